//! CLI command implementations
//!
//! This module contains all CLI command implementations.

pub mod create_user;
pub mod init;
pub mod migrate;
pub mod report;
pub mod serve;
pub mod validate;

//! Storage abstraction layer
//!
//! The clinic talks to its tables through the [`ClinicStore`] trait, with
//! PostgreSQL and in-memory implementations chosen by `database_target`.

pub mod factory;
pub mod traits;

pub use factory::create_store;
pub use traits::{CapacityInsert, ClinicStore};

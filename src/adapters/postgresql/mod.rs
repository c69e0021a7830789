//! PostgreSQL store
//!
//! Connection pooling and the schema live in [`client`]; the
//! [`ClinicStore`](crate::adapters::database::ClinicStore) implementation is
//! in [`adapter`].

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::PostgreSQLAdapter;
pub use client::PostgreSQLClient;

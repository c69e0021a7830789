//! In-memory clinic store
//!
//! Selected with `database_target = "memory"`. Data is lost on exit.

pub mod store;

pub use store::MemoryStore;

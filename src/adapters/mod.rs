//! External system integrations for the clinic.
//!
//! - [`database`] - Storage trait and factory
//! - [`postgresql`] - PostgreSQL store
//! - [`memory`] - In-memory store for tests and demos
//! - [`notify`] - Booking confirmation delivery
//! - [`media`] - Uploaded file storage
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the core can be
//! exercised against the in-memory store and a stub notifier:
//!
//! ```rust
//! use clinic::adapters::database::ClinicStore;
//! use clinic::adapters::memory::MemoryStore;
//! use clinic::domain::NewDoctor;
//!
//! # async fn example() -> clinic::domain::Result<()> {
//! let store = MemoryStore::new();
//! let doctor = store.insert_doctor(NewDoctor::named("Ana Ruiz")).await?;
//! assert_eq!(store.list_doctors().await?.len(), 1);
//! # let _ = doctor;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod media;
pub mod memory;
pub mod notify;
pub mod postgresql;

//! Core business logic for the clinic.
//!
//! Services here take a store handle and, where needed, a notifier or media
//! store. They never see HTTP types; the caller's identity is passed in
//! explicitly.
//!
//! # Modules
//!
//! - [`booking`] - Capacity-checked appointment booking and confirmations
//! - [`directory`] - Doctor list, doctor calendar and appointment detail
//! - [`intake`] - Prescriptions and test result uploads
//! - [`report`] - Daily appointment report and CSV rendering
//! - [`accounts`] - Password hashing, login and account creation
//!
//! # Example
//!
//! ```rust,no_run
//! use clinic::adapters::memory::MemoryStore;
//! use clinic::adapters::notify::LogNotifier;
//! use clinic::core::booking::{BookingForm, BookingOutcome, BookingService};
//! use clinic::domain::{CallerIdentity, DoctorId, UserId};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(MemoryStore::new());
//! let service = BookingService::new(store, Arc::new(LogNotifier), "clinic@example.com");
//!
//! let caller = CallerIdentity {
//!     user_id: UserId::new(1),
//!     username: "sam".to_string(),
//!     is_staff: false,
//! };
//! let form = BookingForm {
//!     timeslot: Some("4".to_string()),
//!     reason: "Follow-up".to_string(),
//! };
//! let request = form.validate(DoctorId::new(2))?;
//!
//! match service.book(&caller, request).await? {
//!     BookingOutcome::Booked(receipt) => println!("booked {}", receipt.appointment.id),
//!     BookingOutcome::Rejected(reason) => println!("{reason}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod accounts;
pub mod booking;
pub mod directory;
pub mod intake;
pub mod report;

pub use accounts::Accounts;
pub use booking::{BookingOutcome, BookingRejection, BookingService};
pub use directory::Directory;
pub use intake::Intake;
pub use report::DailyReport;

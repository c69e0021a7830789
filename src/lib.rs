// Clinic - appointment booking and medical records service
// Copyright (c) 2025 Clinic Contributors
// Licensed under the MIT License

//! # Clinic
//!
//! A small clinic web application: patients browse doctors and book time
//! slots, staff attach prescriptions and test results, and the front desk
//! pulls a daily appointments report.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`web`] - HTTP routes, sessions and server-rendered pages
//! - [`core`] - Business logic (booking, directory, intake, reports, accounts)
//! - [`adapters`] - Storage backends, media files and notifications
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Booking
//!
//! A booking succeeds only while the slot has room. The capacity check and
//! the insert happen atomically in the store, so concurrent requests for the
//! last seat cannot both win:
//!
//! ```rust,no_run
//! use clinic::adapters::memory::MemoryStore;
//! use clinic::adapters::notify::LogNotifier;
//! use clinic::core::booking::{BookingRequest, BookingService};
//! use clinic::domain::{CallerIdentity, DoctorId, SlotId, UserId};
//! use std::sync::Arc;
//!
//! # async fn example() -> clinic::domain::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let booking = BookingService::new(store, Arc::new(LogNotifier), "clinic@example.com");
//!
//! let caller = CallerIdentity {
//!     user_id: UserId::new(1),
//!     username: "sam".to_string(),
//!     is_staff: false,
//! };
//! let request = BookingRequest {
//!     doctor_id: DoctorId::new(1),
//!     slot_id: SlotId::new(3),
//!     reason: "Annual checkup".to_string(),
//! };
//!
//! let outcome = booking.book(&caller, request).await?;
//! println!("booked: {}", outcome.is_booked());
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`domain::Result`] carrying a
//! [`domain::ClinicError`]. Expected refusals such as a full slot are
//! values ([`core::BookingRejection`]), not errors.
//!
//! ## Logging
//!
//! The service logs with `tracing`; see [`logging`] for the console and
//! rolling-file setup.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod web;

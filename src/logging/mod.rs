//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Human-readable or JSON console output
//! - Configurable log levels (`RUST_LOG` overrides)
//! - Local JSON file logging with rotation
//!
//! Booking events are logged through the macros below so that every
//! attempt, rejection and notification carries the same field names.
//!
//! # Example
//!
//! ```no_run
//! use clinic::logging::init_logging;
//! use clinic::config::LoggingConfig;
//!
//! let config = LoggingConfig::console_only();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Clinic started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log a booking attempt
///
/// # Example
///
/// ```no_run
/// use clinic::log_booking_attempt;
/// use clinic::domain::ids::{DoctorId, SlotId, UserId};
///
/// log_booking_attempt!(UserId::new(1), DoctorId::new(2), SlotId::new(3));
/// ```
#[macro_export]
macro_rules! log_booking_attempt {
    ($user_id:expr, $doctor_id:expr, $slot_id:expr) => {
        tracing::info!(
            user_id = %$user_id,
            doctor_id = %$doctor_id,
            slot_id = %$slot_id,
            "Booking attempt"
        );
    };
}

/// Log a booking refused by a business rule
///
/// # Example
///
/// ```no_run
/// use clinic::log_booking_rejected;
/// use clinic::domain::ids::{SlotId, UserId};
///
/// log_booking_rejected!(UserId::new(1), SlotId::new(3), "slot_full");
/// ```
#[macro_export]
macro_rules! log_booking_rejected {
    ($user_id:expr, $slot_id:expr, $reason:expr) => {
        tracing::warn!(
            user_id = %$user_id,
            slot_id = %$slot_id,
            reason = $reason,
            "Booking rejected"
        );
    };
}

/// Log the result of a confirmation delivery
///
/// # Example
///
/// ```no_run
/// use clinic::log_notification_outcome;
/// use clinic::domain::ids::AppointmentId;
///
/// log_notification_outcome!(AppointmentId::new(7), "sent", "");
/// ```
#[macro_export]
macro_rules! log_notification_outcome {
    ($appointment_id:expr, $outcome:expr, $detail:expr) => {
        tracing::info!(
            appointment_id = %$appointment_id,
            outcome = $outcome,
            detail = $detail,
            "Notification outcome"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use clinic::log_error_with_context;
/// use clinic::domain::ClinicError;
///
/// let error = ClinicError::Database("connection reset".to_string());
/// log_error_with_context!(&error, "Failed to load doctor");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}

//! Domain models and types for the clinic service.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`DoctorId`], [`SlotId`], [`PatientId`], ...)
//! - **Entities** ([`Doctor`], [`Patient`], [`TimeSlot`], [`Appointment`],
//!   [`Prescription`], [`TestResult`], [`User`])
//! - **Field validation** ([`validation::FieldErrors`])
//! - **Error types** ([`ClinicError`], [`ConflictKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use clinic::domain::{DoctorId, SlotId};
//!
//! let doctor = DoctorId::new(1);
//! let slot = SlotId::new(1);
//!
//! // This won't compile - type safety prevents mixing IDs
//! // let wrong: DoctorId = slot;
//! # let _ = (doctor, slot);
//! ```

pub mod appointment;
pub mod errors;
pub mod ids;
pub mod patient;
pub mod records;
pub mod result;
pub mod schedule;
pub mod staff;
pub mod user;
pub mod validation;

// Re-export commonly used types for convenience
pub use appointment::{
    Appointment, AppointmentDetail, AppointmentStatus, AppointmentSummary, DailyAppointment,
    NewAppointment,
};
pub use errors::{ClinicError, ConflictKind};
pub use ids::{
    AppointmentId, DoctorId, PatientId, PrescriptionId, SlotId, SpecialtyId, TestResultId, UserId,
};
pub use patient::{NewPatient, Patient};
pub use records::{NewPrescription, NewTestResult, Prescription, TestResult};
pub use result::Result;
pub use schedule::{NewTimeSlot, SlotAvailability, TimeSlot};
pub use staff::{Doctor, NewDoctor, Specialty};
pub use user::{CallerIdentity, NewUser, User};

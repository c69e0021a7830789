//! Domain error types
//!
//! This module defines the error hierarchy for the clinic service.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main clinic error type
///
/// This is the primary error type used throughout the application.
/// Business-rule rejections of a booking are not errors; see
/// [`crate::core::booking::BookingRejection`].
#[derive(Debug, Error)]
pub enum ClinicError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// A referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint rejected the write
    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    /// Authentication errors
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Media (uploaded file) storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Which uniqueness rule a rejected write violated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The patient already holds an appointment in the time slot
    DuplicateBooking,
    /// The appointment already has a prescription
    DuplicatePrescription,
    /// A specialty with the same name exists
    DuplicateSpecialty,
    /// The doctor already has a slot starting at that date and time
    DuplicateTimeSlot,
    /// The username is taken
    DuplicateUsername,
    /// The user account is already linked to another profile
    UserAlreadyLinked,
}

impl ConflictKind {
    /// Human-readable message suitable for showing to the user
    pub fn message(&self) -> &'static str {
        match self {
            ConflictKind::DuplicateBooking => "You already have an appointment in this time slot.",
            ConflictKind::DuplicatePrescription => {
                "A prescription already exists for this appointment."
            }
            ConflictKind::DuplicateSpecialty => "A specialty with this name already exists.",
            ConflictKind::DuplicateTimeSlot => {
                "This doctor already has a time slot starting at that date and time."
            }
            ConflictKind::DuplicateUsername => "This username is already taken.",
            ConflictKind::UserAlreadyLinked => "This user is already linked to a profile.",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl ClinicError {
    /// Returns the conflict kind if this is a uniqueness violation
    pub fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            ClinicError::Conflict(kind) => Some(*kind),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for ClinicError {
    fn from(err: std::io::Error) -> Self {
        ClinicError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        ClinicError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for ClinicError {
    fn from(err: toml::de::Error) -> Self {
        ClinicError::Configuration(format!("TOML parse error: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clinic_error_display() {
        let err = ClinicError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_conflict_display_uses_user_message() {
        let err = ClinicError::Conflict(ConflictKind::DuplicateBooking);
        assert_eq!(
            err.to_string(),
            "Conflict: You already have an appointment in this time slot."
        );
        assert_eq!(err.conflict_kind(), Some(ConflictKind::DuplicateBooking));
    }

    #[test]
    fn test_non_conflict_has_no_kind() {
        let err = ClinicError::NotFound("doctor 4".to_string());
        assert_eq!(err.conflict_kind(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let clinic_err: ClinicError = io_err.into();
        assert!(matches!(clinic_err, ClinicError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let clinic_err: ClinicError = json_err.into();
        assert!(matches!(clinic_err, ClinicError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let clinic_err: ClinicError = toml_err.into();
        assert!(matches!(clinic_err, ClinicError::Configuration(_)));
        assert!(clinic_err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_clinic_error_implements_std_error() {
        let err = ClinicError::Validation("Test error".to_string());
        let _: &dyn std::error::Error = &err;
    }
}

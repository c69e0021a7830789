//! Field validation applied before any write
//!
//! Validators collect every problem into [`FieldErrors`] instead of stopping
//! at the first one, so a form can be re-rendered with all messages inline.

use super::schedule::NewTimeSlot;
use super::staff::NewDoctor;
use super::patient::NewPatient;
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Longest accepted free-text field (reason, notes, content, bio)
pub const MAX_TEXT_LEN: usize = 10_000;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_SPECIALTY_LEN: usize = 100;
pub const MAX_PHONE_LEN: usize = 30;
pub const MAX_USERNAME_LEN: usize = 150;

/// Per-field validation messages, in the order they were found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(String, String)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message against a field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push((field.into(), message.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Messages recorded for one field
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.errors
            .iter()
            .filter(move |(f, _)| f == field)
            .map(|(_, m)| m.as_str())
    }

    /// Whether any message was recorded for the field
    pub fn has(&self, field: &str) -> bool {
        self.errors.iter().any(|(f, _)| f == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.errors.iter().map(|(f, m)| (f.as_str(), m.as_str()))
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }

    /// Parses a required identifier field
    pub fn required_id<T: FromStr>(&mut self, field: &str, raw: Option<&str>) -> Option<T> {
        match raw.map(str::trim) {
            None | Some("") => {
                self.add(field, "This field is required.");
                None
            }
            Some(value) => match value.parse::<T>() {
                Ok(id) => Some(id),
                Err(_) => {
                    self.add(field, "Select a valid choice.");
                    None
                }
            },
        }
    }

    /// Requires a non-blank value
    pub fn required_text(&mut self, field: &str, value: &str) {
        if value.trim().is_empty() {
            self.add(field, "This field is required.");
        }
    }

    /// Rejects values longer than `max` characters
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {len})."),
            );
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

impl From<FieldErrors> for super::errors::ClinicError {
    fn from(errors: FieldErrors) -> Self {
        super::errors::ClinicError::Validation(errors.to_string())
    }
}

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

/// Whether the address looks like `local@domain.tld`
pub fn is_plausible_email(email: &str) -> bool {
    email_pattern().is_some_and(|pattern| pattern.is_match(email.trim()))
}

pub fn validate_time_slot(slot: &NewTimeSlot) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    if slot.capacity < 1 {
        errors.add("capacity", "Ensure this value is greater than or equal to 1.");
    }
    if i16::try_from(slot.capacity).is_err() {
        errors.add("capacity", format!("Ensure this value is at most {}.", i16::MAX));
    }
    if slot.end <= slot.start {
        errors.add("end", "The end time must be after the start time.");
    }
    errors.into_result(())
}

pub fn validate_specialty_name(name: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.required_text("name", name);
    errors.max_len("name", name, MAX_SPECIALTY_LEN);
    errors.into_result(())
}

pub fn validate_new_doctor(doctor: &NewDoctor) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.required_text("full_name", &doctor.full_name);
    errors.max_len("full_name", &doctor.full_name, MAX_NAME_LEN);
    errors.max_len("phone", &doctor.phone, MAX_PHONE_LEN);
    errors.max_len("bio", &doctor.bio, MAX_TEXT_LEN);
    errors.into_result(())
}

pub fn validate_new_patient(patient: &NewPatient) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.required_text("full_name", &patient.full_name);
    errors.max_len("full_name", &patient.full_name, MAX_NAME_LEN);
    errors.max_len("phone", &patient.phone, MAX_PHONE_LEN);
    errors.max_len("medical_history", &patient.medical_history, MAX_TEXT_LEN);
    if !patient.email.trim().is_empty() && !is_plausible_email(&patient.email) {
        errors.add("email", "Enter a valid email address.");
    }
    errors.into_result(())
}

pub fn validate_username(username: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();
    errors.required_text("username", username);
    errors.max_len("username", username, MAX_USERNAME_LEN);
    if username.chars().any(char::is_whitespace) {
        errors.add("username", "Usernames cannot contain spaces.");
    }
    errors.into_result(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{DoctorId, SlotId};
    use chrono::{NaiveDate, NaiveTime};

    #[test]
    fn test_required_id_missing() {
        let mut errors = FieldErrors::new();
        let id: Option<SlotId> = errors.required_id("timeslot", None);
        assert!(id.is_none());
        assert_eq!(
            errors.for_field("timeslot").collect::<Vec<_>>(),
            vec!["This field is required."]
        );
    }

    #[test]
    fn test_required_id_invalid() {
        let mut errors = FieldErrors::new();
        let id: Option<SlotId> = errors.required_id("timeslot", Some("nine"));
        assert!(id.is_none());
        assert!(errors.has("timeslot"));
    }

    #[test]
    fn test_required_id_valid() {
        let mut errors = FieldErrors::new();
        let id: Option<SlotId> = errors.required_id("timeslot", Some("9"));
        assert_eq!(id, Some(SlotId::new(9)));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_max_len_counts_chars() {
        let mut errors = FieldErrors::new();
        errors.max_len("name", "ééé", 3);
        assert!(errors.is_empty());
        errors.max_len("name", "éééé", 3);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_display_joins_fields() {
        let mut errors = FieldErrors::new();
        errors.add("a", "bad");
        errors.add("b", "worse");
        assert_eq!(errors.to_string(), "a: bad; b: worse");
    }

    #[test]
    fn test_email_plausibility() {
        assert!(is_plausible_email("sam@example.com"));
        assert!(!is_plausible_email("sam@example"));
        assert!(!is_plausible_email("sam example.com"));
        assert!(!is_plausible_email(""));
    }

    #[test]
    fn test_time_slot_validation_collects_all() {
        let slot = NewTimeSlot {
            doctor_id: DoctorId::new(1),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            capacity: 0,
        };
        let errors = validate_time_slot(&slot).unwrap_err();
        assert!(errors.has("capacity"));
        assert!(errors.has("end"));
    }

    #[test]
    fn test_patient_email_optional_but_checked() {
        let mut patient = NewPatient::named("Sam");
        assert!(validate_new_patient(&patient).is_ok());
        patient.email = "nope".to_string();
        assert!(validate_new_patient(&patient).unwrap_err().has("email"));
    }

    #[test]
    fn test_specialty_name_required() {
        assert!(validate_specialty_name("  ").is_err());
        assert!(validate_specialty_name(&"x".repeat(101)).is_err());
        assert!(validate_specialty_name("Dermatology").is_ok());
    }

    #[test]
    fn test_username_rules() {
        assert!(validate_username("front desk").is_err());
        assert!(validate_username("").is_err());
        assert!(validate_username("frontdesk").is_ok());
    }
}

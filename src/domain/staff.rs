//! Specialties and doctors

use super::ids::{DoctorId, SpecialtyId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A medical specialty (e.g. "Cardiology"); names are unique
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: SpecialtyId,
    pub name: String,
}

/// A doctor who owns time slots and receives appointments
///
/// The specialty is optional: deleting a specialty keeps its doctors and
/// clears the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,

    /// Login account linked to this doctor, if any
    pub user_id: Option<UserId>,

    pub full_name: String,

    pub specialty: Option<Specialty>,

    pub bio: String,

    /// Photo path relative to the media root
    pub photo: Option<String>,

    pub phone: String,
}

impl Doctor {
    /// Specialty name, or an empty string when none is set
    pub fn specialty_name(&self) -> &str {
        self.specialty.as_ref().map(|s| s.name.as_str()).unwrap_or("")
    }
}

impl fmt::Display for Doctor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.specialty {
            Some(specialty) => write!(f, "Dr. {} ({})", self.full_name, specialty.name),
            None => write!(f, "Dr. {}", self.full_name),
        }
    }
}

/// Fields for registering a doctor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDoctor {
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub specialty_id: Option<SpecialtyId>,
    pub bio: String,
    pub photo: Option<String>,
    pub phone: String,
}

impl NewDoctor {
    /// Creates a doctor record with only the required name set
    pub fn named(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    /// Sets the specialty
    pub fn with_specialty(mut self, specialty_id: SpecialtyId) -> Self {
        self.specialty_id = Some(specialty_id);
        self
    }

    /// Sets the phone number
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Sets the biography
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }
}

//! Patient profiles

use super::ids::{PatientId, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A patient profile, optionally linked to a login account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub dob: Option<NaiveDate>,
    pub phone: String,

    /// Confirmation address; may be blank
    pub email: String,

    pub medical_history: String,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// Whether booking confirmations can be addressed to this patient
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }
}

/// Fields for registering a patient
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPatient {
    pub user_id: Option<UserId>,
    pub full_name: String,
    pub dob: Option<NaiveDate>,
    pub phone: String,
    pub email: String,
    pub medical_history: String,
}

impl NewPatient {
    /// Creates a patient record with only the required name set
    pub fn named(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            ..Self::default()
        }
    }

    /// Links the profile to a login account
    pub fn for_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Sets the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    /// Sets the date of birth
    pub fn with_dob(mut self, dob: NaiveDate) -> Self {
        self.dob = Some(dob);
        self
    }
}

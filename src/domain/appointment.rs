//! Appointments

use super::ids::{AppointmentId, DoctorId, PatientId, SlotId};
use super::records::Prescription;
use super::schedule::TimeSlot;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle state of an appointment
///
/// Only `Scheduled` appointments count against a slot's capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Cancelled,
    Completed,
}

impl AppointmentStatus {
    /// Database and report representation
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Completed => "completed",
        }
    }

    /// Title-cased label for pages
    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(AppointmentStatus::Scheduled),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            "completed" => Ok(AppointmentStatus::Completed),
            other => Err(format!("Unknown appointment status: {other}")),
        }
    }
}

/// A patient's booking of a doctor's time slot
///
/// `(patient_id, timeslot_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub timeslot_id: SlotId,
    pub reason: String,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting an appointment; status is always `scheduled`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub timeslot_id: SlotId,
    pub reason: String,
}

/// An appointment with the names and slot needed for listing it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentSummary {
    pub appointment: Appointment,
    pub doctor_name: String,
    pub slot: TimeSlot,
}

/// Everything shown on the appointment detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentDetail {
    pub appointment: Appointment,
    pub patient_name: String,
    pub doctor_name: String,
    pub slot: TimeSlot,
    pub prescription: Option<Prescription>,
}

/// One appointment on a given day, flattened for the daily report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyAppointment {
    pub appointment_id: AppointmentId,
    pub patient_name: String,
    pub doctor_name: String,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Cancelled,
            AppointmentStatus::Completed,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_status_unknown_value() {
        assert!("pending".parse::<AppointmentStatus>().is_err());
        assert!("Scheduled".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_status_default_is_scheduled() {
        assert_eq!(AppointmentStatus::default(), AppointmentStatus::Scheduled);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AppointmentStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}

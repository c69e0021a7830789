//! Clinical records attached to appointments and patients

use super::ids::{AppointmentId, PatientId, PrescriptionId, TestResultId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A prescription; at most one per appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prescription {
    pub id: PrescriptionId,
    pub appointment_id: AppointmentId,
    pub content: String,

    /// Attachment path relative to the media root (`prescriptions/...`)
    pub file: Option<String>,

    pub prescribed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrescription {
    pub appointment_id: AppointmentId,
    pub content: String,
    pub file: Option<String>,
}

/// An uploaded laboratory or imaging result for a patient
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: TestResultId,
    pub patient_id: PatientId,

    /// Account that uploaded the file; cleared if the account is deleted
    pub uploaded_by: Option<UserId>,

    /// File path relative to the media root (`test_results/...`)
    pub file: String,

    pub notes: String,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTestResult {
    pub patient_id: PatientId,
    pub uploaded_by: Option<UserId>,
    pub file: String,
    pub notes: String,
}

//! Prescriptions and test result uploads
//!
//! Forms are checked first; a form with field problems comes back as
//! `Ok(Err(FieldErrors))` so the page can be shown again with the messages
//! inline. Files are only written once the form is valid and the target
//! record exists.

use crate::adapters::database::ClinicStore;
use crate::adapters::media::{MediaKind, MediaStore, Upload};
use crate::domain::validation::{FieldErrors, MAX_TEXT_LEN};
use crate::domain::{
    AppointmentId, CallerIdentity, ClinicError, ConflictKind, NewPrescription, NewTestResult,
    Patient, PatientId, Prescription, Result, TestResult,
};
use std::sync::Arc;

/// Outcome of a form submission that passed or failed field checks
pub type FormResult<T> = std::result::Result<T, FieldErrors>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrescriptionForm {
    pub content: String,
    pub file: Option<Upload>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestResultForm {
    pub patient: Option<String>,
    pub file: Option<Upload>,
    pub notes: String,
}

fn check_upload(errors: &mut FieldErrors, upload: &Upload, max_bytes: usize) {
    if upload.bytes.is_empty() {
        errors.add("file", "The submitted file is empty.");
    } else if upload.bytes.len() > max_bytes {
        errors.add(
            "file",
            format!("File too large. Maximum {}MB.", max_bytes / (1024 * 1024)),
        );
    }
}

impl PrescriptionForm {
    pub fn validate(&self, max_bytes: usize) -> FormResult<()> {
        let mut errors = FieldErrors::new();
        errors.required_text("content", &self.content);
        errors.max_len("content", &self.content, MAX_TEXT_LEN);
        if let Some(upload) = &self.file {
            check_upload(&mut errors, upload, max_bytes);
        }
        errors.into_result(())
    }
}

impl TestResultForm {
    /// Checks the fields and returns the chosen patient id and file
    pub fn validate(&self, max_bytes: usize) -> FormResult<(PatientId, &Upload)> {
        let mut errors = FieldErrors::new();
        let patient_id: Option<PatientId> = errors.required_id("patient", self.patient.as_deref());
        match &self.file {
            Some(upload) => check_upload(&mut errors, upload, max_bytes),
            None => errors.add("file", "This field is required."),
        }
        errors.max_len("notes", &self.notes, MAX_TEXT_LEN);
        match (patient_id, &self.file) {
            (Some(id), Some(upload)) if errors.is_empty() => Ok((id, upload)),
            _ => Err(errors),
        }
    }
}

/// Records prescriptions and test results
#[derive(Clone)]
pub struct Intake {
    store: Arc<dyn ClinicStore + Send + Sync>,
    media: MediaStore,
}

impl Intake {
    pub fn new(store: Arc<dyn ClinicStore + Send + Sync>, media: MediaStore) -> Self {
        Self { store, media }
    }

    /// Patients offered on the upload form
    pub async fn patients(&self) -> Result<Vec<Patient>> {
        self.store.list_patients().await
    }

    /// Attach a prescription to an appointment
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown appointment,
    /// `Conflict(DuplicatePrescription)` if one already exists, and storage
    /// errors.
    pub async fn create_prescription(
        &self,
        appointment_id: AppointmentId,
        form: PrescriptionForm,
    ) -> Result<FormResult<Prescription>> {
        let detail = self
            .store
            .appointment_detail(appointment_id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("appointment {appointment_id}")))?;

        if let Err(errors) = form.validate(self.media.max_bytes()) {
            return Ok(Err(errors));
        }
        if detail.prescription.is_some() {
            return Err(ClinicError::Conflict(ConflictKind::DuplicatePrescription));
        }

        let file = match &form.file {
            Some(upload) => Some(self.media.save(MediaKind::Prescription, upload).await?),
            None => None,
        };

        let prescription = self
            .store
            .insert_prescription(NewPrescription {
                appointment_id,
                content: form.content.trim().to_string(),
                file: file.clone(),
            })
            .await;

        match prescription {
            Ok(prescription) => {
                tracing::info!(
                    appointment_id = %appointment_id,
                    prescription_id = %prescription.id,
                    with_file = prescription.file.is_some(),
                    "Prescription saved"
                );
                Ok(Ok(prescription))
            }
            Err(e) => {
                if let Some(path) = file {
                    self.discard(&path).await;
                }
                Err(e)
            }
        }
    }

    /// Store a test result file for a patient on behalf of the caller
    ///
    /// # Errors
    ///
    /// Returns storage and store errors. An unknown patient is reported as a
    /// field error.
    pub async fn upload_test_result(
        &self,
        caller: &CallerIdentity,
        form: TestResultForm,
    ) -> Result<FormResult<TestResult>> {
        let (patient_id, upload) = match form.validate(self.media.max_bytes()) {
            Ok(valid) => valid,
            Err(errors) => return Ok(Err(errors)),
        };

        if self.store.get_patient(patient_id).await?.is_none() {
            let mut errors = FieldErrors::new();
            errors.add(
                "patient",
                "Select a valid choice. That choice is not one of the available choices.",
            );
            return Ok(Err(errors));
        }

        let path = self.media.save(MediaKind::TestResult, upload).await?;

        let inserted = self
            .store
            .insert_test_result(NewTestResult {
                patient_id,
                uploaded_by: Some(caller.user_id),
                file: path.clone(),
                notes: form.notes.trim().to_string(),
            })
            .await;

        match inserted {
            Ok(result) => {
                tracing::info!(
                    patient_id = %patient_id,
                    uploaded_by = %caller.user_id,
                    test_result_id = %result.id,
                    "Test result uploaded"
                );
                Ok(Ok(result))
            }
            Err(e) => {
                self.discard(&path).await;
                Err(e)
            }
        }
    }

    async fn discard(&self, relative: &str) {
        let path = self.media.root().join(relative);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphaned upload");
        }
    }
}

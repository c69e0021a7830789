//! Integration tests for prescriptions and test result uploads

mod common;

use clinic::adapters::database::{CapacityInsert, ClinicStore};
use clinic::adapters::media::{MediaStore, Upload};
use clinic::adapters::memory::MemoryStore;
use clinic::core::intake::{PrescriptionForm, TestResultForm};
use clinic::core::Intake;
use clinic::domain::{AppointmentId, ClinicError, ConflictKind, NewAppointment, PatientId};
use common::{at, day, doctor, dyn_store, patient, slot, user};
use std::sync::Arc;
use tempfile::TempDir;

const MAX_BYTES: usize = 1024 * 1024;

struct Setup {
    _media_dir: TempDir,
    root: std::path::PathBuf,
    store: Arc<MemoryStore>,
    intake: Intake,
}

fn setup() -> Setup {
    let media_dir = TempDir::new().unwrap();
    let root = media_dir.path().to_path_buf();
    let store = Arc::new(MemoryStore::new());
    let intake = Intake::new(dyn_store(&store), MediaStore::new(&root, MAX_BYTES));
    Setup {
        _media_dir: media_dir,
        root,
        store,
        intake,
    }
}

async fn booked_appointment(store: &MemoryStore) -> AppointmentId {
    let doc = doctor(store, "Ana Ruiz").await;
    let ts = slot(store, &doc, day(2026, 3, 2), at(9, 0), 2).await;
    let (_, patient) = patient(store, "alice", "alice@example.com").await;
    match store
        .insert_appointment_within_capacity(NewAppointment {
            patient_id: patient.id,
            doctor_id: doc.id,
            timeslot_id: ts.id,
            reason: "Rash".to_string(),
        })
        .await
        .unwrap()
    {
        CapacityInsert::Inserted(a) => a.id,
        full => panic!("unexpected: {full:?}"),
    }
}

fn pdf(name: &str) -> Upload {
    Upload {
        file_name: name.to_string(),
        bytes: b"%PDF-1.4 result".to_vec(),
    }
}

#[tokio::test]
async fn test_prescription_with_file_is_stored_under_media_root() {
    let s = setup();
    let appointment = booked_appointment(&s.store).await;

    let prescription = s
        .intake
        .create_prescription(
            appointment,
            PrescriptionForm {
                content: "  Amoxicillin 500mg  ".to_string(),
                file: Some(pdf("../../etc/rx.pdf")),
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(prescription.content, "Amoxicillin 500mg");
    let file = prescription.file.unwrap();
    assert!(file.starts_with("prescriptions/"));
    assert!(file.ends_with("_rx.pdf"));
    assert_eq!(
        std::fs::read(s.root.join(&file)).unwrap(),
        b"%PDF-1.4 result".to_vec()
    );

    let detail = s.store.appointment_detail(appointment).await.unwrap().unwrap();
    assert_eq!(detail.prescription.unwrap().id, prescription.id);
}

#[tokio::test]
async fn test_second_prescription_is_a_conflict() {
    let s = setup();
    let appointment = booked_appointment(&s.store).await;
    let form = || PrescriptionForm {
        content: "Rest".to_string(),
        file: None,
    };

    s.intake
        .create_prescription(appointment, form())
        .await
        .unwrap()
        .unwrap();
    let err = s
        .intake
        .create_prescription(appointment, form())
        .await
        .unwrap_err();

    assert_eq!(err.conflict_kind(), Some(ConflictKind::DuplicatePrescription));
}

#[tokio::test]
async fn test_prescription_form_errors_write_nothing() {
    let s = setup();
    let appointment = booked_appointment(&s.store).await;

    let errors = s
        .intake
        .create_prescription(
            appointment,
            PrescriptionForm {
                content: "   ".to_string(),
                file: Some(pdf("rx.pdf")),
            },
        )
        .await
        .unwrap()
        .unwrap_err();

    assert!(errors.has("content"));
    assert!(!s.root.join("prescriptions").exists());
    let detail = s.store.appointment_detail(appointment).await.unwrap().unwrap();
    assert!(detail.prescription.is_none());
}

#[tokio::test]
async fn test_prescription_for_unknown_appointment() {
    let s = setup();
    let err = s
        .intake
        .create_prescription(
            AppointmentId::new(404),
            PrescriptionForm {
                content: "Rest".to_string(),
                file: None,
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ClinicError::NotFound(_)));
}

#[tokio::test]
async fn test_upload_test_result_records_uploader() {
    let s = setup();
    let (_, patient) = patient(&s.store, "alice", "alice@example.com").await;
    let nurse = user(&s.store, "nurse", true).await;
    let caller = clinic::domain::CallerIdentity::from(&nurse);

    let result = s
        .intake
        .upload_test_result(
            &caller,
            TestResultForm {
                patient: Some(patient.id.to_string()),
                file: Some(pdf("blood panel.pdf")),
                notes: "Fasting".to_string(),
            },
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(result.patient_id, patient.id);
    assert_eq!(result.uploaded_by, Some(nurse.id));
    assert!(result.file.starts_with("test_results/"));
    assert!(s.root.join(&result.file).is_file());

    let listed = s.store.test_results_for_patient(patient.id).await.unwrap();
    assert_eq!(listed.len(), 1);
}

#[tokio::test]
async fn test_upload_for_unknown_patient_is_a_field_error() {
    let s = setup();
    let nurse = user(&s.store, "nurse", true).await;

    let errors = s
        .intake
        .upload_test_result(
            &clinic::domain::CallerIdentity::from(&nurse),
            TestResultForm {
                patient: Some(PatientId::new(77).to_string()),
                file: Some(pdf("scan.pdf")),
                notes: String::new(),
            },
        )
        .await
        .unwrap()
        .unwrap_err();

    assert!(errors.has("patient"));
    assert!(!s.root.join("test_results").exists());
}

#[tokio::test]
async fn test_oversize_upload_is_rejected() {
    let s = setup();
    let (_, patient) = patient(&s.store, "alice", "alice@example.com").await;
    let nurse = user(&s.store, "nurse", true).await;

    let errors = s
        .intake
        .upload_test_result(
            &clinic::domain::CallerIdentity::from(&nurse),
            TestResultForm {
                patient: Some(patient.id.to_string()),
                file: Some(Upload {
                    file_name: "huge.bin".to_string(),
                    bytes: vec![0; MAX_BYTES + 1],
                }),
                notes: String::new(),
            },
        )
        .await
        .unwrap()
        .unwrap_err();

    assert!(errors.has("file"));
}

//! Integration tests for the daily appointments report

mod common;

use clinic::adapters::database::{CapacityInsert, ClinicStore};
use clinic::adapters::memory::MemoryStore;
use clinic::core::DailyReport;
use clinic::domain::{AppointmentStatus, Doctor, NewAppointment, NewPatient, Patient, TimeSlot};
use common::{at, day, doctor, slot};

async fn named_patient(store: &MemoryStore, name: &str) -> Patient {
    store.insert_patient(NewPatient::named(name)).await.unwrap()
}

async fn appoint(store: &MemoryStore, patient: &Patient, doctor: &Doctor, slot: &TimeSlot) -> clinic::domain::AppointmentId {
    match store
        .insert_appointment_within_capacity(NewAppointment {
            patient_id: patient.id,
            doctor_id: doctor.id,
            timeslot_id: slot.id,
            reason: String::new(),
        })
        .await
        .unwrap()
    {
        CapacityInsert::Inserted(appointment) => appointment.id,
        full => panic!("slot unexpectedly full: {full:?}"),
    }
}

#[tokio::test]
async fn test_report_covers_only_the_requested_day_in_order() {
    let store = MemoryStore::new();
    let ana = doctor(&store, "Ana Ruiz").await;
    let ben = doctor(&store, "Ben Okafor").await;

    let monday_late = slot(&store, &ana, day(2026, 3, 2), at(11, 0), 3).await;
    let monday_early = slot(&store, &ben, day(2026, 3, 2), at(9, 0), 3).await;
    let tuesday = slot(&store, &ana, day(2026, 3, 3), at(9, 0), 3).await;

    let zoe = named_patient(&store, "Zoe Park").await;
    let adam = named_patient(&store, "Adam Cole").await;

    appoint(&store, &zoe, &ana, &monday_late).await;
    appoint(&store, &zoe, &ben, &monday_early).await;
    appoint(&store, &adam, &ben, &monday_early).await;
    appoint(&store, &adam, &ana, &tuesday).await;

    let report = DailyReport::build(&store, day(2026, 3, 2)).await.unwrap();

    let lines: Vec<(String, String, String)> = report
        .rows
        .iter()
        .map(|r| (r.start.to_string(), r.patient.clone(), r.doctor.clone()))
        .collect();
    assert_eq!(
        lines,
        vec![
            ("09:00:00".to_string(), "Adam Cole".to_string(), "Ben Okafor".to_string()),
            ("09:00:00".to_string(), "Zoe Park".to_string(), "Ben Okafor".to_string()),
            ("11:00:00".to_string(), "Zoe Park".to_string(), "Ana Ruiz".to_string()),
        ]
    );
    assert_eq!(report.count(AppointmentStatus::Scheduled), 3);
}

#[tokio::test]
async fn test_report_csv_quotes_and_keeps_cancelled_rows() {
    let store = MemoryStore::new();
    let ana = doctor(&store, "Ana Ruiz").await;
    let ts = slot(&store, &ana, day(2026, 3, 2), at(9, 0), 3).await;
    let lee = named_patient(&store, "Lee, Sam").await;
    let quoted = named_patient(&store, "Max \"Doc\" Weber").await;

    let cancelled = appoint(&store, &lee, &ana, &ts).await;
    appoint(&store, &quoted, &ana, &ts).await;
    store
        .set_appointment_status(cancelled, AppointmentStatus::Cancelled)
        .await
        .unwrap();

    let report = DailyReport::build(&store, day(2026, 3, 2)).await.unwrap();

    assert_eq!(
        report.to_csv(),
        "patient,doctor,date,start,status\r\n\
         \"Lee, Sam\",Ana Ruiz,2026-03-02,09:00:00,cancelled\r\n\
         \"Max \"\"Doc\"\" Weber\",Ana Ruiz,2026-03-02,09:00:00,scheduled\r\n"
    );
    assert_eq!(report.csv_filename(), "appointments_2026-03-02.csv");
}

#[tokio::test]
async fn test_day_without_appointments_is_header_only() {
    let store = MemoryStore::new();
    let report = DailyReport::build(&store, day(2026, 12, 25)).await.unwrap();

    assert!(report.is_empty());
    assert_eq!(report.to_csv(), "patient,doctor,date,start,status\r\n");
}

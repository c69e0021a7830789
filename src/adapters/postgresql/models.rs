//! Row mapping for the PostgreSQL store
//!
//! Each `*_from_row` function expects the column names produced by the
//! matching `*_COLUMNS` constant, so queries and mappers stay in step.

use crate::domain::{
    Appointment, AppointmentId, AppointmentStatus, ClinicError, DailyAppointment, Doctor,
    DoctorId, Patient, PatientId, Prescription, PrescriptionId, Result, SlotId, Specialty,
    SpecialtyId, TestResult, TestResultId, TimeSlot, User, UserId,
};
use tokio_postgres::Row;

pub const USER_COLUMNS: &str = "u.id, u.username, u.password_hash, u.is_staff, u.created_at";

pub const DOCTOR_COLUMNS: &str = "d.id, d.user_id, d.full_name, d.bio, d.photo, d.phone, \
     s.id AS specialty_id, s.name AS specialty_name";

pub const PATIENT_COLUMNS: &str = "p.id, p.user_id, p.full_name, p.dob, p.phone, p.email, \
     p.medical_history, p.created_at";

pub const SLOT_COLUMNS: &str =
    "t.id AS slot_id, t.doctor_id AS slot_doctor_id, t.date, t.start_time, t.end_time, t.capacity";

pub const APPOINTMENT_COLUMNS: &str = "a.id AS appointment_id, a.patient_id, a.doctor_id, \
     a.timeslot_id, a.reason, a.status, a.created_at AS appointment_created_at";

pub const PRESCRIPTION_COLUMNS: &str = "r.id, r.appointment_id, r.content, r.file, r.prescribed_at";

pub const TEST_RESULT_COLUMNS: &str = "x.id, x.patient_id, x.uploaded_by, x.file, x.notes, x.uploaded_at";

fn column<'a, T>(row: &'a Row, name: &str) -> Result<T>
where
    T: tokio_postgres::types::FromSql<'a>,
{
    row.try_get(name)
        .map_err(|e| ClinicError::Database(format!("Failed to read column {name}: {e}")))
}

fn opt_id<T>(raw: Option<i64>, wrap: fn(i64) -> T) -> Option<T> {
    raw.map(wrap)
}

pub fn user_from_row(row: &Row) -> Result<User> {
    Ok(User {
        id: UserId::new(column(row, "id")?),
        username: column(row, "username")?,
        password_hash: column(row, "password_hash")?,
        is_staff: column(row, "is_staff")?,
        created_at: column(row, "created_at")?,
    })
}

pub fn doctor_from_row(row: &Row) -> Result<Doctor> {
    let specialty_id: Option<i64> = column(row, "specialty_id")?;
    let specialty_name: Option<String> = column(row, "specialty_name")?;
    let specialty = match (specialty_id, specialty_name) {
        (Some(id), Some(name)) => Some(Specialty {
            id: SpecialtyId::new(id),
            name,
        }),
        _ => None,
    };

    Ok(Doctor {
        id: DoctorId::new(column(row, "id")?),
        user_id: opt_id(column(row, "user_id")?, UserId::new),
        full_name: column(row, "full_name")?,
        specialty,
        bio: column(row, "bio")?,
        photo: column(row, "photo")?,
        phone: column(row, "phone")?,
    })
}

pub fn patient_from_row(row: &Row) -> Result<Patient> {
    Ok(Patient {
        id: PatientId::new(column(row, "id")?),
        user_id: opt_id(column(row, "user_id")?, UserId::new),
        full_name: column(row, "full_name")?,
        dob: column(row, "dob")?,
        phone: column(row, "phone")?,
        email: column(row, "email")?,
        medical_history: column(row, "medical_history")?,
        created_at: column(row, "created_at")?,
    })
}

pub fn slot_from_row(row: &Row) -> Result<TimeSlot> {
    let capacity: i16 = column(row, "capacity")?;
    let capacity = u16::try_from(capacity)
        .map_err(|_| ClinicError::Database(format!("Invalid slot capacity {capacity}")))?;

    Ok(TimeSlot {
        id: SlotId::new(column(row, "slot_id")?),
        doctor_id: DoctorId::new(column(row, "slot_doctor_id")?),
        date: column(row, "date")?,
        start: column(row, "start_time")?,
        end: column(row, "end_time")?,
        capacity,
    })
}

pub fn appointment_from_row(row: &Row) -> Result<Appointment> {
    Ok(Appointment {
        id: AppointmentId::new(column(row, "appointment_id")?),
        patient_id: PatientId::new(column(row, "patient_id")?),
        doctor_id: DoctorId::new(column(row, "doctor_id")?),
        timeslot_id: SlotId::new(column(row, "timeslot_id")?),
        reason: column(row, "reason")?,
        status: status_from_row(row)?,
        created_at: column(row, "appointment_created_at")?,
    })
}

fn status_from_row(row: &Row) -> Result<AppointmentStatus> {
    let raw: String = column(row, "status")?;
    raw.parse().map_err(ClinicError::Database)
}

pub fn prescription_from_row(row: &Row) -> Result<Prescription> {
    Ok(Prescription {
        id: PrescriptionId::new(column(row, "id")?),
        appointment_id: AppointmentId::new(column(row, "appointment_id")?),
        content: column(row, "content")?,
        file: column(row, "file")?,
        prescribed_at: column(row, "prescribed_at")?,
    })
}

pub fn test_result_from_row(row: &Row) -> Result<TestResult> {
    Ok(TestResult {
        id: TestResultId::new(column(row, "id")?),
        patient_id: PatientId::new(column(row, "patient_id")?),
        uploaded_by: opt_id(column(row, "uploaded_by")?, UserId::new),
        file: column(row, "file")?,
        notes: column(row, "notes")?,
        uploaded_at: column(row, "uploaded_at")?,
    })
}

/// Expects `appointment_id`, `patient_name`, `doctor_name`, `date`,
/// `start_time` and `status`
pub fn daily_from_row(row: &Row) -> Result<DailyAppointment> {
    Ok(DailyAppointment {
        appointment_id: AppointmentId::new(column(row, "appointment_id")?),
        patient_name: column(row, "patient_name")?,
        doctor_name: column(row, "doctor_name")?,
        date: column(row, "date")?,
        start: column(row, "start_time")?,
        status: status_from_row(row)?,
    })
}

/// Converts a scheduled count from SQL `COUNT(*)`
pub fn count_to_u32(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

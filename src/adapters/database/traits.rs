//! Storage abstraction traits
//!
//! This module defines the trait every clinic store implements. Handlers and
//! core services only ever see `Arc<dyn ClinicStore + Send + Sync>`.

use crate::domain::{
    Appointment, AppointmentDetail, AppointmentId, AppointmentSummary, DailyAppointment, Doctor,
    DoctorId, NewAppointment, NewDoctor, NewPatient, NewPrescription, NewTestResult, NewTimeSlot,
    NewUser, Patient, PatientId, Prescription, Result, SlotAvailability, SlotId, Specialty,
    TestResult, TimeSlot, User, UserId,
};
use async_trait::async_trait;
use chrono::NaiveDate;

/// Result of a capacity-checked appointment insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapacityInsert {
    /// The appointment was written with status `scheduled`
    Inserted(Appointment),

    /// The slot already held `scheduled` appointments up to its capacity;
    /// nothing was written
    Full { capacity: u16, scheduled: u32 },
}

/// Clinic store trait
///
/// Uniqueness violations are reported as
/// [`ClinicError::Conflict`](crate::domain::ClinicError::Conflict) with the
/// matching [`ConflictKind`](crate::domain::ConflictKind). Lookups by id
/// return `Ok(None)` for unknown ids.
#[async_trait]
pub trait ClinicStore: Send + Sync {
    /// Short backend name for health checks and logs
    fn backend_name(&self) -> &'static str;

    /// Test the store connection
    ///
    /// # Errors
    ///
    /// Returns an error if the connection test fails.
    async fn test_connection(&self) -> Result<()>;

    /// Create tables and indexes if they do not exist
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    async fn ensure_schema(&self) -> Result<()>;

    // Accounts

    async fn insert_user(&self, user: NewUser) -> Result<User>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    // Staff

    async fn insert_specialty(&self, name: &str) -> Result<Specialty>;

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor>;

    /// All doctors with their specialty, ordered by full name
    async fn list_doctors(&self) -> Result<Vec<Doctor>>;

    async fn get_doctor(&self, id: DoctorId) -> Result<Option<Doctor>>;

    // Schedule

    async fn insert_timeslot(&self, slot: NewTimeSlot) -> Result<TimeSlot>;

    async fn get_timeslot(&self, id: SlotId) -> Result<Option<TimeSlot>>;

    /// The doctor's slots dated on or after `from`, ordered by date then
    /// start time, each with its current scheduled count
    async fn upcoming_timeslots(
        &self,
        doctor_id: DoctorId,
        from: NaiveDate,
    ) -> Result<Vec<SlotAvailability>>;

    /// Number of `scheduled` appointments referencing the slot
    async fn count_scheduled(&self, slot_id: SlotId) -> Result<u32>;

    // Patients

    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient>;

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>>;

    /// The patient profile linked to a login account
    async fn patient_for_user(&self, user_id: UserId) -> Result<Option<Patient>>;

    /// All patients ordered by full name
    async fn list_patients(&self) -> Result<Vec<Patient>>;

    // Appointments

    /// Counts the slot's scheduled appointments and inserts only if the
    /// count is below capacity, as one atomic step
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the slot does not exist and
    /// `Conflict(DuplicateBooking)` if the patient already holds an
    /// appointment in the slot.
    async fn insert_appointment_within_capacity(
        &self,
        appointment: NewAppointment,
    ) -> Result<CapacityInsert>;

    /// The patient's appointments, ordered by slot date and start time
    async fn appointments_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AppointmentSummary>>;

    async fn appointment_detail(&self, id: AppointmentId) -> Result<Option<AppointmentDetail>>;

    /// Every appointment whose slot falls on `date`, ordered by start time
    /// then patient name
    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<DailyAppointment>>;

    // Records

    async fn insert_prescription(&self, prescription: NewPrescription) -> Result<Prescription>;

    async fn insert_test_result(&self, result: NewTestResult) -> Result<TestResult>;

    /// The patient's test results, newest first
    async fn test_results_for_patient(&self, patient_id: PatientId) -> Result<Vec<TestResult>>;
}

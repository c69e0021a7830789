//! Process-local clinic store
//!
//! Every table lives behind one `tokio::sync::Mutex`, so the capacity check
//! and the insert in [`ClinicStore::insert_appointment_within_capacity`] run
//! under the same guard. The same uniqueness rules as the SQL schema are
//! enforced here.

use crate::adapters::database::traits::{CapacityInsert, ClinicStore};
use crate::domain::{
    Appointment, AppointmentDetail, AppointmentId, AppointmentStatus, AppointmentSummary,
    ClinicError, ConflictKind, DailyAppointment, Doctor, DoctorId, NewAppointment, NewDoctor,
    NewPatient, NewPrescription, NewTestResult, NewTimeSlot, NewUser, Patient, PatientId,
    Prescription, PrescriptionId, Result, SlotAvailability, SlotId, Specialty, SpecialtyId,
    TestResult, TestResultId, TimeSlot, User, UserId,
};
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<UserId, User>,
    specialties: BTreeMap<SpecialtyId, Specialty>,
    doctors: BTreeMap<DoctorId, StoredDoctor>,
    patients: BTreeMap<PatientId, Patient>,
    slots: BTreeMap<SlotId, TimeSlot>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    prescriptions: BTreeMap<PrescriptionId, Prescription>,
    test_results: BTreeMap<TestResultId, TestResult>,
}

/// Doctor row as stored; the specialty is joined on read
#[derive(Debug, Clone)]
struct StoredDoctor {
    id: DoctorId,
    user_id: Option<UserId>,
    full_name: String,
    specialty_id: Option<SpecialtyId>,
    bio: String,
    photo: Option<String>,
    phone: String,
}

impl Tables {
    fn allocate(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn doctor(&self, row: &StoredDoctor) -> Doctor {
        Doctor {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name.clone(),
            specialty: row
                .specialty_id
                .and_then(|id| self.specialties.get(&id).cloned()),
            bio: row.bio.clone(),
            photo: row.photo.clone(),
            phone: row.phone.clone(),
        }
    }

    fn doctor_name(&self, id: DoctorId) -> String {
        self.doctors
            .get(&id)
            .map(|d| d.full_name.clone())
            .unwrap_or_default()
    }

    fn patient_name(&self, id: PatientId) -> String {
        self.patients
            .get(&id)
            .map(|p| p.full_name.clone())
            .unwrap_or_default()
    }

    fn scheduled_in(&self, slot_id: SlotId) -> u32 {
        let count = self
            .appointments
            .values()
            .filter(|a| a.timeslot_id == slot_id && a.status == AppointmentStatus::Scheduled)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    fn user_linked(&self, user_id: Option<UserId>) -> Result<()> {
        let Some(user_id) = user_id else {
            return Ok(());
        };
        if !self.users.contains_key(&user_id) {
            return Err(ClinicError::NotFound(format!("user {user_id}")));
        }
        Ok(())
    }
}

/// In-memory implementation of [`ClinicStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites an appointment's status
    ///
    /// Status transitions are not part of the booking workflow; this exists
    /// so tests can put a slot into a state with cancelled appointments.
    pub async fn set_appointment_status(
        &self,
        id: AppointmentId,
        status: AppointmentStatus,
    ) -> Result<()> {
        let mut tables = self.tables.lock().await;
        let appointment = tables
            .appointments
            .get_mut(&id)
            .ok_or_else(|| ClinicError::NotFound(format!("appointment {id}")))?;
        appointment.status = status;
        Ok(())
    }
}

#[async_trait]
impl ClinicStore for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(ClinicError::Conflict(ConflictKind::DuplicateUsername));
        }
        let id = UserId::new(tables.allocate());
        let row = User {
            id,
            username: user.username,
            password_hash: user.password_hash,
            is_staff: user.is_staff,
            created_at: Utc::now(),
        };
        tables.users.insert(id, row.clone());
        Ok(row)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.lock().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_specialty(&self, name: &str) -> Result<Specialty> {
        let mut tables = self.tables.lock().await;
        if tables.specialties.values().any(|s| s.name == name) {
            return Err(ClinicError::Conflict(ConflictKind::DuplicateSpecialty));
        }
        let id = SpecialtyId::new(tables.allocate());
        let row = Specialty {
            id,
            name: name.to_string(),
        };
        tables.specialties.insert(id, row.clone());
        Ok(row)
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        let mut tables = self.tables.lock().await;
        tables.user_linked(doctor.user_id)?;
        if doctor.user_id.is_some()
            && tables.doctors.values().any(|d| d.user_id == doctor.user_id)
        {
            return Err(ClinicError::Conflict(ConflictKind::UserAlreadyLinked));
        }
        if let Some(specialty_id) = doctor.specialty_id {
            if !tables.specialties.contains_key(&specialty_id) {
                return Err(ClinicError::NotFound(format!("specialty {specialty_id}")));
            }
        }
        let id = DoctorId::new(tables.allocate());
        let row = StoredDoctor {
            id,
            user_id: doctor.user_id,
            full_name: doctor.full_name,
            specialty_id: doctor.specialty_id,
            bio: doctor.bio,
            photo: doctor.photo,
            phone: doctor.phone,
        };
        let joined = tables.doctor(&row);
        tables.doctors.insert(id, row);
        Ok(joined)
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let tables = self.tables.lock().await;
        let mut doctors: Vec<Doctor> = tables.doctors.values().map(|d| tables.doctor(d)).collect();
        doctors.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(doctors)
    }

    async fn get_doctor(&self, id: DoctorId) -> Result<Option<Doctor>> {
        let tables = self.tables.lock().await;
        Ok(tables.doctors.get(&id).map(|d| tables.doctor(d)))
    }

    async fn insert_timeslot(&self, slot: NewTimeSlot) -> Result<TimeSlot> {
        crate::domain::validation::validate_time_slot(&slot)?;
        let mut tables = self.tables.lock().await;
        if !tables.doctors.contains_key(&slot.doctor_id) {
            return Err(ClinicError::NotFound(format!("doctor {}", slot.doctor_id)));
        }
        if tables.slots.values().any(|s| {
            s.doctor_id == slot.doctor_id && s.date == slot.date && s.start == slot.start
        }) {
            return Err(ClinicError::Conflict(ConflictKind::DuplicateTimeSlot));
        }
        let id = SlotId::new(tables.allocate());
        let row = TimeSlot {
            id,
            doctor_id: slot.doctor_id,
            date: slot.date,
            start: slot.start,
            end: slot.end,
            capacity: slot.capacity,
        };
        tables.slots.insert(id, row.clone());
        Ok(row)
    }

    async fn get_timeslot(&self, id: SlotId) -> Result<Option<TimeSlot>> {
        Ok(self.tables.lock().await.slots.get(&id).cloned())
    }

    async fn upcoming_timeslots(
        &self,
        doctor_id: DoctorId,
        from: NaiveDate,
    ) -> Result<Vec<SlotAvailability>> {
        let tables = self.tables.lock().await;
        let mut slots: Vec<SlotAvailability> = tables
            .slots
            .values()
            .filter(|s| s.doctor_id == doctor_id && s.date >= from)
            .map(|s| SlotAvailability {
                slot: s.clone(),
                scheduled: tables.scheduled_in(s.id),
            })
            .collect();
        slots.sort_by(|a, b| {
            (a.slot.date, a.slot.start, a.slot.id).cmp(&(b.slot.date, b.slot.start, b.slot.id))
        });
        Ok(slots)
    }

    async fn count_scheduled(&self, slot_id: SlotId) -> Result<u32> {
        Ok(self.tables.lock().await.scheduled_in(slot_id))
    }

    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient> {
        let mut tables = self.tables.lock().await;
        tables.user_linked(patient.user_id)?;
        if patient.user_id.is_some()
            && tables.patients.values().any(|p| p.user_id == patient.user_id)
        {
            return Err(ClinicError::Conflict(ConflictKind::UserAlreadyLinked));
        }
        let id = PatientId::new(tables.allocate());
        let row = Patient {
            id,
            user_id: patient.user_id,
            full_name: patient.full_name,
            dob: patient.dob,
            phone: patient.phone,
            email: patient.email,
            medical_history: patient.medical_history,
            created_at: Utc::now(),
        };
        tables.patients.insert(id, row.clone());
        Ok(row)
    }

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>> {
        Ok(self.tables.lock().await.patients.get(&id).cloned())
    }

    async fn patient_for_user(&self, user_id: UserId) -> Result<Option<Patient>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .patients
            .values()
            .find(|p| p.user_id == Some(user_id))
            .cloned())
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let tables = self.tables.lock().await;
        let mut patients: Vec<Patient> = tables.patients.values().cloned().collect();
        patients.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(patients)
    }

    async fn insert_appointment_within_capacity(
        &self,
        appointment: NewAppointment,
    ) -> Result<CapacityInsert> {
        let mut tables = self.tables.lock().await;

        let capacity = tables
            .slots
            .get(&appointment.timeslot_id)
            .map(|s| s.capacity)
            .ok_or_else(|| ClinicError::NotFound(format!("time slot {}", appointment.timeslot_id)))?;
        if !tables.patients.contains_key(&appointment.patient_id) {
            return Err(ClinicError::NotFound(format!(
                "patient {}",
                appointment.patient_id
            )));
        }
        if !tables.doctors.contains_key(&appointment.doctor_id) {
            return Err(ClinicError::NotFound(format!(
                "doctor {}",
                appointment.doctor_id
            )));
        }

        let scheduled = tables.scheduled_in(appointment.timeslot_id);
        if scheduled >= u32::from(capacity) {
            return Ok(CapacityInsert::Full {
                capacity,
                scheduled,
            });
        }

        if tables.appointments.values().any(|a| {
            a.patient_id == appointment.patient_id && a.timeslot_id == appointment.timeslot_id
        }) {
            return Err(ClinicError::Conflict(ConflictKind::DuplicateBooking));
        }

        let id = AppointmentId::new(tables.allocate());
        let row = Appointment {
            id,
            patient_id: appointment.patient_id,
            doctor_id: appointment.doctor_id,
            timeslot_id: appointment.timeslot_id,
            reason: appointment.reason,
            status: AppointmentStatus::Scheduled,
            created_at: Utc::now(),
        };
        tables.appointments.insert(id, row.clone());
        Ok(CapacityInsert::Inserted(row))
    }

    async fn appointments_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AppointmentSummary>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<AppointmentSummary> = tables
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .filter_map(|a| {
                let slot = tables.slots.get(&a.timeslot_id)?.clone();
                Some(AppointmentSummary {
                    appointment: a.clone(),
                    doctor_name: tables.doctor_name(a.doctor_id),
                    slot,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.slot.date, a.slot.start, a.appointment.id).cmp(&(
                b.slot.date,
                b.slot.start,
                b.appointment.id,
            ))
        });
        Ok(rows)
    }

    async fn appointment_detail(&self, id: AppointmentId) -> Result<Option<AppointmentDetail>> {
        let tables = self.tables.lock().await;
        let Some(appointment) = tables.appointments.get(&id) else {
            return Ok(None);
        };
        let Some(slot) = tables.slots.get(&appointment.timeslot_id) else {
            return Ok(None);
        };
        let prescription = tables
            .prescriptions
            .values()
            .find(|p| p.appointment_id == id)
            .cloned();
        Ok(Some(AppointmentDetail {
            appointment: appointment.clone(),
            patient_name: tables.patient_name(appointment.patient_id),
            doctor_name: tables.doctor_name(appointment.doctor_id),
            slot: slot.clone(),
            prescription,
        }))
    }

    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<DailyAppointment>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<DailyAppointment> = tables
            .appointments
            .values()
            .filter_map(|a| {
                let slot = tables.slots.get(&a.timeslot_id)?;
                (slot.date == date).then(|| DailyAppointment {
                    appointment_id: a.id,
                    patient_name: tables.patient_name(a.patient_id),
                    doctor_name: tables.doctor_name(a.doctor_id),
                    date: slot.date,
                    start: slot.start,
                    status: a.status,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (a.start, &a.patient_name, a.appointment_id).cmp(&(
                b.start,
                &b.patient_name,
                b.appointment_id,
            ))
        });
        Ok(rows)
    }

    async fn insert_prescription(&self, prescription: NewPrescription) -> Result<Prescription> {
        let mut tables = self.tables.lock().await;
        if !tables.appointments.contains_key(&prescription.appointment_id) {
            return Err(ClinicError::NotFound(format!(
                "appointment {}",
                prescription.appointment_id
            )));
        }
        if tables
            .prescriptions
            .values()
            .any(|p| p.appointment_id == prescription.appointment_id)
        {
            return Err(ClinicError::Conflict(ConflictKind::DuplicatePrescription));
        }
        let id = PrescriptionId::new(tables.allocate());
        let row = Prescription {
            id,
            appointment_id: prescription.appointment_id,
            content: prescription.content,
            file: prescription.file,
            prescribed_at: Utc::now(),
        };
        tables.prescriptions.insert(id, row.clone());
        Ok(row)
    }

    async fn insert_test_result(&self, result: NewTestResult) -> Result<TestResult> {
        let mut tables = self.tables.lock().await;
        if !tables.patients.contains_key(&result.patient_id) {
            return Err(ClinicError::NotFound(format!("patient {}", result.patient_id)));
        }
        tables.user_linked(result.uploaded_by)?;
        let id = TestResultId::new(tables.allocate());
        let row = TestResult {
            id,
            patient_id: result.patient_id,
            uploaded_by: result.uploaded_by,
            file: result.file,
            notes: result.notes,
            uploaded_at: Utc::now(),
        };
        tables.test_results.insert(id, row.clone());
        Ok(row)
    }

    async fn test_results_for_patient(&self, patient_id: PatientId) -> Result<Vec<TestResult>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<TestResult> = tables
            .test_results
            .values()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

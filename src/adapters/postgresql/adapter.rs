//! PostgreSQL adapter implementing [`ClinicStore`]

use crate::adapters::database::traits::{CapacityInsert, ClinicStore};
use crate::adapters::postgresql::client::{map_db_error, PostgreSQLClient};
use crate::adapters::postgresql::models::{
    appointment_from_row, count_to_u32, daily_from_row, doctor_from_row, patient_from_row,
    prescription_from_row, slot_from_row, test_result_from_row, user_from_row,
    APPOINTMENT_COLUMNS, DOCTOR_COLUMNS, PATIENT_COLUMNS, PRESCRIPTION_COLUMNS, SLOT_COLUMNS,
    TEST_RESULT_COLUMNS, USER_COLUMNS,
};
use crate::domain::validation::validate_time_slot;
use crate::domain::{
    AppointmentDetail, AppointmentId, AppointmentStatus, AppointmentSummary, ClinicError,
    DailyAppointment, Doctor, DoctorId, NewAppointment, NewDoctor, NewPatient, NewPrescription,
    NewTestResult, NewTimeSlot, NewUser, Patient, PatientId, Prescription, Result,
    SlotAvailability, SlotId, Specialty, SpecialtyId, TestResult, TimeSlot, User, UserId,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

const SCHEDULED: &str = "scheduled";

/// PostgreSQL implementation of [`ClinicStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Get a reference to the underlying client
    pub fn client(&self) -> &Arc<PostgreSQLClient> {
        &self.client
    }

    async fn doctor_by_id(&self, id: i64) -> Result<Option<Doctor>> {
        let sql = format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors d \
             LEFT JOIN specialties s ON s.id = d.specialty_id \
             WHERE d.id = $1"
        );
        self.client
            .query_opt(&sql, &[&id])
            .await?
            .as_ref()
            .map(doctor_from_row)
            .transpose()
    }
}

#[async_trait]
impl ClinicStore for PostgreSQLAdapter {
    fn backend_name(&self) -> &'static str {
        "postgresql"
    }

    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_schema(&self) -> Result<()> {
        self.client.ensure_schema().await
    }

    async fn insert_user(&self, user: NewUser) -> Result<User> {
        let row = self
            .client
            .query_one(
                "INSERT INTO users (username, password_hash, is_staff) VALUES ($1, $2, $3) \
                 RETURNING id, username, password_hash, is_staff, created_at",
                &[&user.username, &user.password_hash, &user.is_staff],
            )
            .await?;
        user_from_row(&row)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = $1");
        self.client
            .query_opt(&sql, &[&id.get()])
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.username = $1");
        self.client
            .query_opt(&sql, &[&username])
            .await?
            .as_ref()
            .map(user_from_row)
            .transpose()
    }

    async fn insert_specialty(&self, name: &str) -> Result<Specialty> {
        let row = self
            .client
            .query_one(
                "INSERT INTO specialties (name) VALUES ($1) RETURNING id, name",
                &[&name],
            )
            .await?;
        Ok(Specialty {
            id: SpecialtyId::new(row.try_get("id").map_err(map_db_error)?),
            name: row.try_get("name").map_err(map_db_error)?,
        })
    }

    async fn insert_doctor(&self, doctor: NewDoctor) -> Result<Doctor> {
        let row = self
            .client
            .query_one(
                "INSERT INTO doctors (user_id, full_name, specialty_id, bio, photo, phone) \
                 VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
                &[
                    &doctor.user_id.map(UserId::get),
                    &doctor.full_name,
                    &doctor.specialty_id.map(SpecialtyId::get),
                    &doctor.bio,
                    &doctor.photo,
                    &doctor.phone,
                ],
            )
            .await?;
        let id: i64 = row.try_get("id").map_err(map_db_error)?;
        self.doctor_by_id(id)
            .await?
            .ok_or_else(|| ClinicError::Database(format!("Inserted doctor {id} not readable")))
    }

    async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        let sql = format!(
            "SELECT {DOCTOR_COLUMNS} FROM doctors d \
             LEFT JOIN specialties s ON s.id = d.specialty_id \
             ORDER BY d.full_name, d.id"
        );
        self.client
            .query(&sql, &[])
            .await?
            .iter()
            .map(doctor_from_row)
            .collect()
    }

    async fn get_doctor(&self, id: DoctorId) -> Result<Option<Doctor>> {
        self.doctor_by_id(id.get()).await
    }

    async fn insert_timeslot(&self, slot: NewTimeSlot) -> Result<TimeSlot> {
        validate_time_slot(&slot)?;
        let capacity = i16::try_from(slot.capacity)
            .map_err(|_| ClinicError::Validation(format!("capacity {} too large", slot.capacity)))?;
        let row = self
            .client
            .query_one(
                "INSERT INTO time_slots (doctor_id, date, start_time, end_time, capacity) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id AS slot_id, doctor_id AS slot_doctor_id, date, start_time, \
                 end_time, capacity",
                &[
                    &slot.doctor_id.get(),
                    &slot.date,
                    &slot.start,
                    &slot.end,
                    &capacity,
                ],
            )
            .await?;
        slot_from_row(&row)
    }

    async fn get_timeslot(&self, id: SlotId) -> Result<Option<TimeSlot>> {
        let sql = format!("SELECT {SLOT_COLUMNS} FROM time_slots t WHERE t.id = $1");
        self.client
            .query_opt(&sql, &[&id.get()])
            .await?
            .as_ref()
            .map(slot_from_row)
            .transpose()
    }

    async fn upcoming_timeslots(
        &self,
        doctor_id: DoctorId,
        from: NaiveDate,
    ) -> Result<Vec<SlotAvailability>> {
        let sql = format!(
            "SELECT {SLOT_COLUMNS}, \
             (SELECT COUNT(*) FROM appointments a \
              WHERE a.timeslot_id = t.id AND a.status = '{SCHEDULED}') AS scheduled \
             FROM time_slots t \
             WHERE t.doctor_id = $1 AND t.date >= $2 \
             ORDER BY t.date, t.start_time, t.id"
        );
        let rows = self.client.query(&sql, &[&doctor_id.get(), &from]).await?;
        rows.iter()
            .map(|row| {
                let scheduled: i64 = row.try_get("scheduled").map_err(map_db_error)?;
                Ok(SlotAvailability {
                    slot: slot_from_row(row)?,
                    scheduled: count_to_u32(scheduled),
                })
            })
            .collect()
    }

    async fn count_scheduled(&self, slot_id: SlotId) -> Result<u32> {
        let row = self
            .client
            .query_one(
                "SELECT COUNT(*) AS scheduled FROM appointments \
                 WHERE timeslot_id = $1 AND status = $2",
                &[&slot_id.get(), &SCHEDULED],
            )
            .await?;
        let count: i64 = row.try_get("scheduled").map_err(map_db_error)?;
        Ok(count_to_u32(count))
    }

    async fn insert_patient(&self, patient: NewPatient) -> Result<Patient> {
        let row = self
            .client
            .query_one(
                "INSERT INTO patients (user_id, full_name, dob, phone, email, medical_history) \
                 VALUES ($1, $2, $3, $4, $5, $6) \
                 RETURNING id, user_id, full_name, dob, phone, email, medical_history, created_at",
                &[
                    &patient.user_id.map(UserId::get),
                    &patient.full_name,
                    &patient.dob,
                    &patient.phone,
                    &patient.email,
                    &patient.medical_history,
                ],
            )
            .await?;
        patient_from_row(&row)
    }

    async fn get_patient(&self, id: PatientId) -> Result<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients p WHERE p.id = $1");
        self.client
            .query_opt(&sql, &[&id.get()])
            .await?
            .as_ref()
            .map(patient_from_row)
            .transpose()
    }

    async fn patient_for_user(&self, user_id: UserId) -> Result<Option<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients p WHERE p.user_id = $1");
        self.client
            .query_opt(&sql, &[&user_id.get()])
            .await?
            .as_ref()
            .map(patient_from_row)
            .transpose()
    }

    async fn list_patients(&self) -> Result<Vec<Patient>> {
        let sql = format!("SELECT {PATIENT_COLUMNS} FROM patients p ORDER BY p.full_name, p.id");
        self.client
            .query(&sql, &[])
            .await?
            .iter()
            .map(patient_from_row)
            .collect()
    }

    async fn insert_appointment_within_capacity(
        &self,
        appointment: NewAppointment,
    ) -> Result<CapacityInsert> {
        let mut conn = self.client.get_connection().await?;
        let tx = conn.transaction().await.map_err(map_db_error)?;

        // Row lock serializes concurrent bookings of the same slot
        let slot = tx
            .query_opt(
                "SELECT capacity FROM time_slots WHERE id = $1 FOR UPDATE",
                &[&appointment.timeslot_id.get()],
            )
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| {
                ClinicError::NotFound(format!("time slot {}", appointment.timeslot_id))
            })?;
        let capacity: i16 = slot.try_get("capacity").map_err(map_db_error)?;
        let capacity = u16::try_from(capacity)
            .map_err(|_| ClinicError::Database(format!("Invalid slot capacity {capacity}")))?;

        let count = tx
            .query_one(
                "SELECT COUNT(*) AS scheduled FROM appointments \
                 WHERE timeslot_id = $1 AND status = $2",
                &[&appointment.timeslot_id.get(), &SCHEDULED],
            )
            .await
            .map_err(map_db_error)?;
        let scheduled = count_to_u32(count.try_get("scheduled").map_err(map_db_error)?);

        if scheduled >= u32::from(capacity) {
            tx.rollback().await.map_err(map_db_error)?;
            return Ok(CapacityInsert::Full {
                capacity,
                scheduled,
            });
        }

        let row = tx
            .query_one(
                "INSERT INTO appointments (patient_id, doctor_id, timeslot_id, reason, status) \
                 VALUES ($1, $2, $3, $4, $5) \
                 RETURNING id AS appointment_id, patient_id, doctor_id, timeslot_id, reason, \
                 status, created_at AS appointment_created_at",
                &[
                    &appointment.patient_id.get(),
                    &appointment.doctor_id.get(),
                    &appointment.timeslot_id.get(),
                    &appointment.reason,
                    &AppointmentStatus::Scheduled.as_str(),
                ],
            )
            .await
            .map_err(map_db_error)?;
        let inserted = appointment_from_row(&row)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(CapacityInsert::Inserted(inserted))
    }

    async fn appointments_for_patient(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<AppointmentSummary>> {
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS}, {SLOT_COLUMNS}, d.full_name AS doctor_name \
             FROM appointments a \
             JOIN time_slots t ON t.id = a.timeslot_id \
             JOIN doctors d ON d.id = a.doctor_id \
             WHERE a.patient_id = $1 \
             ORDER BY t.date, t.start_time, a.id"
        );
        let rows = self.client.query(&sql, &[&patient_id.get()]).await?;
        rows.iter()
            .map(|row| {
                Ok(AppointmentSummary {
                    appointment: appointment_from_row(row)?,
                    doctor_name: row.try_get("doctor_name").map_err(map_db_error)?,
                    slot: slot_from_row(row)?,
                })
            })
            .collect()
    }

    async fn appointment_detail(&self, id: AppointmentId) -> Result<Option<AppointmentDetail>> {
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS}, {SLOT_COLUMNS}, \
             d.full_name AS doctor_name, p.full_name AS patient_name \
             FROM appointments a \
             JOIN time_slots t ON t.id = a.timeslot_id \
             JOIN doctors d ON d.id = a.doctor_id \
             JOIN patients p ON p.id = a.patient_id \
             WHERE a.id = $1"
        );
        let Some(row) = self.client.query_opt(&sql, &[&id.get()]).await? else {
            return Ok(None);
        };

        let prescription_sql =
            format!("SELECT {PRESCRIPTION_COLUMNS} FROM prescriptions r WHERE r.appointment_id = $1");
        let prescription = self
            .client
            .query_opt(&prescription_sql, &[&id.get()])
            .await?
            .as_ref()
            .map(prescription_from_row)
            .transpose()?;

        Ok(Some(AppointmentDetail {
            appointment: appointment_from_row(&row)?,
            patient_name: row.try_get("patient_name").map_err(map_db_error)?,
            doctor_name: row.try_get("doctor_name").map_err(map_db_error)?,
            slot: slot_from_row(&row)?,
            prescription,
        }))
    }

    async fn appointments_on(&self, date: NaiveDate) -> Result<Vec<DailyAppointment>> {
        let rows = self
            .client
            .query(
                "SELECT a.id AS appointment_id, p.full_name AS patient_name, \
                 d.full_name AS doctor_name, t.date, t.start_time, a.status \
                 FROM appointments a \
                 JOIN time_slots t ON t.id = a.timeslot_id \
                 JOIN patients p ON p.id = a.patient_id \
                 JOIN doctors d ON d.id = a.doctor_id \
                 WHERE t.date = $1 \
                 ORDER BY t.start_time, p.full_name, a.id",
                &[&date],
            )
            .await?;
        rows.iter().map(daily_from_row).collect()
    }

    async fn insert_prescription(&self, prescription: NewPrescription) -> Result<Prescription> {
        let row = self
            .client
            .query_one(
                "INSERT INTO prescriptions (appointment_id, content, file) VALUES ($1, $2, $3) \
                 RETURNING id, appointment_id, content, file, prescribed_at",
                &[
                    &prescription.appointment_id.get(),
                    &prescription.content,
                    &prescription.file,
                ],
            )
            .await?;
        prescription_from_row(&row)
    }

    async fn insert_test_result(&self, result: NewTestResult) -> Result<TestResult> {
        let row = self
            .client
            .query_one(
                "INSERT INTO test_results (patient_id, uploaded_by, file, notes) \
                 VALUES ($1, $2, $3, $4) \
                 RETURNING id, patient_id, uploaded_by, file, notes, uploaded_at",
                &[
                    &result.patient_id.get(),
                    &result.uploaded_by.map(UserId::get),
                    &result.file,
                    &result.notes,
                ],
            )
            .await?;
        test_result_from_row(&row)
    }

    async fn test_results_for_patient(&self, patient_id: PatientId) -> Result<Vec<TestResult>> {
        let sql = format!(
            "SELECT {TEST_RESULT_COLUMNS} FROM test_results x \
             WHERE x.patient_id = $1 ORDER BY x.uploaded_at DESC, x.id DESC"
        );
        self.client
            .query(&sql, &[&patient_id.get()])
            .await?
            .iter()
            .map(test_result_from_row)
            .collect()
    }
}

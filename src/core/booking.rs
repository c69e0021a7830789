//! Appointment booking
//!
//! [`BookingService::book`] is the only path that creates appointments. The
//! capacity check and the insert happen in one store call so two patients
//! cannot both take the last place in a slot.

use crate::adapters::database::{CapacityInsert, ClinicStore};
use crate::adapters::notify::{Notification, NotificationOutcome, Notifier};
use crate::domain::validation::FieldErrors;
use crate::domain::{
    Appointment, AppointmentSummary, CallerIdentity, ClinicError, ConflictKind, Doctor, DoctorId,
    NewAppointment, Patient, Result, SlotId, TimeSlot,
};
use crate::{log_booking_attempt, log_booking_rejected, log_notification_outcome};
use std::fmt;
use std::sync::Arc;

/// Longest accepted booking reason
pub const MAX_REASON_LEN: usize = 2000;

/// Subject line of the confirmation email
pub const CONFIRMATION_SUBJECT: &str = "Appointment Scheduled";

/// Raw booking form fields as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
pub struct BookingForm {
    #[serde(default)]
    pub timeslot: Option<String>,
    #[serde(default)]
    pub reason: String,
}

impl BookingForm {
    /// Checks the form and produces a request for the given doctor
    ///
    /// # Errors
    ///
    /// Returns every field problem found: a missing or non-numeric
    /// `timeslot`, or a `reason` longer than [`MAX_REASON_LEN`].
    pub fn validate(&self, doctor_id: DoctorId) -> std::result::Result<BookingRequest, FieldErrors> {
        let mut errors = FieldErrors::new();
        let slot_id: Option<SlotId> = errors.required_id("timeslot", self.timeslot.as_deref());
        errors.max_len("reason", &self.reason, MAX_REASON_LEN);

        match slot_id {
            Some(slot_id) if errors.is_empty() => Ok(BookingRequest {
                doctor_id,
                slot_id,
                reason: self.reason.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// A validated booking request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub doctor_id: DoctorId,
    pub slot_id: SlotId,
    pub reason: String,
}

/// Why a booking was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingRejection {
    /// The caller's account has no patient profile
    NoPatientProfile,
    /// The slot already holds `capacity` scheduled appointments
    SlotFull { capacity: u16, scheduled: u32 },
    /// The patient already has an appointment in the slot
    AlreadyBooked,
    /// The slot is on another doctor's calendar
    SlotDoctorMismatch,
}

impl BookingRejection {
    /// Message shown to the caller
    pub fn message(&self) -> &'static str {
        match self {
            BookingRejection::NoPatientProfile => "No patient profile linked to your user.",
            BookingRejection::SlotFull { .. } => {
                "This time slot is full. Please choose another slot."
            }
            BookingRejection::AlreadyBooked => ConflictKind::DuplicateBooking.message(),
            BookingRejection::SlotDoctorMismatch => {
                "The selected time slot does not belong to this doctor."
            }
        }
    }

    /// Short code used in logs
    pub fn code(&self) -> &'static str {
        match self {
            BookingRejection::NoPatientProfile => "no_patient_profile",
            BookingRejection::SlotFull { .. } => "slot_full",
            BookingRejection::AlreadyBooked => "already_booked",
            BookingRejection::SlotDoctorMismatch => "slot_doctor_mismatch",
        }
    }
}

impl fmt::Display for BookingRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A stored appointment and what happened to its confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingReceipt {
    pub appointment: Appointment,
    pub notification: NotificationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingOutcome {
    Booked(BookingReceipt),
    Rejected(BookingRejection),
}

impl BookingOutcome {
    pub fn is_booked(&self) -> bool {
        matches!(self, BookingOutcome::Booked(_))
    }
}

/// A patient's own appointment list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientAppointments {
    pub patient: Patient,
    pub appointments: Vec<AppointmentSummary>,
}

/// Books appointments and sends confirmations
pub struct BookingService {
    store: Arc<dyn ClinicStore + Send + Sync>,
    notifier: Arc<dyn Notifier>,
    from_address: String,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn ClinicStore + Send + Sync>,
        notifier: Arc<dyn Notifier>,
        from_address: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            from_address: from_address.into(),
        }
    }

    /// Book `request.slot_id` with `request.doctor_id` for the caller
    ///
    /// Business-rule refusals come back as [`BookingOutcome::Rejected`] and
    /// leave the store untouched. The confirmation email never affects the
    /// outcome.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown doctor or slot, and store errors.
    pub async fn book(
        &self,
        caller: &CallerIdentity,
        request: BookingRequest,
    ) -> Result<BookingOutcome> {
        log_booking_attempt!(caller.user_id, request.doctor_id, request.slot_id);

        let patient = match self.store.patient_for_user(caller.user_id).await? {
            Some(patient) => patient,
            None => return Ok(self.reject(caller, request.slot_id, BookingRejection::NoPatientProfile)),
        };

        let doctor = self
            .store
            .get_doctor(request.doctor_id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("doctor {}", request.doctor_id)))?;

        let slot = self
            .store
            .get_timeslot(request.slot_id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("time slot {}", request.slot_id)))?;

        if !slot.belongs_to(doctor.id) {
            return Ok(self.reject(caller, slot.id, BookingRejection::SlotDoctorMismatch));
        }

        let new_appointment = NewAppointment {
            patient_id: patient.id,
            doctor_id: doctor.id,
            timeslot_id: slot.id,
            reason: request.reason,
        };

        let appointment = match self
            .store
            .insert_appointment_within_capacity(new_appointment)
            .await
        {
            Ok(CapacityInsert::Inserted(appointment)) => appointment,
            Ok(CapacityInsert::Full {
                capacity,
                scheduled,
            }) => {
                return Ok(self.reject(
                    caller,
                    slot.id,
                    BookingRejection::SlotFull {
                        capacity,
                        scheduled,
                    },
                ));
            }
            Err(ClinicError::Conflict(ConflictKind::DuplicateBooking)) => {
                return Ok(self.reject(caller, slot.id, BookingRejection::AlreadyBooked));
            }
            Err(e) => return Err(e),
        };

        tracing::info!(
            appointment_id = %appointment.id,
            patient_id = %patient.id,
            doctor_id = %doctor.id,
            slot_id = %slot.id,
            "Appointment booked"
        );

        let notification = self.confirm(&appointment, &patient, &doctor, &slot).await;

        Ok(BookingOutcome::Booked(BookingReceipt {
            appointment,
            notification,
        }))
    }

    /// The caller's appointments, or `None` if the account has no patient
    /// profile
    ///
    /// # Errors
    ///
    /// Returns store errors.
    pub async fn appointments_for(
        &self,
        caller: &CallerIdentity,
    ) -> Result<Option<PatientAppointments>> {
        let Some(patient) = self.store.patient_for_user(caller.user_id).await? else {
            return Ok(None);
        };
        let appointments = self.store.appointments_for_patient(patient.id).await?;
        Ok(Some(PatientAppointments {
            patient,
            appointments,
        }))
    }

    fn reject(
        &self,
        caller: &CallerIdentity,
        slot_id: SlotId,
        rejection: BookingRejection,
    ) -> BookingOutcome {
        log_booking_rejected!(caller.user_id, slot_id, rejection.code());
        BookingOutcome::Rejected(rejection)
    }

    async fn confirm(
        &self,
        appointment: &Appointment,
        patient: &Patient,
        doctor: &Doctor,
        slot: &TimeSlot,
    ) -> NotificationOutcome {
        let outcome = if patient.has_email() {
            let message = confirmation_message(&self.from_address, patient, doctor, slot);
            self.notifier.deliver(&message).await
        } else {
            NotificationOutcome::Skipped("patient has no email address".to_string())
        };

        if let NotificationOutcome::Failed(reason) = &outcome {
            tracing::warn!(
                appointment_id = %appointment.id,
                error = %reason,
                "Failed to send booking confirmation"
            );
        }
        log_notification_outcome!(appointment.id, outcome.label(), outcome.detail());
        outcome
    }
}

/// Builds the confirmation email for a booked slot
pub fn confirmation_message(
    from: &str,
    patient: &Patient,
    doctor: &Doctor,
    slot: &TimeSlot,
) -> Notification {
    Notification {
        from: from.to_string(),
        to: patient.email.trim().to_string(),
        subject: CONFIRMATION_SUBJECT.to_string(),
        body: format!(
            "Your appointment with Dr. {} on {} at {} is scheduled.",
            doctor.full_name,
            slot.date.format("%Y-%m-%d"),
            slot.start.format("%H:%M:%S")
        ),
    }
}

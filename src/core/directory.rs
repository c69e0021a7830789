//! Read-only views of doctors, their calendars and appointments

use crate::adapters::database::ClinicStore;
use crate::domain::{
    AppointmentDetail, AppointmentId, ClinicError, Doctor, DoctorId, Result, SlotAvailability,
};
use chrono::NaiveDate;
use std::sync::Arc;

/// A doctor with the slots still open for booking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCalendar {
    pub doctor: Doctor,
    pub slots: Vec<SlotAvailability>,
}

impl DoctorCalendar {
    /// Slots that can still take a booking
    pub fn bookable(&self) -> impl Iterator<Item = &SlotAvailability> {
        self.slots.iter().filter(|s| !s.is_full())
    }
}

#[derive(Clone)]
pub struct Directory {
    store: Arc<dyn ClinicStore + Send + Sync>,
}

impl Directory {
    pub fn new(store: Arc<dyn ClinicStore + Send + Sync>) -> Self {
        Self { store }
    }

    /// All doctors ordered by name
    pub async fn list_doctors(&self) -> Result<Vec<Doctor>> {
        self.store.list_doctors().await
    }

    /// The doctor and every slot dated `today` or later
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown doctor.
    pub async fn doctor_detail(&self, id: DoctorId, today: NaiveDate) -> Result<DoctorCalendar> {
        let doctor = self
            .store
            .get_doctor(id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("doctor {id}")))?;
        let slots = self.store.upcoming_timeslots(doctor.id, today).await?;

        tracing::debug!(doctor_id = %doctor.id, slots = slots.len(), "Loaded doctor calendar");

        Ok(DoctorCalendar { doctor, slots })
    }

    /// # Errors
    ///
    /// Returns `NotFound` for an unknown appointment.
    pub async fn appointment_detail(&self, id: AppointmentId) -> Result<AppointmentDetail> {
        self.store
            .appointment_detail(id)
            .await?
            .ok_or_else(|| ClinicError::NotFound(format!("appointment {id}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::domain::{NewDoctor, NewTimeSlot};
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, d).unwrap()
    }

    fn at(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_doctor_detail_hides_past_slots() {
        let store = Arc::new(MemoryStore::new());
        let doctor = store.insert_doctor(NewDoctor::named("Ana Ruiz")).await.unwrap();
        for (d, h) in [(9, 10), (10, 11), (10, 9), (12, 8)] {
            store
                .insert_timeslot(
                    NewTimeSlot::builder()
                        .doctor(doctor.id)
                        .date(day(d))
                        .window(at(h), at(h + 1))
                        .build()
                        .unwrap(),
                )
                .await
                .unwrap();
        }

        let directory = Directory::new(store);
        let calendar = directory.doctor_detail(doctor.id, day(10)).await.unwrap();
        let order: Vec<_> = calendar
            .slots
            .iter()
            .map(|s| (s.slot.date, s.slot.start))
            .collect();
        assert_eq!(
            order,
            vec![(day(10), at(9)), (day(10), at(11)), (day(12), at(8))]
        );
        assert_eq!(calendar.bookable().count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_doctor() {
        let directory = Directory::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            directory.doctor_detail(DoctorId::new(5), day(1)).await,
            Err(ClinicError::NotFound(_))
        ));
        assert!(matches!(
            directory.appointment_detail(AppointmentId::new(5)).await,
            Err(ClinicError::NotFound(_))
        ));
    }
}

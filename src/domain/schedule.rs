//! Doctor time slots
//!
//! A time slot is a bookable window on a doctor's calendar. Its capacity is
//! the number of `scheduled` appointments it may hold at once.

use super::ids::{DoctorId, SlotId};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bookable window on a doctor's calendar
///
/// `(doctor_id, date, start)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,

    /// Maximum number of scheduled appointments, at least 1
    pub capacity: u16,
}

impl TimeSlot {
    /// Whether the slot belongs to the given doctor
    pub fn belongs_to(&self, doctor_id: DoctorId) -> bool {
        self.doctor_id == doctor_id
    }

    /// Whether another appointment fits given the current scheduled count
    pub fn has_room_for(&self, scheduled: u32) -> bool {
        scheduled < u32::from(self.capacity)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            self.date,
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// A slot together with its current occupancy, for listing pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotAvailability {
    pub slot: TimeSlot,
    pub scheduled: u32,
}

impl SlotAvailability {
    /// Places left before the slot is full
    pub fn remaining(&self) -> u32 {
        u32::from(self.slot.capacity).saturating_sub(self.scheduled)
    }

    /// Whether the slot can take no more bookings
    pub fn is_full(&self) -> bool {
        !self.slot.has_room_for(self.scheduled)
    }
}

/// Fields for creating a time slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTimeSlot {
    pub doctor_id: DoctorId,
    pub date: NaiveDate,
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub capacity: u16,
}

impl NewTimeSlot {
    /// Creates a new builder
    pub fn builder() -> NewTimeSlotBuilder {
        NewTimeSlotBuilder::default()
    }
}

/// Builder for [`NewTimeSlot`]; capacity defaults to 1
///
/// # Examples
///
/// ```
/// use clinic::domain::ids::DoctorId;
/// use clinic::domain::schedule::NewTimeSlot;
/// use chrono::{NaiveDate, NaiveTime};
///
/// let slot = NewTimeSlot::builder()
///     .doctor(DoctorId::new(1))
///     .date(NaiveDate::from_ymd_opt(2026, 3, 2).unwrap())
///     .window(
///         NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
///         NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
///     )
///     .build()
///     .unwrap();
/// assert_eq!(slot.capacity, 1);
/// ```
#[derive(Debug, Default)]
pub struct NewTimeSlotBuilder {
    doctor_id: Option<DoctorId>,
    date: Option<NaiveDate>,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    capacity: Option<u16>,
}

impl NewTimeSlotBuilder {
    /// Sets the owning doctor
    pub fn doctor(mut self, doctor_id: DoctorId) -> Self {
        self.doctor_id = Some(doctor_id);
        self
    }

    /// Sets the calendar date
    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets start and end time
    pub fn window(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    /// Sets the capacity
    pub fn capacity(mut self, capacity: u16) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Builds the slot
    ///
    /// # Errors
    ///
    /// Returns an error if a required field is missing, the capacity is
    /// zero, or the window ends before it starts.
    pub fn build(self) -> Result<NewTimeSlot, String> {
        let slot = NewTimeSlot {
            doctor_id: self.doctor_id.ok_or("doctor is required")?,
            date: self.date.ok_or("date is required")?,
            start: self.start.ok_or("start is required")?,
            end: self.end.ok_or("end is required")?,
            capacity: self.capacity.unwrap_or(1),
        };
        super::validation::validate_time_slot(&slot).map_err(|errors| errors.to_string())?;
        Ok(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(capacity: u16) -> TimeSlot {
        TimeSlot {
            id: SlotId::new(1),
            doctor_id: DoctorId::new(2),
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            start: t(9, 0),
            end: t(9, 30),
            capacity,
        }
    }

    #[test]
    fn test_has_room_for() {
        let s = slot(2);
        assert!(s.has_room_for(0));
        assert!(s.has_room_for(1));
        assert!(!s.has_room_for(2));
        assert!(!s.has_room_for(3));
    }

    #[test]
    fn test_belongs_to() {
        let s = slot(1);
        assert!(s.belongs_to(DoctorId::new(2)));
        assert!(!s.belongs_to(DoctorId::new(3)));
    }

    #[test]
    fn test_availability_remaining() {
        let a = SlotAvailability {
            slot: slot(3),
            scheduled: 1,
        };
        assert_eq!(a.remaining(), 2);
        assert!(!a.is_full());

        let full = SlotAvailability {
            slot: slot(1),
            scheduled: 4,
        };
        assert_eq!(full.remaining(), 0);
        assert!(full.is_full());
    }

    #[test]
    fn test_display() {
        assert_eq!(slot(1).to_string(), "2026-01-05 09:00-09:30");
    }

    #[test]
    fn test_builder_rejects_zero_capacity() {
        let result = NewTimeSlot::builder()
            .doctor(DoctorId::new(1))
            .date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
            .window(t(9, 0), t(10, 0))
            .capacity(0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_inverted_window() {
        let result = NewTimeSlot::builder()
            .doctor(DoctorId::new(1))
            .date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
            .window(t(10, 0), t(9, 0))
            .build();
        assert!(result.unwrap_err().contains("end"));
    }

    #[test]
    fn test_builder_requires_doctor() {
        let result = NewTimeSlot::builder()
            .date(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap())
            .window(t(9, 0), t(10, 0))
            .build();
        assert_eq!(result.unwrap_err(), "doctor is required");
    }
}

//! Domain identifier types
//!
//! Every table has a `BIGSERIAL` primary key. Each key gets its own newtype
//! so a slot id can never be passed where a doctor id is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database key
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Returns the raw database key
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(format!("{} cannot be empty", $label));
                }
                match trimmed.parse::<i64>() {
                    Ok(id) if id > 0 => Ok(Self(id)),
                    _ => Err(format!("Invalid {}: {}", $label, trimmed)),
                }
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> i64 {
                id.0
            }
        }
    };
}

record_id!(
    /// Login account identifier
    UserId,
    "user id"
);
record_id!(
    /// Medical specialty identifier
    SpecialtyId,
    "specialty id"
);
record_id!(
    /// Doctor identifier
    DoctorId,
    "doctor id"
);
record_id!(
    /// Patient identifier
    PatientId,
    "patient id"
);
record_id!(
    /// Time slot identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use clinic::domain::ids::SlotId;
    ///
    /// let slot: SlotId = "17".parse().unwrap();
    /// assert_eq!(slot.get(), 17);
    /// assert!("abc".parse::<SlotId>().is_err());
    /// ```
    SlotId,
    "time slot id"
);
record_id!(
    /// Appointment identifier
    AppointmentId,
    "appointment id"
);
record_id!(
    /// Prescription identifier
    PrescriptionId,
    "prescription id"
);
record_id!(
    /// Test result identifier
    TestResultId,
    "test result id"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_from_str() {
        let id: DoctorId = "42".parse().unwrap();
        assert_eq!(id.get(), 42);
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_id_from_str_trims_whitespace() {
        let id: SlotId = " 7 ".parse().unwrap();
        assert_eq!(id, SlotId::new(7));
    }

    #[test]
    fn test_id_rejects_empty_and_garbage() {
        assert!("".parse::<PatientId>().is_err());
        assert!("   ".parse::<PatientId>().is_err());
        assert!("x1".parse::<PatientId>().is_err());
    }

    #[test]
    fn test_id_rejects_non_positive() {
        assert!("0".parse::<AppointmentId>().is_err());
        assert!("-3".parse::<AppointmentId>().is_err());
    }

    #[test]
    fn test_id_serializes_as_number() {
        let json = serde_json::to_string(&UserId::new(9)).unwrap();
        assert_eq!(json, "9");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserId::new(9));
    }
}

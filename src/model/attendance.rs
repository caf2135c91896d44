use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Attendance status, stored as a lowercase string.
///
/// Entry points are asymmetric: `pending` only via self check-in,
/// `validated` only from `pending` via batch validation, the rest are
/// set directly by privileged roles (or the QR scan, for `present`).
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    Pending,
    Present,
    Absent,
    Late,
    OnLeave,
    Sick,
    Validated,
}

impl AttendanceStatus {
    /// Statuses a privileged create/update may assign directly.
    /// `pending` belongs to self check-in, `validated` to the batch
    /// validation step only.
    pub fn is_admin_assignable(self) -> bool {
        matches!(
            self,
            AttendanceStatus::Present
                | AttendanceStatus::Absent
                | AttendanceStatus::Late
                | AttendanceStatus::OnLeave
                | AttendanceStatus::Sick
        )
    }

    /// Only pending records may transition to validated.
    pub fn can_validate(self) -> bool {
        self == AttendanceStatus::Pending
    }
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 10)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2026-08-07", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-08-07T07:58:00", value_type = String, format = "date-time", nullable = true)]
    pub check_in: Option<NaiveDateTime>,

    #[schema(example = "2026-08-07T17:02:00", value_type = String, format = "date-time", nullable = true)]
    pub check_out: Option<NaiveDateTime>,

    #[schema(example = "pending")]
    pub status: String,

    #[schema(example = 45.4642, nullable = true)]
    pub latitude: Option<f64>,

    #[schema(example = 9.19, nullable = true)]
    pub longitude: Option<f64>,

    #[schema(example = "north gate", nullable = true)]
    pub notes: Option<String>,

    #[schema(example = 3, nullable = true)]
    pub project_id: Option<u64>,

    #[schema(example = 7, nullable = true)]
    pub validated_by: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_strings_round_trip() {
        for status in [
            AttendanceStatus::Pending,
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Late,
            AttendanceStatus::OnLeave,
            AttendanceStatus::Sick,
            AttendanceStatus::Validated,
        ] {
            let s = status.to_string();
            assert_eq!(AttendanceStatus::from_str(&s).unwrap(), status);
        }
        assert_eq!(AttendanceStatus::OnLeave.to_string(), "on_leave");
        assert!(AttendanceStatus::from_str("half_day").is_err());
    }

    #[test]
    fn validated_and_pending_are_not_admin_assignable() {
        assert!(!AttendanceStatus::Validated.is_admin_assignable());
        assert!(!AttendanceStatus::Pending.is_admin_assignable());
        assert!(AttendanceStatus::Present.is_admin_assignable());
        assert!(AttendanceStatus::Sick.is_admin_assignable());
    }

    #[test]
    fn only_pending_can_be_validated() {
        assert!(AttendanceStatus::Pending.can_validate());
        assert!(!AttendanceStatus::Present.can_validate());
        assert!(!AttendanceStatus::Validated.can_validate());
    }
}

//! Appointment entity and its status lifecycle
//!
//! booked → rescheduled → cancelled. Cancellation is a soft delete: the row
//! stays in the store with status `cancelled`.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::calendar::time_label;
use crate::domain::Staff;

/// Appointment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Booked,
    Rescheduled,
    Cancelled,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "booked",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::Cancelled => "cancelled",
        }
    }

    /// Active appointments show up in the default appointments view
    pub fn is_active(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "booked" => Ok(AppointmentStatus::Booked),
            "rescheduled" => Ok(AppointmentStatus::Rescheduled),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status '{}'", other)),
        }
    }
}

/// A stored appointment row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: i64,
    pub staff_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An appointment ready to be inserted (output of the booking wizard)
#[derive(Debug, Clone, PartialEq)]
pub struct NewAppointment {
    pub staff_id: i64,
    pub scheduled_at: NaiveDateTime,
    pub notes: Option<String>,
}

/// Appointment joined with its staff member, as shown on the appointments page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentView {
    pub id: Uuid,
    pub staff_id: i64,
    pub staff_name: String,
    pub staff_role: String,
    pub scheduled_at: NaiveDateTime,
    /// Display label derived from `scheduled_at`, e.g. "2:00 PM"
    pub time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
}

impl AppointmentView {
    /// Join an appointment with its staff member.
    ///
    /// A staff row that no longer exists renders as "Unknown" / "Staff Member".
    pub fn new(appointment: &Appointment, staff: Option<&Staff>) -> Self {
        Self {
            id: appointment.id,
            staff_id: appointment.staff_id,
            staff_name: staff
                .map(|s| s.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            staff_role: staff
                .map(|s| s.role.clone())
                .unwrap_or_else(|| "Staff Member".to_string()),
            scheduled_at: appointment.scheduled_at,
            time: time_label(appointment.scheduled_at.time()),
            status: appointment.status,
            notes: appointment.notes.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample(status: AppointmentStatus) -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            user_id: 1,
            staff_id: 7,
            scheduled_at: NaiveDate::from_ymd_opt(2030, 3, 4)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            status,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in [
            AppointmentStatus::Booked,
            AppointmentStatus::Rescheduled,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
        assert!("deleted".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn test_only_cancelled_is_inactive() {
        assert!(AppointmentStatus::Booked.is_active());
        assert!(AppointmentStatus::Rescheduled.is_active());
        assert!(!AppointmentStatus::Cancelled.is_active());
    }

    #[test]
    fn test_view_uses_placeholders_for_missing_staff() {
        let view = AppointmentView::new(&sample(AppointmentStatus::Booked), None);
        assert_eq!(view.staff_name, "Unknown");
        assert_eq!(view.staff_role, "Staff Member");
        assert_eq!(view.time, "2:00 PM");
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&AppointmentStatus::Rescheduled).unwrap();
        assert_eq!(json, "\"rescheduled\"");
    }
}

//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AppointmentView, Identity, Staff, UserProfile};

// ============================================
// SESSION DTOs
// ============================================

/// Authentication state for the current request
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<Identity>,
    /// Stored profile row, once one has been created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<UserProfile>,
}

// ============================================
// STAFF DTOs
// ============================================

#[derive(Debug, Serialize)]
pub struct StaffListResponse {
    pub staff: Vec<Staff>,
    pub total: usize,
}

// ============================================
// CALENDAR DTOs
// ============================================

/// Month to render; both default to the current month
#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct SlotsResponse {
    pub slots: Vec<String>,
}

// ============================================
// APPOINTMENT DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct ListAppointmentsQuery {
    #[serde(default)]
    pub include_cancelled: bool,
}

#[derive(Debug, Serialize)]
pub struct AppointmentListResponse {
    pub appointments: Vec<AppointmentView>,
    pub total: usize,
}

/// The booking wizard's selections, submitted on confirm
#[derive(Debug, Deserialize, Serialize)]
pub struct BookAppointmentRequest {
    pub date: NaiveDate,
    /// One of the slot labels, e.g. "10:00 AM"
    pub time: String,
    pub staff_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
    /// Staff was chosen from the directory before opening the wizard
    #[serde(default)]
    pub preselected: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RescheduleRequest {
    pub date: NaiveDate,
    pub time: String,
}

// ============================================
// CHAT DTOs
// ============================================

/// One user turn: free text or the value of a pressed option
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ChatInputRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

impl ChatInputRequest {
    /// The option value wins when both are present
    pub fn input(&self) -> Option<&str> {
        self.value.as_deref().or(self.text.as_deref())
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "degraded"
    pub status: String,
    /// Store status: "ok" or "error"
    pub store: String,
    pub chat_sessions: usize,
    pub connections: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    pub version: String,
}

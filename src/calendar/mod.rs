//! Booking Calendar
//!
//! Day-level calendar for the appointment booking flow.
//!
//! - [`slots`]: the fixed list of bookable time-of-day labels
//! - [`grid`]: month grid with today/past flags and month navigation
//! - [`wizard`]: the Date → Time → Staff → Confirm booking wizard

pub mod grid;
pub mod slots;
pub mod wizard;

pub use grid::{month_grid, next_month, prev_month, DayCell, MonthView};
pub use slots::{is_time_slot, merge, parse_time_label, time_label, TIME_SLOTS};
pub use wizard::{BookingWizard, Confirmation, WizardStep, BOOKING_FAILED, SIGN_IN_PROMPT};

use chrono::NaiveDate;
use thiserror::Error;

/// Errors raised by the calendar and the booking wizard
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalendarError {
    /// Dates strictly before today cannot be booked
    #[error("{0} is in the past")]
    PastDate(NaiveDate),

    /// Label is not one of the bookable time slots
    #[error("'{0}' is not an available time slot")]
    UnknownTimeSlot(String),

    /// Label does not look like "h:mm AM"
    #[error("Invalid time label: {0}")]
    InvalidTimeLabel(String),

    /// Month outside 1..=12 or a year chrono cannot represent
    #[error("Invalid month: {year}-{month}")]
    InvalidMonth { year: i32, month: u32 },

    /// A wizard operation was called on the wrong step
    #[error("Cannot {action} on the {actual} step")]
    OutOfOrder {
        action: &'static str,
        actual: WizardStep,
    },

    /// Selected staff member is not in the directory
    #[error("Selected staff member {0} not found")]
    UnknownStaff(i64),

    /// Confirmation attempted before every selection was made
    #[error("Missing selection: {0}")]
    Incomplete(&'static str),

    /// Confirmation attempted while a submission is in flight
    #[error("A booking is already being submitted")]
    AlreadySubmitting,
}

/// Result type for calendar operations
pub type CalendarResult<T> = Result<T, CalendarError>;

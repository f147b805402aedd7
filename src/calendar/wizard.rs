//! Booking Wizard
//!
//! Linear four-step flow: pick a date, a time slot, a staff member, then
//! confirm. When the wizard is opened for a staff member chosen beforehand
//! (e.g. from the staff directory) the staff step is skipped.
//!
//! The wizard never touches the store. `confirm` hands back either a
//! [`NewAppointment`] for the caller to persist or a sign-in prompt; the
//! caller reports the persistence result through `finish`.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

use super::grid::{month_grid, next_month, prev_month, MonthView};
use super::slots::{is_time_slot, merge};
use super::{CalendarError, CalendarResult};
use crate::domain::{Identity, NewAppointment, Staff};

/// Inline error shown when persisting a confirmed booking fails
pub const BOOKING_FAILED: &str = "Failed to book appointment. Please try again.";

/// Prompt shown when confirming without a signed-in user
pub const SIGN_IN_PROMPT: &str =
    "You need to sign in to book an appointment. This helps us keep track of your bookings.";

/// Wizard steps, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    Date,
    Time,
    Staff,
    Confirm,
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Date => "date",
            WizardStep::Time => "time",
            WizardStep::Staff => "staff",
            WizardStep::Confirm => "confirm",
        };
        f.write_str(name)
    }
}

/// Outcome of confirming the wizard
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// No signed-in user: nothing must be persisted
    SignInRequired,
    /// Ready to insert
    Ready(NewAppointment),
}

#[derive(Debug, Clone)]
pub struct BookingWizard {
    step: WizardStep,
    preselected_staff: Option<i64>,
    month: (i32, u32),
    date: Option<NaiveDate>,
    time: Option<String>,
    staff: Option<i64>,
    notes: Option<String>,
    submitting: bool,
    needs_sign_in: bool,
    error: Option<String>,
    complete: bool,
}

impl BookingWizard {
    /// Open the wizard on the date step, showing the month containing `today`
    pub fn new(today: NaiveDate, preselected_staff: Option<i64>) -> Self {
        use chrono::Datelike;

        Self {
            step: WizardStep::Date,
            preselected_staff,
            month: (today.year(), today.month()),
            date: None,
            time: None,
            staff: preselected_staff,
            notes: None,
            submitting: false,
            needs_sign_in: false,
            error: None,
            complete: false,
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// 3 when the staff member was chosen up front, 4 otherwise
    pub fn total_steps(&self) -> u8 {
        if self.preselected_staff.is_some() {
            3
        } else {
            4
        }
    }

    /// 1-based position of the current step
    pub fn step_number(&self) -> u8 {
        match self.step {
            WizardStep::Date => 1,
            WizardStep::Time => 2,
            WizardStep::Staff => 3,
            WizardStep::Confirm => self.total_steps(),
        }
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn selected_time(&self) -> Option<&str> {
        self.time.as_deref()
    }

    pub fn selected_staff(&self) -> Option<i64> {
        self.staff
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn needs_sign_in(&self) -> bool {
        self.needs_sign_in
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Grid for the month currently displayed on the date step
    pub fn month_view(&self, today: NaiveDate) -> CalendarResult<MonthView> {
        month_grid(self.month.0, self.month.1, today)
    }

    pub fn show_prev_month(&mut self) {
        self.month = prev_month(self.month.0, self.month.1);
    }

    pub fn show_next_month(&mut self) {
        self.month = next_month(self.month.0, self.month.1);
    }

    /// Pick the appointment day. Days before `today` are rejected.
    pub fn select_date(&mut self, date: NaiveDate, today: NaiveDate) -> CalendarResult<()> {
        self.expect_step(WizardStep::Date, "select a date")?;
        if date < today {
            return Err(CalendarError::PastDate(date));
        }

        self.date = Some(date);
        self.step = WizardStep::Time;
        Ok(())
    }

    /// Pick one of the fixed time slots
    pub fn select_time(&mut self, label: &str) -> CalendarResult<()> {
        self.expect_step(WizardStep::Time, "select a time")?;
        if !is_time_slot(label) {
            return Err(CalendarError::UnknownTimeSlot(label.to_string()));
        }

        self.time = Some(label.trim().to_string());
        self.step = if self.preselected_staff.is_some() {
            WizardStep::Confirm
        } else {
            WizardStep::Staff
        };
        Ok(())
    }

    pub fn select_staff(&mut self, staff_id: i64) -> CalendarResult<()> {
        self.expect_step(WizardStep::Staff, "select a staff member")?;
        self.staff = Some(staff_id);
        self.step = WizardStep::Confirm;
        Ok(())
    }

    /// Replace the default appointment note
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() {
            None
        } else {
            Some(notes)
        };
    }

    /// Go back one step. Selections are kept so they show as highlighted.
    pub fn back(&mut self) {
        self.step = match self.step {
            WizardStep::Date | WizardStep::Time => WizardStep::Date,
            WizardStep::Staff => WizardStep::Time,
            WizardStep::Confirm if self.preselected_staff.is_some() => WizardStep::Time,
            WizardStep::Confirm => WizardStep::Staff,
        };
        self.needs_sign_in = false;
        self.error = None;
    }

    /// Confirm the booking.
    ///
    /// `directory` is the staff list the selection was made from. Without an
    /// identity the wizard flags a sign-in prompt and returns
    /// [`Confirmation::SignInRequired`].
    pub fn confirm(
        &mut self,
        identity: Option<&Identity>,
        directory: &[Staff],
    ) -> CalendarResult<Confirmation> {
        self.expect_step(WizardStep::Confirm, "confirm")?;
        if self.submitting {
            return Err(CalendarError::AlreadySubmitting);
        }

        let date = self.date.ok_or(CalendarError::Incomplete("date"))?;
        let time = self.time.clone().ok_or(CalendarError::Incomplete("time"))?;
        let staff_id = self.staff.ok_or(CalendarError::Incomplete("staff member"))?;

        if identity.is_none() {
            self.needs_sign_in = true;
            return Ok(Confirmation::SignInRequired);
        }

        let staff = directory
            .iter()
            .find(|s| s.id == staff_id)
            .ok_or(CalendarError::UnknownStaff(staff_id))?;

        let scheduled_at = merge(date, &time)?;

        self.needs_sign_in = false;
        self.error = None;
        self.submitting = true;

        Ok(Confirmation::Ready(NewAppointment {
            staff_id,
            scheduled_at,
            notes: Some(
                self.notes
                    .clone()
                    .unwrap_or_else(|| staff.appointment_note()),
            ),
        }))
    }

    /// Report the outcome of persisting a confirmed booking.
    ///
    /// On failure the wizard stays on the confirm step with an inline error
    /// and confirm can be pressed again.
    pub fn finish<E: fmt::Display>(&mut self, result: Result<(), E>) {
        self.submitting = false;
        match result {
            Ok(()) => self.complete = true,
            Err(e) => {
                tracing::warn!(error = %e, "Booking submission failed");
                self.error = Some(BOOKING_FAILED.to_string());
            }
        }
    }

    fn expect_step(&self, step: WizardStep, action: &'static str) -> CalendarResult<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(CalendarError::OutOfOrder {
                action,
                actual: self.step,
            })
        }
    }
}

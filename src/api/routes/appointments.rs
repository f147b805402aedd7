//! Appointment routes
//!
//! - GET /api/v1/appointments - The caller's appointments
//! - POST /api/v1/appointments - Book through the wizard
//! - POST /api/v1/appointments/:id/reschedule - Move to another slot
//! - DELETE /api/v1/appointments/:id - Soft cancel

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::{
    AppointmentListResponse, BookAppointmentRequest, ListAppointmentsQuery, RescheduleRequest,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::calendar::{
    is_time_slot, merge, BookingWizard, CalendarError, Confirmation, BOOKING_FAILED,
    SIGN_IN_PROMPT,
};
use crate::domain::{AppointmentView, Identity};

pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Query(query): Query<ListAppointmentsQuery>,
) -> ApiResult<Json<AppointmentListResponse>> {
    let appointments = state
        .store
        .list_appointments(&identity, query.include_cancelled)
        .await?;

    let staff = state.store.list_staff().await?;
    let views: Vec<AppointmentView> = appointments
        .iter()
        .map(|a| AppointmentView::new(a, staff.iter().find(|s| s.id == a.staff_id)))
        .collect();

    Ok(Json(AppointmentListResponse {
        total: views.len(),
        appointments: views,
    }))
}

/// POST /api/v1/appointments
///
/// Replays the wizard's selections and confirms them. A signed-out caller
/// gets the sign-in prompt and nothing is written.
pub async fn book_appointment(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Json(req): Json<BookAppointmentRequest>,
) -> ApiResult<(StatusCode, Json<AppointmentView>)> {
    let today = Local::now().date_naive();

    let mut wizard = BookingWizard::new(today, req.preselected.then_some(req.staff_id));
    wizard.select_date(req.date, today)?;
    wizard.select_time(&req.time)?;
    if !req.preselected {
        wizard.select_staff(req.staff_id)?;
    }
    if let Some(notes) = req.notes.filter(|n| !n.trim().is_empty()) {
        wizard.set_notes(notes);
    }

    // Signed-out callers are turned away before the store is touched
    let directory = match &identity {
        Some(_) => state.store.list_staff().await?,
        None => Vec::new(),
    };
    let confirmation = wizard.confirm(identity.as_ref(), &directory)?;
    let (Confirmation::Ready(new), Some(identity)) = (confirmation, identity) else {
        return Err(ApiError::SignInRequired(SIGN_IN_PROMPT.to_string()));
    };

    let result = state.store.add_appointment(&identity, new).await;
    wizard.finish(result.as_ref().map(|_| ()));
    let appointment = result.map_err(|_| {
        ApiError::Submission(wizard.error().unwrap_or(BOOKING_FAILED).to_string())
    })?;

    let view = state.view(&appointment).await?;
    state.notify_owner(&identity, &view).await;

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn reschedule_appointment(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req): Json<RescheduleRequest>,
) -> ApiResult<Json<AppointmentView>> {
    let scheduled_at = {
        let today = Local::now().date_naive();
        check_slot(req.date, &req.time, today)?;
        merge(req.date, &req.time)?
    };

    let appointment = state
        .store
        .reschedule_appointment(&identity, id, scheduled_at)
        .await?;

    let view = state.view(&appointment).await?;
    state.notify_owner(&identity, &view).await;
    Ok(Json(view))
}

pub async fn cancel_appointment(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AppointmentView>> {
    let appointment = state.store.cancel_appointment(&identity, id).await?;

    let view = state.view(&appointment).await?;
    state.notify_owner(&identity, &view).await;
    Ok(Json(view))
}

/// Same rules as the wizard's date and time steps
fn check_slot(date: NaiveDate, time: &str, today: NaiveDate) -> Result<(), CalendarError> {
    if date < today {
        return Err(CalendarError::PastDate(date));
    }
    if !is_time_slot(time) {
        return Err(CalendarError::UnknownTimeSlot(time.to_string()));
    }
    Ok(())
}

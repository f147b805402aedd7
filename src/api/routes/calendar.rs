//! Calendar routes
//!
//! - GET /api/v1/calendar?year&month - Month grid for the date step
//! - GET /api/v1/calendar/slots - Bookable time labels

use axum::{extract::Query, Json};
use chrono::{Datelike, Local};

use crate::api::dto::{CalendarQuery, SlotsResponse};
use crate::api::error::ApiResult;
use crate::calendar::{month_grid, MonthView, TIME_SLOTS};

pub async fn get_month(Query(query): Query<CalendarQuery>) -> ApiResult<Json<MonthView>> {
    let today = Local::now().date_naive();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    Ok(Json(month_grid(year, month, today)?))
}

pub async fn list_slots() -> Json<SlotsResponse> {
    Json(SlotsResponse {
        slots: TIME_SLOTS.iter().map(|s| s.to_string()).collect(),
    })
}

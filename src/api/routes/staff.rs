//! Staff directory routes
//!
//! - GET /api/v1/staff - Directory ordered by name
//! - GET /api/v1/staff/:id - One staff member

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::StaffListResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::domain::Staff;

pub async fn list_staff(State(state): State<Arc<AppState>>) -> ApiResult<Json<StaffListResponse>> {
    let staff = state.store.list_staff().await?;
    Ok(Json(StaffListResponse {
        total: staff.len(),
        staff,
    }))
}

pub async fn get_staff(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Staff>> {
    state
        .store
        .get_staff(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Staff member {}", id)))
}

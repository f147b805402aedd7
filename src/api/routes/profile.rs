//! Profile routes
//!
//! - GET /api/v1/profile - The caller's profile, created on first visit
//! - PUT /api/v1/profile - Edit name, phone, address or preference

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::domain::{Identity, ProfileUpdate, UserProfile};

pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    identity: Identity,
) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.store.ensure_user(&identity).await?))
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<UserProfile>> {
    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::Validation("Please enter your full name".to_string()));
    }
    if update.email.as_deref().is_some_and(|e| e.trim().is_empty()) {
        return Err(ApiError::Validation(
            "Please enter your email address".to_string(),
        ));
    }

    let profile = state.store.save_profile(&identity, update).await?;
    tracing::info!(user_id = profile.id, "Profile updated");
    Ok(Json(profile))
}

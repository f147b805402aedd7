//! GET /api/v1/session
//!
//! The current-user object, so clients can render signed-in state.

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::SessionResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::domain::Identity;

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
) -> ApiResult<Json<SessionResponse>> {
    let Some(identity) = identity else {
        return Ok(Json(SessionResponse {
            signed_in: false,
            user: None,
            profile: None,
        }));
    };

    let profile = state.store.find_user(&identity.id).await?;
    Ok(Json(SessionResponse {
        signed_in: true,
        user: Some(identity),
        profile,
    }))
}

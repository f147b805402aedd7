//! POST /api/v1/contact
//!
//! Contact form outside a chat session. Signed-in callers update their
//! profile; visitors leave a guest row.

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::chat::SUBMISSION_FAILED;
use crate::domain::{ContactDetails, Identity, UserProfile};

pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Json(details): Json<ContactDetails>,
) -> ApiResult<(StatusCode, Json<UserProfile>)> {
    if let Some(prompt) = details.missing_field_prompt() {
        return Err(ApiError::Validation(prompt.to_string()));
    }

    let saved = match &identity {
        Some(identity) => state.store.save_profile(identity, details.into_update()).await,
        None => state.store.insert_guest(&details).await,
    };

    let profile = saved.map_err(|e| {
        tracing::error!(error = %e, "Failed to save contact details");
        ApiError::Submission(SUBMISSION_FAILED.to_string())
    })?;

    Ok((StatusCode::CREATED, Json(profile)))
}

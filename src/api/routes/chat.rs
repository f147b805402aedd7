//! Chat routes
//!
//! - POST /api/v1/chat/sessions - Start a conversation
//! - GET /api/v1/chat/sessions/:id - Transcript
//! - DELETE /api/v1/chat/sessions/:id - Close
//! - POST /api/v1/chat/sessions/:id/messages - Text or option value
//! - POST /api/v1/chat/sessions/:id/contact - Contact form
//! - POST /api/v1/chat/sessions/:id/property - Property form
//!
//! A session opened by a signed-in user is only visible to that user.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Local;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::dto::ChatInputRequest;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::chat::{ChatMessage, Exchange, PropertyDetails, Transcript};
use crate::domain::{ContactDetails, Identity};

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
) -> ApiResult<(StatusCode, Json<Transcript>)> {
    let (profile, upcoming) = match &identity {
        Some(identity) => {
            let profile = state.store.find_user(&identity.id).await?;
            let now = Local::now().naive_local();
            let upcoming = match state.store.upcoming_appointment(identity, now).await? {
                Some(appointment) => Some(state.view(&appointment).await?),
                None => None,
            };
            (profile, upcoming)
        }
        None => (None, None),
    };

    let transcript = state
        .sessions
        .create(identity.as_ref(), profile.as_ref(), upcoming.as_ref())
        .await?;

    Ok((StatusCode::CREATED, Json(transcript)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Transcript>> {
    authorize(&state, id, identity.as_ref()).await?;
    Ok(Json(state.sessions.get(id).await?))
}

pub async fn close_session(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    authorize(&state, id, identity.as_ref()).await?;
    state.sessions.close(id).await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn post_message(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatInputRequest>,
) -> ApiResult<Json<Exchange>> {
    authorize(&state, id, identity.as_ref()).await?;
    let input = req
        .input()
        .ok_or_else(|| ApiError::Validation("Provide either text or value".to_string()))?;

    Ok(Json(state.sessions.post(id, input).await?))
}

pub async fn submit_contact(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Path(id): Path<Uuid>,
    Json(details): Json<ContactDetails>,
) -> ApiResult<Json<ChatMessage>> {
    authorize(&state, id, identity.as_ref()).await?;
    let message = state
        .sessions
        .submit_contact(id, identity.as_ref(), details, state.store.as_ref())
        .await?;
    Ok(Json(message))
}

pub async fn submit_property(
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Path(id): Path<Uuid>,
    Json(details): Json<PropertyDetails>,
) -> ApiResult<Json<ChatMessage>> {
    authorize(&state, id, identity.as_ref()).await?;
    let message = state
        .sessions
        .submit_property(id, identity.as_ref(), &details, state.store.as_ref())
        .await?;
    Ok(Json(message))
}

/// Sessions owned by a user are reported missing to everyone else
pub(crate) async fn authorize(
    state: &AppState,
    id: Uuid,
    identity: Option<&Identity>,
) -> ApiResult<()> {
    match state.sessions.owner(id).await? {
        Some(owner) if identity.map(|i| i.id.as_str()) != Some(owner.as_str()) => {
            Err(ApiError::NotFound(format!("Chat session not found: {}", id)))
        }
        _ => Ok(()),
    }
}

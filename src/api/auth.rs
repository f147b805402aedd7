//! Identity extraction
//!
//! Sessions are authenticated upstream by the identity provider. The auth
//! proxy in front of this service forwards the signed-in user as headers,
//! and handlers receive them as an [`Identity`]. Use `Option<Identity>` for
//! routes that also serve signed-out visitors.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::config::AuthConfig;
use crate::domain::Identity;

const SIGN_IN_MESSAGE: &str = "Please sign in to continue.";

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Identity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        identity_from_headers(&parts.headers, &state.auth)
            .ok_or_else(|| ApiError::SignInRequired(SIGN_IN_MESSAGE.to_string()))
    }
}

/// Build the identity from proxy headers. A missing or blank id means signed out.
pub fn identity_from_headers(headers: &HeaderMap, auth: &AuthConfig) -> Option<Identity> {
    let id = header(headers, &auth.user_id_header)?;

    Some(Identity {
        id,
        name: header(headers, &auth.name_header),
        email: header(headers, &auth.email_header),
        phone: header(headers, &auth.phone_header),
    })
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

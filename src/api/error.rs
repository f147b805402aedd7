//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::calendar::CalendarError;
use crate::chat::ChatError;
use crate::store::StoreError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed; the message is shown to the user as is
    #[error("{0}")]
    Validation(String),

    /// The operation needs a signed-in user
    #[error("{0}")]
    SignInRequired(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Not allowed in the resource's current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Store failure
    #[error("Store error: {0}")]
    Store(String),

    /// A submission could not be saved; the message is shown to the user as is
    #[error("{0}")]
    Submission(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable (dependency down or at capacity)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            StoreError::Conflict(reason) => ApiError::Conflict(reason),
            other => ApiError::Store(other.to_string()),
        }
    }
}

impl From<CalendarError> for ApiError {
    fn from(err: CalendarError) -> Self {
        match err {
            CalendarError::AlreadySubmitting => ApiError::Conflict(err.to_string()),
            other => ApiError::Validation(other.to_string()),
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::SessionNotFound(_) => ApiError::NotFound(err.to_string()),
            ChatError::TooManySessions(_) => ApiError::ServiceUnavailable(err.to_string()),
            ChatError::Validation(message) => ApiError::Validation(message),
            ChatError::Submission(message) => ApiError::Submission(message),
        }
    }
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::SignInRequired(_) => (StatusCode::UNAUTHORIZED, "SIGN_IN_REQUIRED"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            ApiError::Store(_) | ApiError::Submission(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR")
            }
            ApiError::Internal(_) | ApiError::Io(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_store_error_mapping() {
        let err: ApiError = StoreError::not_found("Appointment", "abc").into();
        assert_eq!(err.status_and_code().1, "NOT_FOUND");

        let err: ApiError = StoreError::Conflict("cancelled".into()).into();
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);

        let err: ApiError = StoreError::invalid("status", "deleted").into();
        assert_eq!(err.status_and_code().1, "STORE_ERROR");
    }

    #[test]
    fn test_calendar_error_mapping() {
        let past = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let err: ApiError = CalendarError::PastDate(past).into();
        assert_eq!(err.status_and_code().0, StatusCode::BAD_REQUEST);

        let err: ApiError = CalendarError::AlreadySubmitting.into();
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn test_chat_messages_are_passed_through() {
        let err: ApiError = ChatError::Validation("Please enter your full name".into()).into();
        assert_eq!(err.to_string(), "Please enter your full name");

        let err: ApiError = ChatError::TooManySessions(3).into();
        assert_eq!(err.status_and_code().1, "SERVICE_UNAVAILABLE");
    }

    #[test]
    fn test_sign_in_status() {
        let response = ApiError::SignInRequired("sign in".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

//! Concierge REST API
//!
//! HTTP API layer for the agency site, built with Axum.
//!
//! # Endpoints
//!
//! ## Session and profile
//! - `GET /api/v1/session` - Current-user object
//! - `GET /api/v1/profile` - The caller's profile
//! - `PUT /api/v1/profile` - Edit the caller's profile
//! - `POST /api/v1/contact` - Contact form outside a chat
//!
//! ## Staff
//! - `GET /api/v1/staff` - Directory ordered by name
//! - `GET /api/v1/staff/:id` - One staff member
//!
//! ## Calendar
//! - `GET /api/v1/calendar` - Month grid
//! - `GET /api/v1/calendar/slots` - Bookable time labels
//!
//! ## Appointments
//! - `GET /api/v1/appointments` - The caller's appointments
//! - `POST /api/v1/appointments` - Book
//! - `POST /api/v1/appointments/:id/reschedule` - Reschedule
//! - `DELETE /api/v1/appointments/:id` - Cancel
//!
//! ## Chat
//! - `POST /api/v1/chat/sessions` - Start a conversation
//! - `GET /api/v1/chat/sessions/:id` - Transcript
//! - `DELETE /api/v1/chat/sessions/:id` - Close
//! - `POST /api/v1/chat/sessions/:id/messages` - Send text or an option
//! - `POST /api/v1/chat/sessions/:id/contact` - Contact form
//! - `POST /api/v1/chat/sessions/:id/property` - Property form
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! ## WebSocket
//! - `GET /ws/chat?session=<id>` - Chat over a socket
//!
//! # Identity
//!
//! Sign-in is handled by an upstream proxy that forwards the user in
//! headers (see [`crate::config::AuthConfig`]). Routes that need a user
//! answer `401 SIGN_IN_REQUIRED` without them.

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ApiConfig;
use crate::websocket::chat_socket_handler;

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/session", get(routes::session::get_session))
        .route(
            "/profile",
            get(routes::profile::get_profile).put(routes::profile::update_profile),
        )
        .route("/contact", post(routes::contact::submit_contact))
        // Staff directory
        .route("/staff", get(routes::staff::list_staff))
        .route("/staff/:id", get(routes::staff::get_staff))
        // Calendar
        .route("/calendar", get(routes::calendar::get_month))
        .route("/calendar/slots", get(routes::calendar::list_slots))
        // Appointments
        .route(
            "/appointments",
            get(routes::appointments::list_appointments)
                .post(routes::appointments::book_appointment),
        )
        .route(
            "/appointments/:id",
            axum::routing::delete(routes::appointments::cancel_appointment),
        )
        .route(
            "/appointments/:id/reschedule",
            post(routes::appointments::reschedule_appointment),
        )
        // Chat
        .route("/chat/sessions", post(routes::chat::start_session))
        .route(
            "/chat/sessions/:id",
            get(routes::chat::get_session).delete(routes::chat::close_session),
        )
        .route(
            "/chat/sessions/:id/messages",
            post(routes::chat::post_message),
        )
        .route(
            "/chat/sessions/:id/contact",
            post(routes::chat::submit_contact),
        )
        .route(
            "/chat/sessions/:id/property",
            post(routes::chat::submit_property),
        );

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.api);
    let body_limit = DefaultBodyLimit::max(state.api.max_body_bytes);
    let timeout = TimeoutLayer::new(Duration::from_secs(state.api.request_timeout_secs));

    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .route("/ws/chat", get(chat_socket_handler))
        .layer(body_limit)
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// Any origin when none are configured
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if config.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.api.addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Concierge API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Concierge API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::domain::default_directory;
    use crate::store::{AppointmentStore, SqliteStore};
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::{Days, Local, NaiveDate};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use crate::domain::{
        Appointment, ContactDetails, Identity, NewAppointment, ProfileUpdate, Staff, UserProfile,
    };
    use crate::store::StoreResult;
    use async_trait::async_trait;
    use chrono::NaiveDateTime;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use uuid::Uuid;

    /// Counts every store call on its way to SQLite
    struct CountingStore {
        inner: SqliteStore,
        calls: AtomicUsize,
    }

    impl CountingStore {
        fn hit(&self) -> &SqliteStore {
            self.calls.fetch_add(1, Ordering::SeqCst);
            &self.inner
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AppointmentStore for CountingStore {
        async fn ping(&self) -> StoreResult<()> {
            self.hit().ping().await
        }
        async fn find_user(&self, identity_id: &str) -> StoreResult<Option<UserProfile>> {
            self.hit().find_user(identity_id).await
        }
        async fn ensure_user(&self, identity: &Identity) -> StoreResult<UserProfile> {
            self.hit().ensure_user(identity).await
        }
        async fn save_profile(
            &self,
            identity: &Identity,
            update: ProfileUpdate,
        ) -> StoreResult<UserProfile> {
            self.hit().save_profile(identity, update).await
        }
        async fn insert_guest(&self, contact: &ContactDetails) -> StoreResult<UserProfile> {
            self.hit().insert_guest(contact).await
        }
        async fn list_staff(&self) -> StoreResult<Vec<Staff>> {
            self.hit().list_staff().await
        }
        async fn get_staff(&self, id: i64) -> StoreResult<Option<Staff>> {
            self.hit().get_staff(id).await
        }
        async fn seed_staff(&self, staff: &[Staff]) -> StoreResult<usize> {
            self.hit().seed_staff(staff).await
        }
        async fn add_appointment(
            &self,
            identity: &Identity,
            new: NewAppointment,
        ) -> StoreResult<Appointment> {
            self.hit().add_appointment(identity, new).await
        }
        async fn list_appointments(
            &self,
            identity: &Identity,
            include_cancelled: bool,
        ) -> StoreResult<Vec<Appointment>> {
            self.hit().list_appointments(identity, include_cancelled).await
        }
        async fn get_appointment(&self, identity: &Identity, id: Uuid) -> StoreResult<Appointment> {
            self.hit().get_appointment(identity, id).await
        }
        async fn cancel_appointment(
            &self,
            identity: &Identity,
            id: Uuid,
        ) -> StoreResult<Appointment> {
            self.hit().cancel_appointment(identity, id).await
        }
        async fn reschedule_appointment(
            &self,
            identity: &Identity,
            id: Uuid,
            scheduled_at: NaiveDateTime,
        ) -> StoreResult<Appointment> {
            self.hit()
                .reschedule_appointment(identity, id, scheduled_at)
                .await
        }
        async fn upcoming_appointment(
            &self,
            identity: &Identity,
            now: NaiveDateTime,
        ) -> StoreResult<Option<Appointment>> {
            self.hit().upcoming_appointment(identity, now).await
        }
    }

    async fn create_test_app() -> (Router, Arc<dyn AppointmentStore>) {
        let store = SqliteStore::open_in_memory().unwrap();
        store.seed_staff(&default_directory()).await.unwrap();
        let store: Arc<dyn AppointmentStore> = Arc::new(store);

        let state = AppState::new(Arc::clone(&store), &Config::default());
        (build_router(state), store)
    }

    fn get(uri: &str, user: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(user) = user {
            builder = builder
                .header("x-auth-user-id", user)
                .header("x-auth-user-name", "Jordan Lee")
                .header("x-auth-user-email", "jordan@example.com");
        }
        builder.body(Body::empty()).unwrap()
    }

    fn send_json(method: &str, uri: &str, user: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json");
        if let Some(user) = user {
            builder = builder
                .header("x-auth-user-id", user)
                .header("x-auth-user-name", "Jordan Lee")
                .header("x-auth-user-email", "jordan@example.com");
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn next_week() -> NaiveDate {
        Local::now()
            .date_naive()
            .checked_add_days(Days::new(7))
            .unwrap()
    }

    fn booking(date: NaiveDate, time: &str) -> Value {
        json!({
            "date": date,
            "time": time,
            "staff_id": 2,
            "notes": "Looking at rentals",
        })
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _store) = create_test_app().await;

        let (status, _) = call(&app, get("/health/live", None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, get("/health/ready", None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = call(&app, get("/health", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["store"], "ok");
    }

    #[tokio::test]
    async fn test_session_reflects_identity_headers() {
        let (app, _store) = create_test_app().await;

        let (status, body) = call(&app, get("/api/v1/session", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["signed_in"], false);
        assert!(body.get("user").is_none());

        let (_, body) = call(&app, get("/api/v1/session", Some("user-1"))).await;
        assert_eq!(body["signed_in"], true);
        assert_eq!(body["user"]["id"], "user-1");
        assert_eq!(body["user"]["name"], "Jordan Lee");
    }

    #[tokio::test]
    async fn test_staff_directory() {
        let (app, _store) = create_test_app().await;

        let (status, body) = call(&app, get("/api/v1/staff", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 4);
        assert_eq!(body["staff"][0]["name"], "Daniel Rossi");

        let (status, body) = call(&app, get("/api/v1/staff/2", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "Property Manager");

        let (status, body) = call(&app, get("/api/v1/staff/99", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_calendar_month_and_slots() {
        let (app, _store) = create_test_app().await;

        let (status, body) = call(&app, get("/api/v1/calendar?year=2030&month=2", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["year"], 2030);
        assert_eq!(body["month"], 2);

        let (status, body) = call(&app, get("/api/v1/calendar?year=2030&month=13", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = call(&app, get("/api/v1/calendar/slots", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["slots"].as_array().unwrap().len(), 8);
        assert_eq!(body["slots"][0], "9:00 AM");
        assert_eq!(body["slots"][7], "4:00 PM");
    }

    #[tokio::test]
    async fn test_appointments_require_identity() {
        let (app, _store) = create_test_app().await;

        let (status, body) = call(&app, get("/api/v1/appointments", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "SIGN_IN_REQUIRED");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_booking_signed_out_prompts_and_writes_nothing() {
        let (app, store) = create_test_app().await;

        let request = send_json("POST", "/api/v1/appointments", None, booking(next_week(), "10:00 AM"));
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "SIGN_IN_REQUIRED");
        assert_eq!(
            body["error"]["message"],
            crate::calendar::SIGN_IN_PROMPT
        );

        // Signing in afterwards shows an empty list and no stray user row
        assert!(store.find_user("user-1").await.unwrap().is_none());
        let (status, body) = call(&app, get("/api/v1/appointments", Some("user-1"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_booking_signed_out_never_reaches_store() {
        let inner = SqliteStore::open_in_memory().unwrap();
        inner.seed_staff(&default_directory()).await.unwrap();
        let store = Arc::new(CountingStore {
            inner,
            calls: AtomicUsize::new(0),
        });
        let state = AppState::new(store.clone(), &Config::default());
        let app = build_router(state);

        let request = send_json("POST", "/api/v1/appointments", None, booking(next_week(), "10:00 AM"));
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "SIGN_IN_REQUIRED");
        assert_eq!(store.calls(), 0);

        // The same request signed in does use the store
        let request = send_json("POST", "/api/v1/appointments", Some("user-1"), booking(next_week(), "10:00 AM"));
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(store.calls() > 0);
    }

    #[tokio::test]
    async fn test_booking_signed_in() {
        let (app, _store) = create_test_app().await;
        let date = next_week();

        let request = send_json("POST", "/api/v1/appointments", Some("user-1"), booking(date, "10:00 AM"));
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["staff_name"], "James Chen");
        assert_eq!(body["time"], "10:00 AM");
        assert_eq!(body["status"], "booked");
        assert_eq!(body["notes"], "Looking at rentals");

        let (_, body) = call(&app, get("/api/v1/appointments", Some("user-1"))).await;
        assert_eq!(body["total"], 1);

        // Another user sees none of it
        let (_, body) = call(&app, get("/api/v1/appointments", Some("user-2"))).await;
        assert_eq!(body["total"], 0);
    }

    #[tokio::test]
    async fn test_booking_rejects_bad_selections() {
        let (app, _store) = create_test_app().await;

        let past = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let request = send_json("POST", "/api/v1/appointments", Some("user-1"), booking(past, "10:00 AM"));
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let request = send_json("POST", "/api/v1/appointments", Some("user-1"), booking(next_week(), "6:00 PM"));
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let mut unknown_staff = booking(next_week(), "10:00 AM");
        unknown_staff["staff_id"] = json!(99);
        let request = send_json("POST", "/api/v1/appointments", Some("user-1"), unknown_staff);
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cancel_and_reschedule() {
        let (app, _store) = create_test_app().await;
        let date = next_week();

        let request = send_json("POST", "/api/v1/appointments", Some("user-1"), booking(date, "10:00 AM"));
        let (_, body) = call(&app, request).await;
        let id = body["id"].as_str().unwrap().to_string();

        let request = send_json(
            "POST",
            &format!("/api/v1/appointments/{}/reschedule", id),
            Some("user-1"),
            json!({ "date": date, "time": "3:00 PM" }),
        );
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["time"], "3:00 PM");
        assert_eq!(body["status"], "rescheduled");

        // Not visible to other users
        let request = send_json("DELETE", &format!("/api/v1/appointments/{}", id), Some("user-2"), json!({}));
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let request = send_json("DELETE", &format!("/api/v1/appointments/{}", id), Some("user-1"), json!({}));
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "cancelled");

        let (_, body) = call(&app, get("/api/v1/appointments", Some("user-1"))).await;
        assert_eq!(body["total"], 0);

        let (_, body) = call(
            &app,
            get("/api/v1/appointments?include_cancelled=true", Some("user-1")),
        )
        .await;
        assert_eq!(body["total"], 1);

        let request = send_json(
            "POST",
            &format!("/api/v1/appointments/{}/reschedule", id),
            Some("user-1"),
            json!({ "date": date, "time": "9:00 AM" }),
        );
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_profile_round_trip() {
        let (app, _store) = create_test_app().await;

        let (status, _) = call(&app, get("/api/v1/profile", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, body) = call(&app, get("/api/v1/profile", Some("user-1"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["name"], "Jordan Lee");

        let request = send_json(
            "PUT",
            "/api/v1/profile",
            Some("user-1"),
            json!({ "phone": "0400 000 000", "preference": "investment" }),
        );
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["phone"], "0400 000 000");
        assert_eq!(body["email"], "jordan@example.com");

        let request = send_json("PUT", "/api/v1/profile", Some("user-1"), json!({ "name": "  " }));
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_contact_form_validation() {
        let (app, _store) = create_test_app().await;

        let request = send_json(
            "POST",
            "/api/v1/contact",
            None,
            json!({ "name": "Sam Park", "email": "sam@example.com" }),
        );
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Please enter your phone number");

        let request = send_json(
            "POST",
            "/api/v1/contact",
            None,
            json!({ "name": "Sam Park", "email": "sam@example.com", "phone": "0411 111 111" }),
        );
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["name"], "Sam Park");
        assert!(body["identity_id"].is_null());
    }

    #[tokio::test]
    async fn test_chat_flow() {
        let (app, _store) = create_test_app().await;

        let request = send_json("POST", "/api/v1/chat/sessions", None, json!({}));
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_string();
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);

        let request = send_json(
            "POST",
            &format!("/api/v1/chat/sessions/{}/messages", id),
            None,
            json!({ "value": "book-appointment" }),
        );
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["author"], "user");
        assert_eq!(body["reply"]["author"], "assistant");
        assert_eq!(body["action"], "show_contact_form");

        let request = send_json(
            "POST",
            &format!("/api/v1/chat/sessions/{}/contact", id),
            None,
            json!({ "name": "Sam", "email": "sam@example.com", "phone": "0411 111 111" }),
        );
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["content"].as_str().unwrap().starts_with("Thanks Sam!"));

        let (_, body) = call(&app, get(&format!("/api/v1/chat/sessions/{}", id), None)).await;
        assert_eq!(body["form_submitted"], true);

        let request = send_json(
            "POST",
            &format!("/api/v1/chat/sessions/{}/messages", id),
            None,
            json!({}),
        );
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = send_json("DELETE", &format!("/api/v1/chat/sessions/{}", id), None, json!({}));
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = call(&app, get(&format!("/api/v1/chat/sessions/{}", id), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_session_hidden_from_other_users() {
        let (app, _store) = create_test_app().await;

        let request = send_json("POST", "/api/v1/chat/sessions", Some("user-1"), json!({}));
        let (_, body) = call(&app, request).await;
        let id = body["id"].as_str().unwrap().to_string();
        let uri = format!("/api/v1/chat/sessions/{}", id);

        let (status, _) = call(&app, get(&uri, Some("user-1"))).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = call(&app, get(&uri, Some("user-2"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(&app, get(&uri, None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_chat_greets_returning_user_with_reminder() {
        let (app, _store) = create_test_app().await;

        let request = send_json("POST", "/api/v1/appointments", Some("user-1"), booking(next_week(), "2:00 PM"));
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);

        let request = send_json("POST", "/api/v1/chat/sessions", Some("user-1"), json!({}));
        let (_, body) = call(&app, request).await;
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert!(messages[1]["content"].as_str().unwrap().contains("James Chen"));
    }

    #[tokio::test]
    async fn test_invalid_json_rejected() {
        let (app, _store) = create_test_app().await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/appointments")
            .header("Content-Type", "application/json")
            .header("x-auth-user-id", "user-1")
            .body(Body::from("not json"))
            .unwrap();
        let (status, _) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

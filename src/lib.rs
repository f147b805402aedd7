//! # Concierge
//!
//! Backend for a real-estate agency site: a staff directory, a booking
//! calendar, per-user appointments and a scripted chat assistant.
//!
//! ## Modules
//!
//! - [`domain`]: Staff, profiles and appointments
//! - [`calendar`]: Time slots, month grids and the booking wizard
//! - [`store`]: SQLite persistence behind the [`store::AppointmentStore`] trait
//! - [`chat`]: The assistant's decision tree and in-memory sessions
//! - [`api`]: REST API server with Axum
//! - [`websocket`]: Chat over a socket, with live appointment updates
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use concierge::{build_router, AppState, Config, SqliteStore};
//! use concierge::store::AppointmentStore;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let store = SqliteStore::open(&config.database.path)?;
//!     store.seed_staff(&concierge::domain::default_directory()).await?;
//!
//!     let state = AppState::new(Arc::new(store), &config);
//!     let listener = tokio::net::TcpListener::bind(config.api.addr()).await?;
//!     axum::serve(listener, build_router(state)).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod calendar;
pub mod chat;
pub mod config;
pub mod domain;
pub mod store;
pub mod telemetry;
pub mod websocket;

// Re-export top-level types for convenience
pub use domain::{
    Appointment, AppointmentStatus, AppointmentView, ContactDetails, Identity, NewAppointment,
    Preference, ProfileUpdate, Staff, UserProfile,
};

pub use calendar::{BookingWizard, CalendarError, Confirmation, MonthView, TIME_SLOTS};

pub use store::{AppointmentStore, SqliteStore, StoreError, StoreResult};

pub use chat::{ChatAction, ChatError, ChatIntent, ChatMessage, ChatSessions, Transcript};

pub use api::{build_router, serve, ApiError, AppState};

pub use websocket::{chat_socket_handler, ChatHub, ClientMessage, ServerMessage, UserEvent};

pub use config::{Config, ConfigError, LoggingConfig};

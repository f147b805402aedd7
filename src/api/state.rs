//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use std::sync::Arc;
use std::time::Instant;

use crate::chat::ChatSessions;
use crate::config::{ApiConfig, AuthConfig, Config};
use crate::domain::{Appointment, AppointmentView, Identity};
use crate::store::{AppointmentStore, StoreResult};
use crate::websocket::{ChatHub, UserEvent};

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AppointmentStore>,
    pub sessions: Arc<ChatSessions>,
    /// Open chat sockets, for pushing appointment changes
    pub hub: Arc<ChatHub>,
    pub api: Arc<ApiConfig>,
    /// Identity header names
    pub auth: Arc<AuthConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn AppointmentStore>, config: &Config) -> Self {
        Self {
            store,
            sessions: Arc::new(ChatSessions::new(config.chat.sessions())),
            hub: Arc::new(ChatHub::new(config.chat.hub())),
            api: Arc::new(config.api.clone()),
            auth: Arc::new(config.auth.clone()),
            start_time: Instant::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Join an appointment with its staff member for display
    pub async fn view(&self, appointment: &Appointment) -> StoreResult<AppointmentView> {
        let staff = self.store.get_staff(appointment.staff_id).await?;
        Ok(AppointmentView::new(appointment, staff.as_ref()))
    }

    /// Push an appointment change to the owner's open chat sockets
    pub async fn notify_owner(&self, identity: &Identity, view: &AppointmentView) {
        let event = UserEvent::appointment_updated(&identity.id, view.clone());
        self.hub.notify(&event).await;
    }
}

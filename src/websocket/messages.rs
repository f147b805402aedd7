//! WebSocket Message Types
//!
//! Frames exchanged between a chat widget and the server.

use serde::{Deserialize, Serialize};

use crate::chat::{ChatAction, ChatMessage};
use crate::domain::AppointmentView;

/// Messages sent from client to server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Free text typed by the user
    Send { text: String },
    /// An option button was pressed
    Choose { value: String },
    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established and bound to a chat session
    Connected {
        connection_id: String,
        session_id: String,
    },
    /// The assistant is preparing a reply
    Typing { message: ChatMessage },
    /// A transcript entry, from either side
    Message {
        message: ChatMessage,
        #[serde(skip_serializing_if = "Option::is_none")]
        action: Option<ChatAction>,
    },
    /// One of the user's appointments changed through the API
    AppointmentUpdated { appointment: AppointmentView },
    /// Pong response to ping
    Pong,
    Error { message: String },
}

/// A message addressed to every socket of one user
#[derive(Debug, Clone)]
pub struct UserEvent {
    /// Provider user id
    pub user_id: String,
    pub message: ServerMessage,
}

impl UserEvent {
    pub fn appointment_updated(user_id: &str, appointment: AppointmentView) -> Self {
        Self {
            user_id: user_id.to_string(),
            message: ServerMessage::AppointmentUpdated { appointment },
        }
    }
}

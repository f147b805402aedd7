//! Chat Assistant
//!
//! A scripted assistant driven by a static decision table.
//!
//! - [`tree`]: the pure input → reply function and its canned texts
//! - [`session`]: in-memory transcripts with idle expiry
//! - [`messages`]: transcript entries and option buttons
//!
//! Transport lives elsewhere: REST routes in `api::routes::chat` and the
//! socket in [`crate::websocket`].

pub mod messages;
pub mod session;
pub mod tree;

pub use messages::{Author, ChatMessage, ChatOption};
pub use session::{
    ChatSessions, Exchange, PropertyDetails, PropertyType, SessionConfig, Transcript,
};
pub use tree::{respond, ChatAction, ChatContext, ChatIntent, Reply};

use thiserror::Error;
use uuid::Uuid;

/// Shown when contact details could not be saved
pub const SUBMISSION_FAILED: &str = "Submission failed. Please try again.";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChatError {
    #[error("Chat session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Too many active chat sessions (max {0})")]
    TooManySessions(usize),

    /// Form or message input rejected; the message is user-facing
    #[error("{0}")]
    Validation(String),

    /// Persisting form data failed; the message is user-facing
    #[error("{0}")]
    Submission(String),
}

pub type ChatResult<T> = Result<T, ChatError>;

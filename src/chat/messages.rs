//! Chat transcript entries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Author {
    Assistant,
    User,
}

/// A selectable reply button
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatOption {
    pub id: String,
    pub text: String,
    /// Sent back as the user's input when chosen
    pub value: String,
}

impl ChatOption {
    pub fn new(value: &str, text: &str) -> Self {
        Self {
            id: value.to_string(),
            text: text.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub author: Author,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<ChatOption>,
    /// Transient typing indicator, never stored in a transcript
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub loading: bool,
}

impl ChatMessage {
    pub fn assistant(content: impl Into<String>, options: Vec<ChatOption>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: Author::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            options,
            loading: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            author: Author::User,
            content: content.into(),
            timestamp: Utc::now(),
            options: Vec::new(),
            loading: false,
        }
    }

    pub fn typing() -> Self {
        Self {
            id: Uuid::new_v4(),
            author: Author::Assistant,
            content: String::new(),
            timestamp: Utc::now(),
            options: Vec::new(),
            loading: true,
        }
    }

    pub fn is_bot(&self) -> bool {
        self.author == Author::Assistant
    }
}

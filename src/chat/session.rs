//! In-memory chat sessions
//!
//! Transcripts are ephemeral: they live for the session's idle lifetime and
//! are never written to the store. Only contact details submitted through
//! the contact form are persisted.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::messages::ChatMessage;
use super::tree::{self, ChatAction, ChatContext, Reply};
use super::{ChatError, ChatResult, SUBMISSION_FAILED};
use crate::domain::{AppointmentView, ContactDetails, Identity, UserProfile};
use crate::store::AppointmentStore;

/// Session registry limits
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub max_sessions: usize,
    /// Idle time after which a session is dropped
    pub ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 10_000,
            ttl: Duration::from_secs(30 * 60),
        }
    }
}

/// Property form submission
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PropertyDetails {
    pub property_type: PropertyType,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    House,
    Apartment,
    Townhouse,
    Land,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "house",
            PropertyType::Apartment => "apartment",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Land => "land",
        }
    }
}

/// Client-visible state of a session
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub profile: ContactDetails,
    pub form_submitted: bool,
}

/// Messages produced by one user turn
#[derive(Debug, Clone, Serialize)]
pub struct Exchange {
    pub user: ChatMessage,
    pub reply: ChatMessage,
    pub action: Option<ChatAction>,
}

struct ChatSession {
    identity_id: Option<String>,
    messages: Vec<ChatMessage>,
    profile: ContactDetails,
    form_submitted: bool,
    last_active: Instant,
}

impl ChatSession {
    fn context(&self) -> ChatContext {
        ChatContext {
            first_name: self
                .profile
                .name
                .split_whitespace()
                .next()
                .map(str::to_string),
            preference: self.profile.preference,
            has_contact: self.profile.missing_field_prompt().is_none(),
        }
    }

    fn push_reply(&mut self, reply: &Reply) -> ChatMessage {
        let message = ChatMessage::assistant(reply.text.clone(), reply.options.clone());
        self.messages.push(message.clone());
        message
    }

    fn transcript(&self, id: Uuid) -> Transcript {
        Transcript {
            id,
            messages: self.messages.clone(),
            profile: self.profile.clone(),
            form_submitted: self.form_submitted,
        }
    }

    fn touch(&mut self) {
        self.last_active = Instant::now();
    }
}

/// Registry of live chat sessions
pub struct ChatSessions {
    sessions: RwLock<HashMap<Uuid, ChatSession>>,
    config: SessionConfig,
}

impl ChatSessions {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Start a conversation with the greeting, plus a reminder when the user
    /// has an upcoming appointment.
    pub async fn create(
        &self,
        identity: Option<&Identity>,
        profile: Option<&UserProfile>,
        upcoming: Option<&AppointmentView>,
    ) -> ChatResult<Transcript> {
        let mut sessions = self.sessions.write().await;
        self.purge_expired(&mut sessions);

        if sessions.len() >= self.config.max_sessions {
            tracing::warn!(max = self.config.max_sessions, "Chat session limit reached");
            return Err(ChatError::TooManySessions(self.config.max_sessions));
        }

        let profile = prefill(identity, profile);
        let first_name = profile.name.split_whitespace().next().map(str::to_string);

        let mut session = ChatSession {
            identity_id: identity.map(|i| i.id.clone()),
            messages: Vec::new(),
            profile,
            form_submitted: false,
            last_active: Instant::now(),
        };
        session.push_reply(&tree::greeting(first_name.as_deref()));
        if let Some(view) = upcoming {
            session.push_reply(&tree::reminder(view));
        }

        let id = Uuid::new_v4();
        let transcript = session.transcript(id);
        sessions.insert(id, session);

        tracing::debug!(session_id = %id, signed_in = identity.is_some(), "Chat session created");
        Ok(transcript)
    }

    pub async fn get(&self, id: Uuid) -> ChatResult<Transcript> {
        let mut sessions = self.sessions.write().await;
        self.purge_expired(&mut sessions);

        let session = sessions.get_mut(&id).ok_or(ChatError::SessionNotFound(id))?;
        session.touch();
        Ok(session.transcript(id))
    }

    /// Provider user id the session was opened with
    pub async fn owner(&self, id: Uuid) -> ChatResult<Option<String>> {
        let sessions = self.sessions.read().await;
        sessions
            .get(&id)
            .map(|s| s.identity_id.clone())
            .ok_or(ChatError::SessionNotFound(id))
    }

    /// Record the user's input (free text or an option value) and answer it
    pub async fn post(&self, id: Uuid, input: &str) -> ChatResult<Exchange> {
        if input.trim().is_empty() {
            return Err(ChatError::Validation("Message cannot be empty".to_string()));
        }

        let mut sessions = self.sessions.write().await;
        self.purge_expired(&mut sessions);
        let session = sessions.get_mut(&id).ok_or(ChatError::SessionNotFound(id))?;
        session.touch();

        let reply = tree::respond(input, &session.context());
        if let Some(preference) = reply.preference {
            session.profile.preference = Some(preference);
        }

        let user = ChatMessage::user(reply.echo.clone().unwrap_or_else(|| input.to_string()));
        session.messages.push(user.clone());
        let message = session.push_reply(&reply);

        Ok(Exchange {
            user,
            reply: message,
            action: reply.action,
        })
    }

    /// Validate and persist contact details, then acknowledge them
    pub async fn submit_contact(
        &self,
        id: Uuid,
        identity: Option<&Identity>,
        mut details: ContactDetails,
        store: &dyn AppointmentStore,
    ) -> ChatResult<ChatMessage> {
        if let Some(prompt) = details.missing_field_prompt() {
            return Err(ChatError::Validation(prompt.to_string()));
        }

        {
            let mut sessions = self.sessions.write().await;
            self.purge_expired(&mut sessions);
            let session = sessions.get(&id).ok_or(ChatError::SessionNotFound(id))?;
            if details.preference.is_none() {
                details.preference = session.profile.preference;
            }
        }

        save_contact(store, identity, &details).await?;

        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(ChatError::SessionNotFound(id))?;
        session.touch();

        let message = session.push_reply(&tree::contact_received(&details.name));
        session.profile = details;
        session.form_submitted = true;
        Ok(message)
    }

    /// Acknowledge a property form. Contact details already on file are
    /// saved along with it.
    pub async fn submit_property(
        &self,
        id: Uuid,
        identity: Option<&Identity>,
        details: &PropertyDetails,
        store: &dyn AppointmentStore,
    ) -> ChatResult<ChatMessage> {
        let location = details.location.trim();
        if location.is_empty() {
            return Err(ChatError::Validation("Please enter a location".to_string()));
        }

        let profile = {
            let mut sessions = self.sessions.write().await;
            self.purge_expired(&mut sessions);
            let session = sessions.get(&id).ok_or(ChatError::SessionNotFound(id))?;
            session.profile.clone()
        };

        if profile.missing_field_prompt().is_none() {
            save_contact(store, identity, &profile).await?;
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&id).ok_or(ChatError::SessionNotFound(id))?;
        session.touch();

        let message =
            session.push_reply(&tree::property_received(details.property_type.as_str(), location));
        session.form_submitted = true;
        Ok(message)
    }

    /// Returns `false` when the session was already gone
    pub async fn close(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn count(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.purge_expired(&mut sessions);
        sessions.len()
    }

    fn purge_expired(&self, sessions: &mut HashMap<Uuid, ChatSession>) {
        let ttl = self.config.ttl;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_active.elapsed() < ttl);

        let purged = before - sessions.len();
        if purged > 0 {
            tracing::debug!(purged, "Expired chat sessions");
        }
    }
}

/// Contact fields known before the user types anything
fn prefill(identity: Option<&Identity>, profile: Option<&UserProfile>) -> ContactDetails {
    let mut details = ContactDetails::default();

    if let Some(identity) = identity {
        details.name = identity.name.clone().unwrap_or_default();
        details.email = identity.email.clone().unwrap_or_default();
        details.phone = identity.phone.clone().unwrap_or_default();
    }

    if let Some(profile) = profile {
        if !profile.name.is_empty() && profile.name != "Unknown" {
            details.name = profile.name.clone();
        }
        if !profile.email.is_empty() {
            details.email = profile.email.clone();
        }
        if let Some(phone) = &profile.phone {
            details.phone = phone.clone();
        }
        details.address = profile.address.clone();
        details.preference = profile.preference;
    }

    details
}

async fn save_contact(
    store: &dyn AppointmentStore,
    identity: Option<&Identity>,
    details: &ContactDetails,
) -> ChatResult<()> {
    let result = match identity {
        Some(identity) => store
            .save_profile(identity, details.clone().into_update())
            .await
            .map(|_| ()),
        None => store.insert_guest(details).await.map(|_| ()),
    };

    result.map_err(|e| {
        tracing::error!(error = %e, "Failed to save contact details");
        ChatError::Submission(SUBMISSION_FAILED.to_string())
    })
}

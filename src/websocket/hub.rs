//! Chat socket registry
//!
//! Tracks chat sockets and which user each belongs to, so appointment
//! changes made over HTTP can be pushed to every open widget of the owner.

use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use super::messages::{ServerMessage, UserEvent};

/// Random id handed out on register
pub type ConnectionId = String;

/// Socket limits
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Sockets beyond this are refused
    pub max_connections: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_connections: 1000,
        }
    }
}

/// Outbound queue of one socket, plus the user it belongs to
struct ConnectionHandle {
    sender: mpsc::UnboundedSender<ServerMessage>,
    /// Provider user id; `None` for guest chats
    user_id: Option<String>,
}

pub struct ChatHub {
    connections: RwLock<HashMap<ConnectionId, ConnectionHandle>>,
    /// User id → their connections
    users: RwLock<HashMap<String, HashSet<ConnectionId>>>,
    config: HubConfig,
}

impl ChatHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
            users: RwLock::new(HashMap::new()),
            config,
        }
    }

    /// Add a socket, indexed under its user when signed in
    ///
    /// Fails once the connection limit has been reached.
    pub async fn register(
        &self,
        sender: mpsc::UnboundedSender<ServerMessage>,
        user_id: Option<String>,
    ) -> Result<ConnectionId, HubError> {
        let mut connections = self.connections.write().await;
        if connections.len() >= self.config.max_connections {
            return Err(HubError::TooManyConnections(self.config.max_connections));
        }

        let id = Uuid::new_v4().to_string();
        if let Some(user) = &user_id {
            self.users
                .write()
                .await
                .entry(user.clone())
                .or_default()
                .insert(id.clone());
        }
        connections.insert(id.clone(), ConnectionHandle { sender, user_id });

        tracing::info!(connection_id = %id, "Chat socket registered");
        Ok(id)
    }

    /// Unregister a connection and drop it from its user's set
    pub async fn unregister(&self, id: &str) {
        let handle = self.connections.write().await.remove(id);

        if let Some(user) = handle.and_then(|h| h.user_id) {
            let mut users = self.users.write().await;
            if let Some(ids) = users.get_mut(&user) {
                ids.remove(id);
                if ids.is_empty() {
                    users.remove(&user);
                }
            }
        }

        tracing::info!(connection_id = %id, "Chat socket unregistered");
    }

    /// Deliver an event to every connection of its user.
    ///
    /// Returns the number of connections reached.
    pub async fn notify(&self, event: &UserEvent) -> usize {
        let ids = match self.users.read().await.get(&event.user_id) {
            Some(ids) => ids.clone(),
            None => return 0,
        };

        let connections = self.connections.read().await;
        let sent = ids
            .iter()
            .filter_map(|id| connections.get(id))
            .filter(|handle| handle.sender.send(event.message.clone()).is_ok())
            .count();

        if sent > 0 {
            tracing::trace!(user_id = %event.user_id, connections = sent, "Pushed user event");
        }
        sent
    }

    /// Queue a frame for one socket
    pub async fn send_to(&self, id: &str, message: ServerMessage) -> Result<(), HubError> {
        let connections = self.connections.read().await;
        let handle = connections.get(id).ok_or(HubError::ConnectionNotFound)?;

        handle
            .sender
            .send(message)
            .map_err(|_| HubError::SendFailed)
    }

    pub async fn connection_count(&self) -> usize {
        self.connections.read().await.len()
    }

    pub async fn user_connection_count(&self, user_id: &str) -> usize {
        self.users
            .read()
            .await
            .get(user_id)
            .map(|ids| ids.len())
            .unwrap_or(0)
    }
}

/// Registry failures
#[derive(Debug, Error)]
pub enum HubError {
    #[error("Too many connections (limit: {0})")]
    TooManyConnections(usize),

    #[error("Connection not found")]
    ConnectionNotFound,

    #[error("Failed to send message")]
    SendFailed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_unregister() {
        let hub = ChatHub::new(HubConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();

        let id = hub.register(tx, Some("user_ava".into())).await.unwrap();
        assert_eq!(hub.connection_count().await, 1);
        assert_eq!(hub.user_connection_count("user_ava").await, 1);

        hub.unregister(&id).await;
        assert_eq!(hub.connection_count().await, 0);
        assert_eq!(hub.user_connection_count("user_ava").await, 0);
    }

    #[tokio::test]
    async fn test_connection_limit() {
        let hub = ChatHub::new(HubConfig { max_connections: 1 });
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        hub.register(tx1, None).await.unwrap();
        let result = hub.register(tx2, None).await;
        assert!(matches!(result, Err(HubError::TooManyConnections(1))));
    }

    #[tokio::test]
    async fn test_notify_reaches_only_the_owner() {
        let hub = ChatHub::new(HubConfig::default());
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        let (tx3, mut rx3) = mpsc::unbounded_channel();

        hub.register(tx1, Some("user_ava".into())).await.unwrap();
        hub.register(tx2, Some("user_ava".into())).await.unwrap();
        hub.register(tx3, Some("user_bob".into())).await.unwrap();

        let event = UserEvent {
            user_id: "user_ava".into(),
            message: ServerMessage::Pong,
        };
        assert_eq!(hub.notify(&event).await, 2);

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
        assert!(rx3.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_notify_unknown_user() {
        let hub = ChatHub::new(HubConfig::default());
        let event = UserEvent {
            user_id: "user_nobody".into(),
            message: ServerMessage::Pong,
        };
        assert_eq!(hub.notify(&event).await, 0);
    }

    #[tokio::test]
    async fn test_send_to_missing_connection() {
        let hub = ChatHub::new(HubConfig::default());
        let result = hub.send_to("missing", ServerMessage::Pong).await;
        assert!(matches!(result, Err(HubError::ConnectionNotFound)));
    }
}

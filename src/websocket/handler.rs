//! Chat socket
//!
//! Upgrades `/ws/chat?session=<id>` and runs the chat over the socket.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::messages::{ClientMessage, ServerMessage};
use crate::api::routes::chat::authorize;
use crate::api::{ApiResult, AppState};
use crate::chat::ChatMessage;
use crate::domain::Identity;

#[derive(Debug, Deserialize)]
pub struct SocketParams {
    pub session: Uuid,
}

/// GET /ws/chat?session=<id>
///
/// The chat session must exist and be visible to the caller before the
/// connection is upgraded.
pub async fn chat_socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    identity: Option<Identity>,
    Query(params): Query<SocketParams>,
) -> ApiResult<Response> {
    authorize(&state, params.session, identity.as_ref()).await?;
    let owner = state.sessions.owner(params.session).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, params.session, owner)))
}

/// Drive one chat socket until either side goes away
async fn handle_socket(
    socket: WebSocket,
    state: Arc<AppState>,
    session_id: Uuid,
    owner: Option<String>,
) {
    let (mut outbound, mut inbound) = socket.split();
    let (queue, mut queued) = mpsc::unbounded_channel::<ServerMessage>();

    let connection_id = match state.hub.register(queue, owner).await {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Chat socket refused");
            let _ = write_frame(&mut outbound, &ServerMessage::Error { message: e.to_string() }).await;
            return;
        }
    };

    tracing::debug!(connection_id = %connection_id, session_id = %session_id, "Chat socket open");

    let connected = ServerMessage::Connected {
        connection_id: connection_id.clone(),
        session_id: session_id.to_string(),
    };
    let _ = state.hub.send_to(&connection_id, connected).await;

    loop {
        tokio::select! {
            frame = queued.recv() => {
                let Some(frame) = frame else { break };
                if write_frame(&mut outbound, &frame).await.is_err() {
                    break;
                }
            }
            incoming = inbound.next() => {
                let keep_open = match incoming {
                    Some(Ok(message)) => {
                        on_frame(&state, &connection_id, session_id, message).await
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %connection_id, error = %e, "Chat socket read failed");
                        false
                    }
                    None => false,
                };
                if !keep_open {
                    break;
                }
            }
        }
    }

    state.hub.unregister(&connection_id).await;
    tracing::debug!(connection_id = %connection_id, "Chat socket closed");
}

async fn write_frame(
    outbound: &mut SplitSink<WebSocket, Message>,
    frame: &ServerMessage,
) -> Result<(), axum::Error> {
    match serde_json::to_string(frame) {
        Ok(text) => outbound.send(Message::Text(text)).await,
        Err(e) => {
            tracing::error!(error = %e, "Could not encode chat frame");
            Ok(())
        }
    }
}

/// Returns `false` once the client has closed
async fn on_frame(state: &AppState, connection_id: &str, session_id: Uuid, message: Message) -> bool {
    let reply = match message {
        Message::Text(text) => match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Ping) => Some(ServerMessage::Pong),
            Ok(ClientMessage::Send { text: input }) | Ok(ClientMessage::Choose { value: input }) => {
                converse(state, connection_id, session_id, &input).await;
                None
            }
            Err(e) => Some(ServerMessage::Error {
                message: format!("Unrecognised frame: {}", e),
            }),
        },
        Message::Binary(_) => Some(ServerMessage::Error {
            message: "Send chat input as JSON text frames".to_string(),
        }),
        // Axum answers pings itself
        Message::Ping(_) | Message::Pong(_) => None,
        Message::Close(_) => return false,
    };

    if let Some(reply) = reply {
        let _ = state.hub.send_to(connection_id, reply).await;
    }
    true
}

/// Typing indicator, then the echoed input and the assistant's answer
async fn converse(state: &AppState, connection_id: &str, session_id: Uuid, input: &str) {
    let typing = ServerMessage::Typing {
        message: ChatMessage::typing(),
    };
    let _ = state.hub.send_to(connection_id, typing).await;

    let frames = match state.sessions.post(session_id, input).await {
        Ok(exchange) => vec![
            ServerMessage::Message {
                message: exchange.user,
                action: None,
            },
            ServerMessage::Message {
                message: exchange.reply,
                action: exchange.action,
            },
        ],
        Err(e) => {
            tracing::debug!(session_id = %session_id, error = %e, "Chat input rejected");
            vec![ServerMessage::Error {
                message: e.to_string(),
            }]
        }
    };

    for frame in frames {
        let _ = state.hub.send_to(connection_id, frame).await;
    }
}

//! Chat WebSocket
//!
//! A socket transport for the chat assistant, plus live appointment updates.
//!
//! - **ChatHub**: tracks open sockets per user
//! - **Handler**: upgrade and message processing
//! - **Messages**: client and server frame formats
//!
//! ## Example
//!
//! ```javascript
//! const ws = new WebSocket(`ws://localhost:8090/ws/chat?session=${sessionId}`);
//!
//! ws.onopen = () => {
//!   ws.send(JSON.stringify({type: 'choose', value: 'sales'}));
//! };
//!
//! ws.onmessage = (event) => {
//!   const msg = JSON.parse(event.data);
//!   if (msg.type === 'appointment_updated') refreshAppointments();
//! };
//! ```

mod handler;
mod hub;
mod messages;

pub use handler::{chat_socket_handler, SocketParams};
pub use hub::{ChatHub, ConnectionId, HubConfig, HubError};
pub use messages::{ClientMessage, ServerMessage, UserEvent};

//! WebSocket message types for the chat relay.
//!
//! Every frame is one JSON object tagged by `type`, with its fields under
//! `payload`:
//! - Client → Server: join, chat, leave
//! - Server → Client: system notices, chat lines

use serde::{Deserialize, Serialize};

use crate::domain::foundation::RelayError;
use crate::domain::relay::Outbound;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ServerMessage {
    /// Server-originated notice.
    System(SystemMessage),

    /// Chat line from another member of the room.
    Chat(ChatMessage),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemMessage {
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub message: String,
    pub user_name: String,
    /// Always false from the server; senders render their own lines.
    pub is_self: bool,
}

impl From<Outbound> for ServerMessage {
    fn from(outbound: Outbound) -> Self {
        match outbound {
            Outbound::System { message } => ServerMessage::System(SystemMessage { message }),
            Outbound::Chat { message, user_name } => ServerMessage::Chat(ChatMessage {
                message,
                user_name: user_name.as_str().to_string(),
                is_self: false,
            }),
        }
    }
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Enter (or re-enter) a room.
    Join(JoinPayload),

    /// Say something to the current room.
    Chat(ChatPayload),

    /// Leave a room.
    Leave(LeavePayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinPayload {
    pub room_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// `room_id` and `user_name` are accepted for compatibility with clients
/// that echo them; routing always uses the server-side member record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    pub message: String,
    #[serde(default)]
    pub room_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeavePayload {
    pub room_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

/// Decodes one inbound frame.
///
/// Anything that is not a well-formed join, chat or leave event is
/// [`RelayError::InvalidMessage`].
pub fn parse_client_message(raw: &str) -> Result<ClientMessage, RelayError> {
    serde_json::from_str(raw).map_err(|e| {
        tracing::trace!(error = %e, "Rejected client frame");
        RelayError::InvalidMessage
    })
}

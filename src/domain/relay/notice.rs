//! Outbound notices and the deliveries that carry them.

use crate::domain::foundation::{ConnectionId, RelayError};

use super::member::DisplayName;

/// Something the relay wants a client to see.
///
/// Transport-neutral; the WebSocket adapter maps it onto the wire format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Server-originated notice (joins, departures, errors).
    System { message: String },

    /// A chat line authored by another member.
    Chat {
        message: String,
        user_name: DisplayName,
    },
}

impl Outbound {
    pub fn joined(name: &DisplayName, occupancy: usize) -> Self {
        let noun = if occupancy == 1 { "person" } else { "people" };
        Self::System {
            message: format!(
                "{} has joined the room ({} {} in room)",
                name, occupancy, noun
            ),
        }
    }

    pub fn left(name: &DisplayName) -> Self {
        Self::System {
            message: format!("{} has left the room", name),
        }
    }

    pub fn disconnected(name: &DisplayName) -> Self {
        Self::System {
            message: format!("{} has disconnected", name),
        }
    }

    pub fn error(err: &RelayError) -> Self {
        Self::System {
            message: err.to_string(),
        }
    }

    pub fn chat(message: impl Into<String>, from: &DisplayName) -> Self {
        Self::Chat {
            message: message.into(),
            user_name: from.clone(),
        }
    }
}

/// One outbound notice and the connections selected to receive it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipients: Vec<ConnectionId>,
    pub outbound: Outbound,
}

impl Delivery {
    pub fn new(recipients: Vec<ConnectionId>, outbound: Outbound) -> Self {
        Self {
            recipients,
            outbound,
        }
    }

    /// A delivery addressed to a single connection.
    pub fn reply(to: ConnectionId, outbound: Outbound) -> Self {
        Self::new(vec![to], outbound)
    }

    pub fn is_empty(&self) -> bool {
        self.recipients.is_empty()
    }
}

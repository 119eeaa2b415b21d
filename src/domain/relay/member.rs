//! Member records and their lifecycle status.

use std::fmt;

use crate::domain::foundation::{RoomId, StateMachine};

/// Name shown next to a member's messages and in room notices.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DisplayName(String);

impl DisplayName {
    /// Name used when a client joins without one.
    pub const ANONYMOUS: &'static str = "Anonymous";

    /// Uses the supplied name, falling back to "Anonymous" when it is
    /// missing or empty.
    pub fn or_anonymous(name: Option<String>) -> Self {
        match name {
            Some(name) if !name.is_empty() => Self(name),
            _ => Self::default(),
        }
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for DisplayName {
    fn default() -> Self {
        Self(Self::ANONYMOUS.to_string())
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a connection stands with respect to rooms.
///
/// `Unregistered` is never stored on a [`Member`]; it is what the registry
/// reports for connections it holds no record for.
///
/// Valid transitions:
/// - Unregistered -> Idle (connect)
/// - Idle -> InRoom, InRoom -> InRoom (join, re-join)
/// - InRoom -> Idle, Idle -> Idle (leave)
/// - Idle -> Unregistered, InRoom -> Unregistered (disconnect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemberStatus {
    #[default]
    Unregistered,
    Idle,
    InRoom,
}

impl StateMachine for MemberStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use MemberStatus::*;
        matches!(
            (self, target),
            (Unregistered, Idle)
                | (Idle, InRoom)
                | (InRoom, InRoom)
                | (InRoom, Idle)
                | (Idle, Idle)
                | (Idle, Unregistered)
                | (InRoom, Unregistered)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use MemberStatus::*;
        match self {
            Unregistered => vec![Idle],
            Idle => vec![InRoom, Idle, Unregistered],
            InRoom => vec![InRoom, Idle, Unregistered],
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MemberStatus::Unregistered => "Unregistered",
            MemberStatus::Idle => "Idle",
            MemberStatus::InRoom => "InRoom",
        };
        write!(f, "{}", s)
    }
}

/// Server-side record of a connection's room and display name.
///
/// Keyed by connection id in the registry. A fresh member has no room and
/// is anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Member {
    room: Option<RoomId>,
    display_name: DisplayName,
}

impl Member {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    pub fn status(&self) -> MemberStatus {
        if self.room.is_some() {
            MemberStatus::InRoom
        } else {
            MemberStatus::Idle
        }
    }

    /// Moves the member into `room` under `name`.
    ///
    /// Returns the room the member was in before, if any.
    pub(crate) fn enter(&mut self, room: RoomId, name: DisplayName) -> Option<RoomId> {
        debug_assert!(self.status().can_transition_to(&MemberStatus::InRoom));
        self.display_name = name;
        self.room.replace(room)
    }

    /// Clears the member's room, keeping its display name.
    ///
    /// Returns the room the member was in, if any.
    pub(crate) fn vacate(&mut self) -> Option<RoomId> {
        debug_assert!(self.status().can_transition_to(&MemberStatus::Idle));
        self.room.take()
    }
}

//! Membership registry: who is connected, which room they are in, and who
//! receives each notice.
//!
//! Rooms are not stored on their own. The registry keeps a room index
//! derived from member records and updates both in the same step, so a
//! room exists exactly while at least one member points at it.
//!
//! ```text
//! members                      rooms (index)
//! ├── conn-a { lobby, Alice }  ├── lobby → { conn-a, conn-b }
//! ├── conn-b { lobby, Bob }    └── games → { conn-c }
//! ├── conn-c { games, Carol }
//! └── conn-d { -, Anonymous }
//! ```
//!
//! Every operation is synchronous and returns the [`Delivery`] it produced;
//! pushing bytes to sockets is the caller's job.

use std::collections::{HashMap, HashSet};

use crate::domain::foundation::{ConnectionId, RelayError, RoomId};

use super::member::{DisplayName, Member, MemberStatus};
use super::notice::{Delivery, Outbound};

#[derive(Debug, Default)]
pub struct MemberRegistry {
    members: HashMap<ConnectionId, Member>,
    rooms: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl MemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection as an idle, anonymous member.
    ///
    /// Returns false if the connection was already registered, in which
    /// case its record is left untouched.
    pub fn connect(&mut self, id: ConnectionId) -> bool {
        if self.members.contains_key(&id) {
            return false;
        }
        self.members.insert(id, Member::new());
        true
    }

    /// Puts `id` in `room` under `name` and announces it to the whole room,
    /// joiner included.
    ///
    /// Unknown connections are registered first. Re-joining the same room
    /// only renames; joining another room moves the member.
    pub fn join(
        &mut self,
        id: ConnectionId,
        room: RoomId,
        name: DisplayName,
    ) -> Delivery {
        self.connect(id);
        let member = self.member_mut(id);

        if let Some(previous) = member.enter(room.clone(), name) {
            self.unindex(id, &previous);
        }
        self.rooms.entry(room.clone()).or_default().insert(id);

        let name = self.member_mut(id).display_name().clone();
        let occupancy = self.occupancy(&room);

        Delivery::new(
            self.members_of(&room, None),
            Outbound::joined(&name, occupancy),
        )
    }

    /// Relays a chat line to everyone else in the sender's room.
    ///
    /// Fails with [`RelayError::NotInRoom`] when the sender has no room; the
    /// caller reports that to the sender alone.
    pub fn chat(&self, id: ConnectionId, message: String) -> Result<Delivery, RelayError> {
        let member = self.members.get(&id).ok_or(RelayError::NotInRoom)?;
        let room = member.room().ok_or(RelayError::NotInRoom)?;

        Ok(Delivery::new(
            self.members_of(room, Some(id)),
            Outbound::chat(message, member.display_name()),
        ))
    }

    /// Clears the member's room and tells the occupants of `room` it left.
    ///
    /// `room` is the room named by the client, which is not necessarily the
    /// room the member was in. The member is cleared before recipients are
    /// chosen, so the leaver never receives its own notice. The connection
    /// stays registered and keeps its display name.
    pub fn leave(&mut self, id: ConnectionId, room: &RoomId) -> Delivery {
        self.connect(id);
        let member = self.member_mut(id);
        let name = member.display_name().clone();

        if let Some(previous) = member.vacate() {
            self.unindex(id, &previous);
        }

        Delivery::new(self.members_of(room, None), Outbound::left(&name))
    }

    /// Forgets the connection. If it was in a room, the remaining occupants
    /// are told it disconnected.
    pub fn disconnect(&mut self, id: ConnectionId) -> Option<Delivery> {
        let member = self.members.remove(&id)?;
        let room = member.room()?;
        self.unindex(id, room);

        Some(Delivery::new(
            self.members_of(room, None),
            Outbound::disconnected(member.display_name()),
        ))
    }

    pub fn member(&self, id: ConnectionId) -> Option<&Member> {
        self.members.get(&id)
    }

    pub fn status(&self, id: ConnectionId) -> MemberStatus {
        self.members
            .get(&id)
            .map(Member::status)
            .unwrap_or(MemberStatus::Unregistered)
    }

    /// Number of members currently in `room` (0 if nobody is).
    pub fn occupancy(&self, room: &RoomId) -> usize {
        self.rooms.get(room).map(HashSet::len).unwrap_or(0)
    }

    /// Connections currently in `room`, minus `exclude`.
    pub fn members_of(&self, room: &RoomId, exclude: Option<ConnectionId>) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .into_iter()
            .flatten()
            .copied()
            .filter(|id| Some(*id) != exclude)
            .collect()
    }

    /// All rooms with at least one member, sorted by name.
    pub fn active_rooms(&self) -> Vec<RoomId> {
        let mut rooms: Vec<RoomId> = self.rooms.keys().cloned().collect();
        rooms.sort();
        rooms
    }

    pub fn connection_count(&self) -> usize {
        self.members.len()
    }

    fn member_mut(&mut self, id: ConnectionId) -> &mut Member {
        self.members.entry(id).or_default()
    }

    fn unindex(&mut self, id: ConnectionId, room: &RoomId) {
        if let Some(occupants) = self.rooms.get_mut(room) {
            occupants.remove(&id);
            if occupants.is_empty() {
                self.rooms.remove(room);
            }
        }
    }
}

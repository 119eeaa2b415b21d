//! Room routing for live WebSocket connections.
//!
//! `RoomRouter` wraps the [`MemberRegistry`] in a single lock together with
//! each connection's outbound queue. Every inbound event takes the lock
//! once, applies its registry transition and enqueues the resulting frames.
//! Socket writes happen later on each connection's own writer task, so a
//! slow client only backs up its own queue.
//!
//! ```text
//! recv task (conn-a) ─┐                          ┌─▶ queue conn-a ─▶ writer ─▶ socket
//! recv task (conn-b) ─┼─▶ Mutex<RouterState> ────┼─▶ queue conn-b ─▶ writer ─▶ socket
//! recv task (conn-c) ─┘   registry + queues      └─▶ queue conn-c ─▶ writer ─▶ socket
//! ```
//!
//! Enqueueing under the lock keeps every connection's frames in the order
//! the registry produced them. Queues are bounded: once a client falls
//! `channel_capacity` frames behind, further frames to it are dropped until
//! its writer catches up.

use std::collections::HashMap;

use tokio::sync::{mpsc, Mutex};

use crate::domain::foundation::{ConnectionId, RelayError, RoomId};
use crate::domain::relay::{Delivery, DisplayName, MemberRegistry, Outbound};

use super::messages::{parse_client_message, ClientMessage, ServerMessage};

/// Default number of frames buffered per connection.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 128;

/// Sending half of a connection's outbound queue of serialized frames.
pub type Outbox = mpsc::Sender<String>;

#[derive(Default)]
struct RouterState {
    registry: MemberRegistry,
    outboxes: HashMap<ConnectionId, Outbox>,
}

impl RouterState {
    /// Serializes once and enqueues on every recipient with room to spare.
    fn dispatch(&self, delivery: Delivery) {
        if delivery.is_empty() {
            return;
        }

        let frame = match serde_json::to_string(&ServerMessage::from(delivery.outbound)) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize server message");
                return;
            }
        };

        for id in &delivery.recipients {
            let Some(outbox) = self.outboxes.get(id) else {
                tracing::trace!(connection_id = %id, "Connection unavailable, skipping");
                continue;
            };

            match outbox.try_send(frame.clone()) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!(connection_id = %id, "Outbox full, dropping frame");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::trace!(connection_id = %id, "Outbox closed, skipping");
                }
            }
        }
    }

    fn reply_error(&self, id: ConnectionId, err: &RelayError) {
        tracing::debug!(connection_id = %id, code = err.code(), "Rejected client event: {}", err);
        self.dispatch(Delivery::reply(id, Outbound::error(err)));
    }
}

/// Shared router for all connections served by this process.
pub struct RoomRouter {
    state: Mutex<RouterState>,
    /// Buffer size for each connection's outbound queue.
    channel_capacity: usize,
}

impl RoomRouter {
    /// Create a router whose connections buffer up to `channel_capacity`
    /// frames each. A capacity of 0 is raised to 1.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            state: Mutex::new(RouterState::default()),
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Create with default capacity (128 frames).
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Opens a bounded outbound queue sized for this router.
    pub fn outbox(&self) -> (Outbox, mpsc::Receiver<String>) {
        mpsc::channel(self.channel_capacity)
    }

    /// Registers a newly accepted connection and its outbound queue.
    pub async fn connect(&self, id: ConnectionId, outbox: Outbox) {
        let mut state = self.state.lock().await;
        state.registry.connect(id);
        state.outboxes.insert(id, outbox);

        tracing::info!(
            connection_id = %id,
            connections = state.registry.connection_count(),
            "Connection registered"
        );
    }

    /// Handles one raw text frame from `id`.
    ///
    /// Malformed frames are answered with a system notice to the sender
    /// and change nothing else.
    pub async fn handle_text(&self, id: ConnectionId, raw: &str) {
        match parse_client_message(raw) {
            Ok(message) => self.handle_message(id, message).await,
            Err(err) => self.state.lock().await.reply_error(id, &err),
        }
    }

    /// Answers `id` with the notice for `err` without touching the registry.
    pub async fn reject(&self, id: ConnectionId, err: RelayError) {
        self.state.lock().await.reply_error(id, &err);
    }

    /// Applies one decoded client event.
    pub async fn handle_message(&self, id: ConnectionId, message: ClientMessage) {
        let mut state = self.state.lock().await;

        let result = match message {
            ClientMessage::Join(payload) => RoomId::new(payload.room_id)
                .map_err(RelayError::from)
                .map(|room| {
                    let name = DisplayName::or_anonymous(payload.user_name);
                    let delivery = state.registry.join(id, room.clone(), name.clone());
                    tracing::info!(
                        connection_id = %id,
                        room = %room,
                        user_name = %name,
                        occupancy = state.registry.occupancy(&room),
                        "Member joined"
                    );
                    delivery
                }),
            ClientMessage::Chat(payload) => state.registry.chat(id, payload.message),
            ClientMessage::Leave(payload) => RoomId::new(payload.room_id)
                .map_err(RelayError::from)
                .map(|room| {
                    let delivery = state.registry.leave(id, &room);
                    tracing::info!(connection_id = %id, room = %room, "Member left");
                    delivery
                }),
        };

        match result {
            Ok(delivery) => state.dispatch(delivery),
            Err(err) => state.reply_error(id, &err),
        }
    }

    /// Forgets a closed connection and tells its room, if it had one.
    pub async fn disconnect(&self, id: ConnectionId) {
        let mut state = self.state.lock().await;
        state.outboxes.remove(&id);

        if let Some(delivery) = state.registry.disconnect(id) {
            state.dispatch(delivery);
        }

        tracing::info!(
            connection_id = %id,
            connections = state.registry.connection_count(),
            "Connection closed"
        );
    }

    /// Number of members currently in `room`.
    pub async fn occupancy(&self, room: &RoomId) -> usize {
        self.state.lock().await.registry.occupancy(room)
    }

    /// All rooms with at least one member (for monitoring).
    pub async fn active_rooms(&self) -> Vec<RoomId> {
        self.state.lock().await.registry.active_rooms()
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.state.lock().await.registry.connection_count()
    }
}

impl Default for RoomRouter {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::sync::Arc;

    struct Client {
        id: ConnectionId,
        rx: mpsc::Receiver<String>,
    }

    impl Client {
        async fn connect(router: &RoomRouter) -> Self {
            let (tx, rx) = router.outbox();
            let id = ConnectionId::new();
            router.connect(id, tx).await;
            Self { id, rx }
        }

        fn drain(&mut self) -> Vec<Value> {
            let mut frames = Vec::new();
            while let Ok(frame) = self.rx.try_recv() {
                frames.push(serde_json::from_str(&frame).unwrap());
            }
            frames
        }
    }

    fn system(message: &str) -> Value {
        json!({"type": "system", "payload": {"message": message}})
    }

    async fn join(router: &RoomRouter, client: &Client, room: &str, name: &str) {
        let frame = json!({"type": "join", "payload": {"roomId": room, "userName": name}});
        router.handle_text(client.id, &frame.to_string()).await;
    }

    async fn chat(router: &RoomRouter, client: &Client, message: &str) {
        let frame = json!({"type": "chat", "payload": {"message": message}});
        router.handle_text(client.id, &frame.to_string()).await;
    }

    #[tokio::test]
    async fn connect_sends_nothing() {
        let router = RoomRouter::with_default_capacity();
        let mut alice = Client::connect(&router).await;

        assert!(alice.drain().is_empty());
        assert_eq!(router.connection_count().await, 1);
    }

    #[tokio::test]
    async fn lobby_scenario() {
        let router = RoomRouter::with_default_capacity();
        let mut alice = Client::connect(&router).await;
        let mut bob = Client::connect(&router).await;

        join(&router, &alice, "lobby", "Alice").await;
        join(&router, &bob, "lobby", "Bob").await;

        assert_eq!(
            alice.drain(),
            vec![
                system("Alice has joined the room (1 person in room)"),
                system("Bob has joined the room (2 people in room)"),
            ]
        );
        assert_eq!(
            bob.drain(),
            vec![system("Bob has joined the room (2 people in room)")]
        );

        chat(&router, &alice, "hi").await;
        assert_eq!(
            bob.drain(),
            vec![json!({"type": "chat", "payload": {"message": "hi", "userName": "Alice", "isSelf": false}})]
        );
        assert!(alice.drain().is_empty());

        router
            .handle_text(bob.id, r#"{"type":"leave","payload":{"roomId":"lobby"}}"#)
            .await;
        assert_eq!(alice.drain(), vec![system("Bob has left the room")]);
        assert!(bob.drain().is_empty());

        chat(&router, &bob, "still there?").await;
        assert_eq!(bob.drain(), vec![system("You're not connected to any room")]);
        assert!(alice.drain().is_empty());
    }

    #[tokio::test]
    async fn bogus_message_only_answers_sender() {
        let router = RoomRouter::with_default_capacity();
        let mut alice = Client::connect(&router).await;
        let mut bob = Client::connect(&router).await;
        join(&router, &alice, "lobby", "Alice").await;
        join(&router, &bob, "lobby", "Bob").await;
        alice.drain();
        bob.drain();

        router.handle_text(alice.id, r#"{"type":"bogus"}"#).await;

        assert_eq!(alice.drain(), vec![system("Invalid message format")]);
        assert!(bob.drain().is_empty());
        assert_eq!(router.occupancy(&RoomId::new("lobby").unwrap()).await, 2);
    }

    #[tokio::test]
    async fn empty_room_id_is_rejected() {
        let router = RoomRouter::with_default_capacity();
        let mut alice = Client::connect(&router).await;

        join(&router, &alice, "", "Alice").await;

        assert_eq!(alice.drain(), vec![system("Room id cannot be empty")]);
        assert!(router.active_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn empty_room_id_on_leave_keeps_membership() {
        let router = RoomRouter::with_default_capacity();
        let mut alice = Client::connect(&router).await;
        let mut bob = Client::connect(&router).await;
        join(&router, &alice, "lobby", "Alice").await;
        join(&router, &bob, "lobby", "Bob").await;
        alice.drain();
        bob.drain();

        router
            .handle_text(bob.id, r#"{"type":"leave","payload":{"roomId":""}}"#)
            .await;

        assert_eq!(bob.drain(), vec![system("Room id cannot be empty")]);
        assert!(alice.drain().is_empty());
        assert_eq!(router.occupancy(&RoomId::new("lobby").unwrap()).await, 2);

        chat(&router, &bob, "still here").await;
        assert_eq!(alice.drain().len(), 1);
    }

    #[tokio::test]
    async fn disconnect_notifies_room() {
        let router = RoomRouter::with_default_capacity();
        let mut alice = Client::connect(&router).await;
        let bob = Client::connect(&router).await;
        join(&router, &alice, "lobby", "Alice").await;
        join(&router, &bob, "lobby", "Bob").await;
        alice.drain();

        router.disconnect(bob.id).await;

        assert_eq!(alice.drain(), vec![system("Bob has disconnected")]);
        assert_eq!(router.occupancy(&RoomId::new("lobby").unwrap()).await, 1);
        assert_eq!(router.connection_count().await, 1);
    }

    #[tokio::test]
    async fn closed_outbox_is_skipped() {
        let router = RoomRouter::with_default_capacity();
        let mut alice = Client::connect(&router).await;
        let bob = Client::connect(&router).await;
        join(&router, &alice, "lobby", "Alice").await;
        join(&router, &bob, "lobby", "Bob").await;
        alice.drain();

        // Bob's writer is gone but the close has not been processed yet.
        drop(bob.rx);
        chat(&router, &alice, "hello").await;
        join(&router, &alice, "lobby", "Alice").await;

        assert_eq!(
            alice.drain(),
            vec![system("Alice has joined the room (2 people in room)")]
        );
    }

    #[tokio::test]
    async fn full_outbox_drops_frames_for_that_connection_only() {
        let router = RoomRouter::new(2);
        let mut alice = Client::connect(&router).await;
        let mut bob = Client::connect(&router).await;
        join(&router, &alice, "lobby", "Alice").await;
        join(&router, &bob, "lobby", "Bob").await;
        alice.drain();

        // Bob stops reading; his queue still holds his own join notice.
        for i in 0..10 {
            chat(&router, &alice, &format!("line {}", i)).await;
        }
        let mut carol = Client::connect(&router).await;
        join(&router, &carol, "lobby", "Carol").await;

        assert_eq!(
            alice.drain(),
            vec![system("Carol has joined the room (3 people in room)")]
        );
        assert_eq!(
            carol.drain(),
            vec![system("Carol has joined the room (3 people in room)")]
        );

        let backlog = bob.drain();
        assert_eq!(backlog.len(), 2);
        assert_eq!(backlog[0], system("Bob has joined the room (2 people in room)"));
        assert_eq!(backlog[1]["payload"]["message"], "line 0");

        // Once drained, Bob receives new frames again.
        chat(&router, &alice, "welcome back").await;
        assert_eq!(bob.drain().len(), 1);
        assert_eq!(carol.drain().len(), 1);
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        assert_eq!(RoomRouter::new(0).channel_capacity(), 1);
        assert_eq!(RoomRouter::default().channel_capacity(), DEFAULT_CHANNEL_CAPACITY);
    }

    #[tokio::test]
    async fn rooms_are_isolated() {
        let router = RoomRouter::with_default_capacity();
        let mut alice = Client::connect(&router).await;
        let mut bob = Client::connect(&router).await;
        let mut carol = Client::connect(&router).await;
        join(&router, &alice, "lobby", "Alice").await;
        join(&router, &bob, "lobby", "Bob").await;
        join(&router, &carol, "games", "Carol").await;
        alice.drain();
        bob.drain();
        assert_eq!(
            carol.drain(),
            vec![system("Carol has joined the room (1 person in room)")]
        );

        chat(&router, &carol, "gg").await;

        assert!(alice.drain().is_empty());
        assert!(bob.drain().is_empty());
        assert!(carol.drain().is_empty());
    }

    #[tokio::test]
    async fn concurrent_joins_count_every_member_once() {
        let router = Arc::new(RoomRouter::with_default_capacity());
        let mut handles = Vec::new();

        for i in 0..32 {
            let router = router.clone();
            handles.push(tokio::spawn(async move {
                let (tx, rx) = router.outbox();
                let id = ConnectionId::new();
                router.connect(id, tx).await;
                let frame = json!({"type": "join", "payload": {"roomId": "lobby", "userName": format!("user-{}", i)}});
                router.handle_text(id, &frame.to_string()).await;
                rx
            }));
        }

        let mut receivers = Vec::new();
        for handle in handles {
            receivers.push(handle.await.unwrap());
        }

        let lobby = RoomId::new("lobby").unwrap();
        assert_eq!(router.occupancy(&lobby).await, 32);

        // Each member's first frame is its own join; later frames count up by one.
        for mut rx in receivers {
            let mut counts = Vec::new();
            while let Ok(frame) = rx.try_recv() {
                let value: Value = serde_json::from_str(&frame).unwrap();
                let message = value["payload"]["message"].as_str().unwrap().to_string();
                let count: usize = message
                    .rsplit('(')
                    .next()
                    .and_then(|tail| tail.split(' ').next())
                    .and_then(|n| n.parse().ok())
                    .unwrap();
                counts.push(count);
            }
            assert!(counts.windows(2).all(|w| w[1] == w[0] + 1), "{:?}", counts);
            assert_eq!(counts.last(), Some(&32));
        }
    }
}

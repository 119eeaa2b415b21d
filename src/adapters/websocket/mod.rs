//! WebSocket adapters for the room chat relay.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         handler                                      │
//! │   - Upgrades HTTP to WebSocket, one recv + one writer task each      │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ text frames
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      RoomRouter                                      │
//! │   - Parses frames, applies MemberRegistry transitions                │
//! │   - Enqueues serialized notices on recipients' queues                │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │
//!                                     │ per-connection queues
//!                                     ▼
//! │   Room: lobby          Room: games                                   │
//! │   ├── conn-a           └── conn-c                                    │
//! │   └── conn-b                                                         │
//! ```
//!
//! # Components
//!
//! - [`messages`] - Wire protocol types
//! - [`rooms`] - Concurrency shell around the member registry
//! - [`handler`] - Axum WebSocket upgrade handler

pub mod handler;
pub mod messages;
pub mod rooms;

pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use messages::{
    parse_client_message, ChatMessage, ChatPayload, ClientMessage, JoinPayload, LeavePayload,
    ServerMessage, SystemMessage,
};
pub use rooms::{Outbox, RoomRouter, DEFAULT_CHANNEL_CAPACITY};

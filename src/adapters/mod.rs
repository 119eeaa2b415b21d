//! Adapters - connect the relay domain to the outside world.
//!
//! - `websocket` - Wire protocol, router and upgrade handler
//! - `http` - Application router, health check, middleware layers

pub mod http;
pub mod websocket;

pub use http::app_router;
pub use websocket::{RoomRouter, WebSocketState};

//! Room Relay - real-time room-based chat over WebSocket.
//!
//! Clients connect, join a named room and exchange text messages that are
//! fanned out to the other occupants of the same room.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod telemetry;

//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, error types and the state machine trait that form
//! the vocabulary of the relay domain.

mod errors;
mod ids;
mod state_machine;

pub use errors::{RelayError, ValidationError};
pub use ids::{ConnectionId, RoomId};
pub use state_machine::StateMachine;

//! Domain layer containing relay logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine trait)
//! - `relay` - Member lifecycle, room index and fan-out decisions

pub mod foundation;
pub mod relay;

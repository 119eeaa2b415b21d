//! State machine trait for lifecycle enums.
//!
//! Gives lifecycle statuses (such as a member's room status) one interface
//! for checking and performing transitions.

use super::ValidationError;

/// Trait for status enums that represent state machines.
///
/// Implementors list their legal transitions and get a checked
/// `transition_to` for free.
///
/// # Example
///
/// ```ignore
/// impl StateMachine for MemberStatus {
///     fn can_transition_to(&self, target: &Self) -> bool {
///         matches!((self, target), (Idle, InRoom) | (InRoom, Idle) | ...)
///     }
///
///     fn valid_transitions(&self) -> Vec<Self> { ... }
/// }
///
/// let status = member.status().transition_to(MemberStatus::InRoom)?;
/// ```
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if transition from self to target is valid.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Returns all valid target states from current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Performs transition with validation, returning error if invalid.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "state_transition",
                format!("Cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    /// Checks if current state is terminal (no valid outgoing transitions).
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

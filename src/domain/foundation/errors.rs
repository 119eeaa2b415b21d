//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Per-event failures reported back to the offending connection.
///
/// The `Display` text of each variant is the exact notice the client sees in
/// a `system` event. None of these affect other connections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Payload was not JSON, had an unknown `type`, or lacked required fields.
    #[error("Invalid message format")]
    InvalidMessage,

    /// Chat sent before joining a room (or after leaving one).
    #[error("You're not connected to any room")]
    NotInRoom,

    /// Join or leave named the empty string as its room.
    #[error("Room id cannot be empty")]
    EmptyRoomId,
}

impl RelayError {
    /// Stable code for structured logs.
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::InvalidMessage => "INVALID_MESSAGE",
            RelayError::NotInRoom => "NOT_IN_ROOM",
            RelayError::EmptyRoomId => "EMPTY_ROOM_ID",
        }
    }
}

impl From<ValidationError> for RelayError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField { ref field } if field == "room_id" => {
                RelayError::EmptyRoomId
            }
            _ => RelayError::InvalidMessage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("room_id");
        assert_eq!(format!("{}", err), "Field 'room_id' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("state_transition", "Idle to Idle");
        assert_eq!(
            format!("{}", err),
            "Field 'state_transition' has invalid format: Idle to Idle"
        );
    }

    #[test]
    fn relay_errors_display_client_notices() {
        assert_eq!(RelayError::InvalidMessage.to_string(), "Invalid message format");
        assert_eq!(
            RelayError::NotInRoom.to_string(),
            "You're not connected to any room"
        );
        assert_eq!(RelayError::EmptyRoomId.to_string(), "Room id cannot be empty");
    }

    #[test]
    fn empty_room_id_validation_maps_to_empty_room_id() {
        let err: RelayError = ValidationError::empty_field("room_id").into();
        assert_eq!(err, RelayError::EmptyRoomId);
    }

    #[test]
    fn other_validation_errors_map_to_invalid_message() {
        let err: RelayError = ValidationError::invalid_format("payload", "bad").into();
        assert_eq!(err, RelayError::InvalidMessage);
        assert_eq!(err.code(), "INVALID_MESSAGE");
    }
}

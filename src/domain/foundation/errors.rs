//! Error types for the domain layer.

use thiserror::Error;

/// Errors that occur during value object construction or state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Invalid state transition: {reason}")]
    InvalidTransition { reason: String },
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

    /// Creates an invalid transition error.
    pub fn invalid_transition(reason: impl Into<String>) -> Self {
        ValidationError::InvalidTransition {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_displays_correctly() {
        let err = ValidationError::empty_field("thread_id");
        assert_eq!(format!("{}", err), "Field 'thread_id' cannot be empty");
    }

    #[test]
    fn invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("arguments", "expected a JSON object");
        assert_eq!(
            format!("{}", err),
            "Field 'arguments' has invalid format: expected a JSON object"
        );
    }

    #[test]
    fn invalid_transition_displays_correctly() {
        let err = ValidationError::invalid_transition("Completed -> InProgress");
        assert_eq!(
            format!("{}", err),
            "Invalid state transition: Completed -> InProgress"
        );
    }
}

//! Caller-facing error taxonomy for orchestration.

use thiserror::Error;

use crate::domain::foundation::ValidationError;
use crate::domain::tools::RegistryError;
use crate::ports::{AssistantApiError, PersistenceError, SqlEngineError};

/// Errors surfaced by the assistant client, run driver and pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrchestrationError {
    /// An operation was invoked before its required setup.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// A tool outside the active set was requested.
    #[error("tools {missing:?} are not in the active tool set {equipped:?}")]
    ToolSubsetMismatch {
        missing: Vec<String>,
        equipped: Vec<String>,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("remote error{}: {message}", status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Remote {
        status: Option<u16>,
        message: String,
    },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// A tool handler failed; the run was abandoned.
    #[error("tool '{tool}' failed: {message}")]
    ToolExecution { tool: String, message: String },

    /// The remote run reached a failed terminal status.
    #[error("run {run_id} ended with status '{status}'{}", last_error.as_ref().map(|e| format!(": {}", e)).unwrap_or_default())]
    RunFailed {
        run_id: String,
        status: String,
        last_error: Option<String>,
    },

    #[error("run {run_id} did not finish within {seconds}s")]
    DeadlineExceeded { run_id: String, seconds: u64 },

    #[error("run {run_id} was cancelled")]
    Cancelled { run_id: String },

    #[error("invalid run state transition: {0}")]
    InvalidStateTransition(ValidationError),

    #[error("sql engine error: {0}")]
    SqlEngine(#[from] SqlEngineError),

    /// A post-run check failed.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl OrchestrationError {
    /// Creates a precondition violation.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionViolation(message.into())
    }
}

impl From<AssistantApiError> for OrchestrationError {
    fn from(err: AssistantApiError) -> Self {
        match err {
            AssistantApiError::Transport(message) => Self::Transport(message),
            AssistantApiError::Remote { status, message } => Self::Remote { status, message },
            AssistantApiError::Parse(message) => Self::Remote {
                status: None,
                message: format!("unreadable response: {}", message),
            },
        }
    }
}

impl From<RegistryError> for OrchestrationError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownTool(name) => Self::UnknownTool(name),
            RegistryError::SubsetMismatch { missing, equipped } => {
                Self::ToolSubsetMismatch { missing, equipped }
            }
            RegistryError::DuplicateTool(name) => {
                Self::precondition(format!("tool '{}' equipped twice", name))
            }
        }
    }
}

impl From<ValidationError> for OrchestrationError {
    fn from(err: ValidationError) -> Self {
        Self::InvalidStateTransition(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assistant_errors_keep_their_category() {
        assert_eq!(
            OrchestrationError::from(AssistantApiError::transport("reset")),
            OrchestrationError::Transport("reset".into())
        );
        assert_eq!(
            OrchestrationError::from(AssistantApiError::remote(Some(404), "missing")),
            OrchestrationError::Remote {
                status: Some(404),
                message: "missing".into()
            }
        );
    }

    #[test]
    fn registry_errors_map_to_tool_errors() {
        assert_eq!(
            OrchestrationError::from(RegistryError::UnknownTool("x".into())),
            OrchestrationError::UnknownTool("x".into())
        );
        assert!(matches!(
            OrchestrationError::from(RegistryError::SubsetMismatch {
                missing: vec!["x".into()],
                equipped: vec![],
            }),
            OrchestrationError::ToolSubsetMismatch { .. }
        ));
    }

    #[test]
    fn run_failed_display_includes_last_error() {
        let err = OrchestrationError::RunFailed {
            run_id: "run_1".into(),
            status: "failed".into(),
            last_error: Some("server_error: boom".into()),
        };
        assert_eq!(
            err.to_string(),
            "run run_1 ended with status 'failed': server_error: boom"
        );
    }
}

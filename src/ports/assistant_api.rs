//! Assistant API Port - Interface to a hosted assistant service.
//!
//! This port abstracts the remote assistant lifecycle: assistants (model +
//! instructions + tool schemas), threads (ordered message history) and runs
//! (one execution of an assistant against a thread).
//!
//! # Design
//!
//! - Every operation is a single remote call; no local state lives here
//! - Run status is reported verbatim; interpretation belongs to the run driver
//! - Errors separate transport failures (retryable) from API rejections

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::assistant::{Message, RunHandle};
use crate::domain::foundation::{AssistantId, RunId, ThreadId};
use crate::domain::tools::{ToolCall, ToolOutput};

/// Port for the remote assistant service.
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Lists the assistants visible to the configured credential.
    async fn list_assistants(&self) -> Result<Vec<AssistantSummary>, AssistantApiError>;

    /// Creates a new assistant.
    async fn create_assistant(
        &self,
        name: &str,
        model: &str,
    ) -> Result<AssistantSummary, AssistantApiError>;

    /// Applies a partial update to an assistant.
    async fn update_assistant(
        &self,
        assistant_id: &AssistantId,
        update: AssistantUpdate,
    ) -> Result<(), AssistantApiError>;

    /// Creates an empty thread.
    async fn create_thread(&self) -> Result<ThreadId, AssistantApiError>;

    /// Appends a user message to a thread.
    async fn create_message(&self, thread_id: &ThreadId, text: &str)
        -> Result<(), AssistantApiError>;

    /// Lists the messages of a thread (any order).
    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, AssistantApiError>;

    /// Starts a run. `tools` overrides the assistant's tools for this run only.
    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
        tools: Option<Vec<Value>>,
    ) -> Result<RunSnapshot, AssistantApiError>;

    /// Fetches the current state of a run.
    async fn retrieve_run(&self, run: &RunHandle) -> Result<RunSnapshot, AssistantApiError>;

    /// Submits one output per pending tool call, in a single batch.
    async fn submit_tool_outputs(
        &self,
        run: &RunHandle,
        outputs: &[ToolOutput],
    ) -> Result<(), AssistantApiError>;

    /// Requests cancellation of a run.
    async fn cancel_run(&self, run: &RunHandle) -> Result<(), AssistantApiError>;
}

/// Summary of a remote assistant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantSummary {
    pub id: AssistantId,
    pub name: Option<String>,
    pub model: String,
}

/// Partial update of a remote assistant. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantUpdate {
    pub model: Option<String>,
    pub instructions: Option<String>,
    pub tools: Option<Vec<Value>>,
}

impl AssistantUpdate {
    /// Update that changes the model.
    pub fn model(model: impl Into<String>) -> Self {
        Self {
            model: Some(model.into()),
            ..Default::default()
        }
    }

    /// Update that replaces the instructions.
    pub fn instructions(instructions: impl Into<String>) -> Self {
        Self {
            instructions: Some(instructions.into()),
            ..Default::default()
        }
    }

    /// Update that replaces the tool schemas.
    pub fn tools(tools: Vec<Value>) -> Self {
        Self {
            tools: Some(tools),
            ..Default::default()
        }
    }
}

/// State of a run as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSnapshot {
    pub id: RunId,
    /// Verbatim remote status (e.g., "requires_action").
    pub status: String,
    /// Pending tool calls; non-empty only while action is required.
    pub tool_calls: Vec<ToolCall>,
    /// Remote error message for failed runs.
    pub last_error: Option<String>,
}

impl RunSnapshot {
    /// Creates a snapshot without pending tool calls.
    pub fn new(id: RunId, status: impl Into<String>) -> Self {
        Self {
            id,
            status: status.into(),
            tool_calls: Vec::new(),
            last_error: None,
        }
    }

    /// Adds pending tool calls.
    pub fn with_tool_calls(mut self, tool_calls: Vec<ToolCall>) -> Self {
        self.tool_calls = tool_calls;
        self
    }

    /// Adds a remote error message.
    pub fn with_last_error(mut self, message: impl Into<String>) -> Self {
        self.last_error = Some(message.into());
        self
    }
}

/// Assistant service errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssistantApiError {
    /// Network failure, timeout, throttling or server-side error.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service rejected the request (e.g., unknown assistant id).
    #[error("remote error{}: {message}", status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// The response could not be understood.
    #[error("parse error: {0}")]
    Parse(String),
}

impl AssistantApiError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a remote rejection.
    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Remote {
            status,
            message: message.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transport_errors_are_retryable() {
        assert!(AssistantApiError::transport("connection reset").is_retryable());
        assert!(!AssistantApiError::remote(Some(404), "No assistant found").is_retryable());
        assert!(!AssistantApiError::parse("bad json").is_retryable());
    }

    #[test]
    fn remote_error_display_includes_status() {
        let err = AssistantApiError::remote(Some(404), "No assistant found");
        assert_eq!(err.to_string(), "remote error (404): No assistant found");

        let err = AssistantApiError::remote(None, "rejected");
        assert_eq!(err.to_string(), "remote error: rejected");
    }

    #[test]
    fn update_constructors_set_single_field() {
        let update = AssistantUpdate::model("gpt-4o");
        assert_eq!(update.model.as_deref(), Some("gpt-4o"));
        assert!(update.instructions.is_none());
        assert!(update.tools.is_none());
    }
}

//! Mock Assistant API for testing.
//!
//! In-memory stand-in for the remote assistant service.
//!
//! # Features
//!
//! - Assistants and threads kept in memory
//! - Scripted run progressions (statuses and tool-call batches)
//! - Assistant replies appended to the thread when a run completes
//! - Per-operation error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let api = MockAssistantApi::new()
//!     .with_run_step(MockRunStep::status("in_progress"))
//!     .with_run_step(MockRunStep::completed())
//!     .with_reply("SELECT count(*) FROM orders");
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::assistant::{Message, Role, RunHandle};
use crate::domain::foundation::{AssistantId, RunId, ThreadId, Timestamp};
use crate::domain::tools::{ToolCall, ToolOutput};
use crate::ports::{AssistantApi, AssistantApiError, AssistantSummary, AssistantUpdate, RunSnapshot};

/// Operations of the mock, used for error injection and call counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    ListAssistants,
    CreateAssistant,
    UpdateAssistant,
    CreateThread,
    CreateMessage,
    ListMessages,
    CreateRun,
    RetrieveRun,
    SubmitToolOutputs,
    CancelRun,
}

/// A recorded call to the mock.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    ListAssistants,
    CreateAssistant { name: String, model: String },
    UpdateAssistant { assistant_id: AssistantId, update: AssistantUpdate },
    CreateThread,
    CreateMessage { thread_id: ThreadId, text: String },
    ListMessages { thread_id: ThreadId },
    CreateRun { thread_id: ThreadId, assistant_id: AssistantId, tools: Option<Vec<Value>> },
    RetrieveRun(RunHandle),
    SubmitToolOutputs { run: RunHandle, outputs: Vec<ToolOutput> },
    CancelRun(RunHandle),
}

impl MockCall {
    fn operation(&self) -> MockOperation {
        match self {
            MockCall::ListAssistants => MockOperation::ListAssistants,
            MockCall::CreateAssistant { .. } => MockOperation::CreateAssistant,
            MockCall::UpdateAssistant { .. } => MockOperation::UpdateAssistant,
            MockCall::CreateThread => MockOperation::CreateThread,
            MockCall::CreateMessage { .. } => MockOperation::CreateMessage,
            MockCall::ListMessages { .. } => MockOperation::ListMessages,
            MockCall::CreateRun { .. } => MockOperation::CreateRun,
            MockCall::RetrieveRun(_) => MockOperation::RetrieveRun,
            MockCall::SubmitToolOutputs { .. } => MockOperation::SubmitToolOutputs,
            MockCall::CancelRun(_) => MockOperation::CancelRun,
        }
    }
}

/// One scripted answer to `retrieve_run`.
#[derive(Debug, Clone)]
pub enum MockRunStep {
    /// Report a plain status.
    Status(String),
    /// Report `requires_action` with the given tool calls.
    RequiresAction(Vec<ToolCall>),
    /// Report `failed` with an error message.
    Failed(String),
    /// Fail the retrieval itself.
    Error(AssistantApiError),
}

impl MockRunStep {
    /// Plain status step.
    pub fn status(status: impl Into<String>) -> Self {
        Self::Status(status.into())
    }

    /// `completed` step.
    pub fn completed() -> Self {
        Self::Status("completed".to_string())
    }

    /// `requires_action` step.
    pub fn requires_action(tool_calls: Vec<ToolCall>) -> Self {
        Self::RequiresAction(tool_calls)
    }
}

#[derive(Debug, Default)]
struct MockState {
    assistants: Vec<AssistantSummary>,
    threads: HashMap<ThreadId, Vec<Message>>,
    run_steps: VecDeque<MockRunStep>,
    replies: VecDeque<String>,
    failures: HashMap<MockOperation, VecDeque<AssistantApiError>>,
    calls: Vec<MockCall>,
    next_id: u64,
    clock: i64,
}

impl MockState {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}_{}", prefix, self.next_id)
    }

    fn tick(&mut self) -> Timestamp {
        self.clock += 1;
        Timestamp::from_unix_secs(1_700_000_000 + self.clock)
    }

    fn record(&mut self, call: MockCall) -> Result<(), AssistantApiError> {
        let operation = call.operation();
        self.calls.push(call);
        match self.failures.get_mut(&operation).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn append_reply(&mut self, thread_id: &ThreadId) {
        if let Some(reply) = self.replies.pop_front() {
            let at = self.tick();
            self.threads
                .entry(thread_id.clone())
                .or_default()
                .push(Message::new(Role::Assistant, reply, at));
        }
    }
}

/// Mock assistant service for testing.
#[derive(Debug, Clone, Default)]
pub struct MockAssistantApi {
    state: Arc<Mutex<MockState>>,
}

impl MockAssistantApi {
    /// Creates an empty mock. Runs complete immediately unless scripted.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a pre-existing assistant.
    pub fn with_assistant(self, id: &str, name: &str, model: &str) -> Self {
        if let Ok(id) = AssistantId::new(id) {
            self.state().assistants.push(AssistantSummary {
                id,
                name: Some(name.to_string()),
                model: model.to_string(),
            });
        }
        self
    }

    /// Queues a scripted answer for `retrieve_run`.
    pub fn with_run_step(self, step: MockRunStep) -> Self {
        self.state().run_steps.push_back(step);
        self
    }

    /// Queues an assistant reply posted when a run completes.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.state().replies.push_back(text.into());
        self
    }

    /// Makes the next call of `operation` fail with `error`.
    pub fn with_failure(self, operation: MockOperation, error: AssistantApiError) -> Self {
        self.state()
            .failures
            .entry(operation)
            .or_default()
            .push_back(error);
        self
    }

    /// Returns all recorded calls.
    pub fn calls(&self) -> Vec<MockCall> {
        self.state().calls.clone()
    }

    /// Returns how many times `operation` was called.
    pub fn call_count(&self, operation: MockOperation) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Returns every submitted batch of tool outputs.
    pub fn submitted_outputs(&self) -> Vec<Vec<ToolOutput>> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::SubmitToolOutputs { outputs, .. } => Some(outputs.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the tool override of every created run.
    pub fn run_tools(&self) -> Vec<Option<Vec<Value>>> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::CreateRun { tools, .. } => Some(tools.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns every assistant update in call order.
    pub fn updates(&self) -> Vec<AssistantUpdate> {
        self.state()
            .calls
            .iter()
            .filter_map(|c| match c {
                MockCall::UpdateAssistant { update, .. } => Some(update.clone()),
                _ => None,
            })
            .collect()
    }

    /// Returns the assistants currently known to the mock.
    pub fn assistants(&self) -> Vec<AssistantSummary> {
        self.state().assistants.clone()
    }

    /// Returns the messages of a thread.
    pub fn thread_messages(&self, thread_id: &ThreadId) -> Vec<Message> {
        self.state()
            .threads
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl AssistantApi for MockAssistantApi {
    async fn list_assistants(&self) -> Result<Vec<AssistantSummary>, AssistantApiError> {
        let mut state = self.state();
        state.record(MockCall::ListAssistants)?;
        Ok(state.assistants.clone())
    }

    async fn create_assistant(
        &self,
        name: &str,
        model: &str,
    ) -> Result<AssistantSummary, AssistantApiError> {
        let mut state = self.state();
        state.record(MockCall::CreateAssistant {
            name: name.to_string(),
            model: model.to_string(),
        })?;
        let id = AssistantId::new(state.next_id("asst"))
            .map_err(|e| AssistantApiError::parse(e.to_string()))?;
        let summary = AssistantSummary {
            id,
            name: Some(name.to_string()),
            model: model.to_string(),
        };
        state.assistants.push(summary.clone());
        Ok(summary)
    }

    async fn update_assistant(
        &self,
        assistant_id: &AssistantId,
        update: AssistantUpdate,
    ) -> Result<(), AssistantApiError> {
        let mut state = self.state();
        state.record(MockCall::UpdateAssistant {
            assistant_id: assistant_id.clone(),
            update: update.clone(),
        })?;
        let assistant = state
            .assistants
            .iter_mut()
            .find(|a| &a.id == assistant_id)
            .ok_or_else(|| {
                AssistantApiError::remote(Some(404), format!("No assistant found with id '{}'", assistant_id))
            })?;
        if let Some(model) = update.model {
            assistant.model = model;
        }
        Ok(())
    }

    async fn create_thread(&self) -> Result<ThreadId, AssistantApiError> {
        let mut state = self.state();
        state.record(MockCall::CreateThread)?;
        let id = ThreadId::new(state.next_id("thread"))
            .map_err(|e| AssistantApiError::parse(e.to_string()))?;
        state.threads.insert(id.clone(), Vec::new());
        Ok(id)
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        text: &str,
    ) -> Result<(), AssistantApiError> {
        let mut state = self.state();
        state.record(MockCall::CreateMessage {
            thread_id: thread_id.clone(),
            text: text.to_string(),
        })?;
        let at = state.tick();
        state
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| AssistantApiError::remote(Some(404), "No thread found"))?
            .push(Message::new(Role::User, text, at));
        Ok(())
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, AssistantApiError> {
        let mut state = self.state();
        state.record(MockCall::ListMessages {
            thread_id: thread_id.clone(),
        })?;
        // Newest first, like the remote default.
        let mut messages = state.threads.get(thread_id).cloned().unwrap_or_default();
        messages.reverse();
        Ok(messages)
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
        tools: Option<Vec<Value>>,
    ) -> Result<RunSnapshot, AssistantApiError> {
        let mut state = self.state();
        state.record(MockCall::CreateRun {
            thread_id: thread_id.clone(),
            assistant_id: assistant_id.clone(),
            tools,
        })?;
        let id = RunId::new(state.next_id("run"))
            .map_err(|e| AssistantApiError::parse(e.to_string()))?;
        Ok(RunSnapshot::new(id, "queued"))
    }

    async fn retrieve_run(&self, run: &RunHandle) -> Result<RunSnapshot, AssistantApiError> {
        let mut state = self.state();
        state.record(MockCall::RetrieveRun(run.clone()))?;
        let step = state
            .run_steps
            .pop_front()
            .unwrap_or_else(MockRunStep::completed);

        let snapshot = RunSnapshot::new(run.run_id.clone(), "in_progress");
        match step {
            MockRunStep::Status(status) => {
                if status == "completed" {
                    state.append_reply(&run.thread_id);
                }
                Ok(RunSnapshot { status, ..snapshot })
            }
            MockRunStep::RequiresAction(calls) => Ok(RunSnapshot {
                status: "requires_action".to_string(),
                ..snapshot
            }
            .with_tool_calls(calls)),
            MockRunStep::Failed(message) => Ok(RunSnapshot {
                status: "failed".to_string(),
                ..snapshot
            }
            .with_last_error(message)),
            MockRunStep::Error(err) => Err(err),
        }
    }

    async fn submit_tool_outputs(
        &self,
        run: &RunHandle,
        outputs: &[ToolOutput],
    ) -> Result<(), AssistantApiError> {
        self.state().record(MockCall::SubmitToolOutputs {
            run: run.clone(),
            outputs: outputs.to_vec(),
        })
    }

    async fn cancel_run(&self, run: &RunHandle) -> Result<(), AssistantApiError> {
        self.state().record(MockCall::CancelRun(run.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unscripted_runs_complete_and_post_reply() {
        let api = MockAssistantApi::new().with_reply("SELECT 1");
        let thread = api.create_thread().await.unwrap();
        api.create_message(&thread, "question").await.unwrap();

        let assistant = api.create_assistant("a", "m").await.unwrap();
        let created = api.create_run(&thread, &assistant.id, None).await.unwrap();
        assert_eq!(created.status, "queued");

        let run = RunHandle::new(thread.clone(), created.id);
        let snapshot = api.retrieve_run(&run).await.unwrap();
        assert_eq!(snapshot.status, "completed");

        let messages = api.thread_messages(&thread);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender(), Role::Assistant);
        assert_eq!(messages[1].text(), "SELECT 1");
    }

    #[tokio::test]
    async fn injected_failure_is_consumed_once() {
        let api = MockAssistantApi::new()
            .with_failure(MockOperation::CreateThread, AssistantApiError::transport("x"));

        assert!(api.create_thread().await.is_err());
        assert!(api.create_thread().await.is_ok());
        assert_eq!(api.call_count(MockOperation::CreateThread), 2);
    }

    #[tokio::test]
    async fn updating_unknown_assistant_is_remote_error() {
        let api = MockAssistantApi::new();
        let id = AssistantId::new("asst_missing").unwrap();
        let err = api
            .update_assistant(&id, AssistantUpdate::instructions("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, AssistantApiError::Remote { status: Some(404), .. }));
    }

    #[tokio::test]
    async fn list_messages_returns_newest_first() {
        let api = MockAssistantApi::new();
        let thread = api.create_thread().await.unwrap();
        api.create_message(&thread, "first").await.unwrap();
        api.create_message(&thread, "second").await.unwrap();

        let listed = api.list_messages(&thread).await.unwrap();
        assert_eq!(listed[0].text(), "second");
        assert_eq!(listed[1].text(), "first");
    }
}

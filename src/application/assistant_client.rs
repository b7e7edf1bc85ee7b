//! Remote Assistant Client - facade over the assistant service.
//!
//! Holds the locally bound assistant, the active tool registry and a log of the
//! messages this process has posted per thread. The log guards `start_run`:
//! a run may only start on a thread created here that has received at least
//! one message.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::assistant::{RunHandle, Transcript};
use crate::domain::foundation::{AssistantId, ThreadId};
use crate::domain::tools::{ToolDescriptor, ToolOutput, ToolRegistry};
use crate::ports::{AssistantApi, AssistantUpdate, RunSnapshot};

use super::OrchestrationError;

/// Facade over the remote assistant lifecycle.
pub struct AssistantClient {
    api: Arc<dyn AssistantApi>,
    assistant_id: Option<AssistantId>,
    registry: ToolRegistry,
    /// Thread -> texts posted from this process, in order
    sent_messages: HashMap<ThreadId, Vec<String>>,
}

impl AssistantClient {
    /// Creates a client with no bound assistant and no tools.
    pub fn new(api: Arc<dyn AssistantApi>) -> Self {
        Self {
            api,
            assistant_id: None,
            registry: ToolRegistry::new(),
            sent_messages: HashMap::new(),
        }
    }

    /// Returns the bound assistant, if any.
    pub fn assistant_id(&self) -> Option<&AssistantId> {
        self.assistant_id.as_ref()
    }

    /// Returns the active tool registry.
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Returns the messages posted to `thread_id` from this process.
    pub fn sent_messages(&self, thread_id: &ThreadId) -> &[String] {
        self.sent_messages
            .get(thread_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn require_assistant(&self) -> Result<&AssistantId, OrchestrationError> {
        self.assistant_id
            .as_ref()
            .ok_or_else(|| OrchestrationError::precondition("no assistant is bound"))
    }

    /// Binds the assistant named `name`, creating it if needed.
    ///
    /// An existing assistant whose model differs from `model` is updated.
    pub async fn get_or_create_assistant(
        &mut self,
        name: &str,
        model: &str,
    ) -> Result<AssistantId, OrchestrationError> {
        let existing = self
            .api
            .list_assistants()
            .await?
            .into_iter()
            .find(|a| a.name.as_deref() == Some(name));

        let id = match existing {
            Some(assistant) => {
                if assistant.model != model {
                    tracing::info!(
                        assistant_id = %assistant.id,
                        from = %assistant.model,
                        to = %model,
                        "Updating assistant model"
                    );
                    self.api
                        .update_assistant(&assistant.id, AssistantUpdate::model(model))
                        .await?;
                }
                tracing::info!(assistant_id = %assistant.id, name, "Reusing assistant");
                assistant.id
            }
            None => {
                let created = self.api.create_assistant(name, model).await?;
                tracing::info!(assistant_id = %created.id, name, model, "Created assistant");
                created.id
            }
        };

        self.assistant_id = Some(id.clone());
        Ok(id)
    }

    /// Replaces the bound assistant's instructions.
    pub async fn set_instructions(&self, text: &str) -> Result<(), OrchestrationError> {
        let assistant_id = self.require_assistant()?;
        self.api
            .update_assistant(assistant_id, AssistantUpdate::instructions(text))
            .await?;
        Ok(())
    }

    /// Replaces the active tool set.
    ///
    /// With `equip_on_assistant`, the exported schemas are also pushed to the
    /// bound assistant so every future run sees them.
    pub async fn equip_tools(
        &mut self,
        tools: Vec<ToolDescriptor>,
        equip_on_assistant: bool,
    ) -> Result<(), OrchestrationError> {
        let assistant_id = self.require_assistant()?.clone();
        let registry = ToolRegistry::with_tools(tools)?;

        if equip_on_assistant {
            self.api
                .update_assistant(&assistant_id, AssistantUpdate::tools(registry.export_schemas()))
                .await?;
        }

        tracing::debug!(tools = ?registry.tool_names(), equip_on_assistant, "Tools equipped");
        self.registry = registry;
        Ok(())
    }

    /// Creates a new thread.
    pub async fn create_thread(&mut self) -> Result<ThreadId, OrchestrationError> {
        self.require_assistant()?;
        let thread_id = self.api.create_thread().await?;
        self.sent_messages.insert(thread_id.clone(), Vec::new());
        tracing::debug!(thread_id = %thread_id, "Thread created");
        Ok(thread_id)
    }

    /// Posts a user message to `thread_id`.
    pub async fn post_message(
        &mut self,
        thread_id: &ThreadId,
        text: &str,
    ) -> Result<(), OrchestrationError> {
        self.api.create_message(thread_id, text).await?;
        self.sent_messages
            .entry(thread_id.clone())
            .or_default()
            .push(text.to_string());
        Ok(())
    }

    /// Checks that a run may start on `thread_id` with `tool_subset`.
    ///
    /// Performs no remote calls.
    pub fn check_run_preconditions(
        &self,
        thread_id: &ThreadId,
        tool_subset: Option<&[String]>,
    ) -> Result<(), OrchestrationError> {
        self.require_assistant()?;
        match self.sent_messages.get(thread_id) {
            None => {
                return Err(OrchestrationError::precondition(format!(
                    "thread {} was not created by this client",
                    thread_id
                )))
            }
            Some(messages) if messages.is_empty() => {
                return Err(OrchestrationError::precondition(format!(
                    "no message has been posted to thread {}",
                    thread_id
                )))
            }
            Some(_) => {}
        }
        if let Some(subset) = tool_subset {
            self.registry.select(subset)?;
        }
        Ok(())
    }

    /// Starts a run of the bound assistant on `thread_id`.
    ///
    /// With `tool_subset`, only those tools are offered to this run.
    pub async fn start_run(
        &self,
        thread_id: &ThreadId,
        tool_subset: Option<&[String]>,
    ) -> Result<RunHandle, OrchestrationError> {
        self.check_run_preconditions(thread_id, tool_subset)?;
        let assistant_id = self.require_assistant()?;

        let tools = match tool_subset {
            Some(subset) => Some(
                self.registry
                    .select(subset)?
                    .into_iter()
                    .map(ToolDescriptor::schema)
                    .collect(),
            ),
            None => None,
        };

        let snapshot = self.api.create_run(thread_id, assistant_id, tools).await?;
        tracing::info!(thread_id = %thread_id, run_id = %snapshot.id, status = %snapshot.status, "Run started");
        Ok(RunHandle::new(thread_id.clone(), snapshot.id))
    }

    /// Loads the full message history of `thread_id`.
    pub async fn load_transcript(
        &self,
        thread_id: &ThreadId,
    ) -> Result<Transcript, OrchestrationError> {
        let messages = self.api.list_messages(thread_id).await?;
        Ok(Transcript::new(messages))
    }

    /// Fetches the current state of `run`.
    pub async fn retrieve_run(&self, run: &RunHandle) -> Result<RunSnapshot, OrchestrationError> {
        Ok(self.api.retrieve_run(run).await?)
    }

    /// Submits a batch of tool outputs for `run`.
    pub async fn submit_tool_outputs(
        &self,
        run: &RunHandle,
        outputs: &[ToolOutput],
    ) -> Result<(), OrchestrationError> {
        self.api.submit_tool_outputs(run, outputs).await?;
        Ok(())
    }

    /// Requests cancellation of `run`.
    pub async fn cancel_run(&self, run: &RunHandle) -> Result<(), OrchestrationError> {
        self.api.cancel_run(run).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::assistant::{MockAssistantApi, MockOperation};
    use crate::domain::tools::{from_fn, ToolDefinition};

    fn tool(name: &str) -> ToolDescriptor {
        ToolDescriptor::new(
            ToolDefinition::simple(name, format!("{} tool", name)),
            from_fn(|_| Ok(String::new())),
        )
    }

    fn client(mock: &MockAssistantApi) -> AssistantClient {
        AssistantClient::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn reuses_assistant_with_matching_name() {
        let mock = MockAssistantApi::new().with_assistant("asst_1", "analyst", "gpt-4");
        let mut client = client(&mock);

        let id = client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();

        assert_eq!(id.as_str(), "asst_1");
        assert_eq!(mock.call_count(MockOperation::CreateAssistant), 0);
        assert_eq!(mock.call_count(MockOperation::UpdateAssistant), 0);
    }

    #[tokio::test]
    async fn updates_model_of_reused_assistant() {
        let mock = MockAssistantApi::new().with_assistant("asst_1", "analyst", "gpt-3.5-turbo");
        let mut client = client(&mock);

        client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();

        assert_eq!(mock.updates(), vec![AssistantUpdate::model("gpt-4")]);
        assert_eq!(mock.assistants()[0].model, "gpt-4");
    }

    #[tokio::test]
    async fn creates_assistant_when_name_differs() {
        let mock = MockAssistantApi::new().with_assistant("asst_1", "other", "gpt-4");
        let mut client = client(&mock);

        let id = client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();

        assert_ne!(id.as_str(), "asst_1");
        assert_eq!(mock.call_count(MockOperation::CreateAssistant), 1);
        assert_eq!(client.assistant_id(), Some(&id));
    }

    #[tokio::test]
    async fn set_instructions_requires_bound_assistant() {
        let mock = MockAssistantApi::new();
        let client = client(&mock);

        let err = client.set_instructions("be terse").await.unwrap_err();

        assert!(matches!(err, OrchestrationError::PreconditionViolation(_)));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn create_thread_requires_bound_assistant() {
        let mock = MockAssistantApi::new();
        let mut client = client(&mock);

        let err = client.create_thread().await.unwrap_err();

        assert!(matches!(err, OrchestrationError::PreconditionViolation(_)));
        assert_eq!(mock.call_count(MockOperation::CreateThread), 0);
    }

    #[tokio::test]
    async fn equip_tools_pushes_schemas_when_requested() {
        let mock = MockAssistantApi::new();
        let mut client = client(&mock);
        client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();

        client.equip_tools(vec![tool("run_sql")], true).await.unwrap();
        client.equip_tools(vec![tool("store_fact")], false).await.unwrap();

        let updates = mock.updates();
        assert_eq!(updates.len(), 1);
        let tools = updates[0].tools.as_ref().unwrap();
        assert_eq!(tools[0]["function"]["name"], "run_sql");
        assert_eq!(client.registry().tool_names(), vec!["store_fact"]);
    }

    #[tokio::test]
    async fn start_run_without_message_is_precondition_violation() {
        let mock = MockAssistantApi::new();
        let mut client = client(&mock);
        client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();
        let thread = client.create_thread().await.unwrap();

        let err = client.start_run(&thread, None).await.unwrap_err();

        assert!(matches!(err, OrchestrationError::PreconditionViolation(_)));
        assert_eq!(mock.call_count(MockOperation::CreateRun), 0);
    }

    #[tokio::test]
    async fn start_run_on_foreign_thread_is_precondition_violation() {
        let mock = MockAssistantApi::new();
        let mut client = client(&mock);
        client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();
        let foreign = ThreadId::new("thread_elsewhere").unwrap();

        let err = client.start_run(&foreign, None).await.unwrap_err();

        assert!(matches!(err, OrchestrationError::PreconditionViolation(_)));
    }

    #[tokio::test]
    async fn start_run_rejects_subset_outside_registry() {
        let mock = MockAssistantApi::new();
        let mut client = client(&mock);
        client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();
        client.equip_tools(vec![tool("run_sql")], false).await.unwrap();
        let thread = client.create_thread().await.unwrap();
        client.post_message(&thread, "hello").await.unwrap();

        let err = client
            .start_run(&thread, Some(&["run_sql".to_string(), "drop_table".to_string()][..]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            OrchestrationError::ToolSubsetMismatch {
                missing: vec!["drop_table".into()],
                equipped: vec!["run_sql".into()],
            }
        );
        assert_eq!(mock.call_count(MockOperation::CreateRun), 0);
    }

    #[tokio::test]
    async fn start_run_with_subset_overrides_tools() {
        let mock = MockAssistantApi::new();
        let mut client = client(&mock);
        client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();
        client
            .equip_tools(vec![tool("run_sql"), tool("store_fact")], false)
            .await
            .unwrap();
        let thread = client.create_thread().await.unwrap();
        client.post_message(&thread, "hello").await.unwrap();

        client.start_run(&thread, Some(&["run_sql".to_string()][..])).await.unwrap();
        client.start_run(&thread, None).await.unwrap();

        let tools = mock.run_tools();
        let overridden = tools[0].as_ref().unwrap();
        assert_eq!(overridden.len(), 1);
        assert_eq!(overridden[0]["function"]["name"], "run_sql");
        assert!(tools[1].is_none());
    }

    #[tokio::test]
    async fn failed_post_is_not_logged() {
        let mock = MockAssistantApi::new().with_failure(
            MockOperation::CreateMessage,
            crate::ports::AssistantApiError::transport("reset"),
        );
        let mut client = client(&mock);
        client.get_or_create_assistant("analyst", "gpt-4").await.unwrap();
        let thread = client.create_thread().await.unwrap();

        assert!(client.post_message(&thread, "hello").await.is_err());
        assert!(client.sent_messages(&thread).is_empty());
    }
}

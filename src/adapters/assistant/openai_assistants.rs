//! OpenAI Assistants Adapter - Implementation of AssistantApi over HTTP.
//!
//! Talks to the Assistants v2 REST surface (`/assistants`, `/threads`,
//! `/threads/{id}/messages`, `/threads/{id}/runs`).
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIAssistantsConfig::new(api_key)
//!     .with_base_url("https://api.openai.com/v1")
//!     .with_timeout(Duration::from_secs(60));
//!
//! let api = OpenAIAssistantsApi::new(config)?;
//! ```
//!
//! # Error mapping
//!
//! Connection failures, timeouts, 429 and 5xx responses become
//! `AssistantApiError::Transport`; any other non-success status becomes
//! `AssistantApiError::Remote`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::domain::assistant::{Message, Role, RunHandle};
use crate::domain::foundation::{AssistantId, RunId, ThreadId, Timestamp, ToolCallId};
use crate::domain::tools::{ToolCall, ToolOutput};
use crate::ports::{AssistantApi, AssistantApiError, AssistantSummary, AssistantUpdate, RunSnapshot};

/// Beta header required by the Assistants API.
const BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Page size used for list endpoints.
const PAGE_LIMIT: u32 = 100;

/// Configuration for the Assistants adapter.
#[derive(Debug, Clone)]
pub struct OpenAIAssistantsConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl OpenAIAssistantsConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Assistants API client.
pub struct OpenAIAssistantsApi {
    config: OpenAIAssistantsConfig,
    client: Client,
}

impl OpenAIAssistantsApi {
    /// Creates a new client with the given configuration.
    pub fn new(config: OpenAIAssistantsConfig) -> Result<Self, AssistantApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AssistantApiError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(self.config.api_key())
            .header(BETA_HEADER.0, BETA_HEADER.1)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, AssistantApiError> {
        let request = self.authorized(self.client.get(self.url(path)));
        self.send(request).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AssistantApiError> {
        let request = self.authorized(self.client.post(self.url(path))).json(body);
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AssistantApiError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AssistantApiError::transport(format!(
                    "Request timed out after {}s",
                    self.config.timeout.as_secs()
                ))
            } else if e.is_connect() {
                AssistantApiError::transport(format!("Connection failed: {}", e))
            } else {
                AssistantApiError::transport(e.to_string())
            }
        })?;

        let response = Self::handle_response_status(response).await?;
        let body = response
            .text()
            .await
            .map_err(|e| AssistantApiError::transport(format!("Failed to read response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| AssistantApiError::parse(format!("Failed to parse response: {}", e)))
    }

    async fn handle_response_status(response: Response) -> Result<Response, AssistantApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(map_error_status(status.as_u16(), &error_body))
    }
}

/// Maps a non-success HTTP status onto an error.
fn map_error_status(status: u16, error_body: &str) -> AssistantApiError {
    let message = extract_error_message(error_body);
    match status {
        429 => AssistantApiError::transport(format!("Rate limited: {}", message)),
        500..=599 => AssistantApiError::transport(format!("Server error {}: {}", status, message)),
        _ => AssistantApiError::remote(Some(status), message),
    }
}

/// Pulls `error.message` out of an error body, falling back to the raw body.
fn extract_error_message(error_body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(error_body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| error_body.to_string())
}

fn to_assistant_id(raw: String) -> Result<AssistantId, AssistantApiError> {
    AssistantId::new(raw).map_err(|e| AssistantApiError::parse(e.to_string()))
}

fn to_thread_id(raw: String) -> Result<ThreadId, AssistantApiError> {
    ThreadId::new(raw).map_err(|e| AssistantApiError::parse(e.to_string()))
}

fn to_summary(wire: AssistantObject) -> Result<AssistantSummary, AssistantApiError> {
    Ok(AssistantSummary {
        id: to_assistant_id(wire.id)?,
        name: wire.name,
        model: wire.model,
    })
}

/// Converts a wire run into a snapshot.
fn to_snapshot(wire: RunObject) -> Result<RunSnapshot, AssistantApiError> {
    let id = RunId::new(wire.id).map_err(|e| AssistantApiError::parse(e.to_string()))?;

    let tool_calls = match wire.required_action {
        Some(action) => action
            .submit_tool_outputs
            .map(|s| s.tool_calls)
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                let call_id = ToolCallId::new(call.id)
                    .map_err(|e| AssistantApiError::parse(e.to_string()))?;
                Ok(ToolCall::new(
                    call_id,
                    call.function.name,
                    call.function.arguments,
                ))
            })
            .collect::<Result<Vec<_>, AssistantApiError>>()?,
        None => Vec::new(),
    };

    let mut snapshot = RunSnapshot::new(id, wire.status).with_tool_calls(tool_calls);
    if let Some(error) = wire.last_error {
        snapshot = snapshot.with_last_error(format!("{}: {}", error.code, error.message));
    }
    Ok(snapshot)
}

/// Converts a wire message into a domain message.
///
/// Only the first text part is kept; messages with an unrecognised role are
/// dropped.
fn to_message(wire: MessageObject) -> Option<Message> {
    let sender = Role::from_remote(&wire.role)?;
    let text = wire
        .content
        .into_iter()
        .find_map(|part| part.text.map(|t| t.value))
        .unwrap_or_default();
    Some(Message::new(sender, text, Timestamp::from_unix_secs(wire.created_at)))
}

#[async_trait]
impl AssistantApi for OpenAIAssistantsApi {
    async fn list_assistants(&self) -> Result<Vec<AssistantSummary>, AssistantApiError> {
        let mut summaries = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let path = match &after {
                Some(cursor) => format!("/assistants?limit={}&after={}", PAGE_LIMIT, cursor),
                None => format!("/assistants?limit={}", PAGE_LIMIT),
            };
            let page: ListPage<AssistantObject> = self.get(&path).await?;
            after = page.last_id.clone();
            for wire in page.data {
                summaries.push(to_summary(wire)?);
            }
            if !page.has_more || after.is_none() {
                break;
            }
        }
        Ok(summaries)
    }

    async fn create_assistant(
        &self,
        name: &str,
        model: &str,
    ) -> Result<AssistantSummary, AssistantApiError> {
        let body = CreateAssistantRequest { name, model };
        let wire: AssistantObject = self.post("/assistants", &body).await?;
        to_summary(wire)
    }

    async fn update_assistant(
        &self,
        assistant_id: &AssistantId,
        update: AssistantUpdate,
    ) -> Result<(), AssistantApiError> {
        let body = UpdateAssistantRequest {
            model: update.model,
            instructions: update.instructions,
            tools: update.tools,
        };
        let _: AssistantObject = self
            .post(&format!("/assistants/{}", assistant_id), &body)
            .await?;
        Ok(())
    }

    async fn create_thread(&self) -> Result<ThreadId, AssistantApiError> {
        let wire: IdObject = self.post("/threads", &serde_json::json!({})).await?;
        to_thread_id(wire.id)
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        text: &str,
    ) -> Result<(), AssistantApiError> {
        let body = CreateMessageRequest {
            role: "user",
            content: text,
        };
        let _: IdObject = self
            .post(&format!("/threads/{}/messages", thread_id), &body)
            .await?;
        Ok(())
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, AssistantApiError> {
        let mut messages = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut path = format!("/threads/{}/messages?limit={}&order=asc", thread_id, PAGE_LIMIT);
            if let Some(cursor) = &after {
                path.push_str("&after=");
                path.push_str(cursor);
            }
            let page: ListPage<MessageObject> = self.get(&path).await?;
            after = page.last_id.clone();
            messages.extend(page.data.into_iter().filter_map(to_message));
            if !page.has_more || after.is_none() {
                break;
            }
        }
        Ok(messages)
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
        tools: Option<Vec<Value>>,
    ) -> Result<RunSnapshot, AssistantApiError> {
        let body = CreateRunRequest {
            assistant_id: assistant_id.as_str(),
            tools,
        };
        let wire: RunObject = self
            .post(&format!("/threads/{}/runs", thread_id), &body)
            .await?;
        to_snapshot(wire)
    }

    async fn retrieve_run(&self, run: &RunHandle) -> Result<RunSnapshot, AssistantApiError> {
        let wire: RunObject = self
            .get(&format!("/threads/{}/runs/{}", run.thread_id, run.run_id))
            .await?;
        to_snapshot(wire)
    }

    async fn submit_tool_outputs(
        &self,
        run: &RunHandle,
        outputs: &[ToolOutput],
    ) -> Result<(), AssistantApiError> {
        let body = SubmitToolOutputsRequest {
            tool_outputs: outputs
                .iter()
                .map(|o| WireToolOutput {
                    tool_call_id: o.call_id().as_str(),
                    output: o.output(),
                })
                .collect(),
        };
        let _: RunObject = self
            .post(
                &format!(
                    "/threads/{}/runs/{}/submit_tool_outputs",
                    run.thread_id, run.run_id
                ),
                &body,
            )
            .await?;
        Ok(())
    }

    async fn cancel_run(&self, run: &RunHandle) -> Result<(), AssistantApiError> {
        let _: RunObject = self
            .post(
                &format!("/threads/{}/runs/{}/cancel", run.thread_id, run.run_id),
                &serde_json::json!({}),
            )
            .await?;
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct CreateAssistantRequest<'a> {
    name: &'a str,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateAssistantRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct CreateMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    assistant_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Value>>,
}

#[derive(Debug, Serialize)]
struct SubmitToolOutputsRequest<'a> {
    tool_outputs: Vec<WireToolOutput<'a>>,
}

#[derive(Debug, Serialize)]
struct WireToolOutput<'a> {
    tool_call_id: &'a str,
    output: &'a str,
}

#[derive(Debug, Deserialize)]
struct ListPage<T> {
    data: Vec<T>,
    #[serde(default)]
    last_id: Option<String>,
    #[serde(default)]
    has_more: bool,
}

#[derive(Debug, Deserialize)]
struct IdObject {
    id: String,
}

#[derive(Debug, Deserialize)]
struct AssistantObject {
    id: String,
    #[serde(default)]
    name: Option<String>,
    model: String,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    role: String,
    created_at: i64,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: Option<TextContent>,
}

#[derive(Debug, Deserialize)]
struct TextContent {
    value: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    id: String,
    status: String,
    #[serde(default)]
    required_action: Option<RequiredAction>,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RequiredAction {
    #[serde(default)]
    submit_tool_outputs: Option<SubmitToolOutputs>,
}

#[derive(Debug, Deserialize)]
struct SubmitToolOutputs {
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    /// Usually a JSON-encoded string, occasionally an object.
    #[serde(default)]
    arguments: Value,
}

#[derive(Debug, Deserialize)]
struct RunError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

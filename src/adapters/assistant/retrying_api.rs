//! Retrying Assistant API - Decorator adding bounded retries to any AssistantApi.
//!
//! Only transport failures are retried. The delay doubles on every attempt:
//! `base_delay`, `2 * base_delay`, `4 * base_delay`, ...
//!
//! # Example
//!
//! ```ignore
//! let api = RetryingAssistantApi::new(Arc::new(OpenAIAssistantsApi::new(config)?))
//!     .with_max_retries(3)
//!     .with_base_delay(Duration::from_secs(1));
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::assistant::{Message, RunHandle};
use crate::domain::foundation::{AssistantId, ThreadId};
use crate::domain::tools::ToolOutput;
use crate::ports::{AssistantApi, AssistantApiError, AssistantSummary, AssistantUpdate, RunSnapshot};

/// AssistantApi decorator that retries transport failures.
pub struct RetryingAssistantApi {
    inner: Arc<dyn AssistantApi>,
    max_retries: u32,
    base_delay: Duration,
}

impl RetryingAssistantApi {
    /// Wraps `inner` with 3 retries and a 1 second base delay.
    pub fn new(inner: Arc<dyn AssistantApi>) -> Self {
        Self {
            inner,
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }

    /// Sets the maximum number of retries after the first attempt.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the delay before the first retry.
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
            .unwrap_or(Duration::MAX)
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, AssistantApiError>
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, AssistantApiError>> + Send,
        T: Send,
    {
        let mut attempt = 0;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        operation,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Transient assistant API failure, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl AssistantApi for RetryingAssistantApi {
    async fn list_assistants(&self) -> Result<Vec<AssistantSummary>, AssistantApiError> {
        self.with_retry("list_assistants", || self.inner.list_assistants())
            .await
    }

    async fn create_assistant(
        &self,
        name: &str,
        model: &str,
    ) -> Result<AssistantSummary, AssistantApiError> {
        self.with_retry("create_assistant", || self.inner.create_assistant(name, model))
            .await
    }

    async fn update_assistant(
        &self,
        assistant_id: &AssistantId,
        update: AssistantUpdate,
    ) -> Result<(), AssistantApiError> {
        self.with_retry("update_assistant", || {
            self.inner.update_assistant(assistant_id, update.clone())
        })
        .await
    }

    async fn create_thread(&self) -> Result<ThreadId, AssistantApiError> {
        self.with_retry("create_thread", || self.inner.create_thread())
            .await
    }

    async fn create_message(
        &self,
        thread_id: &ThreadId,
        text: &str,
    ) -> Result<(), AssistantApiError> {
        self.with_retry("create_message", || self.inner.create_message(thread_id, text))
            .await
    }

    async fn list_messages(&self, thread_id: &ThreadId) -> Result<Vec<Message>, AssistantApiError> {
        self.with_retry("list_messages", || self.inner.list_messages(thread_id))
            .await
    }

    async fn create_run(
        &self,
        thread_id: &ThreadId,
        assistant_id: &AssistantId,
        tools: Option<Vec<Value>>,
    ) -> Result<RunSnapshot, AssistantApiError> {
        self.with_retry("create_run", || {
            self.inner.create_run(thread_id, assistant_id, tools.clone())
        })
        .await
    }

    async fn retrieve_run(&self, run: &RunHandle) -> Result<RunSnapshot, AssistantApiError> {
        self.with_retry("retrieve_run", || self.inner.retrieve_run(run))
            .await
    }

    async fn submit_tool_outputs(
        &self,
        run: &RunHandle,
        outputs: &[ToolOutput],
    ) -> Result<(), AssistantApiError> {
        self.with_retry("submit_tool_outputs", || {
            self.inner.submit_tool_outputs(run, outputs)
        })
        .await
    }

    async fn cancel_run(&self, run: &RunHandle) -> Result<(), AssistantApiError> {
        self.with_retry("cancel_run", || self.inner.cancel_run(run))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::assistant::{MockAssistantApi, MockOperation};

    fn retrying(mock: &MockAssistantApi, max_retries: u32) -> RetryingAssistantApi {
        RetryingAssistantApi::new(Arc::new(mock.clone()))
            .with_max_retries(max_retries)
            .with_base_delay(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn retries_transport_errors_until_success() {
        let mock = MockAssistantApi::new()
            .with_failure(MockOperation::CreateThread, AssistantApiError::transport("reset"))
            .with_failure(MockOperation::CreateThread, AssistantApiError::transport("reset"));

        let thread = retrying(&mock, 3).create_thread().await;

        assert!(thread.is_ok());
        assert_eq!(mock.call_count(MockOperation::CreateThread), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let mock = MockAssistantApi::new()
            .with_failure(MockOperation::ListAssistants, AssistantApiError::transport("down"))
            .with_failure(MockOperation::ListAssistants, AssistantApiError::transport("down"))
            .with_failure(MockOperation::ListAssistants, AssistantApiError::transport("down"));

        let err = retrying(&mock, 1).list_assistants().await.unwrap_err();

        assert_eq!(err, AssistantApiError::transport("down"));
        assert_eq!(mock.call_count(MockOperation::ListAssistants), 2);
    }

    #[tokio::test]
    async fn remote_errors_are_not_retried() {
        let mock = MockAssistantApi::new().with_failure(
            MockOperation::CreateThread,
            AssistantApiError::remote(Some(400), "bad request"),
        );

        let err = retrying(&mock, 3).create_thread().await.unwrap_err();

        assert!(matches!(err, AssistantApiError::Remote { .. }));
        assert_eq!(mock.call_count(MockOperation::CreateThread), 1);
    }

    #[test]
    fn backoff_doubles() {
        let api = RetryingAssistantApi::new(Arc::new(MockAssistantApi::new()))
            .with_base_delay(Duration::from_millis(100));

        assert_eq!(api.backoff(0), Duration::from_millis(100));
        assert_eq!(api.backoff(1), Duration::from_millis(200));
        assert_eq!(api.backoff(3), Duration::from_millis(800));
    }
}

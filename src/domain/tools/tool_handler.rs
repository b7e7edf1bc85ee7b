//! Tool handler trait and the errors a handler may raise.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use super::ToolArguments;

/// Errors raised while invoking a tool.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolError {
    /// Arguments were malformed or missing a required key.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// The handler ran and failed (e.g., the SQL engine rejected the query).
    #[error("{0}")]
    Execution(String),
}

/// Callable backing a tool.
///
/// Handlers are awaited one at a time inside the run driver's polling task, so
/// a slow handler holds up the run.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Executes the tool and returns the text submitted back to the model.
    async fn invoke(&self, arguments: ToolArguments) -> Result<String, ToolError>;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F> ToolHandler for FnHandler<F>
where
    F: Fn(ToolArguments) -> Result<String, ToolError> + Send + Sync,
{
    async fn invoke(&self, arguments: ToolArguments) -> Result<String, ToolError> {
        (self.0)(arguments)
    }
}

/// Wraps a synchronous closure as a tool handler.
pub fn from_fn<F>(f: F) -> Arc<dyn ToolHandler>
where
    F: Fn(ToolArguments) -> Result<String, ToolError> + Send + Sync + 'static,
{
    Arc::new(FnHandler(f))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_fn_invokes_closure() {
        let handler = from_fn(|args| Ok(args.required_str("fact")?.to_uppercase()));
        let args = ToolArguments::from_raw(&serde_json::json!({"fact": "sky is blue"})).unwrap();

        assert_eq!(handler.invoke(args).await.unwrap(), "SKY IS BLUE");
    }

    #[tokio::test]
    async fn from_fn_propagates_errors() {
        let handler = from_fn(|_| Err(ToolError::Execution("boom".into())));
        let result = handler.invoke(ToolArguments::default()).await;

        assert_eq!(result, Err(ToolError::Execution("boom".into())));
    }
}

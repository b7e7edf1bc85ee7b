//! The `run_sql` tool: executes model-generated SQL and records the result.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::tools::{ToolArguments, ToolDefinition, ToolDescriptor, ToolError, ToolHandler};
use crate::ports::{ResultSink, SqlEngine};

/// Name under which the tool is advertised.
pub const RUN_SQL_TOOL: &str = "run_sql";

/// Handler for `run_sql`.
///
/// Executes the `sql` argument, writes the formatted result to the session's
/// query-results file and returns the same text to the model. Engine and
/// write failures are raised as tool execution errors.
pub struct RunSqlTool {
    engine: Arc<dyn SqlEngine>,
    sink: Arc<dyn ResultSink>,
    results_file: PathBuf,
}

impl RunSqlTool {
    /// Creates the handler.
    pub fn new(engine: Arc<dyn SqlEngine>, sink: Arc<dyn ResultSink>, results_file: PathBuf) -> Self {
        Self {
            engine,
            sink,
            results_file,
        }
    }

    /// Returns the schema advertised to the model.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::simple(RUN_SQL_TOOL, "Run a SQL query against the Presto database")
            .with_parameter("sql", "string", "The SQL query to run", true)
    }

    /// Pairs the handler with its definition.
    pub fn into_descriptor(self) -> ToolDescriptor {
        ToolDescriptor::new(Self::definition(), Arc::new(self))
    }
}

#[async_trait]
impl ToolHandler for RunSqlTool {
    async fn invoke(&self, arguments: ToolArguments) -> Result<String, ToolError> {
        let sql = arguments.required_str("sql")?;
        tracing::info!(sql, "Running generated SQL");

        let result = self
            .engine
            .execute(sql)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;
        let text = result.to_text();

        self.sink
            .write_query_result(&self.results_file, &text)
            .await
            .map_err(|e| ToolError::Execution(e.to_string()))?;

        tracing::debug!(rows = result.rows.len(), "SQL result recorded");
        Ok(text)
    }
}

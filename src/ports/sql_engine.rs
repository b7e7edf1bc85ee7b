//! SQL Engine Port - Interface to the analytical SQL engine.

use async_trait::async_trait;
use serde_json::Value;

/// Port for executing SQL statements.
#[async_trait]
pub trait SqlEngine: Send + Sync {
    /// Executes `sql` and returns every row.
    async fn execute(&self, sql: &str) -> Result<QueryResult, SqlEngineError>;
}

/// Rows and column names of a finished query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    /// Creates a new query result.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Returns true when no rows were returned.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the result as comma-separated text.
    ///
    /// The first line holds the column names, then one line per row. An empty
    /// result renders as an empty string with no header.
    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(self.columns.join(","));
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(render_value).collect();
            lines.push(cells.join(","));
        }
        lines.join("\n")
    }

    /// Returns the first column of every row as text.
    pub fn first_column(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter_map(|row| row.first())
            .map(render_value)
            .collect()
    }
}

/// Renders a single cell value.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

/// SQL engine errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SqlEngineError {
    /// The engine could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The engine rejected or failed the query.
    #[error("query failed ({name}): {message}")]
    Query { name: String, message: String },

    /// The engine answered with something we could not interpret.
    #[error("protocol error: {0}")]
    Protocol(String),
}

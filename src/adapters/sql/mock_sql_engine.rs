//! Mock SQL engine for testing.
//!
//! Answers statements from a table of canned results keyed by exact SQL text,
//! falling back to a queue of results for anything else.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::ports::{QueryResult, SqlEngine, SqlEngineError};

#[derive(Debug, Default)]
struct MockSqlState {
    canned: HashMap<String, Result<QueryResult, SqlEngineError>>,
    queue: VecDeque<Result<QueryResult, SqlEngineError>>,
    executed: Vec<String>,
}

/// Mock SQL engine.
#[derive(Debug, Clone, Default)]
pub struct MockSqlEngine {
    state: Arc<Mutex<MockSqlState>>,
}

impl MockSqlEngine {
    /// Creates an engine that returns empty results.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockSqlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answers `sql` with `result` every time it is executed.
    pub fn with_result(self, sql: &str, result: QueryResult) -> Self {
        self.state().canned.insert(sql.to_string(), Ok(result));
        self
    }

    /// Answers `sql` with `error` every time it is executed.
    pub fn with_error(self, sql: &str, error: SqlEngineError) -> Self {
        self.state().canned.insert(sql.to_string(), Err(error));
        self
    }

    /// Queues a result for the next statement without a canned answer.
    pub fn with_next_result(self, result: QueryResult) -> Self {
        self.state().queue.push_back(Ok(result));
        self
    }

    /// Returns every executed statement in order.
    pub fn executed(&self) -> Vec<String> {
        self.state().executed.clone()
    }
}

#[async_trait]
impl SqlEngine for MockSqlEngine {
    async fn execute(&self, sql: &str) -> Result<QueryResult, SqlEngineError> {
        let mut state = self.state();
        state.executed.push(sql.to_string());
        if let Some(answer) = state.canned.get(sql) {
            return answer.clone();
        }
        state.queue.pop_front().unwrap_or_else(|| Ok(QueryResult::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn canned_results_win_over_queue() {
        let engine = MockSqlEngine::new()
            .with_result("SHOW TABLES", QueryResult::new(vec!["Table".into()], vec![vec![json!("t")]]))
            .with_next_result(QueryResult::new(vec!["n".into()], vec![vec![json!(1)]]));

        let tables = engine.execute("SHOW TABLES").await.unwrap();
        assert_eq!(tables.first_column(), vec!["t"]);

        let other = engine.execute("SELECT 1").await.unwrap();
        assert_eq!(other.to_text(), "n\n1");

        assert!(engine.execute("SELECT 2").await.unwrap().is_empty());
        assert_eq!(engine.executed().len(), 3);
    }
}

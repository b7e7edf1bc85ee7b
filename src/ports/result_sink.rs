//! Result Sink Port - Persistence of session artifacts.
//!
//! Every write is a single-shot write of a complete artifact. A failure aborts
//! the step that triggered it.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::domain::assistant::Transcript;
use crate::domain::cost::CostEstimate;

/// Errors that can occur while persisting artifacts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error at {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("Failed to serialize artifact: {0}")]
    Serialization(String),
}

impl PersistenceError {
    /// Creates an IO error for `path`.
    pub fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Port for persisting transcripts, results and cost estimates.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Writes the transcript as a JSON array sorted ascending by timestamp.
    async fn write_transcript(
        &self,
        path: &Path,
        transcript: &Transcript,
    ) -> Result<(), PersistenceError>;

    /// Writes `{cost, tokens}` as JSON.
    async fn write_cost_estimate(
        &self,
        path: &Path,
        estimate: &CostEstimate,
    ) -> Result<(), PersistenceError>;

    /// Writes raw query result text.
    async fn write_query_result(&self, path: &Path, raw_text: &str) -> Result<(), PersistenceError>;

    /// Writes table definitions unless `path` already exists.
    ///
    /// Returns `false` when the write was skipped.
    async fn write_table_definitions(&self, path: &Path, text: &str)
        -> Result<bool, PersistenceError>;

    /// Writes the schema description.
    async fn write_schema_description(&self, path: &Path, text: &str)
        -> Result<(), PersistenceError>;

    /// Checks whether an artifact exists.
    async fn exists(&self, path: &Path) -> Result<bool, PersistenceError>;
}

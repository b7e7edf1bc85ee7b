//! File-based Result Sink Adapter
//!
//! Writes session artifacts (transcripts, query results, table definitions,
//! cost estimates) to the local filesystem. Parent directories are created on
//! demand.

use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use crate::domain::assistant::Transcript;
use crate::domain::cost::CostEstimate;
use crate::ports::{PersistenceError, ResultSink};

/// Filesystem result sink.
#[derive(Debug, Clone, Default)]
pub struct FileResultSink;

impl FileResultSink {
    /// Creates a new file sink.
    pub fn new() -> Self {
        Self
    }

    /// Ensure the parent directory of `path` exists
    async fn ensure_parent(&self, path: &Path) -> Result<(), PersistenceError> {
        match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => fs::create_dir_all(dir)
                .await
                .map_err(|e| PersistenceError::io(dir, e)),
            _ => Ok(()),
        }
    }

    async fn write(&self, path: &Path, contents: &str) -> Result<(), PersistenceError> {
        self.ensure_parent(path).await?;
        fs::write(path, contents)
            .await
            .map_err(|e| PersistenceError::io(path, e))?;
        tracing::debug!(path = %path.display(), bytes = contents.len(), "Artifact written");
        Ok(())
    }
}

#[async_trait]
impl ResultSink for FileResultSink {
    async fn write_transcript(
        &self,
        path: &Path,
        transcript: &Transcript,
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(&transcript.sorted_entries())
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.write(path, &json).await
    }

    async fn write_cost_estimate(
        &self,
        path: &Path,
        estimate: &CostEstimate,
    ) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(estimate)
            .map_err(|e| PersistenceError::Serialization(e.to_string()))?;
        self.write(path, &json).await
    }

    async fn write_query_result(&self, path: &Path, raw_text: &str) -> Result<(), PersistenceError> {
        self.write(path, raw_text).await
    }

    async fn write_table_definitions(
        &self,
        path: &Path,
        text: &str,
    ) -> Result<bool, PersistenceError> {
        if self.exists(path).await? {
            tracing::debug!(path = %path.display(), "Table definitions already present, skipping");
            return Ok(false);
        }
        self.write(path, text).await?;
        Ok(true)
    }

    async fn write_schema_description(
        &self,
        path: &Path,
        text: &str,
    ) -> Result<(), PersistenceError> {
        self.write(path, text).await
    }

    async fn exists(&self, path: &Path) -> Result<bool, PersistenceError> {
        fs::try_exists(path)
            .await
            .map_err(|e| PersistenceError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assistant::{Message, Role, TranscriptEntry};
    use crate::domain::foundation::Timestamp;
    use tempfile::TempDir;

    fn msg(sender: Role, text: &str, secs: i64) -> Message {
        Message::new(sender, text, Timestamp::from_unix_secs(secs))
    }

    #[tokio::test]
    async fn transcript_is_written_sorted_by_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("session").join("analyst-chat.json");
        let transcript = Transcript::new(vec![
            msg(Role::Assistant, "SELECT 1", 20),
            msg(Role::User, "How many orders?", 10),
        ]);

        FileResultSink::new()
            .write_transcript(&path, &transcript)
            .await
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let entries: Vec<TranscriptEntry> = serde_json::from_str(&contents).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].text, "How many orders?");
        assert_eq!(entries[0].sender, Role::User);
        assert_eq!(entries[0].recipient, Role::Assistant);
        assert_eq!(entries[1].timestamp, 20);
    }

    #[tokio::test]
    async fn cost_estimate_has_cost_and_tokens() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cost.json");

        FileResultSink::new()
            .write_cost_estimate(&path, &CostEstimate { cost: 0.5, tokens: 50 })
            .await
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["cost"], 0.5);
        assert_eq!(value["tokens"], 50);
    }

    #[tokio::test]
    async fn table_definitions_are_written_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("table_definitions.txt");
        let sink = FileResultSink::new();

        assert!(sink.write_table_definitions(&path, "first").await.unwrap());
        assert!(!sink.write_table_definitions(&path, "second").await.unwrap());

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first");
    }

    #[tokio::test]
    async fn empty_query_result_still_creates_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("query_results.txt");
        let sink = FileResultSink::new();

        sink.write_query_result(&path, "").await.unwrap();

        assert!(sink.exists(&path).await.unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "");
    }

    #[tokio::test]
    async fn unwritable_path_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let path = blocker.join("child.txt");

        let err = FileResultSink::new()
            .write_schema_description(&path, "text")
            .await
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Io { .. }));
    }
}

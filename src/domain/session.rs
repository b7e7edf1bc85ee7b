//! Session - namespace for the artifacts of one pipeline invocation.

use std::path::{Path, PathBuf};

use crate::domain::foundation::SessionId;

/// One invocation of the pipeline and the directory its artifacts live in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    id: SessionId,
    root: PathBuf,
}

impl Session {
    /// Derives a session from `seed` under `results_dir`.
    ///
    /// The same seed always maps to the same directory.
    pub fn from_seed(seed: &str, results_dir: impl AsRef<Path>) -> Self {
        let id = SessionId::from_seed(seed);
        let root = results_dir.as_ref().join(id.as_str());
        Self { id, root }
    }

    /// Returns the session id.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the session's artifact directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Text file holding the table definitions given to the model.
    pub fn table_definitions_file(&self) -> PathBuf {
        self.root.join("table_definitions.txt")
    }

    /// Text file describing relations between tables.
    pub fn schema_description_file(&self) -> PathBuf {
        self.root.join("schema_description.txt")
    }

    /// Text file holding the last query result.
    pub fn query_results_file(&self) -> PathBuf {
        self.root.join("query_results.txt")
    }

    /// JSON transcript of the conversation with `assistant_name`.
    pub fn chat_file(&self, assistant_name: &str) -> PathBuf {
        self.root
            .join(format!("{}-chat.json", file_stem(assistant_name)))
    }

    /// JSON cost estimate of the conversation with `assistant_name`.
    pub fn cost_file(&self, assistant_name: &str) -> PathBuf {
        self.root
            .join(format!("{}-cost.json", file_stem(assistant_name)))
    }
}

fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

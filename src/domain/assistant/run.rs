//! Run handle value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{RunId, ThreadId};

/// Identifies a run started on a thread.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunHandle {
    pub thread_id: ThreadId,
    pub run_id: RunId,
}

impl RunHandle {
    /// Creates a new run handle.
    pub fn new(thread_id: ThreadId, run_id: RunId) -> Self {
        Self { thread_id, run_id }
    }
}

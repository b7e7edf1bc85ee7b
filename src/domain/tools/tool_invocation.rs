//! Audit record of an executed tool call.

use serde::{Deserialize, Serialize};

use super::ToolArguments;
use crate::domain::foundation::ToolCallId;

/// One tool call as executed by the run driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub call_id: ToolCallId,
    pub tool_name: String,
    pub arguments: ToolArguments,
    pub output: String,
}

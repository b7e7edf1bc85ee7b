//! Strongly-typed identifier value objects.
//!
//! Remote identifiers (assistant, thread, run, tool call) are opaque strings
//! minted by the assistant service. The session id is derived locally.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::ValidationError;

macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident, $field:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a remote identifier, rejecting blank values.
            pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err(ValidationError::empty_field($field));
                }
                Ok(Self(value))
            }

            /// Returns the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

remote_id!(
    /// Identifier of a remotely hosted assistant.
    AssistantId,
    "assistant_id"
);
remote_id!(
    /// Identifier of a remote conversation thread.
    ThreadId,
    "thread_id"
);
remote_id!(
    /// Identifier of one run of an assistant against a thread.
    RunId,
    "run_id"
);
remote_id!(
    /// Identifier of a tool call emitted while a run requires action.
    ToolCallId,
    "tool_call_id"
);

/// Identifier of one invocation of the pipeline.
///
/// Derived deterministically from a seed so repeated invocations with the same
/// assistant and query share an artifact namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    const LENGTH: usize = 16;

    /// Derives a session id from the SHA-256 digest of `seed`.
    pub fn from_seed(seed: &str) -> Self {
        let digest = Sha256::digest(seed.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Self(hex[..Self::LENGTH].to_string())
    }

    /// Returns the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_id_rejects_blank_values() {
        assert!(ThreadId::new("").is_err());
        assert!(RunId::new("   ").is_err());
    }

    #[test]
    fn remote_id_keeps_raw_value() {
        let id = AssistantId::new("asst_123").unwrap();
        assert_eq!(id.as_str(), "asst_123");
        assert_eq!(id.to_string(), "asst_123");
    }

    #[test]
    fn remote_id_serializes_transparently() {
        let id = ToolCallId::new("call_abc").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"call_abc\"");
    }

    #[test]
    fn session_id_is_deterministic() {
        let a = SessionId::from_seed("sql-analysttop customers");
        let b = SessionId::from_seed("sql-analysttop customers");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 16);
    }

    #[test]
    fn session_id_differs_by_seed() {
        let a = SessionId::from_seed("sql-analystquery one");
        let b = SessionId::from_seed("sql-analystquery two");
        assert_ne!(a, b);
    }

    #[test]
    fn session_id_is_lowercase_hex() {
        let id = SessionId::from_seed("anything");
        assert!(id
            .as_str()
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }
}

//! Tool call, arguments and output value objects.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ToolError;
use crate::domain::foundation::ToolCallId;

/// Parsed keyword arguments of a tool call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolArguments(Map<String, Value>);

impl ToolArguments {
    /// Wraps an already parsed argument map.
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Parses raw arguments as delivered by the remote service.
    ///
    /// Accepts a JSON object, or a string holding a JSON-encoded object. An
    /// empty string or `null` yields no arguments.
    pub fn from_raw(raw: &Value) -> Result<Self, ToolError> {
        match raw {
            Value::Object(map) => Ok(Self(map.clone())),
            Value::Null => Ok(Self::default()),
            Value::String(encoded) if encoded.trim().is_empty() => Ok(Self::default()),
            Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
                Ok(Value::Object(map)) => Ok(Self(map)),
                Ok(other) => Err(ToolError::InvalidArguments(format!(
                    "expected a JSON object, got {}",
                    other
                ))),
                Err(e) => Err(ToolError::InvalidArguments(format!(
                    "arguments are not valid JSON: {}",
                    e
                ))),
            },
            other => Err(ToolError::InvalidArguments(format!(
                "expected a JSON object, got {}",
                other
            ))),
        }
    }

    /// Returns an argument by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a required string argument.
    pub fn required_str(&self, key: &str) -> Result<&str, ToolError> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(ToolError::InvalidArguments(format!(
                "'{}' must be a string, got {}",
                key, other
            ))),
            None => Err(ToolError::InvalidArguments(format!(
                "missing required argument '{}'",
                key
            ))),
        }
    }

    /// Returns the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// A request, emitted by the remote model, to invoke a local tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    id: ToolCallId,
    tool_name: String,
    /// Raw arguments: an object or a JSON-encoded string.
    arguments: Value,
}

impl ToolCall {
    /// Creates a new tool call.
    pub fn new(id: ToolCallId, tool_name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id,
            tool_name: tool_name.into(),
            arguments,
        }
    }

    /// Returns the call id.
    pub fn id(&self) -> &ToolCallId {
        &self.id
    }

    /// Returns the requested tool name.
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Returns the arguments as received.
    pub fn raw_arguments(&self) -> &Value {
        &self.arguments
    }

    /// Parses the arguments, tolerating both wire encodings.
    pub fn parse_arguments(&self) -> Result<ToolArguments, ToolError> {
        ToolArguments::from_raw(&self.arguments)
    }
}

/// Local reply to a tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    call_id: ToolCallId,
    output: String,
}

impl ToolOutput {
    /// Creates a new tool output.
    pub fn new(call_id: ToolCallId, output: impl Into<String>) -> Self {
        Self {
            call_id,
            output: output.into(),
        }
    }

    /// Returns the id of the originating call.
    pub fn call_id(&self) -> &ToolCallId {
        &self.call_id
    }

    /// Returns the output text.
    pub fn output(&self) -> &str {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(arguments: Value) -> ToolCall {
        ToolCall::new(ToolCallId::new("call_1").unwrap(), "run_sql", arguments)
    }

    #[test]
    fn parses_structured_object() {
        let args = call(json!({"sql": "SELECT 1"})).parse_arguments().unwrap();
        assert_eq!(args.required_str("sql").unwrap(), "SELECT 1");
    }

    #[test]
    fn parses_json_encoded_string() {
        let args = call(json!("{\"sql\":\"SELECT 1\"}")).parse_arguments().unwrap();
        assert_eq!(args.get("sql"), Some(&json!("SELECT 1")));
    }

    #[test]
    fn both_encodings_yield_same_arguments() {
        let structured = call(json!({"sql": "SELECT 1"})).parse_arguments().unwrap();
        let encoded = call(json!("{\"sql\":\"SELECT 1\"}")).parse_arguments().unwrap();
        assert_eq!(structured, encoded);
    }

    #[test]
    fn empty_string_yields_no_arguments() {
        let args = call(json!("")).parse_arguments().unwrap();
        assert!(args.as_map().is_empty());
    }

    #[test]
    fn rejects_non_object_json() {
        let err = call(json!("[1, 2]")).parse_arguments().unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = call(json!("{sql: SELECT")).parse_arguments().unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments(_)));
    }

    #[test]
    fn required_str_reports_missing_key() {
        let args = ToolArguments::default();
        let err = args.required_str("sql").unwrap_err();
        assert_eq!(
            err,
            ToolError::InvalidArguments("missing required argument 'sql'".into())
        );
    }

    #[test]
    fn required_str_rejects_non_string() {
        let args = ToolArguments::from_raw(&json!({"sql": 42})).unwrap();
        assert!(args.required_str("sql").is_err());
    }
}

//! Tool definition - what the remote model is told about a local tool.

use serde::{Deserialize, Serialize};

/// Definition of a tool that can be invoked by the remote assistant.
///
/// # Examples
///
/// ```
/// use sql_assistant::domain::tools::ToolDefinition;
///
/// let run_sql = ToolDefinition::simple("run_sql", "Run a SQL query against the Presto database")
///     .with_parameter("sql", "string", "The SQL query to run", true);
///
/// let schema = run_sql.to_openai_format();
/// assert_eq!(schema["function"]["parameters"]["required"][0], "sql");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique name of the tool (e.g., "run_sql")
    name: String,

    /// Human-readable description for the model
    description: String,

    /// JSON Schema of the arguments object
    parameters_schema: serde_json::Value,
}

impl ToolDefinition {
    /// Creates a definition with an explicit parameters schema.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters_schema,
        }
    }

    /// Creates a tool definition taking an empty object.
    pub fn simple(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(
            name,
            description,
            serde_json::json!({ "type": "object", "properties": {} }),
        )
    }

    /// Adds a parameter to the schema.
    pub fn with_parameter(
        mut self,
        name: &str,
        json_type: &str,
        description: &str,
        required: bool,
    ) -> Self {
        if let Some(schema) = self.parameters_schema.as_object_mut() {
            let properties = schema
                .entry("properties")
                .or_insert_with(|| serde_json::json!({}));
            if let Some(properties) = properties.as_object_mut() {
                properties.insert(
                    name.to_string(),
                    serde_json::json!({ "type": json_type, "description": description }),
                );
            }
            if required {
                let required = schema
                    .entry("required")
                    .or_insert_with(|| serde_json::json!([]));
                if let Some(required) = required.as_array_mut() {
                    required.push(serde_json::Value::String(name.to_string()));
                }
            }
        }
        self
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description shown to the model.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parameters schema.
    pub fn parameters_schema(&self) -> &serde_json::Value {
        &self.parameters_schema
    }

    /// Converts to the OpenAI function tool format.
    pub fn to_openai_format(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters_schema
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_creates_empty_object_schema() {
        let def = ToolDefinition::simple("store_fact", "Stores a fact");

        assert_eq!(def.name(), "store_fact");
        assert_eq!(def.parameters_schema()["type"], "object");
        assert!(def.parameters_schema()["properties"].as_object().unwrap().is_empty());
    }

    #[test]
    fn with_parameter_adds_property_and_required() {
        let def = ToolDefinition::simple("run_sql", "Run SQL")
            .with_parameter("sql", "string", "The SQL query to run", true)
            .with_parameter("limit", "integer", "Row cap", false);

        let schema = def.parameters_schema();
        assert_eq!(schema["properties"]["sql"]["type"], "string");
        assert_eq!(schema["properties"]["limit"]["type"], "integer");
        assert_eq!(schema["required"], serde_json::json!(["sql"]));
    }

    #[test]
    fn openai_format_wraps_function_object() {
        let def = ToolDefinition::simple("run_sql", "Run SQL");
        let openai = def.to_openai_format();

        assert_eq!(openai["type"], "function");
        assert_eq!(openai["function"]["name"], "run_sql");
        assert_eq!(openai["function"]["description"], "Run SQL");
        assert!(openai["function"]["parameters"].is_object());
    }
}

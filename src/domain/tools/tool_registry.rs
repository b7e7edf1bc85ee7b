//! Tool Registry - The active set of tools equipped on an assistant.
//!
//! Registration replaces the whole set. Lookup is by name; exported schemas
//! keep registration order so requests to the remote service are reproducible.
//!
//! # Example
//!
//! ```
//! use sql_assistant::domain::tools::{from_fn, ToolDefinition, ToolDescriptor, ToolRegistry};
//!
//! let mut registry = ToolRegistry::new();
//! registry
//!     .register(vec![ToolDescriptor::new(
//!         ToolDefinition::simple("store_fact", "A function that stores a fact."),
//!         from_fn(|_| Ok(String::new())),
//!     )])
//!     .unwrap();
//!
//! assert!(registry.resolve("store_fact").is_ok());
//! assert_eq!(registry.export_schemas().len(), 1);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use super::{ToolDefinition, ToolHandler};

/// Errors raised by registry lookups and registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("tool registered twice: {0}")]
    DuplicateTool(String),

    #[error("tools {missing:?} are not in the equipped set {equipped:?}")]
    SubsetMismatch {
        missing: Vec<String>,
        equipped: Vec<String>,
    },
}

/// A tool definition paired with the handler that implements it.
#[derive(Clone)]
pub struct ToolDescriptor {
    definition: ToolDefinition,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Creates a new descriptor.
    pub fn new(definition: ToolDefinition, handler: Arc<dyn ToolHandler>) -> Self {
        Self {
            definition,
            handler,
        }
    }

    /// Returns the tool name.
    pub fn name(&self) -> &str {
        self.definition.name()
    }

    /// Returns the tool definition.
    pub fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    /// Returns the handler.
    pub fn handler(&self) -> &Arc<dyn ToolHandler> {
        &self.handler
    }

    /// Returns the schema advertised to the remote model.
    pub fn schema(&self) -> serde_json::Value {
        self.definition.to_openai_format()
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

/// The active tool set.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    /// Tools in registration order
    tools: Vec<ToolDescriptor>,

    /// Name -> position in `tools`
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Creates a new empty tool registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding `tools`.
    pub fn with_tools(tools: Vec<ToolDescriptor>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        registry.register(tools)?;
        Ok(registry)
    }

    /// Replaces the entire active tool set.
    ///
    /// Names must be unique; on a duplicate the previous set is left intact.
    pub fn register(&mut self, tools: Vec<ToolDescriptor>) -> Result<(), RegistryError> {
        let mut index = HashMap::with_capacity(tools.len());
        for (position, tool) in tools.iter().enumerate() {
            if index.insert(tool.name().to_string(), position).is_some() {
                return Err(RegistryError::DuplicateTool(tool.name().to_string()));
            }
        }
        self.tools = tools;
        self.index = index;
        Ok(())
    }

    /// Looks up a tool by name.
    pub fn resolve(&self, name: &str) -> Result<&ToolDescriptor, RegistryError> {
        self.index
            .get(name)
            .map(|&position| &self.tools[position])
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    /// Checks if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Returns registered tool names in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.iter().map(|t| t.name().to_string()).collect()
    }

    /// Returns the number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Returns true when no tools are registered.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Returns the schemas of all tools in registration order.
    pub fn export_schemas(&self) -> Vec<serde_json::Value> {
        self.tools.iter().map(ToolDescriptor::schema).collect()
    }

    /// Resolves every name of `subset`, failing if any is not registered.
    ///
    /// The returned descriptors follow the order of `subset`.
    pub fn select(&self, subset: &[String]) -> Result<Vec<&ToolDescriptor>, RegistryError> {
        let missing: Vec<String> = subset
            .iter()
            .filter(|name| !self.has_tool(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(RegistryError::SubsetMismatch {
                missing,
                equipped: self.tool_names(),
            });
        }
        subset.iter().map(|name| self.resolve(name)).collect()
    }
}

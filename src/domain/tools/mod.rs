//! Local tools the remote assistant may call.
//!
//! The assistant advertises tool schemas to the remote model; while a run
//! requires action, the model emits tool calls which are dispatched by name to
//! local handlers, and each handler's string output is submitted back.
//!
//! ## Key Types
//!
//! - [`ToolDefinition`] - Name, description and JSON Schema advertised remotely
//! - [`ToolHandler`] - Async callable backing a tool
//! - [`ToolDescriptor`] - Definition + handler pair
//! - [`ToolRegistry`] - The active tool set, in registration order
//! - [`ToolCall`] / [`ToolOutput`] - Request from the model and our reply
//! - [`ToolInvocation`] - Audit record of one executed call

mod tool_call;
mod tool_definition;
mod tool_handler;
mod tool_invocation;
mod tool_registry;

pub use tool_call::{ToolArguments, ToolCall, ToolOutput};
pub use tool_definition::ToolDefinition;
pub use tool_handler::{from_fn, ToolError, ToolHandler};
pub use tool_invocation::ToolInvocation;
pub use tool_registry::{RegistryError, ToolDescriptor, ToolRegistry};

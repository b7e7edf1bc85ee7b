//! Application layer - orchestration of the assistant, tools and persistence.
//!
//! - `AssistantClient` - facade over the remote assistant lifecycle
//! - `RunDriver` - polling state machine driving a run to completion
//! - `handlers` - the end-to-end question answering command

mod assistant_client;
mod error;
pub mod handlers;
pub mod prompt;
mod run_driver;
pub mod schema_introspection;
pub mod sql_tool;

pub use assistant_client::AssistantClient;
pub use error::OrchestrationError;
pub use handlers::{AnswerQueryCommand, AnswerQueryHandler, PipelineReport, PipelineSettings};
pub use run_driver::{RunDriver, RunDriverConfig, RunOutcome};
pub use schema_introspection::{SchemaIntrospector, TableRelation};
pub use sql_tool::{RunSqlTool, RUN_SQL_TOOL};

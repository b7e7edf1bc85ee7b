//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `AssistantApi` - Remote assistant service (assistants, threads, runs)
//! - `SqlEngine` - Analytical SQL engine
//! - `ResultSink` - Persistence of transcripts, results and cost estimates

mod assistant_api;
mod result_sink;
mod sql_engine;

pub use assistant_api::{AssistantApi, AssistantApiError, AssistantSummary, AssistantUpdate, RunSnapshot};
pub use result_sink::{PersistenceError, ResultSink};
pub use sql_engine::{QueryResult, SqlEngine, SqlEngineError};

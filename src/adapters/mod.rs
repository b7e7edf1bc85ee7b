//! Adapters - Implementations of port interfaces.
//!
//! - `assistant` - Remote assistant service (HTTP, retry decorator, mock)
//! - `presto` - Presto SQL engine over HTTP
//! - `sql` - SQL engine test doubles
//! - `storage` - Filesystem result sink

pub mod assistant;
pub mod presto;
pub mod sql;
pub mod storage;

pub use assistant::{
    MockAssistantApi, MockCall, MockOperation, MockRunStep, OpenAIAssistantsApi,
    OpenAIAssistantsConfig, RetryingAssistantApi,
};
pub use presto::{PrestoClient, PrestoConnection};
pub use sql::MockSqlEngine;
pub use storage::FileResultSink;

//! Assistant service adapters.
//!
//! - `OpenAIAssistantsApi` - Assistants v2 REST API
//! - `RetryingAssistantApi` - Bounded retry decorator
//! - `MockAssistantApi` - In-memory mock for tests

mod mock_assistant_api;
mod openai_assistants;
mod retrying_api;

pub use mock_assistant_api::{MockAssistantApi, MockCall, MockOperation, MockRunStep};
pub use openai_assistants::{OpenAIAssistantsApi, OpenAIAssistantsConfig};
pub use retrying_api::RetryingAssistantApi;

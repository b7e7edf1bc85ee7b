//! Domain layer - Pure types with no I/O.
//!
//! - `foundation` - Identifiers, timestamps, state machine trait, errors
//! - `assistant` - Messages, transcripts and the run lifecycle
//! - `tools` - Tool definitions, handlers, registry and calls
//! - `session` - Artifact namespace of one invocation
//! - `cost` - Token and cost estimation

pub mod assistant;
pub mod cost;
pub mod foundation;
pub mod session;
pub mod tools;

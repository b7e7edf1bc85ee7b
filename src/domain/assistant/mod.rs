//! Assistant conversation domain.
//!
//! Types describing a remote assistant conversation from the local point of
//! view: the transcript of a thread, the lifecycle of a run and the handle
//! identifying a run.
//!
//! ## Key Types
//!
//! - [`Message`] / [`Transcript`] - Conversation history, ordered by timestamp
//! - [`RunState`] - Finite state machine driven by polling the remote run
//! - [`RunHandle`] - Thread + run identifier pair returned when a run starts

mod message;
mod run;
mod run_state;

pub use message::{Message, Role, Transcript, TranscriptEntry};
pub use run::RunHandle;
pub use run_state::RunState;

//! Storage Adapters
//!
//! Implementations of the ResultSink port.
//!
//! - **FileResultSink** - Writes artifacts as files under the session directory

mod file_result_sink;

pub use file_result_sink::FileResultSink;

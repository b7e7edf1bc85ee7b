//! Command handlers.

mod answer_query;

pub use answer_query::{AnswerQueryCommand, AnswerQueryHandler, PipelineReport, PipelineSettings};

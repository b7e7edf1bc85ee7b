//! SQL Assistant - natural-language questions answered with SQL.
//!
//! Drives a hosted LLM assistant through its thread/run/tool-call lifecycle to
//! turn a database question into SQL, has the assistant execute that SQL
//! against Presto through a local tool, and persists the conversation, query
//! results and cost estimate per session.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

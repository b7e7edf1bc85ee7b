//! Presto adapter.

mod presto_client;

pub use presto_client::{PrestoClient, PrestoConnection};

//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Every required setting that was absent or blank.
    #[error("Required settings missing: {}", .0.join(", "))]
    MissingSettings(Vec<&'static str>),

    #[error("Invalid port number: {0}")]
    InvalidPort(String),

    #[error("Invalid HTTP scheme '{0}' (expected http or https)")]
    InvalidScheme(String),

    #[error("Poll interval must be greater than zero")]
    InvalidPollInterval,

    #[error("Model name must not be empty")]
    EmptyModel,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid value '{value}' for {key}")]
    InvalidNumber { key: &'static str, value: String },
}

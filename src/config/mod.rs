//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Three prefixes are read:
//!
//! - `PRESTO_*` - SQL engine connection ([`PrestoConfig`])
//! - `OPENAI_*` - Assistant service credentials and model ([`OpenAiConfig`])
//! - `AGENT_*` - Polling, retries, artifact location ([`AgentConfig`])
//!
//! # Example
//!
//! ```no_run
//! use sql_assistant::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Querying {}:{}", config.presto.host, config.presto.port);
//! ```

mod agent;
mod error;
mod openai;
mod presto;

pub use agent::AgentConfig;
pub use error::{ConfigError, ValidationError};
pub use openai::OpenAiConfig;
pub use presto::PrestoConfig;

use serde::de::DeserializeOwned;
use std::str::FromStr;

use agent::RawAgentConfig;
use openai::RawOpenAiConfig;
use presto::RawPrestoConfig;

/// Root application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Presto connection (`PRESTO_*`)
    pub presto: PrestoConfig,

    /// Assistant service (`OPENAI_*`)
    pub openai: OpenAiConfig,

    /// Agent behaviour (`AGENT_*`)
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `PRESTO_*`, `OPENAI_*` and `AGENT_*` variables
    /// 3. Reports every missing required setting in a single error
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required settings are missing or a value cannot
    /// be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from the process environment only.
    pub fn from_env() -> Result<Self, ConfigError> {
        let presto: RawPrestoConfig = read_section("PRESTO")?;
        let openai: RawOpenAiConfig = read_section("OPENAI")?;
        let agent: RawAgentConfig = read_section("AGENT")?;

        let mut missing = Vec::new();
        let presto = presto.resolve(&mut missing)?;
        let openai = openai.resolve(&mut missing)?;
        let agent = agent.resolve()?;

        match (presto, openai) {
            (Some(presto), Some(openai)) if missing.is_empty() => Ok(Self {
                presto,
                openai,
                agent,
            }),
            _ => Err(ValidationError::MissingSettings(missing).into()),
        }
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.presto.validate()?;
        self.openai.validate()?;
        self.agent.validate()?;
        Ok(())
    }
}

fn read_section<T: DeserializeOwned>(prefix: &str) -> Result<T, ConfigError> {
    let section = config::Config::builder()
        .add_source(config::Environment::with_prefix(prefix))
        .build()?
        .try_deserialize()?;
    Ok(section)
}

/// Returns the trimmed value, treating blank as absent.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Like [`optional`], recording `key` in `missing` when absent.
fn required(
    value: Option<String>,
    key: &'static str,
    missing: &mut Vec<&'static str>,
) -> Option<String> {
    let value = optional(value);
    if value.is_none() {
        missing.push(key);
    }
    value
}

/// Parses a numeric setting, falling back to `default` when absent.
fn parse_or<T: FromStr>(
    value: Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ValidationError> {
    match optional(value) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ValidationError::InvalidNumber { key, value: raw }),
        None => Ok(default),
    }
}

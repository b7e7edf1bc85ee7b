//! Agent behaviour configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use super::{optional, parse_or};

/// Agent behaviour configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    /// Name of the remote assistant
    pub assistant_name: String,

    /// Root directory for session artifacts
    pub results_dir: PathBuf,

    /// Delay between run status checks in milliseconds
    pub poll_interval_ms: u64,

    /// Run deadline in seconds (0 disables it)
    pub run_timeout_secs: u64,

    /// Retries of transient assistant API failures
    pub max_retries: u32,

    /// Delay before the first retry in milliseconds
    pub retry_base_delay_ms: u64,

    /// Emit JSON log lines
    pub log_json: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            assistant_name: "sql-analyst".to_string(),
            results_dir: PathBuf::from("./agent_results"),
            poll_interval_ms: 500,
            run_timeout_secs: 600,
            max_retries: 3,
            retry_base_delay_ms: 1000,
            log_json: false,
        }
    }
}

impl AgentConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Returns the run deadline, `None` when disabled.
    pub fn run_deadline(&self) -> Option<Duration> {
        (self.run_timeout_secs > 0).then(|| Duration::from_secs(self.run_timeout_secs))
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }

    /// Validate agent configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_ms == 0 {
            return Err(ValidationError::InvalidPollInterval);
        }
        Ok(())
    }
}

/// `AGENT_*` variables as read from the environment
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawAgentConfig {
    assistant_name: Option<String>,
    results_dir: Option<String>,
    poll_interval_ms: Option<String>,
    run_timeout_secs: Option<String>,
    max_retries: Option<String>,
    retry_base_delay_ms: Option<String>,
    log_json: Option<String>,
}

impl RawAgentConfig {
    pub(super) fn resolve(self) -> Result<AgentConfig, ValidationError> {
        let defaults = AgentConfig::default();
        Ok(AgentConfig {
            assistant_name: optional(self.assistant_name).unwrap_or(defaults.assistant_name),
            results_dir: optional(self.results_dir)
                .map(PathBuf::from)
                .unwrap_or(defaults.results_dir),
            poll_interval_ms: parse_or(
                self.poll_interval_ms,
                "AGENT_POLL_INTERVAL_MS",
                defaults.poll_interval_ms,
            )?,
            run_timeout_secs: parse_or(
                self.run_timeout_secs,
                "AGENT_RUN_TIMEOUT_SECS",
                defaults.run_timeout_secs,
            )?,
            max_retries: parse_or(self.max_retries, "AGENT_MAX_RETRIES", defaults.max_retries)?,
            retry_base_delay_ms: parse_or(
                self.retry_base_delay_ms,
                "AGENT_RETRY_BASE_DELAY_MS",
                defaults.retry_base_delay_ms,
            )?,
            log_json: optional(self.log_json)
                .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(defaults.log_json),
        })
    }
}

//! OpenAI configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::{optional, parse_or};

/// OpenAI Assistants API configuration
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: Secret<String>,

    /// Model assigned to the assistant
    pub model: String,

    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl OpenAiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Exposes the API key for client construction.
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Validate OpenAI configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.model.trim().is_empty() {
            return Err(ValidationError::EmptyModel);
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ValidationError::InvalidBaseUrl(self.base_url.clone()));
        }
        Ok(())
    }
}

/// `OPENAI_*` variables as read from the environment
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawOpenAiConfig {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<String>,
}

impl RawOpenAiConfig {
    pub(super) fn resolve(
        self,
        missing: &mut Vec<&'static str>,
    ) -> Result<Option<OpenAiConfig>, ValidationError> {
        let timeout_secs = parse_or(self.timeout_secs, "OPENAI_TIMEOUT_SECS", 60)?;
        let Some(api_key) = super::required(self.api_key, "OPENAI_API_KEY", missing) else {
            return Ok(None);
        };
        Ok(Some(OpenAiConfig {
            api_key: Secret::new(api_key),
            model: optional(self.model).unwrap_or_else(|| "gpt-4-1106-preview".to_string()),
            base_url: optional(self.base_url)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            timeout_secs,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_with_key() -> RawOpenAiConfig {
        RawOpenAiConfig {
            api_key: Some("sk-test".into()),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_are_applied() {
        let mut missing = Vec::new();
        let config = raw_with_key().resolve(&mut missing).unwrap().unwrap();

        assert_eq!(config.model, "gpt-4-1106-preview");
        assert_eq!(config.base_url, "https://api.openai.com/v1");
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert_eq!(config.api_key(), "sk-test");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn missing_key_is_reported() {
        let mut missing = Vec::new();
        assert!(RawOpenAiConfig::default().resolve(&mut missing).unwrap().is_none());
        assert_eq!(missing, vec!["OPENAI_API_KEY"]);
    }

    #[test]
    fn api_key_is_redacted_in_debug() {
        let mut missing = Vec::new();
        let config = raw_with_key().resolve(&mut missing).unwrap().unwrap();
        assert!(!format!("{:?}", config).contains("sk-test"));
    }

    #[test]
    fn non_numeric_timeout_is_rejected() {
        let raw = RawOpenAiConfig {
            timeout_secs: Some("soon".into()),
            ..raw_with_key()
        };
        let mut missing = Vec::new();
        assert_eq!(
            raw.resolve(&mut missing).unwrap_err(),
            ValidationError::InvalidNumber {
                key: "OPENAI_TIMEOUT_SECS",
                value: "soon".into()
            }
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let mut missing = Vec::new();
        let mut config = raw_with_key().resolve(&mut missing).unwrap().unwrap();
        config.base_url = "api.openai.com".into();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidBaseUrl(_))
        ));
    }
}

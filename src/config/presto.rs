//! Presto connection configuration

use secrecy::Secret;
use serde::Deserialize;

use super::error::ValidationError;
use super::{optional, required};

/// Presto connection configuration
#[derive(Debug, Clone)]
pub struct PrestoConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub catalog: String,
    pub schema: String,
    /// `http` or `https`
    pub http_scheme: String,
    /// Enables basic authentication when set
    pub password: Option<Secret<String>>,
    /// Client tag sent as `X-Presto-Source`
    pub source: String,
}

impl PrestoConfig {
    /// Validate Presto configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort(self.port.to_string()));
        }
        if !matches!(self.http_scheme.as_str(), "http" | "https") {
            return Err(ValidationError::InvalidScheme(self.http_scheme.clone()));
        }
        Ok(())
    }
}

/// `PRESTO_*` variables as read from the environment
#[derive(Debug, Default, Deserialize)]
pub(super) struct RawPrestoConfig {
    host: Option<String>,
    port: Option<String>,
    user: Option<String>,
    catalog: Option<String>,
    schema: Option<String>,
    http_scheme: Option<String>,
    password: Option<String>,
    source: Option<String>,
}

impl RawPrestoConfig {
    /// Resolves the section, recording absent required keys in `missing`.
    pub(super) fn resolve(
        self,
        missing: &mut Vec<&'static str>,
    ) -> Result<Option<PrestoConfig>, ValidationError> {
        let host = required(self.host, "PRESTO_HOST", missing);
        let port = required(self.port, "PRESTO_PORT", missing);
        let user = required(self.user, "PRESTO_USER", missing);
        let catalog = required(self.catalog, "PRESTO_CATALOG", missing);
        let schema = required(self.schema, "PRESTO_SCHEMA", missing);
        let http_scheme = required(self.http_scheme, "PRESTO_HTTP_SCHEME", missing);

        let (Some(host), Some(port), Some(user), Some(catalog), Some(schema), Some(http_scheme)) =
            (host, port, user, catalog, schema, http_scheme)
        else {
            return Ok(None);
        };

        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|_| ValidationError::InvalidPort(port.clone()))?;

        Ok(Some(PrestoConfig {
            host,
            port,
            user,
            catalog,
            schema,
            http_scheme: http_scheme.to_lowercase(),
            password: optional(self.password).map(Secret::new),
            source: optional(self.source).unwrap_or_else(|| "sql-assistant".to_string()),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(scheme: &str, port: u16) -> PrestoConfig {
        PrestoConfig {
            host: "localhost".into(),
            port,
            user: "analyst".into(),
            catalog: "hive".into(),
            schema: "default".into(),
            http_scheme: scheme.into(),
            password: None,
            source: "sql-assistant".into(),
        }
    }

    #[test]
    fn accepts_http_and_https() {
        assert!(config("http", 8080).validate().is_ok());
        assert!(config("https", 443).validate().is_ok());
    }

    #[test]
    fn rejects_other_schemes() {
        assert_eq!(
            config("ftp", 8080).validate(),
            Err(ValidationError::InvalidScheme("ftp".into()))
        );
    }

    #[test]
    fn rejects_zero_port() {
        assert!(matches!(
            config("http", 0).validate(),
            Err(ValidationError::InvalidPort(_))
        ));
    }

    #[test]
    fn unparseable_port_is_invalid() {
        let raw = RawPrestoConfig {
            host: Some("h".into()),
            port: Some("eighty".into()),
            user: Some("u".into()),
            catalog: Some("c".into()),
            schema: Some("s".into()),
            http_scheme: Some("http".into()),
            ..Default::default()
        };
        let mut missing = Vec::new();
        assert_eq!(
            raw.resolve(&mut missing).unwrap_err(),
            ValidationError::InvalidPort("eighty".into())
        );
    }

    #[test]
    fn blank_password_is_ignored() {
        let raw = RawPrestoConfig {
            host: Some("h".into()),
            port: Some("8080".into()),
            user: Some("u".into()),
            catalog: Some("c".into()),
            schema: Some("s".into()),
            http_scheme: Some("HTTPS".into()),
            password: Some("  ".into()),
            source: None,
        };
        let mut missing = Vec::new();
        let config = raw.resolve(&mut missing).unwrap().unwrap();
        assert!(config.password.is_none());
        assert_eq!(config.http_scheme, "https");
        assert_eq!(config.source, "sql-assistant");
    }
}

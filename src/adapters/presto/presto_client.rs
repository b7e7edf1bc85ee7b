//! Presto Client - Implementation of SqlEngine over the Presto HTTP protocol.
//!
//! A statement is submitted with `POST /v1/statement`; the engine answers with
//! a page that may carry `columns`, `data` and a `nextUri`. The client keeps
//! following `nextUri` until it disappears, accumulating rows as it goes.
//!
//! # Configuration
//!
//! ```ignore
//! let client = PrestoClient::new(
//!     PrestoConnection::new("presto.internal", 8080, "analyst", "hive", "sales")
//!         .with_scheme("https")
//!         .with_password(password),
//! )?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use crate::ports::{QueryResult, SqlEngine, SqlEngineError};

/// Connection settings for a Presto coordinator.
#[derive(Debug, Clone)]
pub struct PrestoConnection {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub catalog: String,
    pub schema: String,
    /// Value of the `X-Presto-Source` header.
    pub source: String,
    password: Option<Secret<String>>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl PrestoConnection {
    /// Creates connection settings using plain http.
    pub fn new(
        host: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        catalog: impl Into<String>,
        schema: impl Into<String>,
    ) -> Self {
        Self {
            scheme: "http".to_string(),
            host: host.into(),
            port,
            user: user.into(),
            catalog: catalog.into(),
            schema: schema.into(),
            source: "sql-assistant".to_string(),
            password: None,
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the HTTP scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Enables basic authentication.
    pub fn with_password(mut self, password: Secret<String>) -> Self {
        self.password = Some(password);
        self
    }

    /// Sets the source header value.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Sets the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the statement endpoint.
    pub fn statement_url(&self) -> String {
        format!("{}://{}:{}/v1/statement", self.scheme, self.host, self.port)
    }
}

/// Presto HTTP client.
pub struct PrestoClient {
    connection: PrestoConnection,
    client: Client,
}

impl PrestoClient {
    /// Creates a new client.
    pub fn new(connection: PrestoConnection) -> Result<Self, SqlEngineError> {
        let client = Client::builder()
            .timeout(connection.timeout)
            .build()
            .map_err(|e| SqlEngineError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { connection, client })
    }

    /// Returns the connection settings.
    pub fn connection(&self) -> &PrestoConnection {
        &self.connection
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header("X-Presto-User", &self.connection.user)
            .header("X-Presto-Catalog", &self.connection.catalog)
            .header("X-Presto-Schema", &self.connection.schema)
            .header("X-Presto-Source", &self.connection.source);

        match &self.connection.password {
            Some(password) => builder.basic_auth(&self.connection.user, Some(password.expose_secret())),
            None => builder,
        }
    }

    async fn fetch(&self, request: RequestBuilder) -> Result<QueryPage, SqlEngineError> {
        let response = request
            .send()
            .await
            .map_err(|e| SqlEngineError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SqlEngineError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(SqlEngineError::Transport(format!(
                "Unexpected status {}: {}",
                status, body
            )));
        }

        serde_json::from_str(&body)
            .map_err(|e| SqlEngineError::Protocol(format!("Failed to parse page: {}", e)))
    }
}

#[async_trait]
impl SqlEngine for PrestoClient {
    async fn execute(&self, sql: &str) -> Result<QueryResult, SqlEngineError> {
        tracing::debug!(catalog = %self.connection.catalog, schema = %self.connection.schema, "Submitting statement");

        let submit = self.with_headers(
            self.client
                .post(self.connection.statement_url())
                .body(sql.to_string()),
        );
        let mut page = self.fetch(submit).await?;
        let mut result = QueryResult::default();
        let mut pages = 1usize;

        loop {
            let next = accumulate(page, &mut result)?;
            match next {
                Some(uri) => {
                    page = self.fetch(self.with_headers(self.client.get(uri))).await?;
                    pages += 1;
                }
                None => break,
            }
        }

        tracing::debug!(rows = result.rows.len(), pages, "Statement finished");
        Ok(result)
    }
}

/// Folds one page into `result` and returns the next URI to follow.
fn accumulate(page: QueryPage, result: &mut QueryResult) -> Result<Option<String>, SqlEngineError> {
    if let Some(error) = page.error {
        return Err(SqlEngineError::Query {
            name: error.error_name.unwrap_or_else(|| "UNKNOWN".to_string()),
            message: error.message.unwrap_or_default(),
        });
    }
    if result.columns.is_empty() {
        if let Some(columns) = page.columns {
            result.columns = columns.into_iter().map(|c| c.name).collect();
        }
    }
    if let Some(data) = page.data {
        result.rows.extend(data);
    }
    Ok(page.next_uri)
}

// ════════════════════════════════════════════════════════════════════════════════
// Wire Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryPage {
    #[serde(default)]
    next_uri: Option<String>,
    #[serde(default)]
    columns: Option<Vec<WireColumn>>,
    #[serde(default)]
    data: Option<Vec<Vec<Value>>>,
    #[serde(default)]
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct WireColumn {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(value: Value) -> QueryPage {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn statement_url_uses_scheme_host_and_port() {
        let connection =
            PrestoConnection::new("presto.local", 8443, "analyst", "hive", "sales").with_scheme("https");
        assert_eq!(connection.statement_url(), "https://presto.local:8443/v1/statement");
    }

    #[test]
    fn accumulates_rows_across_pages() {
        let mut result = QueryResult::default();

        let next = accumulate(
            page(json!({
                "id": "q1",
                "nextUri": "http://presto/v1/statement/q1/1",
                "stats": {"state": "QUEUED"}
            })),
            &mut result,
        )
        .unwrap();
        assert_eq!(next.as_deref(), Some("http://presto/v1/statement/q1/1"));

        let next = accumulate(
            page(json!({
                "id": "q1",
                "nextUri": "http://presto/v1/statement/q1/2",
                "columns": [{"name": "name", "type": "varchar"}, {"name": "total", "type": "bigint"}],
                "data": [["acme", 42]]
            })),
            &mut result,
        )
        .unwrap();
        assert!(next.is_some());

        let next = accumulate(
            page(json!({
                "id": "q1",
                "columns": [{"name": "name", "type": "varchar"}, {"name": "total", "type": "bigint"}],
                "data": [["globex", 7]]
            })),
            &mut result,
        )
        .unwrap();
        assert!(next.is_none());

        assert_eq!(result.columns, vec!["name", "total"]);
        assert_eq!(result.to_text(), "name,total\nacme,42\nglobex,7");
    }

    #[test]
    fn error_object_becomes_query_error() {
        let mut result = QueryResult::default();
        let err = accumulate(
            page(json!({
                "id": "q2",
                "error": {
                    "message": "line 1:8: Column 'x' cannot be resolved",
                    "errorCode": 47,
                    "errorName": "COLUMN_NOT_FOUND",
                    "errorType": "USER_ERROR"
                }
            })),
            &mut result,
        )
        .unwrap_err();

        assert_eq!(
            err,
            SqlEngineError::Query {
                name: "COLUMN_NOT_FOUND".into(),
                message: "line 1:8: Column 'x' cannot be resolved".into(),
            }
        );
    }

    #[test]
    fn password_is_not_printed() {
        let connection = PrestoConnection::new("h", 1, "u", "c", "s")
            .with_password(Secret::new("hunter2".to_string()));
        assert!(!format!("{:?}", connection).contains("hunter2"));
    }
}

//! JSON Data Sources
//!
//! HTTP client for pulling widget payloads from external APIs.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Anything that can produce a JSON payload for a URL
#[async_trait]
pub trait JsonSource: Send + Sync {
    /// Perform one retrieval attempt
    async fn fetch(&self, url: &str) -> Result<Value, FetchError>;
}

/// Configuration for the HTTP source
#[derive(Debug, Clone)]
pub struct HttpSourceConfig {
    /// Per-request timeout; `None` leaves it to the transport
    pub request_timeout: Option<Duration>,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for HttpSourceConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            user_agent: format!("finboard/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// `reqwest`-backed source: one GET per call, no retries, no auth
pub struct HttpSource {
    client: Client,
    config: HttpSourceConfig,
}

impl HttpSource {
    /// Create a new HTTP source with the given configuration
    pub fn new(config: HttpSourceConfig) -> Result<Self, FetchError> {
        let mut builder = Client::builder().user_agent(config.user_agent.clone());
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::from_reqwest)?;

        Ok(Self { client, config })
    }

    /// Get the current configuration
    pub fn config(&self) -> &HttpSourceConfig {
        &self.config
    }
}

#[async_trait]
impl JsonSource for HttpSource {
    async fn fetch(&self, url: &str) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::from_reqwest)?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }
}

/// Try a URL once before committing it to a widget
pub async fn probe(source: &dyn JsonSource, url: &str) -> Result<Value, FetchError> {
    let result = source.fetch(url).await;
    match &result {
        Ok(_) => tracing::info!(url, "Probe succeeded"),
        Err(e) => tracing::warn!(url, "Probe failed: {}", e),
    }
    result
}

/// Errors from a single retrieval attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// DNS, connection or transport failure
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// Upstream answered with a non-2xx status
    #[error("HTTP {status}: {reason}")]
    Status { status: u16, reason: String },

    /// Body was not valid JSON
    #[error("Invalid JSON: {0}")]
    Parse(String),
}

impl FetchError {
    fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpSourceConfig::default();
        assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));
        assert!(config.user_agent.starts_with("finboard/"));
    }

    #[test]
    fn test_source_without_timeout() {
        let source = HttpSource::new(HttpSourceConfig {
            request_timeout: None,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(source.config().request_timeout, None);
    }

    #[test]
    fn test_error_display() {
        let err = FetchError::Status {
            status: 503,
            reason: "Service Unavailable".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: Service Unavailable");
        assert_eq!(FetchError::Timeout.to_string(), "Request timed out");
    }
}

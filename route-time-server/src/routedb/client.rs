//! HTTP client for the published route database.

use serde_json::Value;

use super::error::RouteDbError;

/// Default location of the published route/stop/frequency database.
pub const DEFAULT_ROUTE_DB_URL: &str =
    "https://raw.githubusercontent.com/hkbus/hk-bus-crawling/refs/heads/gh-pages/routeFareList.min.json";

/// The upstream host rejects requests without a browser-like agent.
const USER_AGENT: &str = "Mozilla/5.0";

/// Configuration for the route database client.
#[derive(Debug, Clone)]
pub struct RouteDbClientConfig {
    /// URL of the JSON document
    pub url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl RouteDbClientConfig {
    /// Create a config for the given document URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: 120,
        }
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for RouteDbClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_ROUTE_DB_URL)
    }
}

/// Client that downloads the route database document.
#[derive(Debug, Clone)]
pub struct RouteDbClient {
    http: reqwest::Client,
    url: String,
}

impl RouteDbClient {
    /// Create a new client.
    pub fn new(config: RouteDbClientConfig) -> Result<Self, RouteDbError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            url: config.url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download the raw JSON document.
    pub async fn fetch_document(&self) -> Result<Value, RouteDbError> {
        let response = self.http.get(&self.url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouteDbError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| RouteDbError::Json {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = RouteDbClientConfig::default();
        assert_eq!(config.url, DEFAULT_ROUTE_DB_URL);
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn config_overrides() {
        let config = RouteDbClientConfig::new("http://localhost:8080/db.json").with_timeout(5);
        assert_eq!(config.url, "http://localhost:8080/db.json");
        assert_eq!(config.timeout_secs, 5);

        let client = RouteDbClient::new(config).unwrap();
        assert_eq!(client.url(), "http://localhost:8080/db.json");
    }
}

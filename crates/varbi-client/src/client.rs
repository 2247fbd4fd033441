use std::time::Duration;

use reqwest::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use serde_json::Value;
use url::Url;

use varbi_core::error::{Absent, AppError};
use varbi_core::traits::ApiClient;

pub const DEFAULT_BASE_URL: &str = "https://api.varbi.com/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const USER_AGENT: &str = concat!("varbi-mcp/", env!("CARGO_PKG_VERSION"));
const ACCEPT_LANGUAGE_VALUE: &str = "en, *;q=0.5";

/// Settings for [`ReqwestApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Varbi API client using reqwest.
///
/// Sends GET requests with fixed `User-Agent`, `Accept` and
/// `Accept-Language` headers and a total timeout. Connection failures,
/// timeouts, non-2xx statuses and undecodable bodies are logged and
/// returned as [`Absent`].
#[derive(Clone)]
pub struct ReqwestApiClient {
    client: Client,
    base_url: String,
}

impl ReqwestApiClient {
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, AppError> {
        let base_url = validate_base_url(&config.base_url)?;
        if config.timeout.is_zero() {
            return Err(AppError::ConfigError(
                "Request timeout must be greater than zero".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
        );

        let client = Client::builder()
            .user_agent(config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpClient(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl ApiClient for ReqwestApiClient {
    async fn fetch(&self, resource: &str) -> Result<Value, Absent> {
        let url = format!("{}{}", self.base_url, resource);
        tracing::debug!(%url, "GET");

        let response = self.client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!(%url, "Upstream request timed out");
            } else if e.is_connect() {
                tracing::warn!(%url, error = %e, "Upstream connection failed");
            } else {
                tracing::warn!(%url, error = %e, "Upstream request failed");
            }
            Absent
        })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%url, status = status.as_u16(), "Upstream returned error status");
            return Err(Absent);
        }

        response.json::<Value>().await.map_err(|e| {
            tracing::warn!(%url, error = %e, "Upstream body is not valid JSON");
            Absent
        })
    }
}

/// Parse the base URL and strip any trailing slash.
///
/// Only `http` and `https` are accepted.
fn validate_base_url(base_url: &str) -> Result<String, AppError> {
    let parsed = Url::parse(base_url)
        .map_err(|e| AppError::ConfigError(format!("Invalid base URL '{base_url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => {
            return Err(AppError::ConfigError(format!(
                "Base URL scheme '{scheme}' is not allowed (only http/https)"
            )));
        }
    }

    if parsed.host_str().is_none() {
        return Err(AppError::ConfigError(format!(
            "Base URL '{base_url}' has no host"
        )));
    }

    Ok(base_url.trim_end_matches('/').to_string())
}

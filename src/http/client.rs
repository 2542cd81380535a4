//! HTTP request executor
//!
//! Issues a single request and classifies the response:
//! - an `error` response header is an authentication failure, whatever the status
//! - a non-success status is an HTTP error
//! - no answer within the configured timeout is a timeout
//!
//! There are no retries at this layer. Every failure goes back to the caller.

use crate::error::{Error, Result};
use crate::types::{JsonValue, Method, StringMap};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Response};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Response header the vendor sets when a token is rejected
const ERROR_HEADER: &str = "error";
/// Companion header carrying the human-readable reason
const ERROR_DESCRIPTION_HEADER: &str = "error_description";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: HashMap<String, String>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            default_headers: HashMap::new(),
            user_agent: format!("inventory-fetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// A single API call: method, path and everything that rides along
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the base URL, or an absolute URL
    pub path: String,
    /// Query parameters, in insertion order
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: StringMap,
    /// Request body (JSON)
    pub body: Option<JsonValue>,
}

impl ApiRequest {
    /// Create a request for a method and path
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set a query parameter, replacing any previous value for the key
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_query(key, value);
        self
    }

    /// Set a query parameter in place, replacing any previous value for the key
    pub fn set_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.query.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.query.push((key, value)),
        }
    }

    /// Look up a query parameter
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add every header from a map
    #[must_use]
    pub fn headers(mut self, headers: &StringMap) -> Self {
        for (key, value) in headers {
            self.headers.insert(key.clone(), value.clone());
        }
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }
}

/// Something that can perform an [`ApiRequest`] and hand back its JSON body
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Perform the request and return the parsed JSON body
    async fn execute(&self, request: &ApiRequest) -> Result<JsonValue>;
}

/// HTTP client backed by a single shared connection pool
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self { client, config })
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Send a request and return the raw response after classification
    pub async fn send(&self, request: &ApiRequest) -> Result<Response> {
        let full_url = self.build_url(&request.path);
        let mut req = self
            .client
            .request(request.method.into(), &full_url)
            .timeout(self.config.timeout);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &request.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !request.query.is_empty() {
            req = req.query(&request.query);
        }
        if let Some(ref body) = request.body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| self.classify_transport(e))?;

        if let Some(message) = auth_error_message(response.headers()) {
            debug!("Auth error header on {} {}", request.method, full_url);
            return Err(Error::auth(message));
        }

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::http_status(status.as_u16(), body));
        }

        debug!("Request succeeded: {} {}", request.method, full_url);
        Ok(response)
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                format!("{base}/{path}")
            }
            None => path.to_string(),
        }
    }

    fn classify_transport(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            Error::Http(err)
        }
    }
}

#[async_trait]
impl RequestExecutor for HttpClient {
    async fn execute(&self, request: &ApiRequest) -> Result<JsonValue> {
        let response = self.send(request).await?;
        let text = response
            .text()
            .await
            .map_err(|e| self.classify_transport(e))?;
        serde_json::from_str(&text)
            .map_err(|e| Error::decode(format!("Response from {} is not JSON: {e}", request.path)))
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("base_url", &self.config.base_url)
            .field("timeout", &self.config.timeout)
            .finish_non_exhaustive()
    }
}

/// Extract the auth failure message when the vendor error header is present
fn auth_error_message(headers: &HeaderMap) -> Option<String> {
    let error = headers.get(ERROR_HEADER)?;
    let error = error.to_str().unwrap_or("unknown error");
    let message = match headers
        .get(ERROR_DESCRIPTION_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        Some(description) => format!("{error}: {description}"),
        None => error.to_string(),
    };
    Some(message)
}

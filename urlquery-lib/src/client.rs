//! HTTP transport for the urlquery API.
//!
//! `UrlqueryClient` owns the base URL, credentials and a pooled reqwest
//! client. It builds requests with the standard headers and executes them;
//! classifying and decoding the response is left to [`crate::decode`].

use crate::error::UrlqueryError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_ENCODING, CONTENT_TYPE, USER_AGENT};
use reqwest::{Method, Request, Response};
use std::collections::BTreeMap;
use std::time::Duration;

/// Public API endpoint used when no gateway override is given.
pub const DEFAULT_BASE_URL: &str = "https://api.urlquery.net";

/// Client-wide request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "x-apikey";

/// User agent sent with every API call.
pub fn default_user_agent() -> String {
    format!(
        "urlquery-cli/{} (+https://github.com/urlquery/urlquery-cli)",
        env!("CARGO_PKG_VERSION")
    )
}

/// Settings used to build a [`UrlqueryClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
    /// Extra headers added to every request
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: default_user_agent(),
            timeout: DEFAULT_TIMEOUT,
            headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Set the API key. An empty key means unauthenticated.
    pub fn with_api_key<K: Into<String>>(mut self, key: K) -> Self {
        let key = key.into();
        self.api_key = if key.is_empty() { None } else { Some(key) };
        self
    }

    /// Point the client at an alternate gateway. Trailing slashes are dropped.
    pub fn with_base_url<U: Into<String>>(mut self, base_url: U) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Apply one option on top of the current settings.
    pub fn apply(self, option: ClientOption) -> Self {
        match option {
            ClientOption::ApiKey(key) => self.with_api_key(key),
            ClientOption::BaseUrl(url) => self.with_base_url(url),
            ClientOption::UserAgent(ua) => self.with_user_agent(ua),
            ClientOption::Timeout(timeout) => self.with_timeout(timeout),
            ClientOption::Header(name, value) => self.with_header(name, value),
        }
    }
}

/// Composable client options, applied in order; later options win.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientOption {
    ApiKey(String),
    BaseUrl(String),
    UserAgent(String),
    Timeout(Duration),
    Header(String, String),
}

/// API key authentication.
pub fn api_key<K: Into<String>>(key: K) -> ClientOption {
    ClientOption::ApiKey(key.into())
}

/// Custom API gateway.
pub fn base_url<U: Into<String>>(url: U) -> ClientOption {
    ClientOption::BaseUrl(url.into())
}

/// Client for the urlquery public API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct UrlqueryClient {
    http_client: reqwest::Client,
    config: ClientConfig,
    /// Pre-built standard + custom headers
    headers: HeaderMap,
}

impl UrlqueryClient {
    /// Create a client with default settings: public endpoint, no API key.
    pub fn new() -> Result<Self, UrlqueryError> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a client from a list of options applied over the defaults.
    ///
    /// ```rust,no_run
    /// use urlquery_lib::{api_key, base_url, UrlqueryClient};
    ///
    /// let client = UrlqueryClient::with_options([
    ///     api_key("my-key"),
    ///     base_url("https://gateway.internal"),
    /// ])?;
    /// # Ok::<(), urlquery_lib::UrlqueryError>(())
    /// ```
    pub fn with_options<I>(options: I) -> Result<Self, UrlqueryError>
    where
        I: IntoIterator<Item = ClientOption>,
    {
        let config = options
            .into_iter()
            .fold(ClientConfig::default(), ClientConfig::apply);
        Self::with_config(config)
    }

    /// Create a client from explicit settings.
    pub fn with_config(config: ClientConfig) -> Result<Self, UrlqueryError> {
        reqwest::Url::parse(&config.base_url).map_err(|e| {
            UrlqueryError::request(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;

        let headers = build_headers(&config)?;

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                UrlqueryError::network_with_source("Failed to create HTTP client", e.to_string())
            })?;

        Ok(Self {
            http_client,
            config,
            headers,
        })
    }

    /// Settings this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Build a request for `base_url + path` with the standard headers.
    pub fn new_request(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Request, UrlqueryError> {
        let url = format!("{}{}", self.config.base_url, path);

        let mut builder = self
            .http_client
            .request(method, &url)
            .headers(self.headers.clone());

        if let Some(body) = body {
            builder = builder.body(body);
        }

        builder
            .build()
            .map_err(|e| UrlqueryError::request(format!("{} ({})", e, url)))
    }

    /// Execute a request. Transport failures are returned as-is, no status
    /// interpretation happens here.
    pub async fn execute(&self, request: Request) -> Result<Response, UrlqueryError> {
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "sending request");

        let response = self.http_client.execute(request).await.map_err(|e| {
            tracing::debug!(%method, %url, error = %e, "request failed");
            UrlqueryError::from(e)
        })?;

        tracing::debug!(%method, %url, status = %response.status(), "received response");
        Ok(response)
    }

    /// Build and execute in one step.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response, UrlqueryError> {
        let request = self.new_request(method, path, body)?;
        self.execute(request).await
    }
}

fn build_headers(config: &ClientConfig) -> Result<HeaderMap, UrlqueryError> {
    let mut headers = HeaderMap::new();

    if let Some(key) = &config.api_key {
        let value = HeaderValue::from_str(key)
            .map_err(|_| UrlqueryError::request("API key contains invalid header characters"))?;
        headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
    }

    let user_agent = HeaderValue::from_str(&config.user_agent)
        .map_err(|_| UrlqueryError::request("User agent contains invalid header characters"))?;
    headers.insert(USER_AGENT, user_agent);
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| UrlqueryError::request(format!("Invalid header name '{}'", name)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| UrlqueryError::request(format!("Invalid value for header '{}'", name)))?;
        headers.insert(name, value);
    }

    Ok(headers)
}

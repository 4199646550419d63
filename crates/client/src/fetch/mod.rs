//! Network layer of the offline worker.
//!
//! ### Requests and responses
//! - `Request` carries method, normalized URL and headers; its identity
//!   (method + URL) is the cache key.
//! - `Response` is fully buffered so it can be returned to the page and
//!   copied into a store without re-reading the body.
//!
//! ### Failure model
//! - Transport failures (connect, TLS, timeout, body read) are errors.
//! - Every HTTP status, including 4xx/5xx, is a successful fetch.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, normalize, resolve, resolve_http};

use vidshell_core::{CachedResponse, Error, RequestKey};

/// An outgoing request intercepted by the worker.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
}

impl Request {
    /// Build a request; the URL is normalized (lowercase host, no fragment).
    pub fn new(method: Method, url: Url) -> Result<Self, Error> {
        let url = normalize(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self { method, url, headers: HeaderMap::new() })
    }

    pub fn get(url: Url) -> Result<Self, Error> {
        Self::new(Method::GET, url)
    }

    /// Add a header, rejecting names or values that are not valid HTTP.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, Error> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid header name {name:?}: {e}")))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| Error::InvalidInput(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Whether the `Accept` header asks for an HTML document (a navigation).
    pub fn accepts_html(&self) -> bool {
        self.headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains("text/html"))
    }

    /// Cache identity of this request.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(self.method.as_str(), self.url.as_str())
    }
}

/// A buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// Final URL after redirects; `None` for synthetic responses.
    pub url: Option<Url>,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Response {
    /// A locally generated plain-text response.
    pub fn synthetic(status: StatusCode, body: impl Into<String>) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
        Self { url: None, status, headers, body: Bytes::from(body.into()) }
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok())
    }

    /// Copy of this response in store form.
    ///
    /// Header values that are not visible ASCII are dropped.
    pub fn to_cached(&self) -> CachedResponse {
        CachedResponse {
            status: self.status.as_u16(),
            status_text: self.status.canonical_reason().unwrap_or_default().to_string(),
            headers: self
                .headers
                .iter()
                .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
                .collect(),
            body: self.body.to_vec(),
        }
    }

    /// Rebuild a response from a stored entry.
    pub fn from_cached(url: &Url, cached: CachedResponse) -> Result<Self, Error> {
        let status = StatusCode::from_u16(cached.status)
            .map_err(|e| Error::InvalidInput(format!("stored status {}: {e}", cached.status)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &cached.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::debug!("skipping malformed stored header {}", name),
            }
        }

        Ok(Self { url: Some(url.clone()), status, headers, body: Bytes::from(cached.body) })
    }
}

/// Source of live responses.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request. Only transport failures are errors.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "vidshell/0.1")
    pub user_agent: String,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "vidshell/0.1".to_string(), timeout: Duration::from_millis(20000), max_redirects: 5 }
    }
}

impl FetchConfig {
    /// Fetch settings derived from the application configuration.
    pub fn from_app(config: &vidshell_core::AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), ..Default::default() }
    }
}

/// HTTP client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() { Error::FetchTimeout(err.to_string()) } else { Error::Network(err.to_string()) }
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let response = self
            .http
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let body = response.bytes().await.map_err(transport_error)?;

        tracing::debug!(
            "fetched {} {} -> {} {} in {}ms ({} bytes)",
            request.method,
            request.url,
            final_url,
            status.as_u16(),
            start.elapsed().as_millis(),
            body.len()
        );

        Ok(Response { url: Some(final_url), status, headers, body })
    }
}

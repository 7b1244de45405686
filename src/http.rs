//! The HTTP primitive used by news providers.
//!
//! Providers never talk to `reqwest` directly. They describe a request as an
//! [`HttpRequest`] and hand it to an [`HttpClient`], which lets tests swap in
//! a fake transport and count calls.

use crate::error::ProviderError;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};
use url::Url;

/// Default per-request timeout for provider calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Make `url` usable as a base for [`Url::join`].
///
/// `join` replaces the last path segment unless the path ends in `/`, so
/// `https://api.example/v1` would silently lose `v1`. This appends the slash.
pub fn base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// A GET request to a provider endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: Url,
    pub query: Vec<(&'static str, String)>,
    pub headers: Vec<(&'static str, String)>,
    pub timeout: Duration,
}

impl HttpRequest {
    pub fn get(url: Url, timeout: Duration) -> Self {
        Self {
            url,
            query: Vec::new(),
            headers: Vec::new(),
            timeout,
        }
    }

    pub fn query(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.query.push((key, value.into()));
        self
    }

    pub fn header(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((key, value.into()));
        self
    }

    /// Value of a query parameter, if set.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// A response with its status code and raw body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal request/response transport.
///
/// Transport failures (DNS, connect, timeout) are reported as
/// [`ProviderError::Network`]. Any HTTP status is returned as a response.
pub trait HttpClient {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError>;
}

/// [`HttpClient`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestHttp {
    client: reqwest::Client,
}

impl ReqwestHttp {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpClient for ReqwestHttp {
    #[instrument(level = "debug", skip_all, fields(url = %request.url))]
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError> {
        let t0 = Instant::now();
        let mut builder = self
            .client
            .get(request.url)
            .query(&request.query)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(*name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        debug!(
            status,
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Provider responded"
        );
        Ok(HttpResponse { status, body })
    }
}

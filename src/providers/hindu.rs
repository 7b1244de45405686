//! The Hindu national news, served through RapidAPI.
//!
//! This provider ignores the topic and returns its latest items. Records live
//! under `data`, and every article is attributed to "The Hindu".

use super::text_at;
use crate::error::ProviderError;
use crate::http::{DEFAULT_REQUEST_TIMEOUT, HttpRequest, base_url};
use crate::models::ProviderRecord;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://the-hindu-national-news.p.rapidapi.com/";
pub const DEFAULT_HOST: &str = "the-hindu-national-news.p.rapidapi.com";

/// Display name and default author for every record.
pub const SOURCE_NAME: &str = "The Hindu";

#[derive(Debug, Clone)]
pub struct TheHindu {
    base_url: Url,
    api_key: String,
    host: String,
    timeout: Duration,
}

impl TheHindu {
    pub fn new(base: Url, api_key: String) -> Self {
        Self {
            base_url: base_url(base),
            api_key,
            host: DEFAULT_HOST.to_string(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override the `X-RapidAPI-Host` header.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(super) fn request(&self) -> Result<HttpRequest, ProviderError> {
        let url = self.base_url.join("api/news")?;
        Ok(HttpRequest::get(url, self.timeout)
            .header("X-RapidAPI-Key", self.api_key.as_str())
            .header("X-RapidAPI-Host", self.host.as_str()))
    }
}

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    data: Option<Vec<Value>>,
}

/// Map a response body into provider records, one per item under `data`.
///
/// Fields of the wrong type are treated as missing.
pub(super) fn extract(body: &str) -> Result<Vec<ProviderRecord>, ProviderError> {
    let response: NewsResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    Ok(response
        .data
        .unwrap_or_default()
        .iter()
        .map(|article| ProviderRecord {
            title: text_at(article, &["title"]),
            url: text_at(article, &["url"]),
            source: Some(SOURCE_NAME.to_string()),
            published_at: text_at(article, &["published_date"]),
            description: text_at(article, &["description"]),
            image_url: text_at(article, &["image_url"]),
            author: Some(text_at(article, &["author"]).unwrap_or_else(|| SOURCE_NAME.to_string())),
        })
        .collect())
}

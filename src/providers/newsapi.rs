//! NewsAPI keyword search.
//!
//! Queries [`/v2/everything`](https://newsapi.org/docs/endpoints/everything)
//! for the topic, newest first. Records live under `articles`:
//!
//! ```json
//! {"status": "ok", "articles": [{"source": {"name": "..."}, "author": "...",
//!   "title": "...", "description": "...", "url": "...", "urlToImage": "...",
//!   "publishedAt": "2025-05-06T14:30:00Z"}]}
//! ```

use super::{non_blank, text_at};
use crate::error::ProviderError;
use crate::http::{DEFAULT_REQUEST_TIMEOUT, HttpRequest, base_url};
use crate::models::ProviderRecord;
use crate::normalize::UNKNOWN_SOURCE;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://newsapi.org/";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_LANGUAGE: &str = "en";

/// Author used when NewsAPI has no byline.
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// NewsAPI provider settings.
#[derive(Debug, Clone)]
pub struct NewsApi {
    base_url: Url,
    api_key: String,
    page_size: u32,
    language: String,
    sources: Option<String>,
    timeout: Duration,
}

impl NewsApi {
    pub fn new(base: Url, api_key: String) -> Self {
        Self {
            base_url: base_url(base),
            api_key,
            page_size: DEFAULT_PAGE_SIZE,
            language: DEFAULT_LANGUAGE.to_string(),
            sources: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Restrict results to a comma-separated list of NewsAPI source ids.
    pub fn with_sources(mut self, sources: Option<String>) -> Self {
        self.sources = non_blank(sources);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(super) fn request(&self, topic: &str) -> Result<HttpRequest, ProviderError> {
        let url = self.base_url.join("v2/everything")?;
        let mut request = HttpRequest::get(url, self.timeout)
            .query("q", topic)
            .query("apiKey", self.api_key.as_str())
            .query("language", self.language.as_str())
            .query("pageSize", self.page_size.to_string())
            .query("sortBy", "publishedAt");
        if let Some(sources) = &self.sources {
            request = request.query("sources", sources.as_str());
        }
        Ok(request)
    }
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Option<Vec<Value>>,
}

/// Map a NewsAPI response body into provider records.
///
/// Only the envelope must have the expected shape. Each article is read
/// field by field, and fields of the wrong type are treated as missing.
pub(super) fn extract(body: &str) -> Result<Vec<ProviderRecord>, ProviderError> {
    let response: EverythingResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

    if response.status.as_deref() == Some("error") {
        return Err(ProviderError::Rejected(
            response.message.unwrap_or_else(|| "unspecified error".to_string()),
        ));
    }

    Ok(response
        .articles
        .unwrap_or_default()
        .iter()
        .map(|article| ProviderRecord {
            title: text_at(article, &["title"]),
            url: text_at(article, &["url"]),
            source: Some(
                text_at(article, &["source", "name"]).unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            ),
            published_at: text_at(article, &["publishedAt"]),
            description: text_at(article, &["description"]),
            image_url: text_at(article, &["urlToImage"]),
            author: Some(text_at(article, &["author"]).unwrap_or_else(|| DEFAULT_AUTHOR.to_string())),
        })
        .collect())
}

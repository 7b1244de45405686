//! News providers and the per-provider fetch.
//!
//! Each provider is a variant of the closed [`Provider`] enum. A provider
//! knows three things:
//!
//! 1. **Endpoint**: where to send the request
//! 2. **Query mapping**: how the topic and credentials become request parameters
//! 3. **Field mapping**: where title, url, date and friends live in its JSON
//!
//! # Supported Providers
//!
//! | Provider | Module | Topic | Records under |
//! |----------|--------|-------|---------------|
//! | NewsAPI | [`newsapi`] | keyword search (`q`) | `articles` |
//! | The Hindu (RapidAPI) | [`hindu`] | ignored, latest national news | `data` |
//!
//! # Failure Policy
//!
//! [`Provider::fetch`] never returns an error. Network failures, non-2xx
//! statuses and bodies that do not match the expected shape are logged and
//! produce an empty list, so one broken provider cannot sink the aggregate.

pub mod hindu;
pub mod newsapi;

use crate::error::ProviderError;
use crate::http::{HttpClient, HttpRequest};
use crate::models::{Article, ProviderRecord};
use crate::normalize::normalize;
use crate::utils::truncate_for_log;
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

pub use hindu::TheHindu;
pub use newsapi::NewsApi;

/// A configured news provider.
#[derive(Debug, Clone)]
pub enum Provider {
    NewsApi(NewsApi),
    TheHindu(TheHindu),
}

impl Provider {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Provider::NewsApi(_) => "newsapi",
            Provider::TheHindu(_) => "the_hindu",
        }
    }

    fn request(&self, topic: &str) -> Result<HttpRequest, ProviderError> {
        match self {
            Provider::NewsApi(p) => p.request(topic),
            Provider::TheHindu(p) => p.request(),
        }
    }

    fn extract(&self, body: &str) -> Result<Vec<ProviderRecord>, ProviderError> {
        match self {
            Provider::NewsApi(_) => newsapi::extract(body),
            Provider::TheHindu(_) => hindu::extract(body),
        }
    }

    /// Fetch and normalize this provider's articles for `topic`.
    ///
    /// Records the normalizer rejects are dropped. Any failure is logged and
    /// yields an empty list.
    #[instrument(level = "info", skip_all, fields(provider = self.name(), %topic))]
    pub async fn fetch<H: HttpClient>(&self, http: &H, topic: &str, sentences: usize) -> Vec<Article> {
        let t0 = Instant::now();
        let records = match self.fetch_records(http, topic).await {
            Ok(records) => records,
            Err(e) => {
                warn!(
                    provider = self.name(),
                    error = %e,
                    elapsed_ms = t0.elapsed().as_millis() as u64,
                    "Provider fetch failed; continuing without it"
                );
                return Vec::new();
            }
        };

        let raw_count = records.len();
        let articles: Vec<Article> = records
            .into_iter()
            .filter_map(|record| normalize(record, sentences))
            .collect();

        info!(
            provider = self.name(),
            raw = raw_count,
            kept = articles.len(),
            dropped = raw_count - articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched provider articles"
        );
        articles
    }

    async fn fetch_records<H: HttpClient>(
        &self,
        http: &H,
        topic: &str,
    ) -> Result<Vec<ProviderRecord>, ProviderError> {
        let request = self.request(topic)?;
        debug!(url = %request.url, "Requesting provider");

        let response = http.get(request).await?;
        if !response.is_success() {
            return Err(ProviderError::Status {
                status: response.status,
                body: truncate_for_log(&response.body, 300),
            });
        }
        self.extract(&response.body)
    }
}

/// Treat JSON `null`, missing and blank strings alike.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// String found by walking `path` into one provider record.
///
/// Anything that is not a non-blank string (a number, an object, `null`)
/// counts as missing, so an odd field never costs more than its own record.
pub(crate) fn text_at(record: &Value, path: &[&str]) -> Option<String> {
    let mut current = record;
    for key in path {
        current = current.get(key)?;
    }
    non_blank(current.as_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeHttp, FakeReply};
    use serde_json::json;
    use url::Url;

    fn newsapi() -> Provider {
        Provider::NewsApi(NewsApi::new(
            Url::parse("https://newsapi.example/").unwrap(),
            "news-key".to_string(),
        ))
    }

    fn hindu() -> Provider {
        Provider::TheHindu(TheHindu::new(
            Url::parse("https://hindu.example/").unwrap(),
            "rapid-key".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_fetch_normalizes_and_drops_incomplete_records() {
        let http = FakeHttp::new().route(
            "/v2/everything",
            FakeReply::json(
                200,
                json!({
                    "status": "ok",
                    "articles": [
                        {"title": "Kept", "url": "https://a.example/1", "source": {"name": "A"},
                         "publishedAt": "2025-05-06T10:00:00Z", "description": "One. Two."},
                        {"title": "", "url": "https://a.example/2"},
                        {"title": "No url", "url": null}
                    ]
                }),
            ),
        );

        let articles = newsapi().fetch(&http, "Technology", 3).await;
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Kept");
        assert_eq!(articles[0].source, "A");
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn test_network_failure_degrades_to_empty() {
        let http = FakeHttp::new().route("/v2/everything", FakeReply::NetworkDown);
        assert!(newsapi().fetch(&http, "Technology", 3).await.is_empty());
        assert_eq!(http.calls(), 1);
    }

    #[tokio::test]
    async fn test_error_status_degrades_to_empty() {
        let http = FakeHttp::new().route(
            "/api/news",
            FakeReply::json(429, json!({"message": "Too many requests"})),
        );
        assert!(hindu().fetch(&http, "ignored", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_degrades_to_empty() {
        let http = FakeHttp::new().route("/api/news", FakeReply::text(200, "<html>oops</html>"));
        assert!(hindu().fetch(&http, "ignored", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_route_is_a_network_failure() {
        let http = FakeHttp::new();
        assert!(newsapi().fetch(&http, "Technology", 3).await.is_empty());
        assert_eq!(http.calls(), 1);
    }

    #[test]
    fn test_provider_names() {
        assert_eq!(newsapi().name(), "newsapi");
        assert_eq!(hindu().name(), "the_hindu");
    }

    #[test]
    fn test_text_at_ignores_non_strings() {
        let record = json!({"title": 12345, "url": "https://a.example", "source": {"name": "Wire"},
                            "author": "  ", "tags": ["x"]});
        assert_eq!(text_at(&record, &["title"]), None);
        assert_eq!(text_at(&record, &["url"]).as_deref(), Some("https://a.example"));
        assert_eq!(text_at(&record, &["source", "name"]).as_deref(), Some("Wire"));
        assert_eq!(text_at(&record, &["source", "id"]), None);
        assert_eq!(text_at(&record, &["author"]), None);
        assert_eq!(text_at(&record, &["tags"]), None);
        assert_eq!(text_at(&json!("just a string"), &["title"]), None);
    }

    #[tokio::test]
    async fn test_odd_record_does_not_sink_its_neighbours() {
        let http = FakeHttp::new().route(
            "/v2/everything",
            FakeReply::json(
                200,
                json!({
                    "status": "ok",
                    "articles": [
                        {"title": "Good", "url": "https://a.example/1", "publishedAt": "2025-05-06T10:00:00Z"},
                        {"title": 12345, "url": "https://a.example/2"},
                        "not an object",
                        {"title": "Also good", "url": "https://a.example/3", "description": ["odd"]}
                    ]
                }),
            ),
        );

        let articles = newsapi().fetch(&http, "Technology", 3).await;
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["Good", "Also good"]);
        assert_eq!(articles[1].summary, crate::normalize::SUMMARY_FALLBACK);
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_blank(Some("  ".to_string())), None);
        assert_eq!(non_blank(None), None);
    }
}

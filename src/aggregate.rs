//! Concurrent fetch across providers, merged into one ordered article set.
//!
//! All providers run at once, one future per provider, and the aggregate
//! waits for every one of them. The merged list is ordered by publication
//! time, newest first. Completion order never affects the result: lists are
//! collected in provider order, and the sort is stable.
//!
//! Cross-provider duplicates are kept by default, so the same story from two
//! providers appears twice. [`AggregateOptions::dedup_urls`] drops later
//! copies of a URL instead.

use crate::http::HttpClient;
use crate::models::Article;
use crate::normalize::DEFAULT_SUMMARY_SENTENCES;
use crate::providers::Provider;
use futures::stream::{self, StreamExt};
use itertools::Itertools;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Options applied to every aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Sentences kept in each article summary.
    pub summary_sentences: usize,
    /// Drop articles whose URL was already seen.
    pub dedup_urls: bool,
    /// Upper bound on the whole fan-out. Providers still running when it
    /// passes contribute nothing.
    pub deadline: Option<Duration>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            dedup_urls: false,
            deadline: None,
        }
    }
}

/// Fans a topic out to every configured provider.
#[derive(Debug)]
pub struct Aggregator<H> {
    http: H,
    providers: Vec<Provider>,
    options: AggregateOptions,
}

impl<H: HttpClient> Aggregator<H> {
    pub fn new(http: H, providers: Vec<Provider>, options: AggregateOptions) -> Self {
        Self { http, providers, options }
    }

    /// Fetch `topic` from all providers and merge the results.
    ///
    /// # Arguments
    ///
    /// * `topic` - An already validated, trimmed topic
    ///
    /// # Returns
    ///
    /// Every normalized article from the providers that answered in time,
    /// newest first. Failed or late providers contribute nothing, so an
    /// empty vector is a valid outcome rather than an error.
    #[instrument(level = "info", skip_all, fields(%topic, providers = self.providers.len()))]
    pub async fn aggregate(&self, topic: &str) -> Vec<Article> {
        if self.providers.is_empty() {
            warn!("No providers configured");
            return Vec::new();
        }

        let t0 = Instant::now();
        let sentences = self.options.summary_sentences;
        let deadline = self.options.deadline;

        let lists: Vec<Vec<Article>> = stream::iter(self.providers.iter())
            .map(|provider| async move {
                let fetch = provider.fetch(&self.http, topic, sentences);
                match deadline {
                    None => fetch.await,
                    Some(limit) => match tokio::time::timeout(limit, fetch).await {
                        Ok(articles) => articles,
                        Err(_) => {
                            warn!(
                                provider = provider.name(),
                                deadline_ms = limit.as_millis() as u64,
                                "Provider missed the aggregate deadline; continuing without it"
                            );
                            Vec::new()
                        }
                    },
                }
            })
            .buffered(self.providers.len())
            .collect()
            .await;

        let fetched: usize = lists.iter().map(Vec::len).sum();
        let articles = merge(lists, self.options.dedup_urls);

        info!(
            fetched,
            merged = articles.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Aggregated provider articles"
        );
        articles
    }
}

/// Concatenate per-provider lists and order them newest first.
///
/// Equal timestamps keep provider order. With `dedup_urls`, only the first
/// occurrence of each URL after sorting survives.
pub fn merge(lists: Vec<Vec<Article>>, dedup_urls: bool) -> Vec<Article> {
    let mut articles: Vec<Article> = lists.into_iter().flatten().collect();
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    if dedup_urls {
        articles = articles
            .into_iter()
            .unique_by(|article| article.url.clone())
            .collect();
    }
    articles
}

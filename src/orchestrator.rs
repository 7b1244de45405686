//! Entry point of the pipeline: topic in, articles and summary out.

use crate::aggregate::Aggregator;
use crate::assistants::AssistantsApi;
use crate::error::InputError;
use crate::http::HttpClient;
use crate::job::{JobSettings, SummarizationJob};
use crate::models::{Article, NewsDigest, SummaryOutcome};
use std::fmt::Write;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Composes aggregation and summarization for one topic at a time.
///
/// Summarization is optional. Without an assistants client, digests carry
/// [`SummaryOutcome::Skipped`].
pub struct Orchestrator<H, A> {
    aggregator: Aggregator<H>,
    assistants: Option<A>,
    job_settings: JobSettings,
    cancel: CancellationToken,
}

impl<H: HttpClient, A: AssistantsApi> Orchestrator<H, A> {
    pub fn new(
        aggregator: Aggregator<H>,
        assistants: Option<A>,
        job_settings: JobSettings,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            aggregator,
            assistants,
            job_settings,
            cancel,
        }
    }

    /// Fetch, merge and summarize the news for `topic`.
    ///
    /// # Arguments
    ///
    /// * `topic` - The search topic; surrounding whitespace is ignored
    ///
    /// # Returns
    ///
    /// A [`NewsDigest`] with the merged articles, newest first, and the
    /// [`SummaryOutcome`]. A summary failure, timeout or cancellation is
    /// reported inside the digest and never drops the articles.
    ///
    /// # Errors
    ///
    /// [`InputError::TopicRequired`] for a blank topic, before any request
    /// is made.
    #[instrument(level = "info", skip_all, fields(topic = %topic.trim()))]
    pub async fn handle(&self, topic: &str) -> Result<NewsDigest, InputError> {
        let topic = topic.trim();
        if topic.is_empty() {
            warn!("Rejected empty topic");
            return Err(InputError::TopicRequired);
        }

        let articles = self.aggregator.aggregate(topic).await;
        if articles.is_empty() {
            info!("No articles found for topic");
            return Ok(NewsDigest {
                topic: topic.to_string(),
                articles,
                summary: SummaryOutcome::NoArticles,
            });
        }

        let summary = match &self.assistants {
            None => {
                info!(count = articles.len(), "Summarization not configured; returning articles only");
                SummaryOutcome::Skipped
            }
            Some(api) => {
                let input = job_input(topic, &articles);
                let job = SummarizationJob::new(api, self.job_settings, self.cancel.clone())
                    .run(&input)
                    .await;
                info!(
                    job_id = job.job_id,
                    context_id = ?job.context_id,
                    run_id = ?job.run_id,
                    created_at = %job.created_at,
                    deadline_secs = job.deadline.as_secs(),
                    state = %job.state,
                    transitions = job.transitions.len(),
                    "Summarization job finished"
                );
                match job.outcome {
                    Ok(text) => SummaryOutcome::Completed(text),
                    Err(e) => SummaryOutcome::Failed(e),
                }
            }
        };

        Ok(NewsDigest {
            topic: topic.to_string(),
            articles,
            summary,
        })
    }
}

/// Flatten articles into the text submitted to the summarization job.
///
/// ```text
/// News Summary for 'Technology':
///
/// Title: ...
/// Author: ...
/// Source: ...
/// Description: ...
/// URL: ...
///
/// Title: ...
/// ```
pub fn job_input(topic: &str, articles: &[Article]) -> String {
    let mut out = String::new();
    let _ = write!(out, "News Summary for '{topic}':");
    for article in articles {
        let _ = write!(
            out,
            "\n\nTitle: {}\nAuthor: {}\nSource: {}\nDescription: {}\nURL: {}",
            article.title, article.author, article.source, article.summary, article.url
        );
    }
    out
}

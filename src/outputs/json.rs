//! JSON output of a digest.
//!
//! Files are organized by date, one file per topic:
//! `{json_output_dir}/{YYYY-MM-DD}/{topic-slug}.json`. Writing the same topic
//! twice on one day replaces the earlier file.

use crate::models::{Article, NewsDigest, SummaryOutcome};
use crate::utils::{ensure_writable_dir, slugify_title};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

/// Serialized shape of a digest.
#[derive(Debug, Serialize)]
pub struct DigestRecord<'a> {
    pub topic: &'a str,
    pub generated_at: String,
    /// `completed`, `failed`, `no_articles` or `skipped`.
    pub summary_status: &'static str,
    pub summary: Option<&'a str>,
    pub summary_error: Option<String>,
    pub articles: &'a [Article],
}

impl<'a> DigestRecord<'a> {
    pub fn new(digest: &'a NewsDigest, generated_at: DateTime<Local>) -> Self {
        let (summary_status, summary_error) = match &digest.summary {
            SummaryOutcome::Completed(_) => ("completed", None),
            SummaryOutcome::Failed(e) => ("failed", Some(e.to_string())),
            SummaryOutcome::NoArticles => ("no_articles", None),
            SummaryOutcome::Skipped => ("skipped", None),
        };
        Self {
            topic: &digest.topic,
            generated_at: generated_at.to_rfc3339(),
            summary_status,
            summary: digest.summary.text(),
            summary_error,
            articles: &digest.articles,
        }
    }
}

/// Write `digest` below `json_output_dir` and return the file path.
#[instrument(level = "info", skip_all, fields(json_output_dir = %json_output_dir))]
pub async fn write_digest(digest: &NewsDigest, json_output_dir: &str) -> Result<PathBuf, Box<dyn Error>> {
    let now = Local::now();
    let record = DigestRecord::new(digest, now);
    let json = serde_json::to_string_pretty(&record)?;

    let dir = format!(
        "{}/{}",
        json_output_dir.trim_end_matches('/'),
        now.date_naive()
    );
    ensure_writable_dir(&dir).await?;

    let path = PathBuf::from(dir).join(format!("{}.json", slugify_title(&digest.topic)));
    fs::write(&path, json).await?;
    info!(path = %path.display(), articles = digest.articles.len(), "Wrote digest JSON");
    Ok(path)
}

//! Data models for fetched articles and the digest built from them.
//!
//! This module defines the core data structures used throughout the application:
//! - [`ProviderRecord`]: Fields pulled out of one provider record, before normalization
//! - [`Article`]: The canonical article shape every provider is normalized into
//! - [`PublishedAt`]: A publication timestamp that may or may not have parsed
//! - [`NewsDigest`]: The articles for a topic plus the outcome of summarizing them

use crate::error::JobError;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

/// Timestamp formats tried, in order, when parsing a provider timestamp.
pub const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%SZ", "%Y-%m-%d %H:%M:%S"];

/// Date-only format tried after [`TIMESTAMP_FORMATS`].
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Canonical rendering of a parsed timestamp. Also the sort key.
const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Fields extracted from one provider record.
///
/// Every provider names its fields differently; the provider module maps
/// them into this shape and hands it to [`crate::normalize::normalize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderRecord {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub author: Option<String>,
}

/// A publication timestamp.
///
/// Provider timestamps are parsed against a fixed list of formats. When none
/// match, the original string is kept as-is rather than discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishedAt {
    Parsed(NaiveDateTime),
    Raw(String),
}

impl PublishedAt {
    /// Parse a provider timestamp, falling back to the trimmed raw value.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        for format in TIMESTAMP_FORMATS {
            if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
                return PublishedAt::Parsed(parsed);
            }
        }
        if let Some(midnight) = NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return PublishedAt::Parsed(midnight);
        }
        PublishedAt::Raw(raw.to_string())
    }

    /// The string used for ordering.
    ///
    /// Parsed values render in a zero-padded ISO form, so string order equals
    /// chronological order between them. Raw values compare by their text,
    /// which gives them a stable but not necessarily chronological position.
    pub fn sort_key(&self) -> String {
        match self {
            PublishedAt::Parsed(ts) => ts.format(CANONICAL_FORMAT).to_string(),
            PublishedAt::Raw(raw) => raw.clone(),
        }
    }

    /// Human-readable form, e.g. `May 06, 2025 02:30 PM`.
    pub fn display(&self) -> String {
        match self {
            PublishedAt::Parsed(ts) => ts.format("%B %d, %Y %I:%M %p").to_string(),
            PublishedAt::Raw(raw) => raw.clone(),
        }
    }
}

impl Ord for PublishedAt {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (PublishedAt::Parsed(a), PublishedAt::Parsed(b)) => a.cmp(b),
            _ => self.sort_key().cmp(&other.sort_key()),
        }
    }
}

impl PartialOrd for PublishedAt {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PublishedAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sort_key())
    }
}

impl Serialize for PublishedAt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.sort_key())
    }
}

/// A normalized news article.
///
/// Only [`crate::normalize::normalize`] builds these, which guarantees that
/// `title` and `url` are non-empty and `summary` is never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Article {
    /// Headline with markup removed.
    pub title: String,
    /// Link to the full story. Used as the dedup key.
    pub url: String,
    /// Display name of the outlet.
    pub source: String,
    /// When the story was published.
    pub published_at: PublishedAt,
    /// A few leading sentences of the description.
    pub summary: String,
    /// Lead image, empty when the provider has none.
    pub image_url: String,
    /// Byline, or the provider's default author.
    pub author: String,
}

/// What happened when the articles were handed to the summarizer.
#[derive(Debug)]
pub enum SummaryOutcome {
    /// The remote run produced this text.
    Completed(String),
    /// The job reached a failure, timeout or cancellation.
    Failed(JobError),
    /// No articles were found, so nothing was summarized.
    NoArticles,
    /// Summarization is not configured for this run.
    Skipped,
}

impl SummaryOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            SummaryOutcome::Completed(text) => Some(text),
            _ => None,
        }
    }
}

/// The result of one request: the merged articles and their summary.
///
/// The two halves are independent. A failed summary still carries every
/// article that was fetched.
#[derive(Debug)]
pub struct NewsDigest {
    pub topic: String,
    pub articles: Vec<Article>,
    pub summary: SummaryOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_timestamp() {
        let parsed = PublishedAt::parse("2025-05-06T14:30:00Z");
        assert_eq!(parsed.sort_key(), "2025-05-06T14:30:00Z");
        assert!(matches!(parsed, PublishedAt::Parsed(_)));
    }

    #[test]
    fn test_parse_space_separated_timestamp() {
        let parsed = PublishedAt::parse("2025-05-06 09:15:00");
        assert_eq!(parsed.sort_key(), "2025-05-06T09:15:00Z");
    }

    #[test]
    fn test_parse_date_only() {
        let parsed = PublishedAt::parse("2025-05-06");
        assert_eq!(parsed.sort_key(), "2025-05-06T00:00:00Z");
    }

    #[test]
    fn test_unparseable_timestamp_keeps_raw_value() {
        let parsed = PublishedAt::parse("Tue, 06 May 2025 14:30:00 GMT");
        assert_eq!(
            parsed,
            PublishedAt::Raw("Tue, 06 May 2025 14:30:00 GMT".to_string())
        );
        assert_eq!(PublishedAt::parse(""), PublishedAt::Raw(String::new()));
    }

    #[test]
    fn test_parsed_values_order_chronologically() {
        let earlier = PublishedAt::parse("2025-05-06 09:15:00");
        let later = PublishedAt::parse("2025-05-06T14:30:00Z");
        assert!(later > earlier);
    }

    #[test]
    fn test_raw_values_order_by_text() {
        let parsed = PublishedAt::parse("2025-05-06T14:30:00Z");
        let raw = PublishedAt::parse("yesterday");
        let empty = PublishedAt::parse("");
        assert!(raw > parsed);
        assert!(empty < parsed);
    }

    #[test]
    fn test_display_formats_parsed_value() {
        let parsed = PublishedAt::parse("2025-05-06T14:30:00Z");
        assert_eq!(parsed.display(), "May 06, 2025 02:30 PM");
        assert_eq!(PublishedAt::parse("soon").display(), "soon");
    }

    #[test]
    fn test_article_serializes_timestamp_as_string() {
        let article = Article {
            title: "Title".to_string(),
            url: "https://example.com/a".to_string(),
            source: "Example".to_string(),
            published_at: PublishedAt::parse("2025-05-06"),
            summary: "Summary.".to_string(),
            image_url: String::new(),
            author: "Unknown".to_string(),
        };
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["published_at"], "2025-05-06T00:00:00Z");
        assert_eq!(json["title"], "Title");
    }

    #[test]
    fn test_summary_outcome_text() {
        assert_eq!(
            SummaryOutcome::Completed("done".to_string()).text(),
            Some("done")
        );
        assert_eq!(SummaryOutcome::NoArticles.text(), None);
        assert_eq!(SummaryOutcome::Failed(JobError::Cancelled).text(), None);
    }
}

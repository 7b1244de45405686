//! Conversion of provider records into [`Article`]s.
//!
//! Everything here is a pure function: no I/O, no logging. Providers call
//! [`normalize`] on each record and report how many were dropped.

use crate::models::{Article, ProviderRecord, PublishedAt};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

/// Returned when a description yields no usable sentence.
pub const SUMMARY_FALLBACK: &str = "Summary not available";

/// Source name used when a record does not carry one.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Default number of sentences kept in a summary.
pub const DEFAULT_SUMMARY_SENTENCES: usize = 3;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));
static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+").expect("sentence pattern"));

/// Decode HTML entities and remove tag markup.
///
/// Entities are decoded first, so `&lt;b&gt;` becomes `<b>` and is then
/// stripped like any other tag.
pub fn clean_html(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let fragment = Html::parse_fragment(text);
    let decoded: String = fragment.root_element().text().collect();
    TAG.replace_all(&decoded, "").into_owned()
}

/// Keep the first `sentences` sentences of `text`.
///
/// Markup is removed, the text is split on runs of `.`, `!` and `?`, and the
/// surviving non-empty pieces are joined with `". "` and closed with a period.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(summarize_text("One. Two! Three? Four.", 2), "One. Two.");
/// assert_eq!(summarize_text("", 3), "Summary not available");
/// ```
pub fn summarize_text(text: &str, sentences: usize) -> String {
    let plain = clean_html(text);
    let kept: Vec<&str> = SENTENCE_END
        .split(&plain)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .take(sentences)
        .collect();

    if kept.is_empty() {
        return SUMMARY_FALLBACK.to_string();
    }
    format!("{}.", kept.join(". "))
}

/// Build an [`Article`] from a provider record.
///
/// Returns `None` when the title (after markup removal) or the URL is blank.
/// That drops the record; it is not an error.
pub fn normalize(record: ProviderRecord, sentences: usize) -> Option<Article> {
    let title = clean_html(record.title.as_deref().unwrap_or_default())
        .trim()
        .to_string();
    let url = record.url.as_deref().unwrap_or_default().trim().to_string();
    if title.is_empty() || url.is_empty() {
        return None;
    }

    let source = match record.source.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => UNKNOWN_SOURCE.to_string(),
    };

    Some(Article {
        title,
        url,
        source,
        published_at: PublishedAt::parse(record.published_at.as_deref().unwrap_or_default()),
        summary: summarize_text(record.description.as_deref().unwrap_or_default(), sentences),
        image_url: record.image_url.unwrap_or_default().trim().to_string(),
        author: record.author.unwrap_or_default().trim().to_string(),
    })
}

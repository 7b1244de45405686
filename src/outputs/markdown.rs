//! Markdown rendering of a digest.

use crate::models::{NewsDigest, SummaryOutcome};
use std::fmt::Write;

/// Render the summary section followed by every article.
pub fn digest_to_markdown(digest: &NewsDigest) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# News Summary: {}\n", digest.topic);
    match &digest.summary {
        SummaryOutcome::Completed(text) => {
            let _ = writeln!(md, "{}\n", text.trim());
        }
        SummaryOutcome::Failed(e) => {
            let _ = writeln!(md, "> Summarization failed: {e}\n");
        }
        SummaryOutcome::NoArticles => {
            let _ = writeln!(md, "> No news articles found for the topic: {}\n", digest.topic);
        }
        SummaryOutcome::Skipped => {}
    }

    if digest.articles.is_empty() {
        return md;
    }

    let _ = writeln!(md, "## Articles ({})\n", digest.articles.len());
    for article in &digest.articles {
        let _ = writeln!(md, "### [{}]({})\n", article.title, article.url);
        let _ = write!(md, "*{}*", article.source);
        if !article.author.is_empty() && article.author != article.source {
            let _ = write!(md, " · {}", article.author);
        }
        let published = article.published_at.display();
        if !published.is_empty() {
            let _ = write!(md, " · {published}");
        }
        let _ = writeln!(md, "\n\n{}\n", article.summary);
    }
    md
}

//! Command-line interface definitions for News Digest.
//!
//! Secrets are read from flags or environment variables. Everything else can
//! also come from the YAML file given with `--config`; flags win.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the News Digest application.
///
/// # Examples
///
/// ```sh
/// # Articles and summary for a topic, keys from the environment
/// news_digest "Climate Change"
///
/// # Articles only, written to ./json as well
/// news_digest Technology --no-summary --json-output-dir ./json
///
/// # Restrict NewsAPI to two sources and drop duplicate URLs
/// news_digest AI --sources bbc-news,reuters --dedup-urls
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// News topic to search for
    pub topic: String,

    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// NewsAPI key (enables the keyword search provider)
    #[arg(long, env = "NEWS_API_KEY", hide_env_values = true)]
    pub news_api_key: Option<String>,

    /// RapidAPI key (enables The Hindu provider)
    #[arg(long, env = "RAPID_API_KEY", hide_env_values = true)]
    pub rapid_api_key: Option<String>,

    /// OpenAI API key (enables summarization)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Existing assistant to run instead of creating one
    #[arg(long, env = "OPENAI_ASSISTANT_ID")]
    pub openai_assistant_id: Option<String>,

    /// Comma-separated NewsAPI source ids to restrict results to
    #[arg(long)]
    pub sources: Option<String>,

    /// Number of articles requested from NewsAPI
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Sentences kept in each article summary
    #[arg(long)]
    pub summary_sentences: Option<usize>,

    /// Seconds between summarization status checks
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Seconds to wait for the summary before giving up
    #[arg(long)]
    pub job_timeout: Option<u64>,

    /// Seconds to wait for all providers together
    #[arg(long)]
    pub aggregate_timeout: Option<u64>,

    /// Drop articles whose URL another provider already returned
    #[arg(long)]
    pub dedup_urls: bool,

    /// Fetch articles without summarizing them
    #[arg(long)]
    pub no_summary: bool,

    /// Also write the digest as JSON below this directory
    #[arg(short, long)]
    pub json_output_dir: Option<String>,
}

//! # News Digest
//!
//! Fetches news for a topic from several providers at once, merges the
//! results into one list ordered newest first, and asks a remote assistant
//! to summarize them.
//!
//! ## Features
//!
//! - Keyword search through NewsAPI plus The Hindu's latest national news
//! - A failing provider shrinks the result instead of failing the request
//! - Summaries through the OpenAI Assistants API, bounded by a timeout
//! - Markdown on stdout, optional JSON file output
//!
//! ## Usage
//!
//! ```sh
//! NEWS_API_KEY=... OPENAI_API_KEY=... news_digest "Climate Change"
//! ```
//!
//! ## Architecture
//!
//! 1. **Validation**: Reject a blank topic before touching the network
//! 2. **Aggregation**: Query every provider concurrently, normalize, merge and sort
//! 3. **Summarization**: Create a thread, attach the articles, run and poll until done
//! 4. **Output**: Print Markdown and optionally write JSON

use clap::Parser;
use std::error::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod assistants;
mod cli;
mod config;
mod error;
mod http;
mod job;
mod models;
mod normalize;
mod orchestrator;
mod outputs;
mod providers;
mod utils;

#[cfg(test)]
mod testing;

use aggregate::Aggregator;
use assistants::OpenAiAssistants;
use cli::Cli;
use config::Config;
use http::ReqwestHttp;
use models::SummaryOutcome;
use orchestrator::Orchestrator;
use outputs::{json, markdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_digest starting up");

    let args = Cli::parse();
    debug!(topic = %args.topic, config = ?args.config, "Parsed CLI arguments");

    // ---- Configuration ----
    let mut config = match Config::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load configuration");
            return Err(e.into());
        }
    };
    config.apply_cli(&args);

    let providers = match config.providers() {
        Ok(providers) => providers,
        Err(e) => {
            error!(error = %e, "No usable news provider");
            return Err(e.into());
        }
    };
    info!(
        providers = ?providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
        "Providers configured"
    );

    // ---- Summarization backend ----
    let assistants = if args.no_summary {
        info!("Summarization disabled by --no-summary");
        None
    } else {
        match config.openai_settings() {
            None => {
                warn!("OPENAI_API_KEY not set; summarization disabled");
                None
            }
            Some(settings) => match OpenAiAssistants::connect(settings).await {
                Ok(api) => Some(api),
                Err(e) => {
                    warn!(error = %e, "Could not prepare assistant; continuing without summarization");
                    None
                }
            },
        }
    };

    // Ctrl-C stops summarization instead of killing the process. A job not
    // yet started when it arrives never opens a remote thread.
    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; cancelling summarization");
            on_interrupt.cancel();
        }
    });

    let aggregator = Aggregator::new(
        ReqwestHttp::new(reqwest::Client::new()),
        providers,
        config.aggregate_options(),
    );
    let orchestrator = Orchestrator::new(aggregator, assistants, config.job_settings(), cancel);

    // ---- Fetch and summarize ----
    let digest = match orchestrator.handle(&args.topic).await {
        Ok(digest) => digest,
        Err(e) => {
            error!(error = %e, "Rejected request");
            return Err(e.into());
        }
    };

    match &digest.summary {
        SummaryOutcome::NoArticles => {
            warn!(topic = %digest.topic, "No news articles found for the topic")
        }
        SummaryOutcome::Failed(e) => warn!(error = %e, "Summarization failed"),
        SummaryOutcome::Completed(_) | SummaryOutcome::Skipped => {}
    }

    // ---- Output ----
    println!("{}", markdown::digest_to_markdown(&digest));

    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = json::write_digest(&digest, dir).await {
            error!(path = %dir, error = %e, "Failed to write digest JSON");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        articles = digest.articles.len(),
        summarized = digest.summary.text().is_some(),
        "Execution complete"
    );

    Ok(())
}

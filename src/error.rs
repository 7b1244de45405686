//! Error types for the digest pipeline.
//!
//! Each stage owns its own error enum so that callers can tell the
//! conditions apart:
//!
//! - [`InputError`]: rejected caller input, raised before any network activity
//! - [`ProviderError`]: a provider fetch went wrong; never leaves the fetcher
//! - [`ApiError`]: a single assistants API call failed
//! - [`JobError`]: terminal failure of a summarization job
//! - [`ConfigError`]: the configuration file could not be used

use std::time::Duration;
use thiserror::Error;

/// Invalid caller input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("topic required")]
    TopicRequired,
}

/// Failure of a single provider request.
///
/// These are logged and turned into an empty article list by the fetcher.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("invalid provider endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(String),

    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response body: {0}")]
    Malformed(String),

    #[error("provider rejected the request: {0}")]
    Rejected(String),
}

/// Failure of one call against the assistants API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("assistants API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not parse assistants API response: {0}")]
    Parse(String),

    #[error("invalid assistants endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Terminal failure of a summarization job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("could not create job context: {0}")]
    ContextCreation(#[source] ApiError),

    #[error("could not submit job input: {0}")]
    Submission(#[source] ApiError),

    #[error("remote run failed: {0}")]
    RemoteRun(String),

    #[error("no result within {0:?}")]
    TimedOut(Duration),

    #[error("job cancelled")]
    Cancelled,
}

/// Configuration loading failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no news provider is configured (set NEWS_API_KEY or RAPID_API_KEY)")]
    NoProviders,
}

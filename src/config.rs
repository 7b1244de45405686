//! Runtime configuration.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. An optional YAML file (`--config path/to/config.yaml`)
//! 3. Command-line flags and environment variables ([`Config::apply_cli`])
//!
//! ```yaml
//! page_size: 5
//! job_timeout_secs: 120
//! dedup_urls: true
//! model: gpt-4o-mini
//! ```

use crate::aggregate::AggregateOptions;
use crate::assistants::{self, OpenAiSettings};
use crate::cli::Cli;
use crate::error::ConfigError;
use crate::job::JobSettings;
use crate::normalize::DEFAULT_SUMMARY_SENTENCES;
use crate::providers::{NewsApi, Provider, TheHindu, hindu, newsapi};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub news_api_key: Option<String>,
    pub rapid_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub assistant_id: Option<String>,

    pub news_api_url: Url,
    pub hindu_api_url: Url,
    pub hindu_api_host: String,
    pub openai_api_url: Url,

    pub page_size: u32,
    pub language: String,
    pub sources: Option<String>,
    pub request_timeout_secs: u64,
    pub aggregate_timeout_secs: Option<u64>,
    pub summary_sentences: usize,
    pub dedup_urls: bool,

    pub model: String,
    pub poll_interval_secs: u64,
    pub job_timeout_secs: u64,
    pub openai_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_api_key: None,
            rapid_api_key: None,
            openai_api_key: None,
            assistant_id: None,
            news_api_url: Url::parse(newsapi::DEFAULT_BASE_URL).expect("default NewsAPI url"),
            hindu_api_url: Url::parse(hindu::DEFAULT_BASE_URL).expect("default Hindu url"),
            hindu_api_host: hindu::DEFAULT_HOST.to_string(),
            openai_api_url: Url::parse(assistants::DEFAULT_BASE_URL).expect("default OpenAI url"),
            page_size: newsapi::DEFAULT_PAGE_SIZE,
            language: newsapi::DEFAULT_LANGUAGE.to_string(),
            sources: None,
            request_timeout_secs: 10,
            aggregate_timeout_secs: None,
            summary_sentences: DEFAULT_SUMMARY_SENTENCES,
            dedup_urls: false,
            model: assistants::DEFAULT_MODEL.to_string(),
            poll_interval_secs: 3,
            job_timeout_secs: 90,
            openai_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Read the YAML file at `path`, or return defaults when there is none.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let shown = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: shown.clone(),
            source,
        })?;
        let config = Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: shown.clone(),
            source,
        })?;
        info!(path = %shown, "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Overlay command-line flags and environment variables.
    pub fn apply_cli(&mut self, cli: &Cli) {
        fn overlay<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
        fn overlay_opt<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if value.is_some() {
                *slot = value.clone();
            }
        }

        overlay_opt(&mut self.news_api_key, &cli.news_api_key);
        overlay_opt(&mut self.rapid_api_key, &cli.rapid_api_key);
        overlay_opt(&mut self.openai_api_key, &cli.openai_api_key);
        overlay_opt(&mut self.assistant_id, &cli.openai_assistant_id);
        overlay_opt(&mut self.sources, &cli.sources);
        overlay(&mut self.page_size, &cli.page_size);
        overlay(&mut self.poll_interval_secs, &cli.poll_interval);
        overlay(&mut self.job_timeout_secs, &cli.job_timeout);
        overlay(&mut self.summary_sentences, &cli.summary_sentences);
        if cli.aggregate_timeout.is_some() {
            self.aggregate_timeout_secs = cli.aggregate_timeout;
        }
        if cli.dedup_urls {
            self.dedup_urls = true;
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn job_settings(&self) -> JobSettings {
        JobSettings {
            poll_interval: Duration::from_secs(self.poll_interval_secs.max(1)),
            timeout: Duration::from_secs(self.job_timeout_secs),
        }
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            summary_sentences: self.summary_sentences,
            dedup_urls: self.dedup_urls,
            deadline: self.aggregate_timeout_secs.map(Duration::from_secs),
        }
    }

    /// Providers that have credentials, keyword search first.
    pub fn providers(&self) -> Result<Vec<Provider>, ConfigError> {
        let mut providers = Vec::new();

        match present(&self.news_api_key) {
            Some(key) => providers.push(Provider::NewsApi(
                NewsApi::new(self.news_api_url.clone(), key.to_string())
                    .with_page_size(self.page_size)
                    .with_language(self.language.as_str())
                    .with_sources(self.sources.clone())
                    .with_timeout(self.request_timeout()),
            )),
            None => warn!("NEWS_API_KEY not set; NewsAPI provider disabled"),
        }

        match present(&self.rapid_api_key) {
            Some(key) => providers.push(Provider::TheHindu(
                TheHindu::new(self.hindu_api_url.clone(), key.to_string())
                    .with_host(self.hindu_api_host.as_str())
                    .with_timeout(self.request_timeout()),
            )),
            None => warn!("RAPID_API_KEY not set; The Hindu provider disabled"),
        }

        if providers.is_empty() {
            return Err(ConfigError::NoProviders);
        }
        Ok(providers)
    }

    /// OpenAI settings, when an API key is available.
    pub fn openai_settings(&self) -> Option<OpenAiSettings> {
        let api_key = present(&self.openai_api_key)?;
        Some(OpenAiSettings {
            base_url: self.openai_api_url.clone(),
            api_key: api_key.to_string(),
            model: self.model.clone(),
            assistant_id: present(&self.assistant_id).map(str::to_string),
            request_timeout: Duration::from_secs(self.openai_timeout_secs),
        })
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.page_size, 10);
        assert_eq!(config.summary_sentences, 3);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.job_settings(), JobSettings::default());
        assert_eq!(config.aggregate_options(), AggregateOptions::default());
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_yaml_overrides_defaults() {
        let config = Config::from_yaml(
            "page_size: 5\njob_timeout_secs: 120\ndedup_urls: true\n\
             aggregate_timeout_secs: 15\nnews_api_url: http://localhost:8080/\n",
        )
        .unwrap();
        assert_eq!(config.page_size, 5);
        assert_eq!(config.job_settings().timeout, Duration::from_secs(120));
        assert!(config.dedup_urls);
        assert_eq!(config.aggregate_options().deadline, Some(Duration::from_secs(15)));
        assert_eq!(config.news_api_url.as_str(), "http://localhost:8080/");
        assert_eq!(config.summary_sentences, 3);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(Config::from_yaml("  \n").unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_yaml_is_rejected() {
        assert!(Config::from_yaml("page_size: many").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }

    #[test]
    fn test_load_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.yaml");
        std::fs::write(&path, "model: gpt-4o\npoll_interval_secs: 5\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.job_settings().poll_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_cli_wins_over_file() {
        let mut config = Config::from_yaml("page_size: 5\nnews_api_key: from-file\n").unwrap();
        let cli = Cli::parse_from([
            "news_digest",
            "AI",
            "--news-api-key",
            "from-cli",
            "--page-size",
            "20",
            "--dedup-urls",
        ]);
        config.apply_cli(&cli);
        assert_eq!(config.news_api_key.as_deref(), Some("from-cli"));
        assert_eq!(config.page_size, 20);
        assert!(config.dedup_urls);
        assert_eq!(config.job_timeout_secs, 90);
    }

    #[test]
    fn test_providers_follow_available_keys() {
        let mut config = Config::default();
        assert!(matches!(config.providers(), Err(ConfigError::NoProviders)));

        config.rapid_api_key = Some("rk".to_string());
        let providers = config.providers().unwrap();
        assert_eq!(providers.len(), 1);
        assert_eq!(providers[0].name(), "the_hindu");

        config.news_api_key = Some("nk".to_string());
        let names: Vec<&str> = config.providers().unwrap().iter().map(Provider::name).collect();
        assert_eq!(names, vec!["newsapi", "the_hindu"]);
    }

    #[test]
    fn test_blank_keys_count_as_missing() {
        let config = Config {
            news_api_key: Some("  ".to_string()),
            openai_api_key: Some(String::new()),
            ..Config::default()
        };
        assert!(config.providers().is_err());
        assert!(config.openai_settings().is_none());
    }

    #[test]
    fn test_openai_settings() {
        let config = Config {
            openai_api_key: Some("sk".to_string()),
            assistant_id: Some("asst_9".to_string()),
            ..Config::default()
        };
        let settings = config.openai_settings().unwrap();
        assert_eq!(settings.api_key, "sk");
        assert_eq!(settings.assistant_id.as_deref(), Some("asst_9"));
        assert_eq!(settings.model, "gpt-4o-mini");
        assert_eq!(settings.base_url.as_str(), "https://api.openai.com/v1/");
    }

    #[test]
    fn test_poll_interval_is_never_zero() {
        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.job_settings().poll_interval, Duration::from_secs(1));
    }
}

//! Remote assistants API used by the summarization job.
//!
//! # Architecture
//!
//! - [`AssistantsApi`]: the operations a summarization job needs from the
//!   remote side (thread, message, run, poll, list, cancel)
//! - [`OpenAiAssistants`]: implementation over the OpenAI Assistants v2 REST API
//!
//! The job only ever sees the trait, so tests drive it with a scripted fake.
//! Each trait method maps to exactly one HTTP call; nothing here retries.

use crate::error::ApiError;
use crate::http::base_url;
use crate::utils::truncate_for_log;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const ASSISTANT_INSTRUCTIONS: &str = "You are an expert news analyst. \
Provide a concise, objective summary of the news articles. \
Highlight key points, main themes, and significant insights. \
Maintain a neutral, informative tone.";

const RUN_INSTRUCTIONS: &str = "Provide a comprehensive, concise summary of the news articles.";

/// Status of a remote run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Completed,
    Failed,
    Cancelled,
    Expired,
    Incomplete,
    Other(String),
}

impl RunStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "queued" => RunStatus::Queued,
            "in_progress" | "running" => RunStatus::InProgress,
            "requires_action" => RunStatus::RequiresAction,
            "cancelling" => RunStatus::Cancelling,
            "completed" => RunStatus::Completed,
            "failed" => RunStatus::Failed,
            "cancelled" => RunStatus::Cancelled,
            "expired" => RunStatus::Expired,
            "incomplete" => RunStatus::Incomplete,
            other => RunStatus::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Expired => "expired",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Other(raw) => raw,
        }
    }

    /// The run ended without producing a usable result.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired | RunStatus::Incomplete
        )
    }
}

impl From<String> for RunStatus {
    fn from(raw: String) -> Self {
        RunStatus::parse(&raw)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a thread, reduced to its role and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadMessage {
    pub role: String,
    pub text: String,
}

/// Operations a summarization job performs against the remote side.
pub trait AssistantsApi {
    /// Open a new thread and return its id.
    async fn create_thread(&self) -> Result<String, ApiError>;

    /// Append a user message to the thread.
    async fn add_message(&self, thread_id: &str, content: &str) -> Result<(), ApiError>;

    /// Start a run on the thread and return its id.
    async fn create_run(&self, thread_id: &str) -> Result<String, ApiError>;

    /// Current status of a run.
    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, ApiError>;

    /// Messages in the thread, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ApiError>;

    /// Ask the remote side to stop a run.
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), ApiError>;
}

/// Settings for [`OpenAiAssistants`].
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub base_url: Url,
    pub api_key: String,
    pub model: String,
    /// Existing assistant to run. A new one is created when absent.
    pub assistant_id: Option<String>,
    pub request_timeout: Duration,
}

/// [`AssistantsApi`] over the OpenAI Assistants v2 REST API.
pub struct OpenAiAssistants {
    client: reqwest::Client,
    base_url: Url,
    api_key: String,
    assistant_id: String,
    request_timeout: Duration,
}

impl fmt::Debug for OpenAiAssistants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiAssistants")
            .field("base_url", &self.base_url.as_str())
            .field("assistant_id", &self.assistant_id)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct CreateAssistant<'a> {
    name: &'a str,
    instructions: &'a str,
    model: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateRun<'a> {
    assistant_id: &'a str,
    instructions: &'a str,
}

#[derive(Debug, Deserialize)]
struct Created {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunObject {
    status: RunStatus,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<MessageObject>,
}

#[derive(Debug, Deserialize)]
struct MessageObject {
    role: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    text: Option<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    value: String,
}

impl MessageObject {
    fn into_thread_message(self) -> ThreadMessage {
        let text = self
            .content
            .into_iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text.map(|t| t.value))
            .collect::<Vec<_>>()
            .join("\n");
        ThreadMessage { role: self.role, text }
    }
}

impl OpenAiAssistants {
    /// Build a client, creating an assistant first when none is configured.
    #[instrument(level = "info", skip_all, fields(model = %settings.model))]
    pub async fn connect(settings: OpenAiSettings) -> Result<Self, ApiError> {
        let mut api = Self {
            client: reqwest::Client::new(),
            base_url: base_url(settings.base_url),
            api_key: settings.api_key,
            assistant_id: settings.assistant_id.unwrap_or_default(),
            request_timeout: settings.request_timeout,
        };

        if api.assistant_id.is_empty() {
            let created: Created = api
                .post(
                    "assistants",
                    &CreateAssistant {
                        name: "News Summarizer",
                        instructions: ASSISTANT_INSTRUCTIONS,
                        model: &settings.model,
                    },
                )
                .await?;
            info!(assistant_id = %created.id, "Created assistant");
            api.assistant_id = created.id;
        }
        Ok(api)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.base_url.join(path)?;
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .timeout(self.request_timeout))
    }

    async fn send<T: DeserializeOwned>(&self, builder: reqwest::RequestBuilder, path: &str) -> Result<T, ApiError> {
        let t0 = Instant::now();
        let resp = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let elapsed_ms = t0.elapsed().as_millis() as u64;

        if !status.is_success() {
            warn!(path, status = status.as_u16(), elapsed_ms, "Assistants API call failed");
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }
        debug!(path, status = status.as_u16(), elapsed_ms, "Assistants API call succeeded");

        serde_json::from_str(&body).map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let builder = self.request(reqwest::Method::POST, path)?.json(body);
        self.send(builder, path).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ApiError> {
        let builder = self.request(reqwest::Method::GET, path)?.query(query);
        self.send(builder, path).await
    }
}

impl AssistantsApi for OpenAiAssistants {
    async fn create_thread(&self) -> Result<String, ApiError> {
        let created: Created = self.post("threads", &serde_json::json!({})).await?;
        Ok(created.id)
    }

    async fn add_message(&self, thread_id: &str, content: &str) -> Result<(), ApiError> {
        let path = format!("threads/{thread_id}/messages");
        let _: Created = self.post(&path, &CreateMessage { role: "user", content }).await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str) -> Result<String, ApiError> {
        let path = format!("threads/{thread_id}/runs");
        let created: Created = self
            .post(
                &path,
                &CreateRun {
                    assistant_id: &self.assistant_id,
                    instructions: RUN_INSTRUCTIONS,
                },
            )
            .await?;
        Ok(created.id)
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> Result<RunStatus, ApiError> {
        let path = format!("threads/{thread_id}/runs/{run_id}");
        let run: RunObject = self.get(&path, &[]).await?;
        Ok(run.status)
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, ApiError> {
        let path = format!("threads/{thread_id}/messages");
        let list: MessageList = self.get(&path, &[("order", "desc")]).await?;
        Ok(list
            .data
            .into_iter()
            .map(MessageObject::into_thread_message)
            .collect())
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), ApiError> {
        let path = format!("threads/{thread_id}/runs/{run_id}/cancel");
        let _: RunObject = self.post(&path, &serde_json::json!({})).await?;
        Ok(())
    }
}

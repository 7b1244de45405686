//! Test doubles for the two outbound seams.
//!
//! Both fakes are cheap to clone and share their state, so a test can hand
//! one clone to the code under test and keep another to inspect calls.

use crate::assistants::{AssistantsApi, RunStatus, ThreadMessage};
use crate::error::{ApiError, ProviderError};
use crate::http::{HttpClient, HttpRequest, HttpResponse};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned reply for a [`FakeHttp`] route.
#[derive(Debug, Clone)]
pub enum FakeReply {
    Body { status: u16, body: String },
    NetworkDown,
    Delayed(Duration, Box<FakeReply>),
}

impl FakeReply {
    pub fn json(status: u16, body: serde_json::Value) -> Self {
        FakeReply::Body { status, body: body.to_string() }
    }

    pub fn text(status: u16, body: &str) -> Self {
        FakeReply::Body { status, body: body.to_string() }
    }

    pub fn after(self, delay: Duration) -> Self {
        FakeReply::Delayed(delay, Box::new(self))
    }
}

/// [`HttpClient`] answering from a path → reply table.
///
/// Unknown paths behave like an unreachable host.
#[derive(Debug, Clone, Default)]
pub struct FakeHttp {
    routes: Arc<HashMap<String, FakeReply>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl FakeHttp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, path: &str, reply: FakeReply) -> Self {
        Arc::make_mut(&mut self.routes).insert(path.to_string(), reply);
        self
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for FakeHttp {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, ProviderError> {
        let reply = self.routes.get(request.url.path()).cloned();
        self.requests.lock().unwrap().push(request);

        let mut reply = reply.ok_or_else(|| ProviderError::Network("connection refused".to_string()))?;
        loop {
            match reply {
                FakeReply::Body { status, body } => return Ok(HttpResponse { status, body }),
                FakeReply::NetworkDown => {
                    return Err(ProviderError::Network("operation timed out".to_string()));
                }
                FakeReply::Delayed(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    reply = *inner;
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    statuses: VecDeque<RunStatus>,
    last_status: Option<RunStatus>,
    messages: Vec<ThreadMessage>,
    failing: HashSet<&'static str>,
    delays: HashMap<&'static str, Duration>,
    log: Vec<&'static str>,
    inputs: Vec<String>,
}

/// [`AssistantsApi`] that replays a scripted sequence of run statuses.
///
/// Once the script runs out, the last status repeats. Operations named in
/// [`ScriptedAssistants::fail_on`] return an HTTP 500 error, and those named
/// in [`ScriptedAssistants::slow`] take that long to answer.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAssistants {
    script: Arc<Mutex<Script>>,
}

impl ScriptedAssistants {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn statuses<I: IntoIterator<Item = RunStatus>>(self, statuses: I) -> Self {
        self.script.lock().unwrap().statuses.extend(statuses);
        self
    }

    pub fn messages(self, messages: Vec<ThreadMessage>) -> Self {
        self.script.lock().unwrap().messages = messages;
        self
    }

    pub fn fail_on(self, operation: &'static str) -> Self {
        self.script.lock().unwrap().failing.insert(operation);
        self
    }

    pub fn slow(self, operation: &'static str, delay: Duration) -> Self {
        self.script.lock().unwrap().delays.insert(operation, delay);
        self
    }

    /// Every operation invoked so far, in order.
    pub fn log(&self) -> Vec<&'static str> {
        self.script.lock().unwrap().log.clone()
    }

    pub fn calls(&self, operation: &str) -> usize {
        self.log().iter().filter(|op| **op == operation).count()
    }

    /// Message bodies passed to `add_message`.
    pub fn inputs(&self) -> Vec<String> {
        self.script.lock().unwrap().inputs.clone()
    }

    /// Log the call, wait out any scripted delay, then fail if scripted to.
    async fn record(&self, operation: &'static str) -> Result<(), ApiError> {
        let (delay, fails) = {
            let mut script = self.script.lock().unwrap();
            script.log.push(operation);
            (script.delays.get(operation).copied(), script.failing.contains(operation))
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fails {
            return Err(ApiError::Status {
                status: 500,
                body: format!("scripted {operation} failure"),
            });
        }
        Ok(())
    }
}

pub fn assistant(text: &str) -> ThreadMessage {
    ThreadMessage { role: "assistant".to_string(), text: text.to_string() }
}

pub fn user(text: &str) -> ThreadMessage {
    ThreadMessage { role: "user".to_string(), text: text.to_string() }
}

impl AssistantsApi for ScriptedAssistants {
    async fn create_thread(&self) -> Result<String, ApiError> {
        self.record("create_thread").await?;
        Ok("thread_test".to_string())
    }

    async fn add_message(&self, _thread_id: &str, content: &str) -> Result<(), ApiError> {
        self.record("add_message").await?;
        self.script.lock().unwrap().inputs.push(content.to_string());
        Ok(())
    }

    async fn create_run(&self, _thread_id: &str) -> Result<String, ApiError> {
        self.record("create_run").await?;
        Ok("run_test".to_string())
    }

    async fn get_run(&self, _thread_id: &str, _run_id: &str) -> Result<RunStatus, ApiError> {
        self.record("get_run").await?;
        let mut script = self.script.lock().unwrap();
        let status = match script.statuses.pop_front() {
            Some(status) => status,
            None => script.last_status.clone().unwrap_or(RunStatus::InProgress),
        };
        script.last_status = Some(status.clone());
        Ok(status)
    }

    async fn list_messages(&self, _thread_id: &str) -> Result<Vec<ThreadMessage>, ApiError> {
        self.record("list_messages").await?;
        Ok(self.script.lock().unwrap().messages.clone())
    }

    async fn cancel_run(&self, _thread_id: &str, _run_id: &str) -> Result<(), ApiError> {
        self.record("cancel_run").await
    }
}

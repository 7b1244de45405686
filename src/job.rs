//! The summarization job: one remote thread, one run, polled to the end.
//!
//! # Lifecycle
//!
//! ```text
//! Created ──► InputAttached ──► Running ──┬──► Completed
//!    │              │              │      ├──► Failed
//!    └──────────────┴──────────────┴──────┼──► TimedOut
//!                                         └──► Cancelled
//! ```
//!
//! Every transition is one remote call: create thread, add message, start
//! run, then one status poll per interval and a final message listing. The
//! deadline is measured from the start of [`SummarizationJob::run`] and
//! bounds every remote call, including one that is still in flight. When it
//! passes, or when the cancellation token fires, the job stops at once and,
//! if a run was started, sends a single best-effort cancel for it.
//!
//! A job is consumed by [`SummarizationJob::run`], so a finished job can
//! never be polled again.

use crate::assistants::{AssistantsApi, RunStatus};
use crate::error::JobError;
use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
pub const DEFAULT_JOB_TIMEOUT: Duration = Duration::from_secs(90);

/// Result text when a run completes without an assistant reply.
pub const NO_SUMMARY_FALLBACK: &str = "No summary generated.";

static NEXT_JOB_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    InputAttached,
    Running,
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

impl JobState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            JobState::Completed | JobState::Failed | JobState::TimedOut | JobState::Cancelled
        )
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Created => "created",
            JobState::InputAttached => "input_attached",
            JobState::Running => "running",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::TimedOut => "timed_out",
            JobState::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Timing knobs for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobSettings {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_JOB_TIMEOUT,
        }
    }
}

/// A job that has reached a terminal state.
#[derive(Debug)]
pub struct FinishedJob {
    pub job_id: u64,
    pub context_id: Option<String>,
    pub run_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deadline: Duration,
    pub state: JobState,
    /// Every state the job passed through, starting with `Created`.
    pub transitions: Vec<JobState>,
    pub outcome: Result<String, JobError>,
}

/// A single summarization request against an [`AssistantsApi`].
pub struct SummarizationJob<'a, A> {
    api: &'a A,
    settings: JobSettings,
    cancel: CancellationToken,
    job_id: u64,
    context_id: Option<String>,
    run_id: Option<String>,
    created_at: DateTime<Utc>,
    started: Instant,
    state: JobState,
    transitions: Vec<JobState>,
}

impl<'a, A: AssistantsApi> SummarizationJob<'a, A> {
    /// Create a job. The deadline clock starts when it is run.
    ///
    /// Cancelling `cancel` stops the job at its next await point, including
    /// in the middle of a remote call.
    pub fn new(api: &'a A, settings: JobSettings, cancel: CancellationToken) -> Self {
        Self {
            api,
            settings,
            cancel,
            job_id: NEXT_JOB_ID.fetch_add(1, Ordering::Relaxed),
            context_id: None,
            run_id: None,
            created_at: Utc::now(),
            started: Instant::now(),
            state: JobState::Created,
            transitions: vec![JobState::Created],
        }
    }

    /// Drive the job to a terminal state.
    ///
    /// # Arguments
    ///
    /// * `input` - The text submitted as the single user message
    ///
    /// # Returns
    ///
    /// A [`FinishedJob`] in exactly one terminal state. Its `outcome` holds
    /// the newest assistant reply, or the [`JobError`] that ended the job.
    /// Timeouts and cancellations are reported there too; `run` itself
    /// never fails.
    #[instrument(level = "info", skip_all, fields(job_id = self.job_id, input_bytes = input.len()))]
    pub async fn run(mut self, input: &str) -> FinishedJob {
        self.started = Instant::now();
        let outcome = self.drive(input).await;

        if matches!(outcome, Err(JobError::TimedOut(_) | JobError::Cancelled)) {
            if let (Some(thread_id), Some(run_id)) = (&self.context_id, &self.run_id) {
                self.abandon(thread_id, run_id).await;
            }
        }

        let terminal = match &outcome {
            Ok(_) => JobState::Completed,
            Err(JobError::TimedOut(_)) => JobState::TimedOut,
            Err(JobError::Cancelled) => JobState::Cancelled,
            Err(_) => JobState::Failed,
        };
        self.transition(terminal);

        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        match &outcome {
            Ok(text) => info!(elapsed_ms, summary_bytes = text.len(), "Summarization job completed"),
            Err(e) => warn!(elapsed_ms, state = %terminal, error = %e, "Summarization job did not complete"),
        }

        FinishedJob {
            job_id: self.job_id,
            context_id: self.context_id,
            run_id: self.run_id,
            created_at: self.created_at,
            deadline: self.settings.timeout,
            state: self.state,
            transitions: self.transitions,
            outcome,
        }
    }

    fn deadline(&self) -> Instant {
        self.started + self.settings.timeout
    }

    async fn drive(&mut self, input: &str) -> Result<String, JobError> {
        let api = self.api;
        if self.cancel.is_cancelled() {
            return Err(JobError::Cancelled);
        }

        let thread_id = self
            .bounded(api.create_thread())
            .await?
            .map_err(JobError::ContextCreation)?;
        debug!(%thread_id, "Opened job context");
        self.context_id = Some(thread_id.clone());

        self.bounded(api.add_message(&thread_id, input))
            .await?
            .map_err(JobError::Submission)?;
        self.transition(JobState::InputAttached);

        let run_id = self
            .bounded(api.create_run(&thread_id))
            .await?
            .map_err(|e| JobError::RemoteRun(format!("could not start run: {e}")))?;
        self.run_id = Some(run_id.clone());
        self.transition(JobState::Running);

        self.poll(&thread_id, &run_id).await
    }

    async fn poll(&mut self, thread_id: &str, run_id: &str) -> Result<String, JobError> {
        let api = self.api;
        let deadline = self.deadline();
        let mut polls = 0u32;

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(self.timed_out());
            }

            let nap = self.settings.poll_interval.min(deadline - now);
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(JobError::Cancelled),
                _ = sleep(nap) => {}
            }
            if Instant::now() >= deadline {
                return Err(self.timed_out());
            }

            polls += 1;
            let status = self
                .bounded(api.get_run(thread_id, run_id))
                .await?
                .map_err(|e| JobError::RemoteRun(format!("could not poll run: {e}")))?;

            match status {
                RunStatus::Completed => return self.collect(thread_id).await,
                status if status.is_failure() => {
                    return Err(JobError::RemoteRun(format!("run ended with status {status}")));
                }
                status => debug!(%status, polls, "Run still in progress"),
            }
        }
    }

    async fn collect(&self, thread_id: &str) -> Result<String, JobError> {
        let messages = self
            .bounded(self.api.list_messages(thread_id))
            .await?
            .map_err(|e| JobError::RemoteRun(format!("could not list messages: {e}")))?;

        match messages.into_iter().find(|m| m.role == "assistant") {
            Some(message) => Ok(message.text),
            None => {
                warn!("Run completed without an assistant message");
                Ok(NO_SUMMARY_FALLBACK.to_string())
            }
        }
    }

    /// Await one remote call, giving up when the deadline passes or the
    /// token is cancelled.
    ///
    /// The outer error is the interruption; the inner result is the call's own.
    /// A reply that lands at or after the deadline still counts as a timeout.
    async fn bounded<T>(&self, call: impl Future<Output = T>) -> Result<T, JobError> {
        let deadline = self.deadline();
        let reply = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(JobError::Cancelled),
            reply = timeout_at(deadline, call) => reply,
        };
        match reply {
            Ok(value) if Instant::now() < deadline => Ok(value),
            _ => Err(self.timed_out()),
        }
    }

    fn timed_out(&self) -> JobError {
        JobError::TimedOut(self.settings.timeout)
    }

    /// Best-effort remote cancellation. Errors are logged, not returned.
    async fn abandon(&self, thread_id: &str, run_id: &str) {
        if let Err(e) = self.api.cancel_run(thread_id, run_id).await {
            warn!(%run_id, error = %e, "Could not cancel remote run");
        }
    }

    fn transition(&mut self, next: JobState) {
        debug_assert!(!self.state.is_terminal(), "transition out of terminal state {}", self.state);
        debug!(from = %self.state, to = %next, "Job state transition");
        self.state = next;
        self.transitions.push(next);
    }
}

//! Task poller: fixed-cadence status checks until the task is terminal.
//!
//! Split in two so the decision logic can be tested without timers:
//!
//! - [`PollState::apply`] is a pure transition over one status response.
//! - [`poll_until_terminal`] owns the clock, the cancellation token and the
//!   attempt budget, and issues at most one request at a time. The next
//!   tick is armed only after the previous response was handled.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::Doc2MdError;
use crate::pipeline::upload::until_cancelled;
use crate::progress::EventSink;
use crate::protocol::{TaskStatus, TaskStatusResponse};

/// What one status response means for the workflow.
#[derive(Debug, Clone)]
pub enum Transition {
    /// Queued, retrying or an unrecognised status; poll again silently.
    Waiting(TaskStatus),
    /// Still processing; the percentage to display.
    Progress(u8),
    /// Terminal success, carrying the final response for result resolution.
    Completed(Box<TaskStatusResponse>),
    /// Terminal failure with the backend's error text (possibly empty).
    Failed(String),
    /// Response for another task, or arriving after a terminal state.
    Ignored,
}

/// Poll-side view of one task.
#[derive(Debug, Clone)]
pub struct PollState {
    task_id: String,
    percent: u8,
    finished: bool,
}

impl PollState {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            percent: 0,
            finished: false,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Highest percentage seen so far.
    pub fn percent(&self) -> u8 {
        self.percent
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn apply(&mut self, response: TaskStatusResponse) -> Transition {
        if self.finished {
            return Transition::Ignored;
        }
        if let Some(id) = response.task_id.as_deref() {
            if id != self.task_id {
                return Transition::Ignored;
            }
        }

        match response.status {
            TaskStatus::Processing => {
                let reported = clamp_percent(response.progress.unwrap_or(0.0));
                self.percent = self.percent.max(reported);
                Transition::Progress(self.percent)
            }
            TaskStatus::Completed => {
                self.finished = true;
                self.percent = 100;
                Transition::Completed(Box::new(response))
            }
            TaskStatus::Failed => {
                self.finished = true;
                Transition::Failed(response.error.unwrap_or_default())
            }
            other => Transition::Waiting(other),
        }
    }
}

fn clamp_percent(p: f64) -> u8 {
    if p.is_nan() {
        return 0;
    }
    p.round().clamp(0.0, 100.0) as u8
}

/// Cadence and budget for one poll loop.
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub interval: Duration,
    pub max_attempts: u32,
    pub timeout: Option<Duration>,
}

/// A task that reached `completed`.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub final_status: TaskStatusResponse,
    pub attempts: u32,
}

fn gave_up(task_id: &str, attempts: u32, started: Instant) -> Doc2MdError {
    warn!(
        "Giving up on task {} after {} status checks ({:.1}s)",
        task_id,
        attempts,
        started.elapsed().as_secs_f64()
    );
    Doc2MdError::PollTimedOut {
        task_id: task_id.to_string(),
        attempts,
    }
}

/// Poll `task_id` until it completes, fails, runs out of budget or is
/// cancelled.
///
/// The first request goes out one `interval` after the call.
pub(crate) async fn poll_until_terminal(
    api: &ApiClient,
    task_id: &str,
    filename: &str,
    settings: PollSettings,
    sink: &EventSink,
    cancel: &CancellationToken,
) -> Result<PollOutcome, Doc2MdError> {
    let started = Instant::now();
    let mut state = PollState::new(task_id);
    let mut attempts: u32 = 0;

    loop {
        if attempts >= settings.max_attempts {
            return Err(gave_up(task_id, attempts, started));
        }

        // Never sleep past the wall-clock budget.
        let pause = match settings.timeout {
            Some(limit) => settings.interval.min(limit.saturating_sub(started.elapsed())),
            None => settings.interval,
        };
        until_cancelled(cancel, Some(task_id), tokio::time::sleep(pause)).await?;
        if settings
            .timeout
            .is_some_and(|limit| started.elapsed() >= limit)
        {
            return Err(gave_up(task_id, attempts, started));
        }

        attempts += 1;
        let response = until_cancelled(cancel, Some(task_id), api.task_status(task_id))
            .await?
            .map_err(|source| Doc2MdError::PollFailed {
                task_id: task_id.to_string(),
                source,
            })?;
        if cancel.is_cancelled() {
            return Err(Doc2MdError::Cancelled {
                task_id: Some(task_id.to_string()),
            });
        }
        if let Some(msg) = &response.message {
            debug!("Task {} status message: {}", task_id, msg);
        }

        match state.apply(response) {
            Transition::Waiting(status) => {
                if status == TaskStatus::Unknown {
                    warn!("Task {} reported an unrecognised status; still waiting", task_id);
                } else {
                    debug!("Task {} is {:?}", task_id, status);
                }
            }
            Transition::Progress(percent) => {
                debug!("Task {} processing: {}%", task_id, percent);
                sink.emit(|cb| cb.on_progress(filename, percent));
            }
            Transition::Completed(final_status) => {
                info!("Task {} completed after {} status checks", task_id, attempts);
                return Ok(PollOutcome {
                    final_status: *final_status,
                    attempts,
                });
            }
            Transition::Failed(message) => {
                warn!("Task {} failed: {}", task_id, message);
                return Err(Doc2MdError::TaskFailed {
                    task_id: task_id.to_string(),
                    message,
                });
            }
            Transition::Ignored => {
                warn!("Dropping status response that does not belong to task {}", task_id);
            }
        }
    }
}

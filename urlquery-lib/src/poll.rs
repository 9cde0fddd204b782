//! Waiting for a submission to finish.
//!
//! The queue goes `queued → processing → analyzing → done`. Only `done` ends
//! the loop; any other status, known or not, keeps it going. The loop is
//! bounded by an attempt count and an optional deadline and can be cancelled
//! through a [`CancellationToken`].

use crate::client::UrlqueryClient;
use crate::error::UrlqueryError;
use crate::types::QueuedJob;
use crate::utils::require_non_empty;
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Anything that can report the state of a queued job.
#[async_trait]
pub trait QueueStatusSource: Send + Sync {
    async fn queue_status(&self, queue_id: &str) -> Result<QueuedJob, UrlqueryError>;
}

#[async_trait]
impl QueueStatusSource for UrlqueryClient {
    async fn queue_status(&self, queue_id: &str) -> Result<QueuedJob, UrlqueryError> {
        UrlqueryClient::queue_status(self, queue_id).await
    }
}

/// Bounds for the poll loop.
#[derive(Debug, Clone, PartialEq)]
pub struct PollConfig {
    /// Wait between two status calls
    pub interval: Duration,
    /// Maximum number of status calls; `None` means unbounded
    pub max_attempts: Option<u32>,
    /// Overall time budget; `None` means no deadline
    pub deadline: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: Some(600),
            deadline: None,
        }
    }
}

impl PollConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Poll `source` until the job reports `done`.
///
/// `on_update` sees every non-terminal state before the wait that follows it,
/// starting with `initial`. Exactly one status call is made per non-terminal
/// state observed. Errors from the status call end the loop unchanged.
///
/// # Errors
///
/// - `Cancelled` when `cancel` fires during a wait
/// - `PollLimitReached` when `max_attempts` status calls did not reach `done`
/// - `Timeout` when the deadline passes, including while a status call is
///   in flight
pub async fn poll_until_done<S, F>(
    source: &S,
    initial: QueuedJob,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_update: F,
) -> Result<QueuedJob, UrlqueryError>
where
    S: QueueStatusSource + ?Sized,
    F: FnMut(&QueuedJob),
{
    if initial.is_done() {
        return Ok(initial);
    }

    let queue_id = initial.queue_id.clone();
    require_non_empty("queue id", &queue_id)?;

    let deadline_at = config.deadline.map(|budget| (Instant::now() + budget, budget));
    let mut attempts: u32 = 0;
    let mut job = initial;

    while !job.is_done() {
        on_update(&job);

        if let Some(max) = config.max_attempts {
            if attempts >= max {
                return Err(UrlqueryError::PollLimitReached { queue_id, attempts });
            }
        }

        let mut wait = config.interval;
        if let Some((at, budget)) = deadline_at {
            let left = at.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Err(deadline_exceeded(&queue_id, budget));
            }
            wait = wait.min(left);
        }

        tokio::select! {
            _ = cancel.cancelled() => {
                return Err(UrlqueryError::cancelled(format!("waiting for queue '{}'", queue_id)));
            }
            _ = tokio::time::sleep(wait) => {}
        }

        // The deadline also bounds the status call itself
        let call = source.queue_status(&queue_id);
        let mut next = match deadline_at {
            Some((at, budget)) => tokio::time::timeout_at(at, call)
                .await
                .map_err(|_| deadline_exceeded(&queue_id, budget))??,
            None => call.await?,
        };
        attempts += 1;
        tracing::debug!(queue_id = %queue_id, status = %next.status, attempts, "queue status");

        // Status replies may omit the queue id
        if next.queue_id.is_empty() {
            next.queue_id = queue_id.clone();
        }
        job = next;
    }

    Ok(job)
}

fn deadline_exceeded(queue_id: &str, budget: Duration) -> UrlqueryError {
    UrlqueryError::timeout(format!("waiting for queue '{}'", queue_id), budget)
}

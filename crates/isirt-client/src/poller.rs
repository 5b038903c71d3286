//! Submit-then-poll for server-side background tasks (AI incident
//! suggestions). Status checks run strictly one after another, bounded by
//! `max_attempts`, and can be cancelled between checks.

use std::time::Duration;

use async_trait::async_trait;
use isirt_schema::{AsyncTask, IncidentSuggestion, TaskStatus};
use serde_json::Value;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::{ApiError, IsirtClient};

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;
const GENERIC_FAILURE: &str = "background task failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Total number of status requests before giving up.
    pub max_attempts: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            max_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("task {task_id} failed: {reason}")]
    Failed { task_id: String, reason: String },
    #[error("gave up on task {task_id} after {attempts} status checks")]
    GaveUp { task_id: String, attempts: u32 },
    #[error("polling of task {task_id} was cancelled")]
    Cancelled { task_id: String },
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("unexpected task result: {0}")]
    Decode(String),
}

/// Anything that can report the status of a background task.
#[async_trait]
pub trait TaskSource: Send + Sync {
    async fn task_status(&self, task_id: &str) -> Result<AsyncTask, ApiError>;
}

#[async_trait]
impl TaskSource for IsirtClient {
    async fn task_status(&self, task_id: &str) -> Result<AsyncTask, ApiError> {
        self.suggestion_task_status(task_id).await
    }
}

pub struct TaskPoller<'a> {
    source: &'a dyn TaskSource,
    config: PollConfig,
}

impl<'a> TaskPoller<'a> {
    pub fn new(source: &'a dyn TaskSource, config: PollConfig) -> Self {
        Self { source, config }
    }

    /// Polls until the task completes (returning its result untouched),
    /// fails, runs out of attempts, or `cancel` fires.
    pub async fn wait(&self, task_id: &str, cancel: &CancellationToken) -> Result<Value, PollError> {
        let max_attempts = self.config.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return Err(PollError::Cancelled {
                    task_id: task_id.to_string(),
                });
            }

            let task = self.source.task_status(task_id).await?;
            match task.status {
                TaskStatus::Completed => {
                    tracing::debug!("task {task_id} completed after {attempt} checks");
                    return Ok(task.result.unwrap_or(Value::Null));
                }
                TaskStatus::Failed => {
                    let reason = task
                        .failure_reason()
                        .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                    tracing::warn!("task {task_id} failed: {reason}");
                    return Err(PollError::Failed {
                        task_id: task_id.to_string(),
                        reason,
                    });
                }
                _ => {
                    tracing::debug!(
                        "task {task_id} still running (check {attempt}/{max_attempts})"
                    );
                }
            }

            if attempt < max_attempts {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        return Err(PollError::Cancelled { task_id: task_id.to_string() });
                    }
                    _ = time::sleep(self.config.interval) => {}
                }
            }
        }

        Err(PollError::GaveUp {
            task_id: task_id.to_string(),
            attempts: max_attempts,
        })
    }
}

impl IsirtClient {
    /// Submits `description` for AI analysis and waits for the suggestions.
    pub async fn suggest_incident(
        &self,
        description: &str,
        config: PollConfig,
        cancel: &CancellationToken,
    ) -> Result<Value, PollError> {
        let handle = self.request_incident_suggestions(description).await?;
        tracing::info!("suggestion task {} submitted", handle.task_id);
        TaskPoller::new(self, config)
            .wait(&handle.task_id, cancel)
            .await
    }

    pub async fn suggest_incident_typed(
        &self,
        description: &str,
        config: PollConfig,
        cancel: &CancellationToken,
    ) -> Result<IncidentSuggestion, PollError> {
        let result = self.suggest_incident(description, config, cancel).await?;
        serde_json::from_value(result).map_err(|e| PollError::Decode(e.to_string()))
    }
}

//! `InProcessRuntime` — runs workflows on the local Tokio runtime with no
//! external orchestrator, tracking status in memory.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::RuntimeError;
use crate::model::{RetryPolicy, RuntimeHandle, RuntimeStatus};
use crate::{ActivityFn, DurableRuntime};

/// In-memory run registry. Cleared on process restart — acceptable for a
/// local/dev deployment, and the same boundary the engine's status
/// reconciler is built to tolerate (authoritative status always wins).
pub struct InProcessRuntime {
    runs: Mutex<HashMap<String, RuntimeStatus>>,
}

impl InProcessRuntime {
    pub fn new() -> Self {
        Self {
            runs: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for InProcessRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DurableRuntime for InProcessRuntime {
    async fn start(
        &self,
        runtime_workflow_id: &str,
        _task_queue: &str,
        _config: Value,
        _inputs: Value,
    ) -> Result<RuntimeHandle, RuntimeError> {
        self.runs
            .lock()
            .unwrap()
            .insert(runtime_workflow_id.to_string(), RuntimeStatus::Running);

        Ok(RuntimeHandle {
            runtime_workflow_id: runtime_workflow_id.to_string(),
            run_id: Uuid::new_v4().to_string(),
        })
    }

    async fn run_activity(
        &self,
        name: &str,
        retry: RetryPolicy,
        f: ActivityFn,
    ) -> Result<Value, RuntimeError> {
        let mut attempt = 1;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < retry.max_attempts => {
                    let delay = retry.backoff_for_attempt(attempt);
                    warn!(activity = name, attempt, error = %err, ?delay, "activity attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    warn!(activity = name, attempt, error = %err, "activity exhausted retries");
                    return Err(err);
                }
            }
        }
    }

    async fn signal_cancel(&self, runtime_workflow_id: &str) -> Result<(), RuntimeError> {
        let mut runs = self.runs.lock().unwrap();
        match runs.get(runtime_workflow_id) {
            Some(status) if status.is_terminal() => {
                debug!(runtime_workflow_id, ?status, "cancel requested on terminal run, ignoring");
                Ok(())
            }
            Some(_) => {
                runs.insert(runtime_workflow_id.to_string(), RuntimeStatus::Cancelled);
                Ok(())
            }
            None => Err(RuntimeError::NotFound(runtime_workflow_id.to_string())),
        }
    }

    async fn describe(&self, runtime_workflow_id: &str) -> Result<RuntimeStatus, RuntimeError> {
        self.runs
            .lock()
            .unwrap()
            .get(runtime_workflow_id)
            .copied()
            .ok_or_else(|| RuntimeError::NotFound(runtime_workflow_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn start_then_describe_reports_running() {
        let runtime = InProcessRuntime::new();
        runtime.start("wf-1", "default", json!({}), json!({})).await.unwrap();
        assert_eq!(runtime.describe("wf-1").await.unwrap(), RuntimeStatus::Running);
    }

    #[tokio::test]
    async fn describe_unknown_run_is_not_found() {
        let runtime = InProcessRuntime::new();
        assert!(matches!(runtime.describe("missing").await, Err(RuntimeError::NotFound(_))));
    }

    #[tokio::test]
    async fn cancel_moves_running_to_cancelled() {
        let runtime = InProcessRuntime::new();
        runtime.start("wf-1", "default", json!({}), json!({})).await.unwrap();
        runtime.signal_cancel("wf-1").await.unwrap();
        assert_eq!(runtime.describe("wf-1").await.unwrap(), RuntimeStatus::Cancelled);
    }

    #[tokio::test]
    async fn cancel_on_terminal_run_is_a_noop() {
        let runtime = InProcessRuntime::new();
        runtime.start("wf-1", "default", json!({}), json!({})).await.unwrap();
        runtime.signal_cancel("wf-1").await.unwrap();
        runtime.signal_cancel("wf-1").await.unwrap();
        assert_eq!(runtime.describe("wf-1").await.unwrap(), RuntimeStatus::Cancelled);
    }

    #[tokio::test]
    async fn run_activity_retries_until_ok() {
        let runtime = InProcessRuntime::new();
        let calls = Arc::new(AtomicU32::new(0));
        let policy = RetryPolicy {
            max_attempts: 3,
            initial_interval: std::time::Duration::from_millis(1),
            max_interval: std::time::Duration::from_millis(2),
            backoff_coefficient: 1.0,
            start_to_close_timeout: std::time::Duration::from_secs(5),
        };

        let calls_clone = calls.clone();
        let f: ActivityFn = Box::new(move || {
            let calls = calls_clone.clone();
            Box::pin(async move {
                let seen = calls.fetch_add(1, Ordering::SeqCst) + 1;
                if seen < 2 {
                    Err(RuntimeError::Internal("not yet".into()))
                } else {
                    Ok(json!({"ok": true}))
                }
            })
        });

        let result = runtime.run_activity("noop", policy, f).await.unwrap();
        assert_eq!(result, json!({"ok": true}));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn run_activity_returns_last_error_after_exhausting_attempts() {
        let runtime = InProcessRuntime::new();
        let policy = RetryPolicy {
            max_attempts: 2,
            initial_interval: std::time::Duration::from_millis(1),
            max_interval: std::time::Duration::from_millis(1),
            backoff_coefficient: 1.0,
            start_to_close_timeout: std::time::Duration::from_secs(5),
        };

        let f: ActivityFn = Box::new(|| Box::pin(async { Err(RuntimeError::Internal("nope".into())) }));
        let result = runtime.run_activity("noop", policy, f).await;
        assert!(result.is_err());
    }
}

//! Status Reconciler (C7): keeps a locally-recorded [`Execution`] in sync
//! with the durable runtime's authoritative status.

use chrono::Utc;
use tracing::debug;

use runtime::{DurableRuntime, RuntimeStatus};

use crate::error::EngineError;
use crate::models::{Execution, ExecutionStatus};

fn map_status(status: RuntimeStatus) -> ExecutionStatus {
    match status {
        RuntimeStatus::Running => ExecutionStatus::Running,
        RuntimeStatus::Completed => ExecutionStatus::Completed,
        RuntimeStatus::Failed => ExecutionStatus::Failed,
        RuntimeStatus::Cancelled => ExecutionStatus::Cancelled,
    }
}

/// Ask `runtime` for the authoritative status of `execution` and apply it
/// if it moves the local record forward. A terminal local status is never
/// overwritten; a non-terminal authoritative status conflicting with a
/// terminal local one is ignored and logged at `debug`.
pub async fn reconcile(
    mut execution: Execution,
    runtime: &dyn DurableRuntime,
) -> Result<Execution, EngineError> {
    if execution.status.is_terminal() {
        return Ok(execution);
    }

    let authoritative = runtime.describe(&execution.runtime_workflow_id).await?;
    let mapped = map_status(authoritative);

    if mapped == execution.status {
        return Ok(execution);
    }

    if !mapped.is_terminal() {
        debug!(
            execution_id = %execution.id,
            local = %execution.status,
            authoritative = %mapped,
            "ignoring non-terminal authoritative status conflicting with local record"
        );
        return Ok(execution);
    }

    execution.status = mapped;
    execution.completed_at = Some(Utc::now());
    Ok(execution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use runtime::{ActivityFn, RetryPolicy, RuntimeError, RuntimeHandle};
    use serde_json::{json, Value};
    use uuid::Uuid;

    struct FixedRuntime(RuntimeStatus);

    #[async_trait]
    impl DurableRuntime for FixedRuntime {
        async fn start(&self, id: &str, _q: &str, _c: Value, _i: Value) -> Result<RuntimeHandle, RuntimeError> {
            Ok(RuntimeHandle { runtime_workflow_id: id.to_string(), run_id: "r".into() })
        }
        async fn run_activity(&self, _n: &str, _r: RetryPolicy, _f: ActivityFn) -> Result<Value, RuntimeError> {
            Ok(json!({}))
        }
        async fn signal_cancel(&self, _id: &str) -> Result<(), RuntimeError> {
            Ok(())
        }
        async fn describe(&self, _id: &str) -> Result<RuntimeStatus, RuntimeError> {
            Ok(self.0)
        }
    }

    fn execution(status: ExecutionStatus) -> Execution {
        Execution {
            id: Uuid::new_v4(),
            workflow_id: Uuid::new_v4(),
            runtime_workflow_id: "wf-1".into(),
            runtime_run_id: "run-1".into(),
            status,
            inputs: json!({}),
            outputs: None,
            error: None,
            started_at: Utc::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn terminal_authoritative_status_overwrites_running_local() {
        let runtime = FixedRuntime(RuntimeStatus::Completed);
        let result = reconcile(execution(ExecutionStatus::Running), &runtime).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Completed);
        assert!(result.completed_at.is_some());
    }

    #[tokio::test]
    async fn terminal_local_status_is_never_revisited() {
        let runtime = FixedRuntime(RuntimeStatus::Running);
        let result = reconcile(execution(ExecutionStatus::Failed), &runtime).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Failed);
    }

    #[tokio::test]
    async fn conflicting_non_terminal_authoritative_status_is_ignored() {
        let runtime = FixedRuntime(RuntimeStatus::Running);
        let result = reconcile(execution(ExecutionStatus::Running), &runtime).await.unwrap();
        assert_eq!(result.status, ExecutionStatus::Running);
    }
}

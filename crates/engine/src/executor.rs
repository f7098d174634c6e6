//! The DAG Executor (C5) — runs a validated workflow, node by node, in
//! topological order.
//!
//! Dispatch is a `match` over [`crate::models::NodeData`] (REDESIGN FLAG:
//! the source's duck-typed `data: Dict` branch-by-string-key becomes an
//! exhaustive match here). A single node's `Failed` outcome does not
//! abort the loop — downstream nodes still run, exactly like
//! `original_source`'s executor — but the *Execution* is marked `Failed`
//! at close, naming the first node that failed.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{info, instrument, warn};

use activity::{ActivityConfig, ActivityInvoker, ActivityOutcome};
use catalog::ActionCatalog;
use db::DbPool;
use runtime::{ActivityFn, DurableRuntime, RetryPolicy};

use crate::condition;
use crate::dag::{index_nodes, topological_order, validate_graph};
use crate::error::EngineError;
use crate::interpolator::interpolate;
use crate::models::{ExecutionStatus, LogStatus, NodeData, WorkflowDefinition, WorkflowState};

/// Optional Basic-auth credentials forwarded to every activity call.
#[derive(Debug, Clone, Default)]
pub struct ActionAuth {
    pub user: Option<String>,
    pub password: Option<String>,
}

/// Everything the executor needs to run a workflow, gathered behind one
/// struct so `WorkflowExecutor::new` doesn't take half a dozen arguments.
pub struct WorkflowExecutor {
    pool: DbPool,
    runtime: Arc<dyn DurableRuntime>,
    invoker: Arc<dyn ActivityInvoker>,
    catalog: Arc<ActionCatalog>,
    auth: ActionAuth,
}

/// Terminal result of a single execution run.
#[derive(Debug)]
pub struct ExecutionOutcome {
    pub execution_id: uuid::Uuid,
    pub status: ExecutionStatus,
    pub results: HashMap<String, Value>,
    pub error: Option<String>,
}

impl WorkflowExecutor {
    pub fn new(
        pool: DbPool,
        runtime: Arc<dyn DurableRuntime>,
        invoker: Arc<dyn ActivityInvoker>,
        catalog: Arc<ActionCatalog>,
        auth: ActionAuth,
    ) -> Self {
        Self { pool, runtime, invoker, catalog, auth }
    }

    #[instrument(skip(self, inputs), fields(workflow_id = %workflow.id))]
    pub async fn run(
        &self,
        workflow: &WorkflowDefinition,
        inputs: Value,
    ) -> Result<ExecutionOutcome, EngineError> {
        let (valid, errors) = validate_graph(&workflow.config, self.catalog.as_ref());
        if !valid {
            return Err(EngineError::Validation(errors));
        }

        let order = topological_order(&workflow.config);
        let nodes = index_nodes(&workflow.config);

        let exec_row = db::repository::executions::create_execution(&self.pool, workflow.id, inputs.clone())
            .await?;
        let execution_id = exec_row.id;

        let handle = self
            .runtime
            .start(&execution_id.to_string(), "default", json!(workflow.config), inputs.clone())
            .await?;
        db::repository::executions::attach_runtime_handle(
            &self.pool,
            execution_id,
            &handle.runtime_workflow_id,
            &handle.run_id,
        )
        .await?;

        info!(nodes = order.len(), "executing workflow");

        let mut state = WorkflowState::new(inputs);
        let mut first_failure: Option<String> = None;

        for node_id in &order {
            let Some(node) = nodes.get(node_id.as_str()) else {
                warn!(node_id, "node disappeared from index between ordering and dispatch");
                continue;
            };

            let (log_status, output, error) = match &node.data {
                NodeData::Action { action_name, config, .. } => {
                    self.dispatch_action(action_name, config, &state).await
                }
                NodeData::Condition { condition, .. } => {
                    let result = condition::evaluate(condition, &state.as_value());
                    (LogStatus::Success, Some(json!({ "result": result })), None)
                }
                NodeData::Loop { collection, .. } => self.dispatch_loop(collection, &state),
            };

            if let Some(ref output) = output {
                state.results.insert(node_id.clone(), output.clone());
            }

            if log_status == LogStatus::Failed && first_failure.is_none() {
                first_failure = Some(node_id.clone());
            }

            db::repository::executions::append_log(
                &self.pool,
                execution_id,
                node_id,
                node.data.action_name(),
                &log_status.to_string(),
                state.as_value(),
                output,
                error.as_deref(),
            )
            .await?;
        }

        let (status, error) = match &first_failure {
            Some(node_id) => (
                ExecutionStatus::Failed,
                Some(format!("node '{node_id}' failed")),
            ),
            None => (ExecutionStatus::Completed, None),
        };

        let outputs = json!(state.results);
        let applied = db::repository::executions::complete_execution_if_running(
            &self.pool,
            execution_id,
            &status.to_string(),
            Some(outputs),
            error.as_deref(),
        )
        .await?;

        // A concurrent cancel can have already moved the row past
        // `RUNNING`; terminal states are absorbing, so that write wins
        // and this run's own result must not clobber it.
        let (status, error) = if applied {
            (status, error)
        } else {
            let row = db::repository::executions::get_execution(&self.pool, execution_id).await?;
            let observed = row.status.parse::<ExecutionStatus>().unwrap_or(status);
            (observed, row.error)
        };

        Ok(ExecutionOutcome {
            execution_id,
            status,
            results: state.results,
            error,
        })
    }

    async fn dispatch_action(
        &self,
        action_name: &str,
        config: &Value,
        state: &WorkflowState,
    ) -> (LogStatus, Option<Value>, Option<String>) {
        let Some(action) = self.catalog.get_active(action_name) else {
            let error = format!("action '{action_name}' is not registered or inactive");
            warn!(action_name, "dispatching unknown action");
            return (LogStatus::Failed, Some(json!({"status": "FAILED", "error": error})), Some(error));
        };

        let interpolated_config = interpolate(config, &state.as_value());

        let activity_config = ActivityConfig {
            endpoint: action.endpoint.clone(),
            http_method: action.http_method.clone(),
            auth_user: self.auth.user.clone(),
            auth_password: self.auth.password.clone(),
            event_data: json!({ "action_name": action_name }),
            configurations: interpolated_config,
            data: state.as_value(),
        };

        let invoker = self.invoker.clone();
        let action_name_owned = action_name.to_string();
        let activity_fn: ActivityFn = Box::new(move || {
            let invoker = invoker.clone();
            let config = activity_config.clone();
            let action_name = action_name_owned.clone();
            Box::pin(async move {
                // The activity invoker already owns its own bounded retry
                // loop and never raises; we always return `Ok` here so the
                // runtime's own retry policy stays inert (see module docs
                // on `runtime::ActivityFn`) and each action is invoked
                // exactly once through this closure.
                let outcome = invoker.invoke(&config).await;
                Ok(match outcome {
                    ActivityOutcome::Success { data } => {
                        json!({ "status": "SUCCESS", "data": data, "action_name": action_name })
                    }
                    ActivityOutcome::Failed { error } => {
                        json!({ "status": "FAILED", "error": error, "action_name": action_name })
                    }
                })
            })
        });

        let result = self
            .runtime
            .run_activity(action_name, RetryPolicy::activity_default(), activity_fn)
            .await;

        match result {
            Ok(value) => {
                if value.get("status").and_then(|v| v.as_str()) == Some("SUCCESS") {
                    (LogStatus::Success, Some(value), None)
                } else {
                    let error = value
                        .get("error")
                        .and_then(|v| v.as_str())
                        .unwrap_or("activity failed")
                        .to_string();
                    (LogStatus::Failed, Some(value), Some(error))
                }
            }
            Err(err) => {
                let error = err.to_string();
                (LogStatus::Failed, Some(json!({"status": "FAILED", "error": error})), Some(error))
            }
        }
    }

    /// `original_source` never executes a loop body — it only resolves
    /// the collection and records its items. Carried forward as a
    /// documented limitation rather than invented functionality.
    fn dispatch_loop(&self, collection: &str, state: &WorkflowState) -> (LogStatus, Option<Value>, Option<String>) {
        match crate::interpolator::resolve_path(collection, &state.as_value()) {
            Some(Value::Array(items)) => (LogStatus::Success, Some(json!(items)), None),
            Some(_) => {
                warn!(collection, "loop collection path did not resolve to an array");
                (LogStatus::Success, Some(json!([])), None)
            }
            None => {
                warn!(collection, "loop collection path not found in state");
                (LogStatus::Success, Some(json!([])), None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use activity::mock::MockActionExecutor;
    use catalog::Action;
    use chrono::Utc;
    use runtime::InProcessRuntime;

    fn action(name: &str) -> Action {
        Action {
            id: uuid::Uuid::new_v4(),
            action_name: name.to_string(),
            display_name: None,
            class_name: "Demo".into(),
            method_name: "run".into(),
            domain: "demo".into(),
            endpoint: name.to_string(),
            http_method: "POST".into(),
            description: None,
            parameters: json!({}),
            returns: json!({}),
            category: None,
            tags: vec![],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// A lazily-connecting pool never touches the network until a query
    /// actually runs, which the dispatch-level tests below never do.
    fn unreachable_pool() -> DbPool {
        sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .expect("lazy pool construction never touches the network")
    }

    fn test_executor(outcome: ActivityOutcome) -> WorkflowExecutor {
        let catalog = Arc::new(ActionCatalog::new(vec![action("ping")]));
        let runtime: Arc<dyn DurableRuntime> = Arc::new(InProcessRuntime::new());
        let invoker: Arc<dyn ActivityInvoker> =
            Arc::new(MockActionExecutor::new().with_outcome("ping", outcome));
        WorkflowExecutor::new(unreachable_pool(), runtime, invoker, catalog, ActionAuth::default())
    }

    #[test]
    fn loop_dispatch_resolves_array_collection() {
        let state = WorkflowState {
            inputs: json!({}),
            results: HashMap::from([("prev".to_string(), json!({"items": [1, 2, 3]}))]),
        };
        let executor = test_executor(ActivityOutcome::Success { data: json!({}) });
        let (status, output, error) = executor.dispatch_loop("results.prev.items", &state);
        assert_eq!(status, LogStatus::Success);
        assert_eq!(output, Some(json!([1, 2, 3])));
        assert!(error.is_none());
    }

    #[test]
    fn loop_dispatch_missing_path_yields_empty_array() {
        let state = WorkflowState::new(json!({}));
        let executor = test_executor(ActivityOutcome::Success { data: json!({}) });
        let (status, output, _) = executor.dispatch_loop("results.missing", &state);
        assert_eq!(status, LogStatus::Success);
        assert_eq!(output, Some(json!([])));
    }

    #[tokio::test]
    async fn action_dispatch_unknown_action_fails_without_calling_invoker() {
        let state = WorkflowState::new(json!({}));
        let executor = test_executor(ActivityOutcome::Success { data: json!({}) });
        let (status, _, error) = executor.dispatch_action("not_registered", &json!({}), &state).await;
        assert_eq!(status, LogStatus::Failed);
        assert!(error.unwrap().contains("not_registered"));
    }

    #[tokio::test]
    async fn action_dispatch_success_records_data() {
        let state = WorkflowState::new(json!({}));
        let executor = test_executor(ActivityOutcome::Success { data: json!({"ok": true}) });
        let (status, output, error) = executor.dispatch_action("ping", &json!({}), &state).await;
        assert_eq!(status, LogStatus::Success);
        assert!(error.is_none());
        assert_eq!(output.unwrap()["data"], json!({"ok": true}));
    }

    #[tokio::test]
    async fn action_dispatch_failure_is_recorded_without_aborting() {
        let state = WorkflowState::new(json!({}));
        let executor = test_executor(ActivityOutcome::Failed { error: "boom".into() });
        let (status, _, error) = executor.dispatch_action("ping", &json!({}), &state).await;
        assert_eq!(status, LogStatus::Failed);
        assert_eq!(error.unwrap(), "boom");
    }
}

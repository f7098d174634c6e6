//! `GET /executions`, `GET /executions/{id}` (with logs), cancel + sync.

use axum::extract::{Path, Query, State};
use axum::Json;
use db::models::ExecutionLogRow;
use engine::{Execution, ExecutionStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::convert::execution_from_row;
use crate::error::ApiError;
use crate::AppState;

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct ListExecutionsQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub workflow_id: Option<Uuid>,
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExecutionDetail {
    #[serde(flatten)]
    pub execution: Execution,
    pub logs: Vec<ExecutionLogRow>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListExecutionsQuery>,
) -> Result<Json<Vec<Execution>>, ApiError> {
    let rows = db::repository::executions::list_executions(
        &state.pool,
        query.skip,
        query.limit,
        query.workflow_id,
        query.status.as_deref(),
    )
    .await?;

    Ok(Json(rows.into_iter().map(execution_from_row).collect()))
}

pub async fn get(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<ExecutionDetail>, ApiError> {
    let row = db::repository::executions::get_execution(&state.pool, id).await?;
    let logs = db::repository::executions::list_logs(&state.pool, id).await?;

    Ok(Json(ExecutionDetail { execution: execution_from_row(row), logs }))
}

pub async fn sync(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<Execution>, ApiError> {
    let row = db::repository::executions::get_execution(&state.pool, id).await?;
    let execution = execution_from_row(row);

    let reconciled = engine::reconcile(execution, state.runtime.as_ref()).await?;

    db::repository::executions::update_execution_status(
        &state.pool,
        id,
        &reconciled.status.to_string(),
        reconciled.outputs.clone(),
        reconciled.error.as_deref(),
        reconciled.status.is_terminal(),
    )
    .await?;

    Ok(Json(reconciled))
}

pub async fn cancel(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<Execution>, ApiError> {
    let row = db::repository::executions::get_execution(&state.pool, id).await?;
    let mut execution = execution_from_row(row);

    if execution.status != ExecutionStatus::Running {
        return Err(ApiError::bad_request(format!(
            "cannot cancel while execution is {}",
            execution.status
        )));
    }

    state.runtime.signal_cancel(&execution.runtime_workflow_id).await?;

    execution.status = ExecutionStatus::Cancelled;
    execution.completed_at = Some(chrono::Utc::now());

    db::repository::executions::update_execution_status(
        &state.pool,
        id,
        &execution.status.to_string(),
        execution.outputs.clone(),
        execution.error.as_deref(),
        true,
    )
    .await?;

    Ok(Json(execution))
}

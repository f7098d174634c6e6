//! Execution and execution-log repository functions.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    DbError,
    models::{ExecutionLogRow, ExecutionRow},
};

// ---------------------------------------------------------------------------
// executions
// ---------------------------------------------------------------------------

/// Create a new execution record in `running` status.
pub async fn create_execution(
    pool: &PgPool,
    workflow_id: Uuid,
    inputs: serde_json::Value,
) -> Result<ExecutionRow, DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as!(
        ExecutionRow,
        r#"
        INSERT INTO executions
            (id, workflow_id, runtime_workflow_id, runtime_run_id, status, inputs, outputs, error, started_at, completed_at)
        VALUES ($1, $2, NULL, NULL, 'RUNNING', $3, NULL, NULL, $4, NULL)
        RETURNING id, workflow_id, runtime_workflow_id, runtime_run_id, status, inputs, outputs, error, started_at, completed_at
        "#,
        id,
        workflow_id,
        inputs,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single execution by primary key.
pub async fn get_execution(pool: &PgPool, id: Uuid) -> Result<ExecutionRow, DbError> {
    let row = sqlx::query_as!(
        ExecutionRow,
        r#"
        SELECT id, workflow_id, runtime_workflow_id, runtime_run_id, status, inputs, outputs, error, started_at, completed_at
        FROM executions WHERE id = $1
        "#,
        id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// List executions, newest first, optionally filtered by workflow and/or
/// status, paginated.
pub async fn list_executions(
    pool: &PgPool,
    skip: i64,
    limit: i64,
    workflow_id: Option<Uuid>,
    status: Option<&str>,
) -> Result<Vec<ExecutionRow>, DbError> {
    let rows = sqlx::query_as!(
        ExecutionRow,
        r#"
        SELECT id, workflow_id, runtime_workflow_id, runtime_run_id, status, inputs, outputs, error, started_at, completed_at
        FROM executions
        WHERE ($3::uuid IS NULL OR workflow_id = $3)
          AND ($4::text IS NULL OR status = $4)
        ORDER BY started_at DESC
        OFFSET $1 LIMIT $2
        "#,
        skip,
        limit,
        workflow_id,
        status,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Record the runtime handle returned by `DurableRuntime::start`.
pub async fn attach_runtime_handle(
    pool: &PgPool,
    execution_id: Uuid,
    runtime_workflow_id: &str,
    runtime_run_id: &str,
) -> Result<(), DbError> {
    sqlx::query!(
        "UPDATE executions SET runtime_workflow_id = $2, runtime_run_id = $3 WHERE id = $1",
        execution_id,
        runtime_workflow_id,
        runtime_run_id,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Write a terminal result, but only while the row is still `RUNNING`.
///
/// Terminal states are absorbing: a concurrent cancel can already have
/// flipped the row to `CANCELLED` by the time a run finishes, and that
/// write must win. Returns `true` if this call actually applied the
/// result, `false` if the row had already moved on to some other status.
pub async fn complete_execution_if_running(
    pool: &PgPool,
    execution_id: Uuid,
    status: &str,
    outputs: Option<serde_json::Value>,
    error: Option<&str>,
) -> Result<bool, DbError> {
    let result = sqlx::query!(
        r#"
        UPDATE executions
        SET status = $2, outputs = $3, error = $4, completed_at = $5
        WHERE id = $1 AND status = 'RUNNING'
        "#,
        execution_id,
        status,
        outputs,
        error,
        Utc::now(),
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Update `status` (and `outputs`/`error` when terminal), stamping
/// `completed_at` iff the new status is terminal.
pub async fn update_execution_status(
    pool: &PgPool,
    execution_id: Uuid,
    status: &str,
    outputs: Option<serde_json::Value>,
    error: Option<&str>,
    terminal: bool,
) -> Result<(), DbError> {
    if terminal {
        sqlx::query!(
            r#"
            UPDATE executions
            SET status = $2, outputs = $3, error = $4, completed_at = $5
            WHERE id = $1
            "#,
            execution_id,
            status,
            outputs,
            error,
            Utc::now(),
        )
        .execute(pool)
        .await?;
    } else {
        sqlx::query!(
            "UPDATE executions SET status = $2 WHERE id = $1",
            execution_id,
            status,
        )
        .execute(pool)
        .await?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// execution_logs
// ---------------------------------------------------------------------------

/// Append a step log entry.
pub async fn append_log(
    pool: &PgPool,
    execution_id: Uuid,
    step_name: &str,
    action_name: Option<&str>,
    status: &str,
    inputs: serde_json::Value,
    outputs: Option<serde_json::Value>,
    error: Option<&str>,
) -> Result<ExecutionLogRow, DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as!(
        ExecutionLogRow,
        r#"
        INSERT INTO execution_logs
            (id, execution_id, step_name, action_name, status, inputs, outputs, error, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, execution_id, step_name, action_name, status, inputs, outputs, error, created_at
        "#,
        id,
        execution_id,
        step_name,
        action_name,
        status,
        inputs,
        outputs,
        error,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch all log entries for an execution, in step order.
pub async fn list_logs(pool: &PgPool, execution_id: Uuid) -> Result<Vec<ExecutionLogRow>, DbError> {
    let rows = sqlx::query_as!(
        ExecutionLogRow,
        r#"
        SELECT id, execution_id, step_name, action_name, status, inputs, outputs, error, created_at
        FROM execution_logs WHERE execution_id = $1 ORDER BY created_at ASC
        "#,
        execution_id,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

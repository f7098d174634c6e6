//! Workflow CRUD operations.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, models::WorkflowRow};

/// Insert a new workflow definition at version 1.
pub async fn create_workflow(
    pool: &PgPool,
    name: &str,
    description: Option<&str>,
    config: serde_json::Value,
    created_by: Option<&str>,
) -> Result<WorkflowRow, DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as!(
        WorkflowRow,
        r#"
        INSERT INTO workflows
            (id, name, description, version, is_active, config, created_by, created_at, updated_at)
        VALUES ($1, $2, $3, 1, true, $4, $5, $6, $6)
        RETURNING id, name, description, version, is_active, config, created_by, created_at, updated_at
        "#,
        id,
        name,
        description,
        config,
        created_by,
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Fetch a single workflow by its primary key, active or not.
pub async fn get_workflow(pool: &PgPool, id: Uuid) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as!(
        WorkflowRow,
        r#"
        SELECT id, name, description, version, is_active, config, created_by, created_at, updated_at
        FROM workflows WHERE id = $1
        "#,
        id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Return active workflows, newest first, paginated.
pub async fn list_workflows(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<WorkflowRow>, DbError> {
    let rows = sqlx::query_as!(
        WorkflowRow,
        r#"
        SELECT id, name, description, version, is_active, config, created_by, created_at, updated_at
        FROM workflows
        WHERE is_active
        ORDER BY created_at DESC
        OFFSET $1 LIMIT $2
        "#,
        skip,
        limit,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replace `name`/`description`/`config`, bumping `version` by one.
pub async fn update_workflow(
    pool: &PgPool,
    id: Uuid,
    name: &str,
    description: Option<&str>,
    config: serde_json::Value,
) -> Result<WorkflowRow, DbError> {
    let row = sqlx::query_as!(
        WorkflowRow,
        r#"
        UPDATE workflows
        SET name = $2, description = $3, config = $4, version = version + 1, updated_at = $5
        WHERE id = $1
        RETURNING id, name, description, version, is_active, config, created_by, created_at, updated_at
        "#,
        id,
        name,
        description,
        config,
        Utc::now(),
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Soft-delete: flips `is_active` to `false` rather than removing the
/// row, so past executions still resolve their `workflow_id`.
pub async fn soft_delete_workflow(pool: &PgPool, id: Uuid) -> Result<(), DbError> {
    let result = sqlx::query!(
        "UPDATE workflows SET is_active = false, updated_at = $2 WHERE id = $1 AND is_active",
        id,
        Utc::now(),
    )
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }

    Ok(())
}

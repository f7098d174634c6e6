//! Conversation-session repository functions.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DbError, models::ConversationSessionRow};

/// Start a new conversation session with an empty transcript and no draft.
pub async fn create_session(pool: &PgPool) -> Result<ConversationSessionRow, DbError> {
    let id = Uuid::new_v4();
    let now = Utc::now();

    let row = sqlx::query_as!(
        ConversationSessionRow,
        r#"
        INSERT INTO conversation_sessions (id, status, workflow_id, workflow_draft, messages, created_at, updated_at)
        VALUES ($1, 'active', NULL, NULL, $2, $3, $3)
        RETURNING id, status, workflow_id, workflow_draft, messages, created_at, updated_at
        "#,
        id,
        serde_json::json!([]),
        now,
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

pub async fn get_session(pool: &PgPool, id: Uuid) -> Result<ConversationSessionRow, DbError> {
    let row = sqlx::query_as!(
        ConversationSessionRow,
        "SELECT id, status, workflow_id, workflow_draft, messages, created_at, updated_at FROM conversation_sessions WHERE id = $1",
        id,
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Replace `status`/`workflow_draft`/`messages` wholesale after a turn.
/// `workflow_id` is carried through unchanged rather than reset, since a
/// turn never un-promotes a session.
pub async fn upsert_session(
    pool: &PgPool,
    id: Uuid,
    status: &str,
    workflow_draft: Option<serde_json::Value>,
    messages: serde_json::Value,
) -> Result<ConversationSessionRow, DbError> {
    let row = sqlx::query_as!(
        ConversationSessionRow,
        r#"
        INSERT INTO conversation_sessions (id, status, workflow_id, workflow_draft, messages, created_at, updated_at)
        VALUES ($1, $2, NULL, $3, $4, $5, $5)
        ON CONFLICT (id) DO UPDATE
        SET status = EXCLUDED.status,
            workflow_draft = EXCLUDED.workflow_draft,
            messages = EXCLUDED.messages,
            updated_at = EXCLUDED.updated_at
        RETURNING id, status, workflow_id, workflow_draft, messages, created_at, updated_at
        "#,
        id,
        status,
        workflow_draft,
        messages,
        Utc::now(),
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Record that `session_id` was promoted to a saved workflow, moving the
/// session to `completed`.
pub async fn promote_session(
    pool: &PgPool,
    session_id: Uuid,
    workflow_id: Uuid,
) -> Result<ConversationSessionRow, DbError> {
    let row = sqlx::query_as!(
        ConversationSessionRow,
        r#"
        UPDATE conversation_sessions
        SET workflow_id = $2, status = 'completed', updated_at = $3
        WHERE id = $1
        RETURNING id, status, workflow_id, workflow_draft, messages, created_at, updated_at
        "#,
        session_id,
        workflow_id,
        Utc::now(),
    )
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

pub async fn list_sessions(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<ConversationSessionRow>, DbError> {
    let rows = sqlx::query_as!(
        ConversationSessionRow,
        r#"
        SELECT id, status, workflow_id, workflow_draft, messages, created_at, updated_at
        FROM conversation_sessions ORDER BY updated_at DESC OFFSET $1 LIMIT $2
        "#,
        skip,
        limit,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

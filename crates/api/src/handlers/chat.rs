//! `POST /chat` + session CRUD.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use db::models::ConversationSessionRow;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChatTurnDto {
    pub session_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatTurnResponse {
    pub session_id: Uuid,
    pub response: String,
    pub workflow_draft: Option<Value>,
    pub messages: Value,
}

pub async fn turn(
    State(state): State<AppState>,
    Json(payload): Json<ChatTurnDto>,
) -> Result<Json<ChatTurnResponse>, ApiError> {
    let session = match payload.session_id {
        Some(id) => db::repository::conversations::get_session(&state.pool, id).await?,
        None => db::repository::conversations::create_session(&state.pool).await?,
    };

    let mut messages: Vec<agent::Message> = serde_json::from_value(session.messages).unwrap_or_default();
    let mut draft = session.workflow_draft;

    let result = agent::handle_turn(
        state.llm.as_ref(),
        state.catalog.as_ref(),
        &mut messages,
        &mut draft,
        &payload.message,
    )
    .await;

    let enriched_draft = draft.map(|d| agent::enrich_nodes(d, state.catalog.as_ref()));

    let updated = db::repository::conversations::upsert_session(
        &state.pool,
        session.id,
        "active",
        enriched_draft.clone(),
        serde_json::to_value(&messages).unwrap_or_default(),
    )
    .await?;

    Ok(Json(ChatTurnResponse {
        session_id: updated.id,
        response: result.reply,
        workflow_draft: updated.workflow_draft,
        messages: updated.messages,
    }))
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<ConversationSessionRow>>, ApiError> {
    let rows = db::repository::conversations::list_sessions(&state.pool, page.skip, page.limit).await?;
    Ok(Json(rows))
}

pub async fn get_session(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ConversationSessionRow>, ApiError> {
    let row = db::repository::conversations::get_session(&state.pool, id).await?;
    Ok(Json(row))
}

pub async fn delete_session(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    let row = db::repository::conversations::get_session(&state.pool, id).await?;
    db::repository::conversations::upsert_session(&state.pool, row.id, "abandoned", row.workflow_draft, row.messages)
        .await?;
    Ok(StatusCode::OK)
}

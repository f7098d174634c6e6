//! Workflow CRUD + execute + suggest-metadata handlers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use engine::{WorkflowConfig, WorkflowDefinition};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::convert::workflow_from_row;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct CreateWorkflowDto {
    pub name: String,
    pub description: Option<String>,
    pub config: WorkflowConfig,
    /// Set when this workflow is being promoted from a chat draft; the
    /// originating session is marked `completed` and linked to it.
    #[serde(default)]
    pub session_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkflowDto {
    pub name: Option<String>,
    pub description: Option<String>,
    pub config: Option<WorkflowConfig>,
}

#[derive(Debug, Deserialize)]
pub struct ExecuteWorkflowDto {
    #[serde(default)]
    pub inputs: Value,
}

#[derive(Debug, Serialize)]
pub struct ExecuteResponse {
    pub execution_id: Uuid,
    pub runtime_workflow_id: String,
    pub status: String,
}

pub async fn list(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> Result<Json<Vec<WorkflowDefinition>>, ApiError> {
    let rows = db::repository::workflows::list_workflows(&state.pool, page.skip, page.limit).await?;
    Ok(Json(rows.into_iter().map(workflow_from_row).collect()))
}

pub async fn get(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<WorkflowDefinition>, ApiError> {
    let row = db::repository::workflows::get_workflow(&state.pool, id).await?;
    Ok(Json(workflow_from_row(row)))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CreateWorkflowDto>,
) -> Result<(StatusCode, Json<WorkflowDefinition>), ApiError> {
    let (valid, errors) = engine::dag::validate_graph(&payload.config, state.catalog.as_ref());
    if !valid {
        return Err(ApiError::bad_request(errors.join("; ")));
    }

    let row = db::repository::workflows::create_workflow(
        &state.pool,
        &payload.name,
        payload.description.as_deref(),
        serde_json::to_value(&payload.config).unwrap_or_default(),
        None,
    )
    .await?;

    if let Some(session_id) = payload.session_id {
        db::repository::conversations::promote_session(&state.pool, session_id, row.id).await?;
    }

    Ok((StatusCode::CREATED, Json(workflow_from_row(row))))
}

pub async fn update(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateWorkflowDto>,
) -> Result<Json<WorkflowDefinition>, ApiError> {
    let existing = db::repository::workflows::get_workflow(&state.pool, id).await?;

    if let Some(ref config) = payload.config {
        let (valid, errors) = engine::dag::validate_graph(config, state.catalog.as_ref());
        if !valid {
            return Err(ApiError::bad_request(errors.join("; ")));
        }
    }

    let name = payload.name.unwrap_or(existing.name);
    let description = payload.description.or(existing.description);
    let config = payload
        .config
        .map(|c| serde_json::to_value(&c).unwrap_or_default())
        .unwrap_or(existing.config);

    let row =
        db::repository::workflows::update_workflow(&state.pool, id, &name, description.as_deref(), config).await?;
    Ok(Json(workflow_from_row(row)))
}

pub async fn delete(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    db::repository::workflows::soft_delete_workflow(&state.pool, id).await?;
    Ok(StatusCode::OK)
}

pub async fn execute(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<ExecuteWorkflowDto>,
) -> Result<(StatusCode, Json<ExecuteResponse>), ApiError> {
    let row = db::repository::workflows::get_workflow(&state.pool, id).await?;
    let workflow = workflow_from_row(row);

    let executor = engine::WorkflowExecutor::new(
        state.pool.clone(),
        state.runtime.clone(),
        state.invoker.clone(),
        state.catalog.clone(),
        state.action_auth.clone(),
    );

    let outcome = executor.run(&workflow, payload.inputs).await?;

    Ok((
        StatusCode::OK,
        Json(ExecuteResponse {
            execution_id: outcome.execution_id,
            runtime_workflow_id: outcome.execution_id.to_string(),
            status: outcome.status.to_string(),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SuggestMetadataDto {
    pub nodes: Vec<Value>,
    #[serde(default)]
    pub edges: Vec<Value>,
}

pub async fn suggest_metadata(
    State(state): State<AppState>,
    Json(payload): Json<SuggestMetadataDto>,
) -> Result<Json<agent::SuggestedMetadata>, ApiError> {
    if payload.nodes.is_empty() {
        return Err(ApiError::bad_request("cannot suggest metadata for an empty node list"));
    }

    let _ = payload.edges;
    let metadata = agent::suggest_metadata(&payload.nodes, state.llm.as_ref()).await;
    Ok(Json(metadata))
}

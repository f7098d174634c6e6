//! `GET /actions`, `GET /actions/{id}` — read-only catalog browsing.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListActionsQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub skip: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

#[derive(Debug, Serialize)]
pub struct ActionDto {
    pub id: Uuid,
    pub action_name: String,
    pub display_name: String,
    pub domain: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub parameters: serde_json::Value,
    pub is_active: bool,
}

impl From<&catalog::Action> for ActionDto {
    fn from(action: &catalog::Action) -> Self {
        Self {
            id: action.id,
            action_name: action.action_name.clone(),
            display_name: action.resolved_display_name(),
            domain: action.domain.clone(),
            category: action.category.clone(),
            description: action.description.clone(),
            parameters: action.parameters.clone(),
            is_active: action.is_active,
        }
    }
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListActionsQuery>,
) -> Json<Vec<ActionDto>> {
    let mut actions: Vec<&catalog::Action> = state
        .catalog
        .iter()
        .filter(|a| query.category.as_deref().map(|c| a.category.as_deref() == Some(c)).unwrap_or(true))
        .filter(|a| {
            query
                .search
                .as_deref()
                .map(|needle| a.action_name.contains(needle) || a.resolved_display_name().contains(needle))
                .unwrap_or(true)
        })
        .collect();

    actions.sort_by(|a, b| a.action_name.cmp(&b.action_name));

    let page = actions.into_iter().skip(query.skip).take(query.limit).map(ActionDto::from).collect();
    Json(page)
}

pub async fn get(Path(id): Path<Uuid>, State(state): State<AppState>) -> Result<Json<ActionDto>, ApiError> {
    state
        .catalog
        .iter()
        .find(|a| a.id == id)
        .map(ActionDto::from)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("action not found"))
}

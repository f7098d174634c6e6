//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models — they carry no domain behaviour.
//! Domain types live in the `engine` crate; repository functions convert
//! between the two at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// workflows
// ---------------------------------------------------------------------------

/// A persisted workflow definition row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub version: i32,
    pub is_active: bool,
    /// `{nodes, edges}`, serialised from `engine::models::WorkflowConfig`.
    pub config: serde_json::Value,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// executions
// ---------------------------------------------------------------------------

/// A persisted workflow execution row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExecutionRow {
    pub id: Uuid,
    pub workflow_id: Uuid,
    pub runtime_workflow_id: Option<String>,
    pub runtime_run_id: Option<String>,
    pub status: String,
    pub inputs: serde_json::Value,
    pub outputs: Option<serde_json::Value>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// ---------------------------------------------------------------------------
// execution_logs
// ---------------------------------------------------------------------------

/// One step's worth of logging within an execution.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExecutionLogRow {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub step_name: String,
    pub action_name: Option<String>,
    pub status: String,
    pub inputs: serde_json::Value,
    pub outputs: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// conversation_sessions
// ---------------------------------------------------------------------------

/// A persisted conversational-agent session, including the in-progress
/// workflow draft and the running message transcript.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversationSessionRow {
    pub id: Uuid,
    pub status: String,
    /// Set once the draft is promoted to a saved workflow via `POST /workflows`.
    pub workflow_id: Option<Uuid>,
    /// `{nodes, edges}` draft, or `null` before the first turn produces one.
    pub workflow_draft: Option<serde_json::Value>,
    /// Array of `{role, content}` messages, oldest first.
    pub messages: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

//! Core domain models for the workflow engine.
//!
//! These are the source of truth for what a workflow, execution, and
//! node graph look like in memory. They serialise 1:1 onto the JSONB
//! columns the `db` crate's row structs carry — `db::models` holds the
//! *persistence* shape, this module holds the *domain* shape, and a thin
//! `serde_json` round-trip sits between the two (same split the teacher
//! draws between its engine models and its db row structs).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Node / Edge / WorkflowConfig
// ---------------------------------------------------------------------------

/// Presentational-only coordinates; the engine never reads these.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl Default for Position {
    fn default() -> Self {
        Self { x: 0.0, y: 0.0 }
    }
}

/// Variant-specific payload for a node. Adjacently tagged: `type` names
/// the variant, `data` carries its fields — matching the wire shape
/// `{"id", "type", "data": {...}, "position"}` rather than flattening
/// the variant's fields straight onto the node.
///
/// Replaces the source's duck-typed `data: Dict` with a proper sum type
/// (REDESIGN FLAG): the executor becomes a `match` instead of a series of
/// `.get()` calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum NodeData {
    Action {
        action_name: String,
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        config: serde_json::Value,
    },
    Condition {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        condition: String,
    },
    Loop {
        #[serde(default)]
        label: Option<String>,
        #[serde(default)]
        collection: String,
    },
}

impl NodeData {
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeData::Action { label, .. }
            | NodeData::Condition { label, .. }
            | NodeData::Loop { label, .. } => label.as_deref(),
        }
    }

    pub fn action_name(&self) -> Option<&str> {
        match self {
            NodeData::Action { action_name, .. } => Some(action_name.as_str()),
            _ => None,
        }
    }
}

/// A single step in the workflow graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier within this workflow (referenced by edges).
    pub id: String,
    #[serde(flatten)]
    pub data: NodeData,
    #[serde(default)]
    pub position: Position,
}

/// The kind of edge — `default` for a plain sequencing arrow, `conditional`
/// for one gated by the source condition node's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Default,
    Conditional,
}

impl Default for EdgeKind {
    fn default() -> Self {
        EdgeKind::Default
    }
}

/// Directed edge from one node to another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type", default)]
    pub edge_type: EdgeKind,
    #[serde(default)]
    pub label: Option<String>,
}

/// The wire/persisted shape of a workflow's graph: `{nodes, edges}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl WorkflowConfig {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// WorkflowDefinition
// ---------------------------------------------------------------------------

/// A complete, versioned workflow definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub version: u32,
    pub is_active: bool,
    pub config: WorkflowConfig,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowDefinition {
    pub fn new(name: impl Into<String>, config: WorkflowConfig) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            version: 1,
            is_active: true,
            config,
            created_by: "admin".into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update in place and bump the version, per the invariant
    /// that `(name, version)` is unique and an update mutates in place.
    pub fn apply_update(
        &mut self,
        name: Option<String>,
        description: Option<String>,
        config: Option<WorkflowConfig>,
    ) {
        if let Some(name) = name {
            self.name = name;
        }
        if description.is_some() {
            self.description = description;
        }
        if let Some(config) = config {
            self.config = config;
        }
        self.version += 1;
        self.updated_at = Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Execution / ExecutionLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExecutionStatus {
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ExecutionStatus::Completed | ExecutionStatus::Failed | ExecutionStatus::Cancelled
        )
    }
}

impl std::fmt::Display for ExecutionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExecutionStatus::Running => "RUNNING",
            ExecutionStatus::Completed => "COMPLETED",
            ExecutionStatus::Failed => "FAILED",
            ExecutionStatus::Cancelled => "CANCELLED",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RUNNING" => Ok(Self::Running),
            "COMPLETED" => Ok(Self::Completed),
            "FAILED" => Ok(Self::Failed),
            "CANCELLED" => Ok(Self::Cancelled),
            other => Err(format!("unknown execution status: {other}")),
        }
    }
}

/// One run of a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Execution {
    pub id: Uuid,
    pub workflow_id: Uuid,
    /// Opaque id assigned by the durable runtime.
    pub runtime_workflow_id: String,
    pub runtime_run_id: String,
    pub status: ExecutionStatus,
    pub inputs: serde_json::Value,
    pub outputs: Option<serde_json::Value>,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogStatus {
    Success,
    Failed,
    Skipped,
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LogStatus::Success => "SUCCESS",
            LogStatus::Failed => "FAILED",
            LogStatus::Skipped => "SKIPPED",
        };
        write!(f, "{s}")
    }
}

/// An append-only per-node-attempt record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionLog {
    pub id: Uuid,
    pub execution_id: Uuid,
    pub step_name: String,
    pub action_name: String,
    pub status: LogStatus,
    pub inputs: Option<serde_json::Value>,
    pub outputs: Option<serde_json::Value>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Workflow state accumulated during execution
// ---------------------------------------------------------------------------

/// The per-execution state threaded through the node loop: `{inputs,
/// results}`. Never mutated by the interpolator; the executor owns
/// appending to `results`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowState {
    pub inputs: serde_json::Value,
    pub results: HashMap<String, serde_json::Value>,
}

impl WorkflowState {
    pub fn new(inputs: serde_json::Value) -> Self {
        Self {
            inputs,
            results: HashMap::new(),
        }
    }

    /// Render the state as the `serde_json::Value` tree the interpolator
    /// walks dot-paths against: `{"inputs": ..., "results": {...}}`.
    pub fn as_value(&self) -> serde_json::Value {
        serde_json::json!({
            "inputs": self.inputs,
            "results": self.results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_update_bumps_version_and_preserves_id() {
        let mut wf = WorkflowDefinition::new("demo", WorkflowConfig::default());
        let id = wf.id;
        let created_at = wf.created_at;
        wf.apply_update(Some("renamed".into()), None, None);
        assert_eq!(wf.id, id);
        assert_eq!(wf.created_at, created_at);
        assert_eq!(wf.version, 2);
        assert_eq!(wf.name, "renamed");
    }

    #[test]
    fn terminal_statuses() {
        assert!(ExecutionStatus::Completed.is_terminal());
        assert!(ExecutionStatus::Failed.is_terminal());
        assert!(ExecutionStatus::Cancelled.is_terminal());
        assert!(!ExecutionStatus::Running.is_terminal());
    }

    #[test]
    fn node_data_serializes_with_nested_data_object() {
        let node = Node {
            id: "a".into(),
            data: NodeData::Action {
                action_name: "ping".into(),
                label: Some("Ping it".into()),
                config: serde_json::json!({}),
            },
            position: Position::default(),
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["type"], "action");
        assert_eq!(value["data"]["action_name"], "ping");
        assert!(value.get("action_name").is_none());
    }

    #[test]
    fn node_deserializes_from_nested_data_object() {
        let json = serde_json::json!({
            "id": "a",
            "type": "action",
            "data": {"action_name": "ping", "label": "Ping it", "config": {}},
            "position": {"x": 1.0, "y": 2.0},
        });
        let node: Node = serde_json::from_value(json).unwrap();
        assert_eq!(node.data.action_name(), Some("ping"));
        assert_eq!(node.data.label(), Some("Ping it"));
    }
}

//! Conversions between `db` persistence rows and `engine` domain models.
//! Kept in the API layer so neither crate needs to depend on the other.

use engine::{Execution, ExecutionStatus, WorkflowConfig, WorkflowDefinition};

pub fn workflow_from_row(row: db::models::WorkflowRow) -> WorkflowDefinition {
    let config: WorkflowConfig = serde_json::from_value(row.config).unwrap_or_default();
    WorkflowDefinition {
        id: row.id,
        name: row.name,
        description: row.description,
        version: row.version as u32,
        is_active: row.is_active,
        config,
        created_by: row.created_by.unwrap_or_default(),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

pub fn execution_from_row(row: db::models::ExecutionRow) -> Execution {
    let status = row.status.parse().unwrap_or(ExecutionStatus::Running);
    Execution {
        id: row.id,
        workflow_id: row.workflow_id,
        runtime_workflow_id: row.runtime_workflow_id.unwrap_or_default(),
        runtime_run_id: row.runtime_run_id.unwrap_or_default(),
        status,
        inputs: row.inputs,
        outputs: row.outputs,
        error: row.error,
        started_at: row.started_at,
        completed_at: row.completed_at,
    }
}

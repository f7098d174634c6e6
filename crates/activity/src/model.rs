//! Wire shapes for an activity invocation.

use serde_json::Value;

/// Everything [`crate::ActivityInvoker::invoke`] needs to make one call.
///
/// Built by the executor from the action's catalog entry plus the node's
/// (already-interpolated) configuration.
#[derive(Debug, Clone)]
pub struct ActivityConfig {
    /// Fully-qualified URL of the external action endpoint.
    pub endpoint: String,
    /// HTTP method the catalog declares for this action.
    pub http_method: String,
    /// Basic auth username, if the deployment requires one.
    pub auth_user: Option<String>,
    /// Basic auth password, if the deployment requires one.
    pub auth_password: Option<String>,
    /// Data describing the triggering event (mirrors the source's
    /// `event_data` envelope field).
    pub event_data: Value,
    /// Node-level configuration, already interpolated against workflow
    /// state.
    pub configurations: Value,
    /// Accumulated workflow data available to the action.
    pub data: Value,
}

/// The result of invoking an action. Never an `Err` — a failed upstream
/// call is data, not a propagated error (see module docs).
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityOutcome {
    Success { data: Value },
    Failed { error: String },
}

impl ActivityOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ActivityOutcome::Success { .. })
    }
}

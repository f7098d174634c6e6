//! Engine-level error taxonomy.
//!
//! Mirrors the taxonomy named in the workspace root spec §7:
//! `ValidationError` / `NotFound` / `StateConflict` / `UpstreamFailure` /
//! `InternalError`, plus a passthrough for the persistence layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// The submitted graph failed DAG validation; carries every
    /// accumulated error message (C2 never short-circuits).
    #[error("workflow graph is invalid: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Entity id unknown.
    #[error("{0} not found")]
    NotFound(String),

    /// Operation not allowed given the current state, e.g. cancelling a
    /// terminal execution. Carries the state actually observed.
    #[error("cannot {operation} while execution is {observed_status}")]
    StateConflict {
        operation: &'static str,
        observed_status: String,
    },

    /// The durable runtime, LLM, or an external action was unreachable or
    /// failed after retries.
    #[error("upstream failure: {0}")]
    UpstreamFailure(String),

    /// Persistence error from the db crate.
    #[error("database error: {0}")]
    Database(#[from] db::DbError),

    /// Durable runtime error.
    #[error("runtime error: {0}")]
    Runtime(#[from] runtime::RuntimeError),

    /// Assertion failure / internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

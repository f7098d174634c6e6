//! `runtime` crate — the durable execution contract (C7).
//!
//! Specifies the boundary the engine requires from a workflow runtime
//! (start / run an activity with retry / signal cancellation / describe
//! status) without committing the rest of the workspace to a particular
//! orchestrator. [`InProcessRuntime`] is the concrete implementation used
//! when there is no external orchestrator to talk to — it runs the
//! executor loop on the local Tokio runtime and owns the retry/backoff
//! sleep around each activity closure itself.

pub mod error;
pub mod inprocess;
pub mod model;

pub use error::RuntimeError;
pub use inprocess::InProcessRuntime;
pub use model::{RetryPolicy, RuntimeHandle, RuntimeStatus};

use std::future::Future;
use std::pin::Pin;

use async_trait::async_trait;
use serde_json::Value;

/// A retryable unit of work handed to `run_activity`. Returns `Ok` for
/// both a successful and a *classified* failed activity outcome — only a
/// genuine transport/infra error that the activity invoker could not
/// classify itself should come back as `Err`, which is what triggers this
/// trait's own retry loop. In practice the activity invoker (crate
/// `activity`) never raises past its own boundary, so this closure is
/// expected to always return `Ok`; the retry loop here exists for
/// contract completeness and for any future activity kind that can fail
/// in a way the invoker can't classify.
pub type ActivityFn =
    Box<dyn Fn() -> Pin<Box<dyn Future<Output = Result<Value, RuntimeError>> + Send>> + Send + Sync>;

#[async_trait]
pub trait DurableRuntime: Send + Sync {
    /// Start a new durable run. `config`/`inputs` are opaque to the
    /// runtime; the engine is responsible for what they mean.
    async fn start(
        &self,
        runtime_workflow_id: &str,
        task_queue: &str,
        config: Value,
        inputs: Value,
    ) -> Result<RuntimeHandle, RuntimeError>;

    /// Run `f`, retrying per `retry` until it returns `Ok` or attempts are
    /// exhausted. Sleeping between attempts is this trait's
    /// responsibility, never the activity invoker's.
    async fn run_activity(
        &self,
        name: &str,
        retry: RetryPolicy,
        f: ActivityFn,
    ) -> Result<Value, RuntimeError>;

    /// Request cancellation of a running workflow. A no-op (not an error)
    /// if the run is already terminal.
    async fn signal_cancel(&self, runtime_workflow_id: &str) -> Result<(), RuntimeError>;

    /// Authoritative status of a run, for the engine's status reconciler.
    async fn describe(&self, runtime_workflow_id: &str) -> Result<RuntimeStatus, RuntimeError>;
}

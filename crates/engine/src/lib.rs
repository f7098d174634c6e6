//! `engine` crate — workflow domain models, DAG validation (C2), state
//! interpolation (C3), condition evaluation, the DAG executor (C5), and
//! status reconciliation (C7).

pub mod condition;
pub mod dag;
pub mod error;
pub mod executor;
pub mod interpolator;
pub mod models;
pub mod reconcile;

pub use error::EngineError;
pub use executor::{ActionAuth, ExecutionOutcome, WorkflowExecutor};
pub use models::{Edge, Execution, ExecutionStatus, Node, NodeData, WorkflowConfig, WorkflowDefinition};
pub use reconcile::reconcile;

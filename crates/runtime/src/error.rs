//! Error type returned by `DurableRuntime` operations.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no runtime workflow found for id '{0}'")]
    NotFound(String),

    #[error("runtime workflow '{0}' is already terminal and cannot be restarted")]
    AlreadyTerminal(String),

    #[error("internal runtime error: {0}")]
    Internal(String),
}

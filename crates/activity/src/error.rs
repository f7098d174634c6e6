//! Transport-level error type.
//!
//! Distinct from [`crate::ActivityOutcome::Failed`]: this is the error
//! surface for things that can never be attributed to the external
//! action itself (a malformed endpoint, a bug in the invoker). A failing
//! HTTP call is not an `ActivityError` — it's a `Failed` outcome.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("action '{0}' has no endpoint configured")]
    MissingEndpoint(String),

    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),
}

//! Error type for LLM transport failures.
//!
//! Never surfaced to the end user — per the ambient error-handling
//! policy, every caller of [`crate::llm::LlmClient`] falls back to a
//! deterministic response rather than propagating this.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("llm request failed: {0}")]
    Llm(#[from] reqwest::Error),

    #[error("llm returned an unexpected response shape")]
    UnexpectedShape,
}

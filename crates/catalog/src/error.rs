//! Catalog-level error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("action '{0}' not found")]
    NotFound(String),

    #[error("external catalog request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response shape from external catalog")]
    UnexpectedShape,
}

//! Catalogue error type.

use thiserror::Error;

/// Errors produced by `gs-catalog`.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalogue parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

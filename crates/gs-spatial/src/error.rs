//! Spatial-subsystem error type.

use thiserror::Error;

/// Errors produced by `gs-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("empty graph: {0}")]
    EmptyGraph(String),

    #[error("site {0:?} already exists in the graph")]
    DuplicateSite(String),

    #[error("site {0:?} not found in the graph")]
    UnknownSite(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;

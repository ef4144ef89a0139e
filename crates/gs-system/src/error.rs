//! System-assembly error type.

use thiserror::Error;

use gs_graph::GraphError;
use gs_mapper::MapperError;

/// Errors produced by `gs-system`.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("unsupported edge type: {0}")]
    UnsupportedEdgeType(String),

    #[error("winding mismatch: {0}")]
    WindingMismatch(String),

    #[error("invalid split-phase winding: {0}")]
    InvalidSplitPhaseWinding(String),

    #[error("invalid component reference: {0}")]
    InvalidReference(String),

    #[error(transparent)]
    Mapper(#[from] MapperError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SystemResult<T> = Result<T, SystemError>;

//! Topology-synthesis error type.

use thiserror::Error;

use gs_graph::GraphError;
use gs_spatial::SpatialError;

/// Errors produced by `gs-topo`.
#[derive(Debug, Error)]
pub enum TopoError {
    #[error("empty graph: {0}")]
    EmptyGraph(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Graph(#[from] GraphError),
}

pub type TopoResult<T> = Result<T, TopoError>;

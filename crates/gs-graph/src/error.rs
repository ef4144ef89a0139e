//! Graph-subsystem error type.

use thiserror::Error;

/// Errors produced by `gs-graph`.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("node {0:?} already exists in the graph")]
    NodeAlreadyExists(String),

    #[error("node {0:?} does not exist in the graph")]
    NodeDoesNotExist(String),

    #[error("edge {0} already exists in the graph")]
    EdgeAlreadyExists(String),

    #[error("edge between {from:?} and {to:?} does not exist")]
    EdgeDoesNotExist { from: String, to: String },

    #[error("voltage source node {existing:?} already exists; cannot add {new:?}")]
    VsourceAlreadyExists { existing: String, new: String },

    #[error("no voltage source node is set on this graph")]
    VsourceDoesNotExist,

    #[error("empty graph: {0}")]
    EmptyGraph(String),

    #[error("invalid node data: {0}")]
    InvalidNodeData(String),

    #[error("invalid edge data: {0}")]
    InvalidEdgeData(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

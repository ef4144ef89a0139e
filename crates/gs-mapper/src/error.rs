//! Mapper-subsystem error type.

use thiserror::Error;

use gs_graph::GraphError;
use gs_spatial::SpatialError;

/// Errors produced by `gs-mapper`.
#[derive(Debug, Error)]
pub enum MapperError {
    #[error("allocation mapping error: {0}")]
    AllocationMapping(String),

    #[error("invalid phase allocation method {0:?} (expected greedy, kmeans, or agglomerative)")]
    InvalidPhaseAllocationMethod(String),

    #[error("missing transformer mapping: {0}")]
    MissingTransformerMapping(String),

    #[error("unsupported transformer type: {0}")]
    UnsupportedTransformerType(String),

    #[error("missing voltage mapping: {0}")]
    MissingVoltageMapping(String),

    #[error("unsupported branch equipment type: {0}")]
    UnsupportedBranchEquipmentType(String),

    #[error("invalid asset phase: {0}")]
    InvalidAssetPhase(String),

    #[error("equipment not found: {0}")]
    EquipmentNotFound(String),

    #[error("wrong equipment assigned: {0}")]
    WrongEquipmentAssigned(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type MapperResult<T> = Result<T, MapperError>;

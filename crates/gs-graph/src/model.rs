//! Node and edge payloads of the distribution graph.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use gs_core::{Distance, GeoPoint};

use crate::{GraphError, GraphResult};

/// The kinds of asset that can hang off a feeder node.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum AssetKind {
    Load,
    Solar,
    Capacitor,
    VoltageSource,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssetKind::Load => "load",
            AssetKind::Solar => "solar",
            AssetKind::Capacitor => "capacitor",
            AssetKind::VoltageSource => "voltage source",
        };
        write!(f, "{s}")
    }
}

/// The catalogue family a branch edge draws its conductor equipment from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchEquipmentKind {
    MatrixImpedance,
    SequenceImpedance,
    Geometry,
}

/// Edge flavour: a physical line segment or a distribution transformer.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeKind {
    Branch(BranchEquipmentKind),
    Transformer,
}

/// A feeder node: a named electrical connection site with attached assets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub location: GeoPoint,
    pub assets: BTreeSet<AssetKind>,
}

impl Node {
    pub fn new(name: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            name: name.into(),
            location,
            assets: BTreeSet::new(),
        }
    }

    pub fn with_assets(name: impl Into<String>, location: GeoPoint, assets: &[AssetKind]) -> Self {
        Self {
            name: name.into(),
            location,
            assets: assets.iter().copied().collect(),
        }
    }
}

/// A feeder edge.  Branches carry a physical length; transformer edges never
/// do (they connect two voltage levels at one location).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub name: String,
    pub kind: EdgeKind,
    pub length: Option<Distance>,
}

impl Edge {
    /// Validating constructor enforcing the kind/length invariant.
    pub fn new(
        name: impl Into<String>,
        kind: EdgeKind,
        length: Option<Distance>,
    ) -> GraphResult<Self> {
        let name = name.into();
        match (kind, length) {
            (EdgeKind::Transformer, Some(_)) => Err(GraphError::InvalidEdgeData(format!(
                "transformer edge {name:?} must not carry a length"
            ))),
            (EdgeKind::Branch(_), None) => Err(GraphError::InvalidEdgeData(format!(
                "branch edge {name:?} must carry a length"
            ))),
            _ => Ok(Self { name, kind, length }),
        }
    }

    /// A line-segment edge of the given catalogue family.
    pub fn branch(
        name: impl Into<String>,
        family: BranchEquipmentKind,
        length: Distance,
    ) -> Self {
        Self {
            name: name.into(),
            kind: EdgeKind::Branch(family),
            length: Some(length),
        }
    }

    /// A zero-length transformer edge.
    pub fn transformer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: EdgeKind::Transformer,
            length: None,
        }
    }

    pub fn is_transformer(&self) -> bool {
        matches!(self.kind, EdgeKind::Transformer)
    }
}

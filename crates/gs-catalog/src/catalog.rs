//! The catalogue store.
//!
//! A `Catalog` holds typed vectors of equipment, one per family.  Selection
//! is client-side: the typed iterators combine with standard
//! `Iterator::filter` predicates, so callers express exactly the rules the
//! equipment mapper needs without the store knowing about them.

use serde::{Deserialize, Serialize};

use crate::equipment::{
    Equipment, GeometryBranchEquipment, LoadEquipment, MatrixImpedanceBranchEquipment,
    SequenceImpedanceBranchEquipment, TransformerEquipment, VoltageSourceEquipment,
};
use crate::{CatalogError, CatalogResult};

/// Store of concrete equipment models, grouped by family.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    transformers: Vec<TransformerEquipment>,
    matrix_branches: Vec<MatrixImpedanceBranchEquipment>,
    sequence_branches: Vec<SequenceImpedanceBranchEquipment>,
    geometry_branches: Vec<GeometryBranchEquipment>,
    loads: Vec<LoadEquipment>,
    voltage_sources: Vec<VoltageSourceEquipment>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert any equipment into its family's table.
    pub fn add(&mut self, equipment: Equipment) {
        match equipment {
            Equipment::Transformer(e) => self.transformers.push(e),
            Equipment::MatrixImpedanceBranch(e) => self.matrix_branches.push(e),
            Equipment::SequenceImpedanceBranch(e) => self.sequence_branches.push(e),
            Equipment::GeometryBranch(e) => self.geometry_branches.push(e),
            Equipment::Load(e) => self.loads.push(e),
            Equipment::VoltageSource(e) => self.voltage_sources.push(e),
        }
    }

    pub fn component_count(&self) -> usize {
        self.transformers.len()
            + self.matrix_branches.len()
            + self.sequence_branches.len()
            + self.geometry_branches.len()
            + self.loads.len()
            + self.voltage_sources.len()
    }

    // ── Typed iteration ───────────────────────────────────────────────────

    pub fn transformers(&self) -> impl Iterator<Item = &TransformerEquipment> {
        self.transformers.iter()
    }

    pub fn matrix_branches(&self) -> impl Iterator<Item = &MatrixImpedanceBranchEquipment> {
        self.matrix_branches.iter()
    }

    pub fn sequence_branches(&self) -> impl Iterator<Item = &SequenceImpedanceBranchEquipment> {
        self.sequence_branches.iter()
    }

    pub fn geometry_branches(&self) -> impl Iterator<Item = &GeometryBranchEquipment> {
        self.geometry_branches.iter()
    }

    pub fn loads(&self) -> impl Iterator<Item = &LoadEquipment> {
        self.loads.iter()
    }

    pub fn voltage_sources(&self) -> impl Iterator<Item = &VoltageSourceEquipment> {
        self.voltage_sources.iter()
    }

    // ── Persistence ───────────────────────────────────────────────────────

    pub fn to_json(&self) -> CatalogResult<String> {
        serde_json::to_string_pretty(self).map_err(CatalogError::from)
    }

    pub fn from_json(json: &str) -> CatalogResult<Self> {
        serde_json::from_str(json).map_err(CatalogError::from)
    }
}

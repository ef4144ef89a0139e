//! Single-pass assembly of a [`DistributionSystem`] from a labelled graph.
//!
//! The builder walks the graph once: a bus per node, an asset component per
//! `(node, asset kind)`, and a branch or transformer component per edge.
//! Transformer emission derives per-winding line-to-ground voltages from the
//! selected equipment, maps each winding to the closer-voltage bus, and
//! validates the winding→bus cardinality and split-phase winding layout.

use tracing::debug;

use gs_catalog::{Equipment, EquipmentKind, TransformerEquipment, VoltageType};
use gs_core::{Phase, PhaseSet, Voltage};
use gs_graph::{
    AssetKind, BranchEquipmentKind, DistributionGraph, Edge, EdgeKind, GraphError, Node,
};
use gs_mapper::{EquipmentMapper, MapperError, PhaseMapper, VoltageMapper};

use crate::components::{AssetComponent, BranchComponent, Bus, TransformerComponent};
use crate::system::DistributionSystem;
use crate::{SystemError, SystemResult};

/// The fixed edge-kind → equipment-family table.
pub fn expected_equipment_kind(kind: EdgeKind) -> EquipmentKind {
    match kind {
        EdgeKind::Transformer => EquipmentKind::Transformer,
        EdgeKind::Branch(BranchEquipmentKind::MatrixImpedance) => {
            EquipmentKind::MatrixImpedanceBranch
        }
        EdgeKind::Branch(BranchEquipmentKind::SequenceImpedance) => {
            EquipmentKind::SequenceImpedanceBranch
        }
        EdgeKind::Branch(BranchEquipmentKind::Geometry) => EquipmentKind::GeometryBranch,
    }
}

/// Assembles typed system components from a graph plus its phase, voltage,
/// and equipment label tables.
pub struct SystemBuilder<'a> {
    name: String,
    graph: &'a DistributionGraph,
    phases: &'a dyn PhaseMapper,
    voltages: &'a dyn VoltageMapper,
    equipment: &'a dyn EquipmentMapper,
}

impl<'a> SystemBuilder<'a> {
    pub fn new(
        name: impl Into<String>,
        graph: &'a DistributionGraph,
        phases: &'a dyn PhaseMapper,
        voltages: &'a dyn VoltageMapper,
        equipment: &'a dyn EquipmentMapper,
    ) -> Self {
        Self {
            name: name.into(),
            graph,
            phases,
            voltages,
            equipment,
        }
    }

    /// Run the single assembly pass.
    pub fn build(self) -> SystemResult<DistributionSystem> {
        let mut system = DistributionSystem {
            name: self.name.clone(),
            ..DistributionSystem::default()
        };

        for node in self.graph.get_nodes() {
            system.buses.push(self.make_bus(node)?);
            for &kind in &node.assets {
                system.assets.push(self.make_asset(node, kind)?);
            }
        }

        for (from, to, edge) in self.graph.get_edges() {
            let equipment = self.edge_equipment(edge)?;
            let expected = expected_equipment_kind(edge.kind);
            if equipment.kind() != expected {
                return Err(MapperError::WrongEquipmentAssigned(format!(
                    "edge {:?} expects {expected} equipment, got {}",
                    edge.name,
                    equipment.kind()
                ))
                .into());
            }

            match edge.kind {
                EdgeKind::Branch(_) => {
                    system
                        .branches
                        .push(self.make_branch(from, to, edge, equipment.clone())?);
                }
                EdgeKind::Transformer => {
                    system
                        .transformers
                        .push(self.make_transformer(from, to, edge, equipment)?);
                }
            }
        }

        debug!(%system.name, "{}", system.stats());
        Ok(system)
    }

    // ── Per-component emission ────────────────────────────────────────────

    fn make_bus(&self, node: &Node) -> SystemResult<Bus> {
        Ok(Bus {
            name: node.name.clone(),
            phases: self.node_phases(&node.name)?.clone(),
            coordinate: node.location,
            rated_voltage: self.node_voltage(&node.name)?,
            voltage_type: VoltageType::LineToGround,
        })
    }

    fn make_asset(&self, node: &Node, kind: AssetKind) -> SystemResult<AssetComponent> {
        let phases = self
            .phases
            .asset_phases()
            .get(&node.name)
            .and_then(|per_asset| per_asset.get(&kind))
            .ok_or_else(|| {
                MapperError::InvalidAssetPhase(format!(
                    "no phases for {kind} asset at node {:?}",
                    node.name
                ))
            })?
            .clone();

        let equipment = self
            .equipment
            .asset_equipment()
            .get(&node.name)
            .and_then(|per_asset| per_asset.get(&kind))
            .cloned();
        // Loads and sources always come from the catalogue; solar and
        // capacitor assets have no catalogue family here.
        if equipment.is_none()
            && matches!(kind, AssetKind::Load | AssetKind::VoltageSource)
        {
            return Err(MapperError::EquipmentNotFound(format!(
                "no {kind} equipment assigned at node {:?}",
                node.name
            ))
            .into());
        }

        let token = match kind {
            AssetKind::Load => "load",
            AssetKind::Solar => "solar",
            AssetKind::Capacitor => "capacitor",
            AssetKind::VoltageSource => "vsource",
        };
        Ok(AssetComponent {
            name: format!("{}_{token}", node.name),
            bus: node.name.clone(),
            kind,
            phases,
            equipment,
        })
    }

    fn make_branch(
        &self,
        from: &str,
        to: &str,
        edge: &Edge,
        equipment: Equipment,
    ) -> SystemResult<BranchComponent> {
        let phases: PhaseSet = self
            .node_phases(from)?
            .intersection(self.node_phases(to)?)
            .copied()
            .collect();
        let length = edge.length.ok_or_else(|| {
            GraphError::InvalidEdgeData(format!("branch {:?} has no length", edge.name))
        })?;

        Ok(BranchComponent {
            name: edge.name.clone(),
            buses: [from.to_string(), to.to_string()],
            phases,
            length,
            equipment,
        })
    }

    fn make_transformer(
        &self,
        from: &str,
        to: &str,
        edge: &Edge,
        equipment: &Equipment,
    ) -> SystemResult<TransformerComponent> {
        let unit = match equipment {
            Equipment::Transformer(t) => t,
            other => {
                return Err(MapperError::WrongEquipmentAssigned(format!(
                    "{} equipment on transformer edge {:?}",
                    other.kind(),
                    edge.name
                ))
                .into());
            }
        };

        let winding_voltages = effective_winding_voltages(unit);

        // Each winding lands on whichever endpoint bus sits closest in
        // voltage.
        let from_volts = self.node_voltage(from)?.as_volts();
        let to_volts = self.node_voltage(to)?.as_volts();
        let winding_buses: Vec<String> = winding_voltages
            .iter()
            .map(|wv| {
                if (from_volts - wv.as_volts()).abs() <= (to_volts - wv.as_volts()).abs() {
                    from.to_string()
                } else {
                    to.to_string()
                }
            })
            .collect();

        // The mapping must distinguish as many buses as there are distinct
        // winding voltages.
        let distinct_voltages = count_distinct(winding_voltages.iter().map(|v| Voltage::as_volts(*v)));
        let distinct_buses = {
            let mut buses: Vec<&str> = winding_buses.iter().map(String::as_str).collect();
            buses.sort_unstable();
            buses.dedup();
            buses.len()
        };
        if distinct_buses != distinct_voltages {
            return Err(SystemError::WindingMismatch(format!(
                "transformer {:?}: {} distinct winding voltages map onto {} bus(es)",
                edge.name, distinct_voltages, distinct_buses
            )));
        }

        let winding_phases =
            self.winding_phases(edge, unit, &winding_buses)?;

        Ok(TransformerComponent {
            name: edge.name.clone(),
            buses: [from.to_string(), to.to_string()],
            winding_buses,
            winding_phases,
            equipment: equipment.clone(),
        })
    }

    /// Per-winding conductor sets.  Without split-phase involvement every
    /// winding takes its bus's phase set; a center-tapped secondary instead
    /// gets `{S1, N}` / `{N, S2}` on the tapped windings with the primary
    /// keeping the transformer's allocated phases.
    fn winding_phases(
        &self,
        edge: &Edge,
        unit: &TransformerEquipment,
        winding_buses: &[String],
    ) -> SystemResult<Vec<PhaseSet>> {
        let bus_phase_sets = winding_buses
            .iter()
            .map(|bus| self.node_phases(bus))
            .collect::<SystemResult<Vec<_>>>()?;

        let split_involved = bus_phase_sets
            .iter()
            .flat_map(|set| set.iter())
            .any(|p| matches!(p, Phase::S1 | Phase::S2));

        if !split_involved {
            return Ok(bus_phase_sets.into_iter().cloned().collect());
        }

        // Center-tap topology: exactly three windings over exactly two buses.
        let distinct_buses = {
            let mut buses: Vec<&str> = winding_buses.iter().map(String::as_str).collect();
            buses.sort_unstable();
            buses.dedup();
            buses.len()
        };
        if unit.windings.len() != 3 || distinct_buses != 2 {
            return Err(SystemError::InvalidSplitPhaseWinding(format!(
                "transformer {:?}: split-phase layout needs 3 windings on 2 buses, \
                 got {} winding(s) on {} bus(es)",
                edge.name,
                unit.windings.len(),
                distinct_buses
            )));
        }
        let primary_has_split = bus_phase_sets[0]
            .iter()
            .any(|p| matches!(p, Phase::S1 | Phase::S2));
        if primary_has_split {
            return Err(SystemError::InvalidSplitPhaseWinding(format!(
                "transformer {:?}: primary winding landed on the split-phase bus",
                edge.name
            )));
        }

        let primary = self
            .phases
            .transformer_phases()
            .get(&edge.name)
            .ok_or_else(|| {
                MapperError::MissingTransformerMapping(format!(
                    "no transformer phases recorded for {:?}",
                    edge.name
                ))
            })?
            .clone();

        Ok(vec![
            primary,
            [Phase::S1, Phase::N].into_iter().collect(),
            [Phase::N, Phase::S2].into_iter().collect(),
        ])
    }

    // ── Label lookups ─────────────────────────────────────────────────────

    fn node_phases(&self, node: &str) -> SystemResult<&PhaseSet> {
        self.phases.node_phases().get(node).ok_or_else(|| {
            MapperError::MissingTransformerMapping(format!(
                "no phases propagated to node {node:?}"
            ))
            .into()
        })
    }

    fn node_voltage(&self, node: &str) -> SystemResult<Voltage> {
        self.voltages.node_voltages().get(node).copied().ok_or_else(|| {
            MapperError::MissingVoltageMapping(format!("no voltage mapped for node {node:?}"))
                .into()
        })
    }

    fn edge_equipment(&self, edge: &Edge) -> SystemResult<&Equipment> {
        self.equipment.edge_equipment().get(&edge.name).ok_or_else(|| {
            MapperError::EquipmentNotFound(format!(
                "no equipment selected for edge {:?}",
                edge.name
            ))
            .into()
        })
    }
}

// ── Winding voltage derivation ────────────────────────────────────────────────

/// Effective line-to-ground voltage per winding: line-to-line ratings scale
/// by 1/√3; on center-tapped units the tapped windings span twice their
/// half-winding rating.
fn effective_winding_voltages(unit: &TransformerEquipment) -> Vec<Voltage> {
    unit.windings
        .iter()
        .enumerate()
        .map(|(i, winding)| {
            let base = match winding.voltage_type {
                VoltageType::LineToGround => winding.rated_voltage,
                VoltageType::LineToLine => winding.rated_voltage / 3.0f64.sqrt(),
            };
            if unit.is_center_tapped && i > 0 {
                base * 2.0
            } else {
                base
            }
        })
        .collect()
}

fn count_distinct(values: impl Iterator<Item = f64>) -> usize {
    let mut sorted: Vec<f64> = values.collect();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup_by(|a, b| a == b);
    sorted.len()
}

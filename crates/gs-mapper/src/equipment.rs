//! Equipment selection from the catalogue.
//!
//! For every edge the mapper aggregates the apparent power served downstream
//! (ZIP phase-load magnitudes over DFS descendants), derives the branch
//! current from the local voltage and phase count, and picks the smallest
//! catalogue entry that survives the family's predicate.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use gs_catalog::{Catalog, Equipment, LoadEquipment, VoltageSourceEquipment};
use gs_core::{ApparentPower, Current, Phase, PhaseSet, Voltage};
use gs_graph::{AssetKind, BranchEquipmentKind, DfsTree, DistributionGraph, EdgeKind};

use crate::phase::PhaseMapper;
use crate::voltage::VoltageMapper;
use crate::{MapperError, MapperResult};

/// Transformer candidates must offer a winding voltage within
/// `[0.85·v, 1.15·v)` of each supplied endpoint voltage.
const VOLTAGE_WINDOW_LOW: f64 = 0.85;
const VOLTAGE_WINDOW_HIGH: f64 = 1.15;

/// Label tables the system builder consumes from an equipment mapper.
pub trait EquipmentMapper {
    /// Edge name → selected equipment.
    fn edge_equipment(&self) -> &FxHashMap<String, Equipment>;

    /// Node name → asset kind → equipment.
    fn asset_equipment(&self) -> &FxHashMap<String, BTreeMap<AssetKind, Equipment>>;
}

/// Equipment mapper backed by a catalogue, computed at construction.
pub struct CatalogEquipmentMapper {
    edge_equipment: FxHashMap<String, Equipment>,
    asset_equipment: FxHashMap<String, BTreeMap<AssetKind, Equipment>>,
}

impl EquipmentMapper for CatalogEquipmentMapper {
    fn edge_equipment(&self) -> &FxHashMap<String, Equipment> {
        &self.edge_equipment
    }

    fn asset_equipment(&self) -> &FxHashMap<String, BTreeMap<AssetKind, Equipment>> {
        &self.asset_equipment
    }
}

impl CatalogEquipmentMapper {
    /// Select edge equipment for every edge of `graph`, given the asset
    /// equipment already assigned to nodes (loads drive the served-power
    /// aggregation).
    pub fn new(
        graph: &DistributionGraph,
        catalog: &Catalog,
        phase_mapper: &dyn PhaseMapper,
        voltage_mapper: &dyn VoltageMapper,
        asset_equipment: FxHashMap<String, BTreeMap<AssetKind, Equipment>>,
    ) -> MapperResult<Self> {
        let tree = graph.dfs_tree()?;
        let node_phases = phase_mapper.node_phases();
        let node_voltages = voltage_mapper.node_voltages();

        let mut edge_equipment: FxHashMap<String, Equipment> = FxHashMap::default();
        for (from, to, edge) in graph.get_edges() {
            let served = served_load(graph, &tree, &asset_equipment, from, to)?;

            let from_phases = energized_phases(node_phases, from)?;
            let to_phases = energized_phases(node_phases, to)?;
            let num_phase = from_phases.len().min(to_phases.len());

            let selected = match edge.kind {
                EdgeKind::Transformer => select_transformer(
                    catalog,
                    served,
                    num_phase,
                    [
                        voltage_of(node_voltages, from)?,
                        voltage_of(node_voltages, to)?,
                    ],
                )?,
                EdgeKind::Branch(family) => {
                    let kv = voltage_of(node_voltages, from)?.as_kilovolts();
                    let kva = served.as_kilovolt_amperes();
                    let is_split = from_phases.contains(&Phase::S1)
                        || from_phases.contains(&Phase::S2);
                    let amps = if num_phase == 1 {
                        kva / kv
                    } else if is_split {
                        kva / (2.0 * kv)
                    } else {
                        kva / (3.0f64.sqrt() * kv)
                    };
                    select_branch(catalog, family, Current::amperes(amps), num_phase)?
                }
            };
            debug!(edge = %edge.name, equipment = selected.name(), "equipment selected");
            edge_equipment.insert(edge.name.clone(), selected);
        }

        Ok(Self {
            edge_equipment,
            asset_equipment,
        })
    }
}

/// Convenience: assign the same load and source equipment to every load and
/// voltage-source asset in the graph.  Solar and capacitor assets carry no
/// catalogue equipment here.
pub fn uniform_asset_equipment(
    graph: &DistributionGraph,
    load: &LoadEquipment,
    source: &VoltageSourceEquipment,
) -> FxHashMap<String, BTreeMap<AssetKind, Equipment>> {
    let mut table: FxHashMap<String, BTreeMap<AssetKind, Equipment>> = FxHashMap::default();
    for node in graph.get_nodes() {
        let mut per_asset = BTreeMap::new();
        for kind in &node.assets {
            match kind {
                AssetKind::Load => {
                    per_asset.insert(*kind, Equipment::Load(load.clone()));
                }
                AssetKind::VoltageSource => {
                    per_asset.insert(*kind, Equipment::VoltageSource(source.clone()));
                }
                AssetKind::Solar | AssetKind::Capacitor => {}
            }
        }
        if !per_asset.is_empty() {
            table.insert(node.name.clone(), per_asset);
        }
    }
    table
}

// ── Aggregation ───────────────────────────────────────────────────────────────

/// Apparent power served below an edge: the ZIP magnitudes of every
/// load-bearing DFS descendant of the edge's parent endpoint.
fn served_load(
    graph: &DistributionGraph,
    tree: &DfsTree,
    asset_equipment: &FxHashMap<String, BTreeMap<AssetKind, Equipment>>,
    from: &str,
    to: &str,
) -> MapperResult<ApparentPower> {
    let parent = if tree.has_edge(from, to) { from } else { to };

    let mut total = ApparentPower::volt_amperes(0.0);
    for descendant in tree.descendants(parent) {
        let node = graph.get_node(&descendant)?;
        if !node.assets.contains(&AssetKind::Load) {
            continue;
        }
        let equipment = asset_equipment
            .get(&descendant)
            .and_then(|per_asset| per_asset.get(&AssetKind::Load))
            .ok_or_else(|| {
                MapperError::EquipmentNotFound(format!(
                    "load node {descendant:?} has no load equipment assigned"
                ))
            })?;
        match equipment {
            Equipment::Load(load) => total = total + load.total_apparent_power(),
            other => {
                return Err(MapperError::WrongEquipmentAssigned(format!(
                    "{} equipment on load node {descendant:?}",
                    other.kind()
                )));
            }
        }
    }
    Ok(total)
}

/// Node phases minus the neutral; what conductor counting cares about.
fn energized_phases(
    node_phases: &FxHashMap<String, PhaseSet>,
    node: &str,
) -> MapperResult<PhaseSet> {
    let phases = node_phases.get(node).ok_or_else(|| {
        MapperError::MissingTransformerMapping(format!(
            "no phases propagated to node {node:?}"
        ))
    })?;
    Ok(phases
        .iter()
        .copied()
        .filter(|p| *p != Phase::N)
        .collect())
}

fn voltage_of(
    node_voltages: &FxHashMap<String, Voltage>,
    node: &str,
) -> MapperResult<Voltage> {
    node_voltages.get(node).copied().ok_or_else(|| {
        MapperError::MissingVoltageMapping(format!("no voltage mapped for node {node:?}"))
    })
}

// ── Selection ─────────────────────────────────────────────────────────────────

/// Smallest transformer whose capacity exceeds the served load, whose primary
/// phase count matches, and whose winding voltages sit inside the window
/// around each supplied endpoint voltage.
fn select_transformer(
    catalog: &Catalog,
    capacity: ApparentPower,
    num_phase: usize,
    endpoint_voltages: [Voltage; 2],
) -> MapperResult<Equipment> {
    let mut supplied: Vec<f64> = endpoint_voltages.iter().map(|v| v.as_volts()).collect();
    supplied.sort_by(|a, b| b.total_cmp(a));

    let mut candidates: Vec<_> = catalog
        .transformers()
        .filter(|t| {
            let first = match t.windings.first() {
                Some(w) => w,
                None => return false,
            };
            if t.min_rated_power() <= capacity {
                return false;
            }
            if num_phase == 3 && first.num_phases != 3 {
                return false;
            }
            if num_phase < 3 && usize::from(first.num_phases) != num_phase.min(1) {
                return false;
            }

            let mut winding_voltages: Vec<f64> =
                t.windings.iter().map(|w| w.rated_voltage.as_volts()).collect();
            winding_voltages.sort_by(|a, b| b.total_cmp(a));
            supplied
                .iter()
                .zip(winding_voltages.iter().take(supplied.len()))
                .all(|(v1, v2)| {
                    *v2 >= VOLTAGE_WINDOW_LOW * v1 && *v2 < VOLTAGE_WINDOW_HIGH * v1
                })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.windings[0]
            .rated_power
            .as_volt_amperes()
            .total_cmp(&b.windings[0].rated_power.as_volt_amperes())
    });

    candidates
        .first()
        .map(|t| Equipment::Transformer((*t).clone()))
        .ok_or_else(|| {
            MapperError::EquipmentNotFound(format!(
                "no transformer in catalogue for {capacity}, {num_phase} phase(s), \
                 endpoints {} / {}",
                endpoint_voltages[0], endpoint_voltages[1]
            ))
        })
}

/// Smallest-ampacity conductor of the requested family that carries the
/// current with the right phase geometry.
fn select_branch(
    catalog: &Catalog,
    family: BranchEquipmentKind,
    current: Current,
    num_phase: usize,
) -> MapperResult<Equipment> {
    let selected = match family {
        BranchEquipmentKind::MatrixImpedance => {
            let mut candidates: Vec<_> = catalog
                .matrix_branches()
                .filter(|b| b.ampacity > current && b.matrix_order() == num_phase)
                .collect();
            candidates.sort_by(|a, b| {
                a.ampacity.as_amperes().total_cmp(&b.ampacity.as_amperes())
            });
            candidates
                .first()
                .map(|b| Equipment::MatrixImpedanceBranch((*b).clone()))
        }
        BranchEquipmentKind::SequenceImpedance => {
            let mut candidates: Vec<_> = catalog
                .sequence_branches()
                .filter(|b| b.ampacity > current && num_phase >= 3)
                .collect();
            candidates.sort_by(|a, b| {
                a.ampacity.as_amperes().total_cmp(&b.ampacity.as_amperes())
            });
            candidates
                .first()
                .map(|b| Equipment::SequenceImpedanceBranch((*b).clone()))
        }
        BranchEquipmentKind::Geometry => {
            let mut candidates: Vec<_> = catalog
                .geometry_branches()
                .filter(|b| b.max_ampacity() > current && num_phase <= b.conductors.len())
                .collect();
            candidates.sort_by(|a, b| {
                a.max_ampacity()
                    .as_amperes()
                    .total_cmp(&b.max_ampacity().as_amperes())
            });
            candidates
                .first()
                .map(|b| Equipment::GeometryBranch((*b).clone()))
        }
    };

    selected.ok_or_else(|| {
        MapperError::EquipmentNotFound(format!(
            "no {family:?} branch in catalogue for {current} on {num_phase} phase(s)"
        ))
    })
}

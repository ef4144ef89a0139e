//! Balanced phase assignment.
//!
//! Three-phase transformers take `{A, B, C}` outright.  Single-phase and
//! split-phase transformers are spread across the HT phase tuples (`{A}`,
//! `{B}`, `{C}`, or the delta pairs) by one of three allocation policies,
//! then phases propagate upward to the source and downward through each
//! transformer's service subtree.

use std::collections::BTreeMap;
use std::str::FromStr;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use gs_core::{phase_set, split_secondary, three_phase, ApparentPower, GeoPoint, Phase, PhaseSet};
use gs_graph::{AssetKind, DfsTree, DistributionGraph};
use gs_spatial::{ward_labels, weighted_kmeans_labels, KMEANS_SEED};

use crate::allocation::{allocations_from_labels, graph_distance_matrix, greedy_allocations};
use crate::{MapperError, MapperResult};

/// Transformer construction, as far as phase allocation cares.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransformerKind {
    ThreePhase,
    SinglePhase,
    SinglePhasePrimaryDelta,
    SplitPhase,
    SplitPhasePrimaryDelta,
}

impl TransformerKind {
    /// Split-phase units get the `{S1, N, S2}` secondary.
    pub fn is_split_phase(self) -> bool {
        matches!(
            self,
            TransformerKind::SplitPhase | TransformerKind::SplitPhasePrimaryDelta
        )
    }

    /// Delta primaries connect line-to-line, so their HT tuples are phase
    /// pairs.
    pub fn is_primary_delta(self) -> bool {
        matches!(
            self,
            TransformerKind::SinglePhasePrimaryDelta | TransformerKind::SplitPhasePrimaryDelta
        )
    }
}

impl std::fmt::Display for TransformerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TransformerKind::ThreePhase => "three-phase",
            TransformerKind::SinglePhase => "single-phase",
            TransformerKind::SinglePhasePrimaryDelta => "single-phase primary-delta",
            TransformerKind::SplitPhase => "split-phase",
            TransformerKind::SplitPhasePrimaryDelta => "split-phase primary-delta",
        };
        write!(f, "{s}")
    }
}

/// Phase-allocation input for one transformer edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformerPhaseConfig {
    pub name: String,
    pub kind: TransformerKind,
    pub capacity: ApparentPower,
    pub location: GeoPoint,
}

/// Policy for spreading single-phase transformers across HT phase tuples.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AllocationMethod {
    /// Largest capacity first onto the lightest tuple.
    Greedy,
    /// Capacity-weighted K-means over transformer locations.
    KMeans,
    /// Ward linkage over feeder hop distances.
    #[default]
    Agglomerative,
}

impl FromStr for AllocationMethod {
    type Err = MapperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "greedy" => Ok(AllocationMethod::Greedy),
            "kmeans" => Ok(AllocationMethod::KMeans),
            "agglomerative" => Ok(AllocationMethod::Agglomerative),
            other => Err(MapperError::InvalidPhaseAllocationMethod(other.to_string())),
        }
    }
}

/// Label tables the system builder consumes from a phase mapper.
pub trait PhaseMapper {
    /// Node name → phase set.
    fn node_phases(&self) -> &FxHashMap<String, PhaseSet>;

    /// Node name → asset kind → phase set.
    fn asset_phases(&self) -> &FxHashMap<String, BTreeMap<AssetKind, PhaseSet>>;

    /// Transformer edge name → HT phase set.
    fn transformer_phases(&self) -> &FxHashMap<String, PhaseSet>;
}

/// Balanced phase mapper: allocation plus up/down propagation, computed and
/// validated at construction.
pub struct BalancedPhaseMapper {
    node_phases: FxHashMap<String, PhaseSet>,
    asset_phases: FxHashMap<String, BTreeMap<AssetKind, PhaseSet>>,
    transformer_phases: FxHashMap<String, PhaseSet>,
}

impl PhaseMapper for BalancedPhaseMapper {
    fn node_phases(&self) -> &FxHashMap<String, PhaseSet> {
        &self.node_phases
    }

    fn asset_phases(&self) -> &FxHashMap<String, BTreeMap<AssetKind, PhaseSet>> {
        &self.asset_phases
    }

    fn transformer_phases(&self) -> &FxHashMap<String, PhaseSet> {
        &self.transformer_phases
    }
}

impl BalancedPhaseMapper {
    pub fn new(
        graph: &DistributionGraph,
        configs: &[TransformerPhaseConfig],
        method: AllocationMethod,
    ) -> MapperResult<Self> {
        let endpoints = transformer_endpoints(graph);
        check_coverage(&endpoints, configs)?;
        let tree = graph.dfs_tree()?;

        let mut node_phases: FxHashMap<String, PhaseSet> = FxHashMap::default();
        let mut transformer_phases: FxHashMap<String, PhaseSet> = FxHashMap::default();

        // Group configs by transformer kind, keeping input order inside each
        // group.
        let mut by_kind: BTreeMap<TransformerKind, Vec<&TransformerPhaseConfig>> = BTreeMap::new();
        for config in configs {
            by_kind.entry(config.kind).or_default().push(config);
        }

        for (kind, group) in &by_kind {
            match kind {
                TransformerKind::ThreePhase => {
                    for config in group {
                        let (from, to) = &endpoints[&config.name];
                        node_phases.insert(from.clone(), three_phase());
                        node_phases.insert(to.clone(), three_phase());
                        transformer_phases.insert(config.name.clone(), three_phase());
                    }
                }
                _ => allocate_single_phase_group(
                    graph,
                    &tree,
                    &endpoints,
                    group,
                    *kind,
                    method,
                    &mut node_phases,
                    &mut transformer_phases,
                )?,
            }
        }

        propagate_upward(&tree, configs, &endpoints, &mut node_phases);
        propagate_downward(&tree, configs, &endpoints, &mut node_phases);

        let asset_phases = assign_asset_phases(graph, &node_phases)?;
        validate_asset_phases(&node_phases, &asset_phases)?;

        debug!(
            nodes = node_phases.len(),
            transformers = transformer_phases.len(),
            "phase mapping computed"
        );
        Ok(Self {
            node_phases,
            asset_phases,
            transformer_phases,
        })
    }
}

// ── Construction internals ────────────────────────────────────────────────────

fn transformer_endpoints(graph: &DistributionGraph) -> FxHashMap<String, (String, String)> {
    graph
        .get_edges()
        .filter(|(_, _, e)| e.is_transformer())
        .map(|(from, to, e)| (e.name.clone(), (from.to_string(), to.to_string())))
        .collect()
}

/// The config list must cover exactly the set of transformer edges.
fn check_coverage(
    endpoints: &FxHashMap<String, (String, String)>,
    configs: &[TransformerPhaseConfig],
) -> MapperResult<()> {
    let config_names: FxHashSet<&str> = configs.iter().map(|c| c.name.as_str()).collect();

    let mut missing: Vec<&str> = endpoints
        .keys()
        .map(String::as_str)
        .filter(|name| !config_names.contains(name))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(MapperError::MissingTransformerMapping(format!(
            "no phase config for transformers {missing:?}"
        )));
    }

    let mut unknown: Vec<&str> = config_names
        .iter()
        .copied()
        .filter(|name| !endpoints.contains_key(*name))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(MapperError::MissingTransformerMapping(format!(
            "phase configs for unknown transformers {unknown:?}"
        )));
    }
    Ok(())
}

/// The head (HT side) of a transformer edge is the endpoint whose depth-1
/// DFS successors contain the other endpoint.
fn head_of<'a>(tree: &DfsTree, from: &'a str, to: &'a str) -> &'a str {
    if tree.children(from).iter().any(|c| c == to) {
        from
    } else {
        to
    }
}

/// HT phase tuples offered to one group of single-phase transformers.
fn ht_phase_tuples(kind: TransformerKind) -> MapperResult<Vec<PhaseSet>> {
    if kind == TransformerKind::ThreePhase {
        return Err(MapperError::UnsupportedTransformerType(format!(
            "{kind} transformers do not take tuple allocation"
        )));
    }
    Ok(if kind.is_primary_delta() {
        vec![
            phase_set(&[Phase::A, Phase::B]),
            phase_set(&[Phase::B, Phase::C]),
            phase_set(&[Phase::C, Phase::A]),
        ]
    } else {
        vec![
            phase_set(&[Phase::A]),
            phase_set(&[Phase::B]),
            phase_set(&[Phase::C]),
        ]
    })
}

#[allow(clippy::too_many_arguments)]
fn allocate_single_phase_group(
    graph: &DistributionGraph,
    tree: &DfsTree,
    endpoints: &FxHashMap<String, (String, String)>,
    group: &[&TransformerPhaseConfig],
    kind: TransformerKind,
    method: AllocationMethod,
    node_phases: &mut FxHashMap<String, PhaseSet>,
    transformer_phases: &mut FxHashMap<String, PhaseSet>,
) -> MapperResult<()> {
    let tuples = ht_phase_tuples(kind)?;
    let names: Vec<String> = group.iter().map(|c| c.name.clone()).collect();

    let allocations = match method {
        AllocationMethod::Greedy => {
            let weights: Vec<(String, f64)> = group
                .iter()
                .map(|c| (c.name.clone(), c.capacity.as_volt_amperes()))
                .collect();
            greedy_allocations(&weights, tuples.len())
        }
        AllocationMethod::KMeans => {
            let points: Vec<[f64; 2]> = group
                .iter()
                .map(|c| [c.location.lon, c.location.lat])
                .collect();
            let weights: Vec<f64> = group.iter().map(|c| c.capacity.as_volt_amperes()).collect();
            let labels =
                weighted_kmeans_labels(&points, Some(&weights), tuples.len(), KMEANS_SEED)?;
            allocations_from_labels(&names, &labels, tuples.len())
        }
        AllocationMethod::Agglomerative => {
            let heads: Vec<String> = group
                .iter()
                .map(|c| {
                    let (from, to) = &endpoints[&c.name];
                    head_of(tree, from, to).to_string()
                })
                .collect();
            let matrix = graph_distance_matrix(graph, &heads)?;
            let labels = ward_labels(&matrix, tuples.len())?;
            allocations_from_labels(&names, &labels, tuples.len())
        }
    };

    let allocated: FxHashSet<&str> = allocations
        .iter()
        .flatten()
        .map(String::as_str)
        .collect();
    let unallocated: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|n| !allocated.contains(*n))
        .collect();
    if !unallocated.is_empty() {
        return Err(MapperError::AllocationMapping(format!(
            "transformers {unallocated:?} received no phase tuple"
        )));
    }

    for (allocation, phases) in allocations.iter().zip(&tuples) {
        for name in allocation {
            let (from, to) = &endpoints[name];
            let head = head_of(tree, from, to);
            let tail = if head == from.as_str() { to } else { from };

            node_phases.insert(head.to_string(), phases.clone());
            node_phases.insert(
                tail.to_string(),
                if kind.is_split_phase() {
                    split_secondary()
                } else {
                    phases.clone()
                },
            );
            transformer_phases.insert(name.clone(), phases.clone());
        }
    }
    Ok(())
}

/// Walk from each transformer head up to the source, unioning the head's
/// phases into every node on the way.  Any union equal to a two-element
/// subset of `{A, B, C}` promotes to the full three phases.
fn propagate_upward(
    tree: &DfsTree,
    configs: &[TransformerPhaseConfig],
    endpoints: &FxHashMap<String, (String, String)>,
    node_phases: &mut FxHashMap<String, PhaseSet>,
) {
    for config in configs {
        let (from, to) = &endpoints[&config.name];
        let head = head_of(tree, from, to);
        let head_phases = match node_phases.get(head) {
            Some(p) => p.clone(),
            None => continue,
        };

        for node in tree.path_from_root(head) {
            let entry = node_phases.entry(node).or_default();
            entry.extend(head_phases.iter().copied());
            if is_two_of_abc(entry) {
                *entry = three_phase();
            }
        }
    }
}

fn is_two_of_abc(set: &PhaseSet) -> bool {
    set.len() == 2 && set.iter().all(|p| matches!(p, Phase::A | Phase::B | Phase::C))
}

/// Every DFS descendant of a transformer head that still lacks phases
/// inherits the tail's set; split-phase descendants drop the neutral.
fn propagate_downward(
    tree: &DfsTree,
    configs: &[TransformerPhaseConfig],
    endpoints: &FxHashMap<String, (String, String)>,
    node_phases: &mut FxHashMap<String, PhaseSet>,
) {
    for config in configs {
        let (from, to) = &endpoints[&config.name];
        let head = head_of(tree, from, to);
        let tail = if head == from.as_str() { to } else { from };
        let tail_phases = match node_phases.get(tail) {
            Some(p) => p.clone(),
            None => continue,
        };
        let is_split = tail_phases == split_secondary();

        for descendant in tree.descendants(head) {
            if !node_phases.contains_key(&descendant) {
                let inherited = if is_split {
                    phase_set(&[Phase::S1, Phase::S2])
                } else {
                    tail_phases.clone()
                };
                node_phases.insert(descendant, inherited);
            }
        }
    }
}

/// Each asset takes its node's full phase set.
fn assign_asset_phases(
    graph: &DistributionGraph,
    node_phases: &FxHashMap<String, PhaseSet>,
) -> MapperResult<FxHashMap<String, BTreeMap<AssetKind, PhaseSet>>> {
    let mut asset_phases: FxHashMap<String, BTreeMap<AssetKind, PhaseSet>> = FxHashMap::default();
    for node in graph.get_nodes() {
        if node.assets.is_empty() {
            continue;
        }
        let phases = node_phases.get(&node.name).ok_or_else(|| {
            MapperError::MissingTransformerMapping(format!(
                "no phases propagated to node {:?}",
                node.name
            ))
        })?;
        let per_asset = node
            .assets
            .iter()
            .map(|&kind| (kind, phases.clone()))
            .collect();
        asset_phases.insert(node.name.clone(), per_asset);
    }
    Ok(asset_phases)
}

/// The union of a node's asset phases must stay within the node's phases.
fn validate_asset_phases(
    node_phases: &FxHashMap<String, PhaseSet>,
    asset_phases: &FxHashMap<String, BTreeMap<AssetKind, PhaseSet>>,
) -> MapperResult<()> {
    for (node, per_asset) in asset_phases {
        let union: PhaseSet = per_asset.values().flatten().copied().collect();
        let allowed = node_phases.get(node).ok_or_else(|| {
            MapperError::InvalidAssetPhase(format!("node {node:?} has assets but no phases"))
        })?;
        if !union.is_subset(allowed) {
            return Err(MapperError::InvalidAssetPhase(format!(
                "asset phases {union:?} exceed node phases {allowed:?} at {node:?}"
            )));
        }
    }
    Ok(())
}

//! Distribution-graph assembly from primary and secondary site networks.
//!
//! [`OpenStreetBuilder`] owns the synthesis pipeline shared by every
//! strategy: build the primary network, build one secondary network per load
//! cluster, weld them together through virtual transformer sites, convert
//! the raw site graph into a typed [`DistributionGraph`], and finally explode
//! each transformer *site* into a transformer *edge*.
//!
//! The concrete shapes of the primary and secondary networks come from a
//! [`NetworkStrategy`] implementation (see [`crate::prsg`]).

use rustc_hash::FxHashSet;
use tracing::debug;

use gs_core::GeoPoint;
use gs_graph::{AssetKind, BranchEquipmentKind, DistributionGraph, Edge, Node};
use gs_spatial::{Group, SiteGraph};

use crate::{TopoError, TopoResult};

/// Coordinate nudge applied to welded transformer sites so they never share
/// an exact coordinate with the primary node they attach to.
pub const WELD_EPSILON: f64 = 1e-6;

/// Pluggable primary/secondary network shapes.
pub trait NetworkStrategy {
    /// The high-voltage backbone spanning all group centres and the source.
    fn primary(&mut self, groups: &[Group], source: GeoPoint) -> TopoResult<SiteGraph>;

    /// The low-voltage network serving one group's points.  `index` is the
    /// group's position, available for fresh-name prefixes.
    fn secondary(&mut self, group: &Group, index: usize) -> TopoResult<SiteGraph>;
}

/// Builds a [`DistributionGraph`] from clustered load points and a source
/// location, with network shapes supplied by `S`.
pub struct OpenStreetBuilder<S> {
    strategy: S,
    groups: Vec<Group>,
    source_location: GeoPoint,
    point_node_mapping: Vec<(GeoPoint, String)>,
}

impl<S: NetworkStrategy> OpenStreetBuilder<S> {
    pub fn new(strategy: S, groups: Vec<Group>, source_location: GeoPoint) -> Self {
        Self {
            strategy,
            groups,
            source_location,
            point_node_mapping: Vec::new(),
        }
    }

    /// Group-point → secondary-node assignments recorded by the last
    /// [`build`](Self::build) run.
    pub fn point_node_mapping(&self) -> &[(GeoPoint, String)] {
        &self.point_node_mapping
    }

    /// Run the full synthesis pipeline.
    pub fn build(&mut self) -> TopoResult<DistributionGraph> {
        let mut network = self.strategy.primary(&self.groups, self.source_location)?;
        if network.is_empty() {
            return Err(TopoError::EmptyGraph("empty primary network".into()));
        }
        debug!(
            sites = network.site_count(),
            links = network.link_count(),
            "primary network built"
        );

        let substation = network
            .nearest_sites(&[self.source_location])?
            .swap_remove(0);
        let centers: Vec<GeoPoint> = self.groups.iter().map(|g| g.center).collect();
        let transformer_sites = network.nearest_sites(&centers)?;

        self.point_node_mapping.clear();
        let mut weld_nodes = Vec::with_capacity(self.groups.len());
        for (index, group) in self.groups.iter().enumerate() {
            debug!(group = index, center = %group.center, "building secondary network");
            let secondary = self.strategy.secondary(group, index)?;

            let load_sites = secondary.nearest_sites(&group.points)?;
            self.point_node_mapping
                .extend(group.points.iter().copied().zip(load_sites));

            let transformer_site = &transformer_sites[index];
            let nearest_secondary = secondary
                .nearest_sites(&[group.center])?
                .swap_remove(0);

            network.merge(secondary)?;

            // Weld: a fresh site nudged off the group centre, linked to both
            // sides; it becomes the transformer edge after explosion.
            let weld = format!("xfmr_{index}");
            network.add_site(
                &weld,
                GeoPoint::new(
                    group.center.lon + WELD_EPSILON,
                    group.center.lat + WELD_EPSILON,
                ),
            )?;
            network.add_link(transformer_site, &weld)?;
            network.add_link(&weld, &nearest_secondary)?;
            weld_nodes.push(weld);
        }

        let load_nodes: Vec<String> = self
            .point_node_mapping
            .iter()
            .map(|(_, node)| node.clone())
            .collect();
        let mut graph =
            to_distribution_graph(&network, &substation, &load_nodes)?;
        explode_transformer_nodes(&mut graph, &weld_nodes)?;
        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "distribution graph assembled"
        );
        Ok(graph)
    }
}

// ── Raw graph → DistributionGraph ─────────────────────────────────────────────

/// Convert a welded site graph into a typed distribution graph: every link
/// becomes a matrix-impedance branch with its geodesic length; the substation
/// site carries the voltage source and each load site a load asset.
pub fn to_distribution_graph(
    network: &SiteGraph,
    substation: &str,
    load_nodes: &[String],
) -> TopoResult<DistributionGraph> {
    let loads: FxHashSet<&str> = load_nodes.iter().map(String::as_str).collect();
    let mut graph = DistributionGraph::new();
    let mut branch_counter = 0usize;

    for (a, b) in network.links() {
        for site in [a, b] {
            if graph.has_node(&site.name) {
                continue;
            }
            let mut assets = Vec::new();
            if site.name == substation {
                assets.push(AssetKind::VoltageSource);
            }
            if loads.contains(site.name.as_str()) {
                assets.push(AssetKind::Load);
            }
            graph.add_node(Node::with_assets(&site.name, site.point, &assets))?;
        }

        graph.add_edge(
            &a.name,
            &b.name,
            Edge::branch(
                format!("branch_{branch_counter}"),
                BranchEquipmentKind::MatrixImpedance,
                a.point.distance(b.point),
            ),
        )?;
        branch_counter += 1;
    }
    Ok(graph)
}

// ── Transformer-node explosion ────────────────────────────────────────────────

/// Replace each virtual transformer *node* with a transformer *edge*.
///
/// For every welded node `t`: insert a sibling `t_ht` at the same location,
/// re-target the DFS-parent edge of `t` onto `t_ht` (payload preserved), and
/// connect `t_ht` to `t` with a zero-length transformer edge named after `t`.
/// Afterwards every transformer is an edge between a primary-side node and a
/// secondary-side node, never a node.
pub fn explode_transformer_nodes(
    graph: &mut DistributionGraph,
    transformer_nodes: &[String],
) -> TopoResult<()> {
    let tree = graph.dfs_tree()?;

    let mut seen = FxHashSet::default();
    for t in transformer_nodes {
        if !seen.insert(t.as_str()) {
            continue;
        }
        let location = graph.get_node(t)?.location;
        let ht_name = format!("{t}_ht");
        graph.add_node(Node::new(&ht_name, location))?;

        if let Some(parent) = tree.parent(t) {
            let parent = parent.to_string();
            let edge = graph.remove_edge(&parent, t)?;
            graph.add_edge(&parent, &ht_name, edge)?;
        }

        graph.add_edge(t, &ht_name, Edge::transformer(t.clone()))?;
    }
    Ok(())
}

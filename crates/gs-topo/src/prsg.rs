//! PRSG — the Primary-Road / Secondary-Grid synthesis strategy.
//!
//! The primary network comes from the road network inside the buffered hull
//! of all cluster points: roads too far from a cluster centre are extended
//! with a direct spur, long segments are split, and a Steiner tree connects
//! the nodes nearest each cluster centre and the source.  Each secondary
//! network is a Steiner tree over a 50 m mesh grid spanning the cluster's
//! bounding rectangle.

use std::collections::BTreeSet;

use tracing::debug;

use gs_core::{Distance, GeoPoint};
use gs_spatial::{bounding_polygon, bounding_rect, mesh_graph, steiner_tree, Group, SiteGraph};

use crate::builder::{NetworkStrategy, OpenStreetBuilder};
use crate::provider::{RegionQuery, RoadProvider};
use crate::{TopoError, TopoResult};

/// Buffer applied to the cluster hull when querying for roads.
pub const DEFAULT_BUFFER: Distance = Distance::meters(20.0);

/// A cluster centre farther than this from the road network gets a direct
/// spur added.
pub const ROAD_EXTENSION_THRESHOLD: Distance = Distance::meters(20.0);

/// Maximum primary segment length before splitting.
pub const PRIMARY_SPLIT_LENGTH: Distance = Distance::meters(150.0);

/// Node spacing of the secondary mesh grid.
pub const SECONDARY_MESH_SPACING: Distance = Distance::meters(50.0);

/// Primary-Road / Secondary-Grid network shapes over a road provider.
pub struct PrsgStrategy<R> {
    provider: R,
    buffer: Distance,
}

impl<R: RoadProvider> PrsgStrategy<R> {
    pub fn new(provider: R) -> Self {
        Self {
            provider,
            buffer: DEFAULT_BUFFER,
        }
    }

    pub fn with_buffer(provider: R, buffer: Distance) -> Self {
        Self { provider, buffer }
    }

    /// Add a direct spur from each cluster centre whose nearest road node is
    /// farther than [`ROAD_EXTENSION_THRESHOLD`].
    fn extend_road_network(
        &self,
        mut roads: SiteGraph,
        groups: &[Group],
    ) -> TopoResult<SiteGraph> {
        for (index, group) in groups.iter().enumerate() {
            let nearest = roads.nearest_sites(&[group.center])?.swap_remove(0);
            let road_point = roads.point_of(&nearest).ok_or_else(|| {
                TopoError::EmptyGraph(format!("road site {nearest:?} has no coordinate"))
            })?;
            if group.center.distance(road_point) > ROAD_EXTENSION_THRESHOLD {
                let spur = format!("ext_{index}");
                roads.add_site(&spur, group.center)?;
                roads.add_link(&spur, &nearest)?;
            }
        }
        Ok(roads)
    }
}

impl<R: RoadProvider> NetworkStrategy for PrsgStrategy<R> {
    fn primary(&mut self, groups: &[Group], source: GeoPoint) -> TopoResult<SiteGraph> {
        let points: Vec<GeoPoint> = groups
            .iter()
            .flat_map(|g| g.points.iter().copied())
            .collect();
        let window = bounding_polygon(&points, self.buffer)?;

        let roads = self.provider.fetch_roads(&RegionQuery::Polygon(window))?;
        debug!(
            sites = roads.site_count(),
            links = roads.link_count(),
            "road network fetched"
        );

        let extended = self.extend_road_network(roads, groups)?;
        let split = extended.split_links(PRIMARY_SPLIT_LENGTH);

        let mut terminal_points: Vec<GeoPoint> = groups.iter().map(|g| g.center).collect();
        terminal_points.push(source);
        let terminals = split.nearest_sites(&terminal_points)?;

        Ok(steiner_tree(&split, &terminals)?)
    }

    fn secondary(&mut self, group: &Group, index: usize) -> TopoResult<SiteGraph> {
        // A lone customer needs no network, just its service point.
        if group.points.len() == 1 {
            let mut graph = SiteGraph::new();
            graph.add_site(format!("sec{index}_center"), group.center)?;
            return Ok(graph);
        }

        let (lower_left, upper_right) = bounding_rect(&group.points)?;
        let mesh = mesh_graph(
            lower_left,
            upper_right,
            SECONDARY_MESH_SPACING,
            &format!("sec{index}"),
        )?;

        let nearest = mesh.nearest_sites(&group.points)?;
        let distinct: BTreeSet<&String> = nearest.iter().collect();
        if distinct.len() == 1 {
            // Everything snapped onto one mesh node; the induced subgraph is
            // that single node.
            return Ok(mesh.subgraph(&nearest[..1])?);
        }

        let tree = steiner_tree(&mesh, &nearest)?;
        if tree.is_empty() {
            return Err(TopoError::EmptyGraph(format!(
                "secondary network for group {index} reduced to nothing"
            )));
        }
        Ok(tree)
    }
}

/// The concrete PRSG builder: [`OpenStreetBuilder`] over [`PrsgStrategy`].
pub type Prsg<R> = OpenStreetBuilder<PrsgStrategy<R>>;

impl<R: RoadProvider> OpenStreetBuilder<PrsgStrategy<R>> {
    /// PRSG builder with the default road-query buffer.
    pub fn with_provider(provider: R, groups: Vec<Group>, source_location: GeoPoint) -> Self {
        OpenStreetBuilder::new(PrsgStrategy::new(provider), groups, source_location)
    }

    /// PRSG builder with an explicit road-query buffer.
    pub fn with_provider_and_buffer(
        provider: R,
        groups: Vec<Group>,
        source_location: GeoPoint,
        buffer: Distance,
    ) -> Self {
        OpenStreetBuilder::new(PrsgStrategy::with_buffer(provider, buffer), groups, source_location)
    }
}

//! Raw geographic graph: named sites with undirected links.
//!
//! `SiteGraph` is the working representation for everything *before* the
//! typed distribution graph exists: fetched road networks, secondary mesh
//! grids, Steiner reductions, and the welded combination of all of them.
//! Node payloads carry only a name and a coordinate; link payloads are empty
//! (lengths are recomputed from coordinates where needed).
//!
//! Fresh names created by mesh generation and edge splitting are
//! deterministic and derived from their context (`"{prefix}_{i}_{j}"`,
//! `"{a}--{b}--{n}"`), so merged graphs never collide and runs reproduce.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use gs_core::{Distance, GeoPoint};

use crate::polygon::DEGREE_TO_METER;
use crate::{SpatialError, SpatialResult};

/// A named geographic node.
#[derive(Debug, Clone, PartialEq)]
pub struct Site {
    pub name: String,
    pub point: GeoPoint,
}

/// Undirected graph of geographic sites.
#[derive(Debug, Clone, Default)]
pub struct SiteGraph {
    graph: UnGraph<Site, ()>,
    names: FxHashMap<String, NodeIndex>,
}

impl SiteGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(sites: usize, links: usize) -> Self {
        Self {
            graph: UnGraph::with_capacity(sites, links),
            names: FxHashMap::default(),
        }
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn site_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn link_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Add a site; duplicate names are rejected.
    pub fn add_site(&mut self, name: impl Into<String>, point: GeoPoint) -> SpatialResult<()> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(SpatialError::DuplicateSite(name));
        }
        let idx = self.graph.add_node(Site {
            name: name.clone(),
            point,
        });
        self.names.insert(name, idx);
        Ok(())
    }

    /// Add an undirected link between two existing sites.  Re-adding an
    /// existing link is a no-op.
    pub fn add_link(&mut self, a: &str, b: &str) -> SpatialResult<()> {
        let ia = self.index_of(a)?;
        let ib = self.index_of(b)?;
        if self.graph.find_edge(ia, ib).is_none() {
            self.graph.add_edge(ia, ib, ());
        }
        Ok(())
    }

    /// Disjoint union: move every site and link of `other` into `self`.
    /// A shared site name is an error (the union must stay disjoint).
    pub fn merge(&mut self, other: SiteGraph) -> SpatialResult<()> {
        for site in other.graph.node_weights() {
            self.add_site(site.name.clone(), site.point)?;
        }
        for (a, b) in other.links() {
            self.add_link(&a.name, &b.name)?;
        }
        Ok(())
    }

    // ── Access ────────────────────────────────────────────────────────────

    pub fn point_of(&self, name: &str) -> Option<GeoPoint> {
        self.names.get(name).map(|&i| self.graph[i].point)
    }

    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.graph.node_weights()
    }

    /// Iterator over links as `(site_a, site_b)` pairs.
    pub fn links(&self) -> impl Iterator<Item = (&Site, &Site)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], &self.graph[e.target()]))
    }

    pub(crate) fn index_of(&self, name: &str) -> SpatialResult<NodeIndex> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| SpatialError::UnknownSite(name.to_string()))
    }

    pub(crate) fn petgraph(&self) -> &UnGraph<Site, ()> {
        &self.graph
    }

    /// For each target point, the name of the nearest site.
    pub fn nearest_sites(&self, targets: &[GeoPoint]) -> SpatialResult<Vec<String>> {
        if self.is_empty() {
            return Err(SpatialError::EmptyGraph(
                "nearest-site query on a graph with no sites".into(),
            ));
        }
        let sites: Vec<&Site> = self.graph.node_weights().collect();
        let points: Vec<GeoPoint> = sites.iter().map(|s| s.point).collect();
        let indices = crate::nearest::nearest_points(&points, targets)?;
        Ok(indices.into_iter().map(|i| sites[i].name.clone()).collect())
    }

    /// Induced subgraph over the named sites.
    pub fn subgraph(&self, names: &[String]) -> SpatialResult<SiteGraph> {
        let mut out = SiteGraph::with_capacity(names.len(), names.len());
        for name in names {
            let idx = self.index_of(name)?;
            if !out.contains(name) {
                out.add_site(name.clone(), self.graph[idx].point)?;
            }
        }
        for (a, b) in self.links() {
            if out.contains(&a.name) && out.contains(&b.name) {
                out.add_link(&a.name, &b.name)?;
            }
        }
        Ok(out)
    }

    // ── Derived graphs ────────────────────────────────────────────────────

    /// Minimum spanning forest by geodesic link length (Kruskal).  Isolated
    /// sites are preserved.
    pub fn minimum_spanning_tree(&self) -> SiteGraph {
        let mut edges: Vec<(f64, NodeIndex, NodeIndex)> = self
            .graph
            .edge_references()
            .map(|e| {
                let len = self.graph[e.source()]
                    .point
                    .distance(self.graph[e.target()].point)
                    .as_meters();
                (len, e.source(), e.target())
            })
            .collect();
        edges.sort_by(|a, b| {
            a.0.total_cmp(&b.0)
                .then_with(|| (a.1, a.2).cmp(&(b.1, b.2)))
        });

        let mut out = SiteGraph::with_capacity(self.site_count(), self.site_count());
        for site in self.graph.node_weights() {
            // Names are unique in self, so re-adding cannot fail.
            let _ = out.add_site(site.name.clone(), site.point);
        }

        let mut components = UnionFind::<usize>::new(self.graph.node_count());
        for (_, a, b) in edges {
            if components.union(a.index(), b.index()) {
                let _ = out.add_link(&self.graph[a].name, &self.graph[b].name);
            }
        }
        out
    }

    /// Rewrite every link longer than `max_len` into a chain of interior
    /// sites spaced `max_len` apart along the lon/lat chord.  Pure: returns a
    /// new graph; endpoints and short links are unchanged.
    pub fn split_links(&self, max_len: Distance) -> SiteGraph {
        // A non-positive limit cannot be honoured; leave the graph as-is.
        if max_len.as_meters() <= 0.0 {
            return self.clone();
        }
        let mut out = SiteGraph::with_capacity(self.site_count(), self.link_count());
        for site in self.graph.node_weights() {
            let _ = out.add_site(site.name.clone(), site.point);
        }

        let max_m = max_len.as_meters();
        for (a, b) in self.links() {
            let length_m = a.point.distance(b.point).as_meters();
            if length_m <= max_m {
                let _ = out.add_link(&a.name, &b.name);
                continue;
            }

            // Interior sites at max_len, 2·max_len, … from `a`; the last
            // segment picks up the remainder.
            let mut chain = vec![a.name.clone()];
            let mut offset = max_m;
            let mut counter = 0usize;
            while offset < length_m {
                let f = offset / length_m;
                let point = GeoPoint::new(
                    a.point.lon + (b.point.lon - a.point.lon) * f,
                    a.point.lat + (b.point.lat - a.point.lat) * f,
                );
                let name = format!("{}--{}--{counter}", a.name, b.name);
                let _ = out.add_site(name.clone(), point);
                chain.push(name);
                offset += max_m;
                counter += 1;
            }
            chain.push(b.name.clone());

            for pair in chain.windows(2) {
                let _ = out.add_link(&pair[0], &pair[1]);
            }
        }
        out
    }
}

// ── Mesh generation ───────────────────────────────────────────────────────────

/// Build a 4-connected rectangular mesh between `lower_left` and
/// `upper_right` with the given node spacing.
///
/// Node names are `"{prefix}_{i}_{j}"` by column/row index.  An empty mesh
/// (inverted corners) is an error reporting the corner-to-corner distance.
pub fn mesh_graph(
    lower_left: GeoPoint,
    upper_right: GeoPoint,
    spacing: Distance,
    prefix: &str,
) -> SpatialResult<SiteGraph> {
    if spacing.as_meters() <= 0.0 {
        return Err(SpatialError::InvalidInput(format!(
            "mesh spacing must be positive, got {spacing}"
        )));
    }
    let delta = spacing.as_meters() / DEGREE_TO_METER;
    let lons = arange(lower_left.lon, upper_right.lon + delta, delta);
    let lats = arange(lower_left.lat, upper_right.lat + delta, delta);

    if lons.is_empty() || lats.is_empty() {
        let diagonal = ((upper_right.lon - lower_left.lon).powi(2)
            + (upper_right.lat - lower_left.lat).powi(2))
        .sqrt()
            * DEGREE_TO_METER;
        return Err(SpatialError::EmptyGraph(format!(
            "empty mesh for {lower_left} .. {upper_right} at {spacing} spacing \
             (diagonal distance {diagonal:.1} m)"
        )));
    }

    let mut mesh = SiteGraph::with_capacity(lons.len() * lats.len(), 2 * lons.len() * lats.len());
    for (i, &lon) in lons.iter().enumerate() {
        for (j, &lat) in lats.iter().enumerate() {
            mesh.add_site(format!("{prefix}_{i}_{j}"), GeoPoint::new(lon, lat))?;
            if i > 0 {
                mesh.add_link(&format!("{prefix}_{}_{j}", i - 1), &format!("{prefix}_{i}_{j}"))?;
            }
            if j > 0 {
                mesh.add_link(&format!("{prefix}_{i}_{}", j - 1), &format!("{prefix}_{i}_{j}"))?;
            }
        }
    }
    Ok(mesh)
}

/// Half-open float range `[start, stop)` in `step` increments, computed from
/// the start to avoid accumulation drift.
fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let mut values = Vec::new();
    loop {
        let x = start + values.len() as f64 * step;
        if x >= stop {
            break;
        }
        values.push(x);
    }
    values
}

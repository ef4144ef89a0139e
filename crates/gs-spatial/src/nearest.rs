//! Nearest-point lookup over an R-tree spatial index.
//!
//! Distances are squared Euclidean in lon/lat degree space — sufficient for
//! nearest-among queries within a feeder service area (error < 0.1 % at
//! ≤ 60° latitude).  Bulk loading keeps the whole lookup at
//! O((|sources| + |targets|) · log |sources|).

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use gs_core::GeoPoint;

use crate::{SpatialError, SpatialResult};

/// Entry stored in the R-tree: a 2-D `[lon, lat]` point plus the index of
/// the source point it came from.
#[derive(Clone)]
struct PointEntry {
    point: [f64; 2],
    idx: usize,
}

impl RTreeObject for PointEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for PointEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let d_lon = self.point[0] - point[0];
        let d_lat = self.point[1] - point[1];
        d_lon * d_lon + d_lat * d_lat
    }
}

/// For each target, return the index (into `sources`) of the nearest source
/// point.  Ties resolve by R-tree traversal order.
pub fn nearest_points(
    sources: &[GeoPoint],
    targets: &[GeoPoint],
) -> SpatialResult<Vec<usize>> {
    if sources.is_empty() {
        return Err(SpatialError::InvalidInput(
            "nearest-point lookup needs at least one source point".into(),
        ));
    }

    let entries: Vec<PointEntry> = sources
        .iter()
        .enumerate()
        .map(|(idx, p)| PointEntry {
            point: [p.lon, p.lat],
            idx,
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    targets
        .iter()
        .map(|t| {
            tree.nearest_neighbor(&[t.lon, t.lat])
                .map(|e| e.idx)
                .ok_or_else(|| {
                    SpatialError::InvalidInput(format!("no source point near {t}"))
                })
        })
        .collect()
}

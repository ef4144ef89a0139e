//! External data-provider interfaces.
//!
//! Fetching OpenStreetMap buildings and roads is a collaborator concern; the
//! synthesis pipeline only sees these traits.  Implementations live outside
//! the core (network clients, fixture loaders, test stubs) and can be swapped
//! without touching the builder.

use gs_core::{Distance, GeoPoint};
use gs_spatial::SiteGraph;

use crate::TopoResult;

/// A region to fetch geographic data for.
///
/// Address and point queries carry their own search radius; polygon and
/// point-list queries define the window directly.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionQuery {
    Address { address: String, radius: Distance },
    Point { center: GeoPoint, radius: Distance },
    Polygon(Vec<GeoPoint>),
    Points(Vec<GeoPoint>),
}

/// Geometry attached to a building parcel.
///
/// Providers replace multi-polygon footprints with the exterior ring of the
/// convex hull and skip unsupported geometry types.
#[derive(Debug, Clone, PartialEq)]
pub enum ParcelGeometry {
    Point(GeoPoint),
    Ring(Vec<GeoPoint>),
}

/// A building parcel as returned by the buildings provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub name: String,
    pub geometry: ParcelGeometry,
    pub building_type: String,
    pub city: String,
    pub state: String,
    pub postal_address: String,
}

impl Parcel {
    /// A representative coordinate for clustering: the point itself, or the
    /// first ring vertex.
    pub fn anchor(&self) -> Option<GeoPoint> {
        match &self.geometry {
            ParcelGeometry::Point(p) => Some(*p),
            ParcelGeometry::Ring(ring) => ring.first().copied(),
        }
    }
}

/// Source of building parcels.
pub trait ParcelProvider {
    fn fetch_buildings(&self, query: &RegionQuery) -> TopoResult<Vec<Parcel>>;
}

/// Source of road networks.
///
/// The returned graph must already be reduced to a minimum spanning tree
/// ([`SiteGraph::minimum_spanning_tree`] is available to implementations) and
/// carry a coordinate per site.
pub trait RoadProvider {
    fn fetch_roads(&self, query: &RegionQuery) -> TopoResult<SiteGraph>;
}

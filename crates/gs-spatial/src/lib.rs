//! `gs-spatial` — spatial utilities for feeder synthesis.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`cluster`]    | Seeded K-means (`Group`), weighted K-means, Ward linkage  |
//! | [`nearest`]    | R-tree nearest-point lookup                               |
//! | [`polygon`]    | Bounding rectangles and buffered query polygons           |
//! | [`site_graph`] | `SiteGraph` (named geographic graph), mesh, edge splitting |
//! | [`steiner`]    | Mehlhorn Steiner-tree approximation                       |
//! | [`error`]      | `SpatialError`, `SpatialResult<T>`                        |

pub mod cluster;
pub mod error;
pub mod nearest;
pub mod polygon;
pub mod site_graph;
pub mod steiner;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cluster::{kmeans_clusters, ward_labels, weighted_kmeans_labels, Group, KMEANS_SEED};
pub use error::{SpatialError, SpatialResult};
pub use nearest::nearest_points;
pub use polygon::{bounding_polygon, bounding_rect, DEGREE_TO_METER};
pub use site_graph::{mesh_graph, Site, SiteGraph};
pub use steiner::{steiner_edges, steiner_tree};

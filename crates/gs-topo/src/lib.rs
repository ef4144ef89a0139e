//! `gs-topo` — feeder topology synthesis.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                    |
//! |--------------|-------------------------------------------------------------|
//! | [`builder`]  | `OpenStreetBuilder`, `NetworkStrategy`, weld + explosion    |
//! | [`prsg`]     | `Prsg` (Primary-Road / Secondary-Grid strategy), constants  |
//! | [`provider`] | `RoadProvider` / `ParcelProvider` interfaces, `RegionQuery` |
//! | [`error`]    | `TopoError`, `TopoResult<T>`                                |

pub mod builder;
pub mod error;
pub mod provider;
pub mod prsg;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::{
    explode_transformer_nodes, to_distribution_graph, NetworkStrategy, OpenStreetBuilder,
    WELD_EPSILON,
};
pub use error::{TopoError, TopoResult};
pub use provider::{Parcel, ParcelGeometry, ParcelProvider, RegionQuery, RoadProvider};
pub use prsg::{
    Prsg, PrsgStrategy, DEFAULT_BUFFER, PRIMARY_SPLIT_LENGTH, ROAD_EXTENSION_THRESHOLD,
    SECONDARY_MESH_SPACING,
};

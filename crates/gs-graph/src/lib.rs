//! `gs-graph` — the attributed distribution-feeder graph.
//!
//! # Crate layout
//!
//! | Module    | Contents                                               |
//! |-----------|--------------------------------------------------------|
//! | [`model`] | `Node`, `Edge`, `AssetKind`, `EdgeKind` payload types  |
//! | [`graph`] | `DistributionGraph`, `DfsTree`                         |
//! | [`error`] | `GraphError`, `GraphResult<T>`                         |

pub mod error;
pub mod graph;
pub mod model;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{GraphError, GraphResult};
pub use graph::{DfsTree, DistributionGraph};
pub use model::{AssetKind, BranchEquipmentKind, Edge, EdgeKind, Node};

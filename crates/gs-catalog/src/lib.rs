//! `gs-catalog` — the external equipment catalogue interface.
//!
//! # Crate layout
//!
//! | Module        | Contents                                             |
//! |---------------|------------------------------------------------------|
//! | [`equipment`] | Typed equipment families and the `Equipment` sum     |
//! | [`catalog`]   | `Catalog` store with typed predicate iteration, JSON |
//! | [`error`]     | `CatalogError`, `CatalogResult<T>`                   |

pub mod catalog;
pub mod equipment;
pub mod error;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use catalog::Catalog;
pub use equipment::{
    ConductorEquipment, Equipment, EquipmentKind, GeometryBranchEquipment, LoadEquipment,
    MatrixImpedanceBranchEquipment, PhaseLoadEquipment, PhaseVoltageSourceEquipment,
    SequenceImpedanceBranchEquipment, TransformerEquipment, VoltageSourceEquipment,
    VoltageType, WindingEquipment,
};
pub use error::{CatalogError, CatalogResult};

//! `gs-mapper` — phase, voltage, and equipment labelling for synthesized
//! feeders.
//!
//! Mappers compute and validate their label tables eagerly at construction;
//! the constructed mapper is an immutable snapshot whose accessors hand out
//! borrowed maps.  The system builder consumes mappers through the
//! [`PhaseMapper`], [`VoltageMapper`], and [`EquipmentMapper`] traits, so
//! alternative implementations (including test fixtures) slot in without
//! touching the pipeline.
//!
//! # Crate layout
//!
//! | Module        | Contents                                               |
//! |---------------|--------------------------------------------------------|
//! | [`phase`]     | `BalancedPhaseMapper`, allocation methods, propagation |
//! | [`voltage`]   | `TransformerVoltageMapper`                             |
//! | [`equipment`] | `CatalogEquipmentMapper`, served-load aggregation      |
//! | [`error`]     | `MapperError`, `MapperResult<T>`                       |

mod allocation;
pub mod equipment;
pub mod error;
pub mod phase;
pub mod voltage;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use equipment::{uniform_asset_equipment, CatalogEquipmentMapper, EquipmentMapper};
pub use error::{MapperError, MapperResult};
pub use phase::{
    AllocationMethod, BalancedPhaseMapper, PhaseMapper, TransformerKind, TransformerPhaseConfig,
};
pub use voltage::{TransformerVoltageConfig, TransformerVoltageMapper, VoltageMapper};

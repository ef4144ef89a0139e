//! `gs-system` — typed distribution-system assembly.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                  |
//! |----------------|-----------------------------------------------------------|
//! | [`components`] | `Bus`, `BranchComponent`, `TransformerComponent`, assets  |
//! | [`system`]     | `DistributionSystem`, `SystemStats`, JSON round-trip      |
//! | [`builder`]    | `SystemBuilder` single-pass assembly                      |
//! | [`error`]      | `SystemError`, `SystemResult<T>`                          |

pub mod builder;
pub mod components;
pub mod error;
pub mod system;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use builder::{expected_equipment_kind, SystemBuilder};
pub use components::{AssetComponent, BranchComponent, Bus, TransformerComponent};
pub use error::{SystemError, SystemResult};
pub use system::{DistributionSystem, SystemStats};

//! `gs-core` — foundational types for the `gridsynth` feeder-synthesis
//! framework.
//!
//! This crate is a dependency of every other `gs-*` crate.  It intentionally
//! has no `gs-*` dependencies and minimal external ones (only `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                  |
//! |-----------|-----------------------------------------------------------|
//! | [`geo`]   | `GeoPoint`, great-circle distance                         |
//! | [`units`] | `Distance`, `Voltage`, `Current`, power quantities, `Angle` |
//! | [`phase`] | `Phase`, `PhaseSet` and common phase-set constructors     |

pub mod geo;
pub mod phase;
pub mod units;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use geo::GeoPoint;
pub use phase::{phase_set, split_secondary, three_phase, Phase, PhaseSet};
pub use units::{
    ActivePower, Angle, ApparentPower, Current, Distance, ReactivePower, Voltage,
};

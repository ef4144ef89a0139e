//! Electrical phase labels.
//!
//! A node carries a non-empty *set* of phases.  `BTreeSet` gives stable
//! iteration order (A < B < C < N < S1 < S2), which keeps downstream output
//! and serialised systems deterministic.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A single phase conductor label.
///
/// `S1`/`S2` are the two hot legs of a center-tapped split-phase secondary;
/// `N` is the neutral.
#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Phase {
    A,
    B,
    C,
    N,
    S1,
    S2,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::A => "A",
            Phase::B => "B",
            Phase::C => "C",
            Phase::N => "N",
            Phase::S1 => "S1",
            Phase::S2 => "S2",
        };
        write!(f, "{s}")
    }
}

/// An ordered set of phases attached to a node, winding, or asset.
pub type PhaseSet = BTreeSet<Phase>;

/// Build a `PhaseSet` from a slice.
pub fn phase_set(phases: &[Phase]) -> PhaseSet {
    phases.iter().copied().collect()
}

/// The full three-phase set `{A, B, C}`.
pub fn three_phase() -> PhaseSet {
    phase_set(&[Phase::A, Phase::B, Phase::C])
}

/// The center-tapped secondary set `{S1, N, S2}`.
pub fn split_secondary() -> PhaseSet {
    phase_set(&[Phase::S1, Phase::N, Phase::S2])
}

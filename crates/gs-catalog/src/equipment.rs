//! Typed equipment components.
//!
//! These are the concrete models the equipment mapper selects from and the
//! system builder attaches to emitted components.  Field sets carry exactly
//! what the selection predicates and winding/voltage derivations consume.

use serde::{Deserialize, Serialize};

use gs_core::{ActivePower, Angle, ApparentPower, Current, ReactivePower, Voltage};

/// How a rated voltage is expressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoltageType {
    LineToLine,
    LineToGround,
}

// ── Transformers ──────────────────────────────────────────────────────────────

/// One winding of a distribution transformer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindingEquipment {
    pub num_phases: u8,
    pub rated_power: ApparentPower,
    pub rated_voltage: Voltage,
    pub voltage_type: VoltageType,
}

/// A catalogue transformer: two or more windings, optionally center-tapped
/// (the residential split-phase construction).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerEquipment {
    pub name: String,
    pub windings: Vec<WindingEquipment>,
    pub is_center_tapped: bool,
}

impl TransformerEquipment {
    /// Smallest winding power rating; the unit's effective capacity.
    pub fn min_rated_power(&self) -> ApparentPower {
        self.windings
            .iter()
            .map(|w| w.rated_power)
            .fold(ApparentPower::volt_amperes(f64::INFINITY), ApparentPower::min)
    }
}

// ── Branch conductors ─────────────────────────────────────────────────────────

/// Per-phase impedance matrices plus an ampacity rating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixImpedanceBranchEquipment {
    pub name: String,
    /// Resistance matrix, ohm/km; square with one row per phase.
    pub r_matrix: Vec<Vec<f64>>,
    /// Reactance matrix, ohm/km.
    pub x_matrix: Vec<Vec<f64>>,
    /// Capacitance matrix, nF/km.
    pub c_matrix: Vec<Vec<f64>>,
    pub ampacity: Current,
}

impl MatrixImpedanceBranchEquipment {
    /// Matrix order = number of phases this model covers.
    pub fn matrix_order(&self) -> usize {
        self.r_matrix.len()
    }
}

/// Positive/zero sequence impedances; valid for three-phase lines only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceImpedanceBranchEquipment {
    pub name: String,
    /// Positive-sequence impedance, ohm/km.
    pub pos_seq_resistance: f64,
    pub pos_seq_reactance: f64,
    /// Zero-sequence impedance, ohm/km.
    pub zero_seq_resistance: f64,
    pub zero_seq_reactance: f64,
    pub ampacity: Current,
}

/// A bare conductor used by geometry-described spans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConductorEquipment {
    pub name: String,
    pub ampacity: Current,
}

/// A span described by its conductor set and physical arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryBranchEquipment {
    pub name: String,
    pub conductors: Vec<ConductorEquipment>,
}

impl GeometryBranchEquipment {
    /// Ampacity of the strongest conductor in the arrangement.
    pub fn max_ampacity(&self) -> Current {
        self.conductors
            .iter()
            .map(|c| c.ampacity)
            .fold(Current::amperes(0.0), Current::max)
    }
}

// ── Loads and sources ─────────────────────────────────────────────────────────

/// ZIP-composition load for one phase.
///
/// `z/i/p` fractions split real and reactive demand into constant-impedance,
/// constant-current, and constant-power parts; each triple sums to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseLoadEquipment {
    pub real_power: ActivePower,
    pub reactive_power: ReactivePower,
    pub z_real: f64,
    pub i_real: f64,
    pub p_real: f64,
    pub z_imag: f64,
    pub i_imag: f64,
    pub p_imag: f64,
}

impl PhaseLoadEquipment {
    /// Constant-power load split across nothing but the P fraction.
    pub fn constant_power(real_power: ActivePower, reactive_power: ReactivePower) -> Self {
        Self {
            real_power,
            reactive_power,
            z_real: 0.0,
            i_real: 0.0,
            p_real: 1.0,
            z_imag: 0.0,
            i_imag: 0.0,
            p_imag: 1.0,
        }
    }

    /// ZIP-weighted apparent-power magnitude of this phase load:
    /// `√((z_r+i_r+p_r)·P² + (z_i+i_i+p_i)·Q²)`.
    pub fn apparent_power(&self) -> ApparentPower {
        let p_kw = self.real_power.as_kilowatts();
        let q_kvar = self.reactive_power.as_kilovars();
        let magnitude = ((self.z_real + self.i_real + self.p_real) * p_kw * p_kw
            + (self.z_imag + self.i_imag + self.p_imag) * q_kvar * q_kvar)
            .sqrt();
        ApparentPower::kilovolt_amperes(magnitude)
    }
}

/// A catalogue load: one ZIP entry per served phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadEquipment {
    pub name: String,
    pub phase_loads: Vec<PhaseLoadEquipment>,
}

impl LoadEquipment {
    /// Total ZIP apparent power across all phase loads.
    pub fn total_apparent_power(&self) -> ApparentPower {
        self.phase_loads.iter().map(PhaseLoadEquipment::apparent_power).sum()
    }
}

/// One phase of a voltage source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseVoltageSourceEquipment {
    pub voltage: Voltage,
    pub angle: Angle,
    pub r1: f64,
    pub x1: f64,
    pub r0: f64,
    pub x0: f64,
}

/// A substation voltage source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoltageSourceEquipment {
    pub name: String,
    pub sources: Vec<PhaseVoltageSourceEquipment>,
}

// ── Unified view ──────────────────────────────────────────────────────────────

/// Discriminant for the equipment families the catalogue stores.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    Transformer,
    MatrixImpedanceBranch,
    SequenceImpedanceBranch,
    GeometryBranch,
    Load,
    VoltageSource,
}

impl std::fmt::Display for EquipmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EquipmentKind::Transformer => "transformer",
            EquipmentKind::MatrixImpedanceBranch => "matrix-impedance branch",
            EquipmentKind::SequenceImpedanceBranch => "sequence-impedance branch",
            EquipmentKind::GeometryBranch => "geometry branch",
            EquipmentKind::Load => "load",
            EquipmentKind::VoltageSource => "voltage source",
        };
        write!(f, "{s}")
    }
}

/// Any catalogue equipment, tagged by family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Equipment {
    Transformer(TransformerEquipment),
    MatrixImpedanceBranch(MatrixImpedanceBranchEquipment),
    SequenceImpedanceBranch(SequenceImpedanceBranchEquipment),
    GeometryBranch(GeometryBranchEquipment),
    Load(LoadEquipment),
    VoltageSource(VoltageSourceEquipment),
}

impl Equipment {
    pub fn name(&self) -> &str {
        match self {
            Equipment::Transformer(e) => &e.name,
            Equipment::MatrixImpedanceBranch(e) => &e.name,
            Equipment::SequenceImpedanceBranch(e) => &e.name,
            Equipment::GeometryBranch(e) => &e.name,
            Equipment::Load(e) => &e.name,
            Equipment::VoltageSource(e) => &e.name,
        }
    }

    pub fn kind(&self) -> EquipmentKind {
        match self {
            Equipment::Transformer(_) => EquipmentKind::Transformer,
            Equipment::MatrixImpedanceBranch(_) => EquipmentKind::MatrixImpedanceBranch,
            Equipment::SequenceImpedanceBranch(_) => EquipmentKind::SequenceImpedanceBranch,
            Equipment::GeometryBranch(_) => EquipmentKind::GeometryBranch,
            Equipment::Load(_) => EquipmentKind::Load,
            Equipment::VoltageSource(_) => EquipmentKind::VoltageSource,
        }
    }
}

//! Typed components of an assembled distribution system.
//!
//! Components reference buses by name; the containing
//! [`DistributionSystem`](crate::DistributionSystem) validates the references
//! on import.

use serde::{Deserialize, Serialize};

use gs_catalog::{Equipment, VoltageType};
use gs_core::{Distance, GeoPoint, PhaseSet, Voltage};
use gs_graph::AssetKind;

/// An electrical connection site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub name: String,
    pub phases: PhaseSet,
    pub coordinate: GeoPoint,
    pub rated_voltage: Voltage,
    pub voltage_type: VoltageType,
}

/// A load, solar, capacitor, or voltage-source component hanging off a bus.
///
/// Load and voltage-source assets always carry catalogue equipment; solar and
/// capacitor assets have no catalogue family here and may carry none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetComponent {
    pub name: String,
    pub bus: String,
    pub kind: AssetKind,
    pub phases: PhaseSet,
    pub equipment: Option<Equipment>,
}

/// A line segment between two buses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchComponent {
    pub name: String,
    pub buses: [String; 2],
    pub phases: PhaseSet,
    pub length: Distance,
    pub equipment: Equipment,
}

/// A distribution transformer between two buses.
///
/// `winding_buses[i]` is the bus winding `i` connects to and
/// `winding_phases[i]` its conductor set; both follow the equipment's
/// winding order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformerComponent {
    pub name: String,
    pub buses: [String; 2],
    pub winding_buses: Vec<String>,
    pub winding_phases: Vec<PhaseSet>,
    pub equipment: Equipment,
}

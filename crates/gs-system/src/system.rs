//! The assembled distribution system container and its persisted form.

use serde::{Deserialize, Serialize};

use gs_graph::AssetKind;

use crate::components::{AssetComponent, BranchComponent, Bus, TransformerComponent};
use crate::{SystemError, SystemResult};

/// A complete synthesized distribution system.
///
/// Construction happens once (see [`SystemBuilder`](crate::SystemBuilder));
/// afterwards the system is an immutable snapshot that can be queried,
/// summarised, and round-tripped through JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DistributionSystem {
    pub name: String,
    pub buses: Vec<Bus>,
    pub branches: Vec<BranchComponent>,
    pub transformers: Vec<TransformerComponent>,
    pub assets: Vec<AssetComponent>,
}

impl DistributionSystem {
    pub fn get_bus(&self, name: &str) -> Option<&Bus> {
        self.buses.iter().find(|b| b.name == name)
    }

    pub fn assets_of_kind(&self, kind: AssetKind) -> impl Iterator<Item = &AssetComponent> {
        self.assets.iter().filter(move |a| a.kind == kind)
    }

    /// Component counts by type.
    pub fn stats(&self) -> SystemStats {
        SystemStats {
            buses: self.buses.len(),
            branches: self.branches.len(),
            transformers: self.transformers.len(),
            loads: self.assets_of_kind(AssetKind::Load).count(),
            solar: self.assets_of_kind(AssetKind::Solar).count(),
            capacitors: self.assets_of_kind(AssetKind::Capacitor).count(),
            voltage_sources: self.assets_of_kind(AssetKind::VoltageSource).count(),
        }
    }

    // ── Persistence ───────────────────────────────────────────────────────

    pub fn to_json(&self) -> SystemResult<String> {
        serde_json::to_string_pretty(self).map_err(SystemError::from)
    }

    /// Load a system from its JSON form, re-validating bus references.
    pub fn from_json(json: &str) -> SystemResult<Self> {
        let system: DistributionSystem = serde_json::from_str(json)?;
        system.validate_references()?;
        Ok(system)
    }

    fn validate_references(&self) -> SystemResult<()> {
        let has_bus = |name: &str| self.buses.iter().any(|b| b.name == name);

        for asset in &self.assets {
            if !has_bus(&asset.bus) {
                return Err(SystemError::InvalidReference(format!(
                    "asset {:?} references unknown bus {:?}",
                    asset.name, asset.bus
                )));
            }
        }
        for branch in &self.branches {
            for bus in &branch.buses {
                if !has_bus(bus) {
                    return Err(SystemError::InvalidReference(format!(
                        "branch {:?} references unknown bus {bus:?}",
                        branch.name
                    )));
                }
            }
        }
        for transformer in &self.transformers {
            for bus in transformer.buses.iter().chain(&transformer.winding_buses) {
                if !has_bus(bus) {
                    return Err(SystemError::InvalidReference(format!(
                        "transformer {:?} references unknown bus {bus:?}",
                        transformer.name
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Size summary of an assembled system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SystemStats {
    pub buses: usize,
    pub branches: usize,
    pub transformers: usize,
    pub loads: usize,
    pub solar: usize,
    pub capacitors: usize,
    pub voltage_sources: usize,
}

impl std::fmt::Display for SystemStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} buses, {} branches, {} transformers, {} loads, {} sources",
            self.buses, self.branches, self.transformers, self.loads, self.voltage_sources
        )
    }
}

//! Voltage propagation from transformer winding ratings.
//!
//! Each transformer pushes the maximum of its winding voltages to everything
//! upstream of its LT endpoint and the minimum to everything downstream of
//! its HT endpoint.  Nodes touched by several transformers keep the greater
//! voltage upstream and the lesser downstream, so cascaded transformers
//! resolve correctly.

use rustc_hash::FxHashMap;
use tracing::debug;

use gs_core::Voltage;
use gs_graph::DistributionGraph;

use crate::{MapperError, MapperResult};

/// Per-winding line-to-ground voltages for one transformer edge.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformerVoltageConfig {
    pub name: String,
    pub voltages: Vec<Voltage>,
}

/// Label table the system builder consumes from a voltage mapper.
pub trait VoltageMapper {
    /// Node name → line-to-ground voltage.
    fn node_voltages(&self) -> &FxHashMap<String, Voltage>;
}

/// Voltage mapper driven by transformer winding ratings, computed at
/// construction.
pub struct TransformerVoltageMapper {
    node_voltages: FxHashMap<String, Voltage>,
}

impl VoltageMapper for TransformerVoltageMapper {
    fn node_voltages(&self) -> &FxHashMap<String, Voltage> {
        &self.node_voltages
    }
}

impl TransformerVoltageMapper {
    pub fn new(
        graph: &DistributionGraph,
        configs: &[TransformerVoltageConfig],
    ) -> MapperResult<Self> {
        let endpoints: FxHashMap<&str, (&str, &str)> = graph
            .get_edges()
            .filter(|(_, _, e)| e.is_transformer())
            .map(|(from, to, e)| (e.name.as_str(), (from, to)))
            .collect();

        check_coverage(&endpoints, configs)?;
        let tree = graph.dfs_tree()?;

        let mut node_voltages: FxHashMap<String, Voltage> = FxHashMap::default();
        for config in configs {
            let (from, to) = endpoints[config.name.as_str()];
            let (ht, lt) = if tree.has_edge(from, to) {
                (from, to)
            } else {
                (to, from)
            };

            let vmax = fold_voltages(config, Voltage::max)?;
            let vmin = fold_voltages(config, Voltage::min)?;

            // Ancestors of the LT side run at the primary level or above.
            for node in tree.ancestors(lt) {
                node_voltages
                    .entry(node)
                    .and_modify(|v| *v = v.max(vmax))
                    .or_insert(vmax);
            }
            // Descendants of the HT side run at the secondary level or below.
            for node in tree.descendants(ht) {
                node_voltages
                    .entry(node)
                    .and_modify(|v| *v = v.min(vmin))
                    .or_insert(vmin);
            }
        }

        debug!(nodes = node_voltages.len(), "voltage mapping computed");
        Ok(Self { node_voltages })
    }
}

/// Every transformer edge in the graph needs a config (extras are equally a
/// coverage defect).
fn check_coverage(
    endpoints: &FxHashMap<&str, (&str, &str)>,
    configs: &[TransformerVoltageConfig],
) -> MapperResult<()> {
    let config_names: Vec<&str> = configs.iter().map(|c| c.name.as_str()).collect();

    let mut missing: Vec<&str> = endpoints
        .keys()
        .copied()
        .filter(|name| !config_names.contains(name))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(MapperError::MissingVoltageMapping(format!(
            "no winding voltages for transformers {missing:?}"
        )));
    }

    let mut unknown: Vec<&str> = config_names
        .iter()
        .copied()
        .filter(|name| !endpoints.contains_key(name))
        .collect();
    if !unknown.is_empty() {
        unknown.sort_unstable();
        return Err(MapperError::MissingVoltageMapping(format!(
            "winding voltages for unknown transformers {unknown:?}"
        )));
    }
    Ok(())
}

fn fold_voltages(
    config: &TransformerVoltageConfig,
    pick: fn(Voltage, Voltage) -> Voltage,
) -> MapperResult<Voltage> {
    config
        .voltages
        .iter()
        .copied()
        .reduce(pick)
        .ok_or_else(|| {
            MapperError::MissingVoltageMapping(format!(
                "transformer {:?} lists no winding voltages",
                config.name
            ))
        })
}

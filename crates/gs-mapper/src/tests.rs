//! Unit tests for gs-mapper.

#[cfg(test)]
mod helpers {
    use gs_catalog::{
        Catalog, Equipment, LoadEquipment, MatrixImpedanceBranchEquipment, PhaseLoadEquipment,
        PhaseVoltageSourceEquipment, TransformerEquipment, VoltageSourceEquipment, VoltageType,
        WindingEquipment,
    };
    use gs_core::{
        ActivePower, Angle, ApparentPower, Current, Distance, GeoPoint, ReactivePower, Voltage,
    };
    use gs_graph::{AssetKind, BranchEquipmentKind, DistributionGraph, Edge, Node};

    use crate::{TransformerKind, TransformerPhaseConfig};

    /// The tiny split-phase feeder:
    ///
    /// ```text
    /// src ──xfmr_1── sec ──line_1── l1
    ///                 └───line_2─── l2
    /// ```
    pub fn tiny_feeder() -> DistributionGraph {
        let mut graph = DistributionGraph::new();
        graph
            .add_nodes([
                Node::with_assets(
                    "src",
                    GeoPoint::new(-97.33, 32.75),
                    &[AssetKind::VoltageSource],
                ),
                Node::new("sec", GeoPoint::new(-97.329, 32.749)),
                Node::with_assets("l1", GeoPoint::new(-97.328, 32.748), &[AssetKind::Load]),
                Node::with_assets("l2", GeoPoint::new(-97.327, 32.747), &[AssetKind::Load]),
            ])
            .unwrap();
        graph
            .add_edge("src", "sec", Edge::transformer("xfmr_1"))
            .unwrap();
        graph
            .add_edge(
                "sec",
                "l1",
                Edge::branch(
                    "line_1",
                    BranchEquipmentKind::MatrixImpedance,
                    Distance::meters(50.0),
                ),
            )
            .unwrap();
        graph
            .add_edge(
                "sec",
                "l2",
                Edge::branch(
                    "line_2",
                    BranchEquipmentKind::MatrixImpedance,
                    Distance::meters(75.0),
                ),
            )
            .unwrap();
        graph
    }

    /// A feeder with `n` transformers, each behind its own primary stub:
    ///
    /// ```text
    /// sub ──b_i── h_i ──t_i── s_i      (i = 1..=n)
    /// ```
    pub fn chain_feeder(n: usize) -> DistributionGraph {
        let mut graph = DistributionGraph::new();
        graph
            .add_node(Node::with_assets(
                "sub",
                GeoPoint::new(0.0, 0.0),
                &[AssetKind::VoltageSource],
            ))
            .unwrap();
        for i in 1..=n {
            let lon = i as f64 * 0.001;
            graph
                .add_node(Node::new(format!("h_{i}"), GeoPoint::new(lon, 0.001)))
                .unwrap();
            graph
                .add_node(Node::new(format!("s_{i}"), GeoPoint::new(lon, 0.002)))
                .unwrap();
            graph
                .add_edge(
                    "sub",
                    &format!("h_{i}"),
                    Edge::branch(
                        format!("b_{i}"),
                        BranchEquipmentKind::MatrixImpedance,
                        Distance::meters(100.0),
                    ),
                )
                .unwrap();
            graph
                .add_edge(&format!("h_{i}"), &format!("s_{i}"), Edge::transformer(format!("t_{i}")))
                .unwrap();
        }
        graph
    }

    pub fn phase_config(
        name: &str,
        kind: TransformerKind,
        kva: f64,
        location: GeoPoint,
    ) -> TransformerPhaseConfig {
        TransformerPhaseConfig {
            name: name.to_string(),
            kind,
            capacity: ApparentPower::kilovolt_amperes(kva),
            location,
        }
    }

    // ── Catalogue fixtures ────────────────────────────────────────────────

    pub fn split_phase_transformer(name: &str, kva: f64) -> TransformerEquipment {
        let winding = |kv: f64| WindingEquipment {
            num_phases: 1,
            rated_power: ApparentPower::kilovolt_amperes(kva),
            rated_voltage: Voltage::kilovolts(kv),
            voltage_type: VoltageType::LineToGround,
        };
        TransformerEquipment {
            name: name.to_string(),
            windings: vec![winding(7.2), winding(0.12), winding(0.12)],
            is_center_tapped: true,
        }
    }

    pub fn matrix_branch(name: &str, amps: f64) -> MatrixImpedanceBranchEquipment {
        MatrixImpedanceBranchEquipment {
            name: name.to_string(),
            r_matrix: vec![vec![0.4013, 0.0953], vec![0.0953, 0.4013]],
            x_matrix: vec![vec![0.2809, 0.0667], vec![0.0667, 0.2809]],
            c_matrix: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            ampacity: Current::amperes(amps),
        }
    }

    pub fn residential_load() -> LoadEquipment {
        LoadEquipment {
            name: "res_5kw".into(),
            phase_loads: vec![
                PhaseLoadEquipment::constant_power(
                    ActivePower::kilowatts(2.5),
                    ReactivePower::kilovars(0.5),
                ),
                PhaseLoadEquipment::constant_power(
                    ActivePower::kilowatts(2.5),
                    ReactivePower::kilovars(0.5),
                ),
            ],
        }
    }

    pub fn substation_source() -> VoltageSourceEquipment {
        VoltageSourceEquipment {
            name: "sub_src".into(),
            sources: vec![PhaseVoltageSourceEquipment {
                voltage: Voltage::kilovolts(7.2),
                angle: Angle::degrees(0.0),
                r1: 0.0,
                x1: 0.0001,
                r0: 0.0,
                x0: 0.0001,
            }],
        }
    }

    pub fn small_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add(Equipment::Transformer(split_phase_transformer("xfmr_25", 25.0)));
        catalog.add(Equipment::Transformer(split_phase_transformer("xfmr_50", 50.0)));
        catalog.add(Equipment::MatrixImpedanceBranch(matrix_branch("acsr_30", 30.0)));
        catalog.add(Equipment::MatrixImpedanceBranch(matrix_branch("acsr_100", 100.0)));
        catalog.add(Equipment::Load(residential_load()));
        catalog
    }
}

// ── Phase mapping ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod phase {
    use std::str::FromStr;

    use gs_core::{phase_set, split_secondary, three_phase, GeoPoint, Phase};
    use gs_graph::AssetKind;

    use crate::{
        AllocationMethod, BalancedPhaseMapper, MapperError, PhaseMapper, TransformerKind,
    };

    use super::helpers::{chain_feeder, phase_config, tiny_feeder};

    #[test]
    fn split_phase_assignment_and_propagation() {
        let graph = tiny_feeder();
        let configs = vec![phase_config(
            "xfmr_1",
            TransformerKind::SplitPhase,
            25.0,
            GeoPoint::new(-97.33, 32.75),
        )];
        let mapper =
            BalancedPhaseMapper::new(&graph, &configs, AllocationMethod::Greedy).unwrap();

        // Head keeps its single HT phase; tail is the center-tapped triple;
        // downstream loads inherit the hots without the neutral.
        assert_eq!(mapper.node_phases()["src"], phase_set(&[Phase::A]));
        assert_eq!(mapper.node_phases()["sec"], split_secondary());
        assert_eq!(mapper.node_phases()["l1"], phase_set(&[Phase::S1, Phase::S2]));
        assert_eq!(mapper.node_phases()["l2"], phase_set(&[Phase::S1, Phase::S2]));
        assert_eq!(mapper.transformer_phases()["xfmr_1"], phase_set(&[Phase::A]));
    }

    #[test]
    fn three_phase_transformer_gets_abc() {
        let graph = chain_feeder(1);
        let configs = vec![phase_config(
            "t_1",
            TransformerKind::ThreePhase,
            150.0,
            GeoPoint::new(0.001, 0.001),
        )];
        let mapper =
            BalancedPhaseMapper::new(&graph, &configs, AllocationMethod::Greedy).unwrap();

        assert_eq!(mapper.node_phases()["h_1"], three_phase());
        assert_eq!(mapper.node_phases()["s_1"], three_phase());
        assert_eq!(mapper.transformer_phases()["t_1"], three_phase());
        // Upward propagation reaches the substation.
        assert_eq!(mapper.node_phases()["sub"], three_phase());
    }

    #[test]
    fn greedy_balances_capacity_within_ten_kva() {
        let graph = chain_feeder(9);
        let capacities = [10.0, 10.0, 10.0, 20.0, 20.0, 20.0, 30.0, 30.0, 30.0];
        let configs: Vec<_> = capacities
            .iter()
            .enumerate()
            .map(|(i, &kva)| {
                phase_config(
                    &format!("t_{}", i + 1),
                    TransformerKind::SinglePhase,
                    kva,
                    GeoPoint::new(i as f64 * 0.001, 0.001),
                )
            })
            .collect();
        let mapper =
            BalancedPhaseMapper::new(&graph, &configs, AllocationMethod::Greedy).unwrap();

        // Sum allocated capacity per HT phase.
        let mut sums = std::collections::BTreeMap::new();
        for (i, config) in configs.iter().enumerate() {
            let phases = mapper.transformer_phases()[&config.name].clone();
            *sums.entry(phases).or_insert(0.0) += capacities[i];
        }
        assert_eq!(sums.len(), 3);
        let max = sums.values().cloned().fold(f64::MIN, f64::max);
        let min = sums.values().cloned().fold(f64::MAX, f64::min);
        assert!(max - min <= 10.0, "imbalance {max} - {min}");
    }

    #[test]
    fn upward_union_promotes_to_three_phase() {
        let graph = chain_feeder(3);
        let configs: Vec<_> = (1..=3)
            .map(|i| {
                phase_config(
                    &format!("t_{i}"),
                    TransformerKind::SinglePhase,
                    25.0,
                    GeoPoint::new(i as f64 * 0.001, 0.001),
                )
            })
            .collect();
        let mapper =
            BalancedPhaseMapper::new(&graph, &configs, AllocationMethod::Greedy).unwrap();

        // Three different single phases union at the substation; the
        // two-phase intermediate state promotes to the full set.
        assert_eq!(mapper.node_phases()["sub"], three_phase());

        // Monotonicity: every ancestor of a head covers the head's phases.
        let tree = graph.dfs_tree().unwrap();
        for i in 1..=3 {
            let head = format!("h_{i}");
            let head_phases = &mapper.node_phases()[&head];
            for ancestor in tree.ancestors(&head) {
                assert!(
                    head_phases.is_subset(&mapper.node_phases()[&ancestor]),
                    "ancestor {ancestor} misses phases of {head}"
                );
            }
        }
    }

    #[test]
    fn kmeans_and_agglomerative_spread_across_tuples() {
        for method in [AllocationMethod::KMeans, AllocationMethod::Agglomerative] {
            let graph = chain_feeder(3);
            let configs: Vec<_> = (1..=3)
                .map(|i| {
                    phase_config(
                        &format!("t_{i}"),
                        TransformerKind::SinglePhase,
                        25.0,
                        GeoPoint::new(i as f64 * 0.001, 0.001),
                    )
                })
                .collect();
            let mapper = BalancedPhaseMapper::new(&graph, &configs, method).unwrap();

            let tuples: std::collections::BTreeSet<_> = (1..=3)
                .map(|i| mapper.transformer_phases()[&format!("t_{i}")].clone())
                .collect();
            assert_eq!(tuples.len(), 3, "method {method:?} merged phase groups");
        }
    }

    #[test]
    fn delta_primary_gets_phase_pairs() {
        let graph = chain_feeder(3);
        let configs: Vec<_> = (1..=3)
            .map(|i| {
                phase_config(
                    &format!("t_{i}"),
                    TransformerKind::SinglePhasePrimaryDelta,
                    25.0,
                    GeoPoint::new(i as f64 * 0.001, 0.001),
                )
            })
            .collect();
        let mapper =
            BalancedPhaseMapper::new(&graph, &configs, AllocationMethod::Greedy).unwrap();

        for i in 1..=3 {
            let phases = &mapper.transformer_phases()[&format!("t_{i}")];
            assert_eq!(phases.len(), 2, "delta primary should get a phase pair");
            assert!(phases.iter().all(|p| matches!(p, Phase::A | Phase::B | Phase::C)));
        }
    }

    #[test]
    fn asset_phases_are_subsets_of_node_phases() {
        let graph = tiny_feeder();
        let configs = vec![phase_config(
            "xfmr_1",
            TransformerKind::SplitPhase,
            25.0,
            GeoPoint::new(-97.33, 32.75),
        )];
        let mapper =
            BalancedPhaseMapper::new(&graph, &configs, AllocationMethod::Greedy).unwrap();

        for (node, per_asset) in mapper.asset_phases() {
            for phases in per_asset.values() {
                assert!(phases.is_subset(&mapper.node_phases()[node]));
            }
        }
        // Loads carry their node's phases.
        assert_eq!(
            mapper.asset_phases()["l1"][&AssetKind::Load],
            phase_set(&[Phase::S1, Phase::S2])
        );
    }

    #[test]
    fn missing_config_is_fatal() {
        let graph = tiny_feeder();
        let result = BalancedPhaseMapper::new(&graph, &[], AllocationMethod::Greedy);
        assert!(matches!(
            result,
            Err(MapperError::MissingTransformerMapping(_))
        ));
    }

    #[test]
    fn unknown_config_is_fatal() {
        let graph = tiny_feeder();
        let configs = vec![
            super::helpers::phase_config(
                "xfmr_1",
                TransformerKind::SplitPhase,
                25.0,
                GeoPoint::new(0.0, 0.0),
            ),
            super::helpers::phase_config(
                "ghost",
                TransformerKind::SplitPhase,
                25.0,
                GeoPoint::new(0.0, 0.0),
            ),
        ];
        let result = BalancedPhaseMapper::new(&graph, &configs, AllocationMethod::Greedy);
        assert!(matches!(
            result,
            Err(MapperError::MissingTransformerMapping(_))
        ));
    }

    #[test]
    fn allocation_method_parsing() {
        assert_eq!(
            AllocationMethod::from_str("kmeans").unwrap(),
            AllocationMethod::KMeans
        );
        assert_eq!(
            AllocationMethod::from_str("greedy").unwrap(),
            AllocationMethod::Greedy
        );
        assert!(matches!(
            AllocationMethod::from_str("kmean"),
            Err(MapperError::InvalidPhaseAllocationMethod(_))
        ));
    }
}

// ── Voltage mapping ───────────────────────────────────────────────────────────

#[cfg(test)]
mod voltage {
    use gs_core::{GeoPoint, Voltage};
    use gs_graph::{AssetKind, DistributionGraph, Edge, Node};

    use crate::{MapperError, TransformerVoltageConfig, TransformerVoltageMapper, VoltageMapper};

    use super::helpers::tiny_feeder;

    fn volts(name: &str, voltages: &[Voltage]) -> TransformerVoltageConfig {
        TransformerVoltageConfig {
            name: name.to_string(),
            voltages: voltages.to_vec(),
        }
    }

    #[test]
    fn primary_up_secondary_down() {
        let graph = tiny_feeder();
        let mapper = TransformerVoltageMapper::new(
            &graph,
            &[volts(
                "xfmr_1",
                &[Voltage::kilovolts(7.2), Voltage::volts(120.0)],
            )],
        )
        .unwrap();

        assert_eq!(mapper.node_voltages()["src"], Voltage::kilovolts(7.2));
        assert_eq!(mapper.node_voltages()["sec"], Voltage::volts(120.0));
        assert_eq!(mapper.node_voltages()["l1"], Voltage::volts(120.0));
        assert_eq!(mapper.node_voltages()["l2"], Voltage::volts(120.0));
    }

    #[test]
    fn cascaded_transformers_merge_with_max_and_min() {
        // src ──x1── mid ──x2── leaf
        let mut graph = DistributionGraph::new();
        graph
            .add_nodes([
                Node::with_assets(
                    "src",
                    GeoPoint::new(0.0, 0.0),
                    &[AssetKind::VoltageSource],
                ),
                Node::new("mid", GeoPoint::new(0.001, 0.0)),
                Node::new("leaf", GeoPoint::new(0.002, 0.0)),
            ])
            .unwrap();
        graph.add_edge("src", "mid", Edge::transformer("x1")).unwrap();
        graph.add_edge("mid", "leaf", Edge::transformer("x2")).unwrap();

        let mapper = TransformerVoltageMapper::new(
            &graph,
            &[
                volts("x1", &[Voltage::kilovolts(7.2), Voltage::volts(480.0)]),
                volts("x2", &[Voltage::volts(480.0), Voltage::volts(120.0)]),
            ],
        )
        .unwrap();

        assert_eq!(mapper.node_voltages()["src"], Voltage::kilovolts(7.2));
        assert_eq!(mapper.node_voltages()["mid"], Voltage::volts(480.0));
        assert_eq!(mapper.node_voltages()["leaf"], Voltage::volts(120.0));
    }

    #[test]
    fn missing_transformer_voltage_is_fatal() {
        let graph = tiny_feeder();
        let result = TransformerVoltageMapper::new(&graph, &[]);
        assert!(matches!(result, Err(MapperError::MissingVoltageMapping(_))));
    }

    #[test]
    fn empty_winding_list_is_fatal() {
        let graph = tiny_feeder();
        let result = TransformerVoltageMapper::new(&graph, &[volts("xfmr_1", &[])]);
        assert!(matches!(result, Err(MapperError::MissingVoltageMapping(_))));
    }
}

// ── Equipment mapping ─────────────────────────────────────────────────────────

#[cfg(test)]
mod equipment {
    use gs_catalog::{Catalog, Equipment};
    use gs_core::{GeoPoint, Voltage};

    use crate::{
        uniform_asset_equipment, AllocationMethod, BalancedPhaseMapper, CatalogEquipmentMapper,
        EquipmentMapper, MapperError, TransformerKind, TransformerVoltageConfig,
        TransformerVoltageMapper,
    };

    use super::helpers::{
        phase_config, residential_load, small_catalog, split_phase_transformer,
        substation_source, tiny_feeder,
    };

    fn mappers(
        graph: &gs_graph::DistributionGraph,
    ) -> (BalancedPhaseMapper, TransformerVoltageMapper) {
        let phase = BalancedPhaseMapper::new(
            graph,
            &[phase_config(
                "xfmr_1",
                TransformerKind::SplitPhase,
                25.0,
                GeoPoint::new(-97.33, 32.75),
            )],
            AllocationMethod::Greedy,
        )
        .unwrap();
        let voltage = TransformerVoltageMapper::new(
            graph,
            &[TransformerVoltageConfig {
                name: "xfmr_1".into(),
                voltages: vec![Voltage::kilovolts(7.2), Voltage::volts(120.0)],
            }],
        )
        .unwrap();
        (phase, voltage)
    }

    #[test]
    fn selects_smallest_adequate_equipment() {
        let graph = tiny_feeder();
        let (phase, voltage) = mappers(&graph);
        let catalog = small_catalog();
        let assets = uniform_asset_equipment(&graph, &residential_load(), &substation_source());

        let mapper =
            CatalogEquipmentMapper::new(&graph, &catalog, &phase, &voltage, assets).unwrap();

        // Served load is ~10.2 kVA; the 25 kVA unit wins over the 50 kVA one.
        assert_eq!(mapper.edge_equipment()["xfmr_1"].name(), "xfmr_25");

        // Split-phase current ≈ 10.2 kVA / (2 · 0.12 kV) ≈ 42 A: the 30 A
        // conductor is out, the 100 A one is the smallest that carries it.
        // That it exceeds 30 A at all shows line_1 is sized for BOTH loads
        // below `sec`, not just its own.
        assert_eq!(mapper.edge_equipment()["line_1"].name(), "acsr_100");
        assert_eq!(mapper.edge_equipment()["line_2"].name(), "acsr_100");
    }

    #[test]
    fn no_candidate_is_fatal() {
        let graph = tiny_feeder();
        let (phase, voltage) = mappers(&graph);

        // Catalogue whose only transformer is too small for the served load.
        let mut catalog = Catalog::new();
        catalog.add(Equipment::Transformer(split_phase_transformer("tiny", 5.0)));
        catalog.add(Equipment::MatrixImpedanceBranch(super::helpers::matrix_branch(
            "acsr_100", 100.0,
        )));
        let assets = uniform_asset_equipment(&graph, &residential_load(), &substation_source());

        let result = CatalogEquipmentMapper::new(&graph, &catalog, &phase, &voltage, assets);
        assert!(matches!(result, Err(MapperError::EquipmentNotFound(_))));
    }

    #[test]
    fn transformer_voltage_window_is_enforced() {
        let graph = tiny_feeder();
        let (phase, voltage) = mappers(&graph);

        // Right capacity, wrong secondary voltage (480 V against a 120 V bus).
        let mut wrong = split_phase_transformer("wrong_lv", 25.0);
        for winding in wrong.windings.iter_mut().skip(1) {
            winding.rated_voltage = Voltage::volts(480.0);
        }
        let mut catalog = Catalog::new();
        catalog.add(Equipment::Transformer(wrong));
        catalog.add(Equipment::MatrixImpedanceBranch(super::helpers::matrix_branch(
            "acsr_100", 100.0,
        )));
        let assets = uniform_asset_equipment(&graph, &residential_load(), &substation_source());

        let result = CatalogEquipmentMapper::new(&graph, &catalog, &phase, &voltage, assets);
        assert!(matches!(result, Err(MapperError::EquipmentNotFound(_))));
    }

    #[test]
    fn wrong_equipment_on_load_node_is_fatal() {
        let graph = tiny_feeder();
        let (phase, voltage) = mappers(&graph);
        let catalog = small_catalog();

        let mut assets =
            uniform_asset_equipment(&graph, &residential_load(), &substation_source());
        // Sabotage: a voltage source where load equipment belongs.
        assets.get_mut("l1").unwrap().insert(
            gs_graph::AssetKind::Load,
            Equipment::VoltageSource(substation_source()),
        );

        let result = CatalogEquipmentMapper::new(&graph, &catalog, &phase, &voltage, assets);
        assert!(matches!(result, Err(MapperError::WrongEquipmentAssigned(_))));
    }

    #[test]
    fn uniform_assets_cover_loads_and_source() {
        let graph = tiny_feeder();
        let table = uniform_asset_equipment(&graph, &residential_load(), &substation_source());

        assert!(table["src"].contains_key(&gs_graph::AssetKind::VoltageSource));
        assert!(table["l1"].contains_key(&gs_graph::AssetKind::Load));
        assert!(table["l2"].contains_key(&gs_graph::AssetKind::Load));
        assert!(!table.contains_key("sec"));
    }
}

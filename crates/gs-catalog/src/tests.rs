//! Unit tests for gs-catalog.

#[cfg(test)]
mod helpers {
    use gs_core::{ActivePower, ApparentPower, Current, ReactivePower, Voltage};

    use crate::{
        Catalog, Equipment, LoadEquipment, MatrixImpedanceBranchEquipment,
        PhaseLoadEquipment, TransformerEquipment, VoltageType, WindingEquipment,
    };

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

    pub fn two_wire_matrix_branch(name: &str, amps: f64) -> MatrixImpedanceBranchEquipment {
        MatrixImpedanceBranchEquipment {
            name: name.to_string(),
            r_matrix: vec![vec![0.4013, 0.0953], vec![0.0953, 0.4013]],
            x_matrix: vec![vec![0.2809, 0.0667], vec![0.0667, 0.2809]],
            c_matrix: vec![vec![0.0, 0.0], vec![0.0, 0.0]],
            ampacity: Current::amperes(amps),
        }
    }

    pub fn residential_load(name: &str) -> LoadEquipment {
        LoadEquipment {
            name: name.to_string(),
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

    pub fn small_catalog() -> Catalog {
        let mut catalog = Catalog::new();
        catalog.add(Equipment::Transformer(split_phase_transformer("xfmr_25", 25.0)));
        catalog.add(Equipment::Transformer(split_phase_transformer("xfmr_50", 50.0)));
        catalog.add(Equipment::MatrixImpedanceBranch(two_wire_matrix_branch(
            "1/0_acsr", 200.0,
        )));
        catalog.add(Equipment::Load(residential_load("res_5kw")));
        catalog
    }
}

#[cfg(test)]
mod store {
    use crate::EquipmentKind;

    #[test]
    fn typed_iteration_with_predicates() {
        let catalog = super::helpers::small_catalog();

        assert_eq!(catalog.component_count(), 4);
        assert_eq!(catalog.transformers().count(), 2);

        // Client-side predicate: capacity above 30 kVA.
        let big: Vec<_> = catalog
            .transformers()
            .filter(|t| t.min_rated_power().as_kilovolt_amperes() > 30.0)
            .collect();
        assert_eq!(big.len(), 1);
        assert_eq!(big[0].name, "xfmr_50");
    }

    #[test]
    fn equipment_kind_tagging() {
        let catalog = super::helpers::small_catalog();
        let load = crate::Equipment::Load(catalog.loads().next().unwrap().clone());
        assert_eq!(load.kind(), EquipmentKind::Load);
        assert_eq!(load.name(), "res_5kw");
    }

    #[test]
    fn json_round_trip() {
        let catalog = super::helpers::small_catalog();
        let json = catalog.to_json().unwrap();
        let reloaded = crate::Catalog::from_json(&json).unwrap();
        assert_eq!(reloaded.component_count(), catalog.component_count());
        assert_eq!(reloaded.transformers().count(), 2);
        assert_eq!(reloaded.matrix_branches().count(), 1);
        assert_eq!(reloaded.loads().count(), 1);
    }
}

#[cfg(test)]
mod equipment {
    #[test]
    fn zip_apparent_power() {
        let load = super::helpers::residential_load("r");
        // Two phases of √(2.5² + 0.5²) kVA each.
        let expected = 2.0 * (2.5f64 * 2.5 + 0.5 * 0.5).sqrt();
        assert!((load.total_apparent_power().as_kilovolt_amperes() - expected).abs() < 1e-9);
    }

    #[test]
    fn min_rated_power_over_windings() {
        let tr = super::helpers::split_phase_transformer("t", 25.0);
        assert!((tr.min_rated_power().as_kilovolt_amperes() - 25.0).abs() < 1e-12);
    }

    #[test]
    fn geometry_max_ampacity() {
        use gs_core::Current;

        use crate::{ConductorEquipment, GeometryBranchEquipment};

        let geometry = GeometryBranchEquipment {
            name: "pole_top".into(),
            conductors: vec![
                ConductorEquipment {
                    name: "a".into(),
                    ampacity: Current::amperes(150.0),
                },
                ConductorEquipment {
                    name: "n".into(),
                    ampacity: Current::amperes(90.0),
                },
            ],
        };
        assert!((geometry.max_ampacity().as_amperes() - 150.0).abs() < 1e-12);
    }
}

//! Unit tests for gs-topo.
//!
//! All tests run against a stub road provider, so nothing touches the
//! network.  The fixture geography is a straight east-west road with two
//! load clusters sitting ~110 m north of it.

#[cfg(test)]
mod helpers {
    use gs_core::GeoPoint;
    use gs_spatial::{Group, SiteGraph};

    use crate::{RegionQuery, RoadProvider, TopoResult};

    /// Four road nodes in a line along the equator, 0.001° (~111 m) apart.
    pub struct StubRoads;

    impl RoadProvider for StubRoads {
        fn fetch_roads(&self, _query: &RegionQuery) -> TopoResult<SiteGraph> {
            let mut roads = SiteGraph::new();
            for i in 0..4 {
                roads.add_site(format!("r{i}"), GeoPoint::new(i as f64 * 0.001, 0.0))?;
            }
            for i in 0..3 {
                roads.add_link(&format!("r{i}"), &format!("r{}", i + 1))?;
            }
            Ok(roads.minimum_spanning_tree())
        }
    }

    /// Provider that finds no roads at all.
    pub struct NoRoads;

    impl RoadProvider for NoRoads {
        fn fetch_roads(&self, _query: &RegionQuery) -> TopoResult<SiteGraph> {
            Ok(SiteGraph::new())
        }
    }

    /// Two clusters of two service points each, north of the road.
    pub fn two_groups() -> Vec<Group> {
        vec![
            Group {
                center: GeoPoint::new(0.001, 0.001),
                points: vec![
                    GeoPoint::new(0.0009, 0.0008),
                    GeoPoint::new(0.0011, 0.0012),
                ],
            },
            Group {
                center: GeoPoint::new(0.003, 0.001),
                points: vec![
                    GeoPoint::new(0.0029, 0.0008),
                    GeoPoint::new(0.0031, 0.0012),
                ],
            },
        ]
    }

    pub fn source() -> GeoPoint {
        GeoPoint::new(0.0, 0.0)
    }
}

// ── Full PRSG synthesis ───────────────────────────────────────────────────────

#[cfg(test)]
mod prsg_build {
    use gs_graph::AssetKind;

    use crate::{Prsg, TopoError};

    #[test]
    fn synthesizes_rooted_feeder() {
        let mut builder = Prsg::with_provider(
            super::helpers::StubRoads,
            super::helpers::two_groups(),
            super::helpers::source(),
        );
        let graph = builder.build().unwrap();

        // The node nearest the source location carries the voltage source.
        assert_eq!(graph.vsource_node(), Some("r0"));

        // One transformer edge per group, named after the weld node, each
        // between the weld node and its `_ht` sibling.
        let transformers: Vec<_> = graph
            .get_edges()
            .filter(|(_, _, e)| e.is_transformer())
            .map(|(a, b, e)| (a.to_string(), b.to_string(), e.name.clone()))
            .collect();
        assert_eq!(transformers.len(), 2);
        for (a, b, name) in &transformers {
            let ht = format!("{name}_ht");
            assert!(
                (a == name && *b == ht) || (b == name && *a == ht),
                "transformer {name} connects {a} and {b}"
            );
        }

        // Kind/length invariant holds for every edge.
        for (_, _, edge) in graph.get_edges() {
            assert_eq!(edge.is_transformer(), edge.length.is_none());
        }

        // Every service point got a load node.
        let load_count = graph
            .get_nodes()
            .filter(|n| n.assets.contains(&AssetKind::Load))
            .count();
        assert_eq!(load_count, 4);
        assert_eq!(builder.point_node_mapping().len(), 4);

        // The DFS tree reaches the whole welded feeder.
        let tree = graph.dfs_tree().unwrap();
        assert_eq!(tree.node_count(), graph.node_count());
    }

    #[test]
    fn transformer_heads_sit_between_primary_and_secondary() {
        let mut builder = Prsg::with_provider(
            super::helpers::StubRoads,
            super::helpers::two_groups(),
            super::helpers::source(),
        );
        let graph = builder.build().unwrap();
        let tree = graph.dfs_tree().unwrap();

        for (a, b, edge) in graph.get_edges().filter(|(_, _, e)| e.is_transformer()) {
            // One endpoint is the DFS parent of the other; the parent side is
            // the `_ht` (primary) node.
            let head = if tree.has_edge(a, b) { a } else { b };
            assert!(head.ends_with("_ht"), "head {head} of {}", edge.name);
        }
    }

    #[test]
    fn empty_road_network_fails() {
        let mut builder = Prsg::with_provider(
            super::helpers::NoRoads,
            super::helpers::two_groups(),
            super::helpers::source(),
        );
        let result = builder.build();
        assert!(
            matches!(result, Err(TopoError::Spatial(_)) | Err(TopoError::EmptyGraph(_))),
            "expected an empty-graph failure"
        );
    }
}

// ── Secondary network shapes ──────────────────────────────────────────────────

#[cfg(test)]
mod secondary {
    use gs_core::GeoPoint;
    use gs_spatial::Group;

    use crate::{NetworkStrategy, PrsgStrategy};

    #[test]
    fn single_point_group_is_trivial() {
        let mut strategy = PrsgStrategy::new(super::helpers::StubRoads);
        let group = Group {
            center: GeoPoint::new(0.5, 0.5),
            points: vec![GeoPoint::new(0.5, 0.5)],
        };
        let graph = strategy.secondary(&group, 7).unwrap();
        assert_eq!(graph.site_count(), 1);
        assert_eq!(graph.link_count(), 0);
        assert!(graph.contains("sec7_center"));
    }

    #[test]
    fn tight_group_collapses_to_one_mesh_node() {
        let mut strategy = PrsgStrategy::new(super::helpers::StubRoads);
        // Points ~1 m apart: both snap to the same 50 m mesh node.
        let group = Group {
            center: GeoPoint::new(0.0, 0.0),
            points: vec![
                GeoPoint::new(0.0, 0.0),
                GeoPoint::new(0.00001, 0.00001),
            ],
        };
        let graph = strategy.secondary(&group, 0).unwrap();
        assert_eq!(graph.site_count(), 1);
        assert_eq!(graph.link_count(), 0);
    }

    #[test]
    fn spread_group_builds_connected_grid_tree() {
        let mut strategy = PrsgStrategy::new(super::helpers::StubRoads);
        let group = super::helpers::two_groups().swap_remove(0);
        let graph = strategy.secondary(&group, 0).unwrap();

        // A tree spanning at least the two snapped service nodes.
        assert!(graph.site_count() >= 2);
        assert_eq!(graph.link_count(), graph.site_count() - 1);
    }
}

// ── Transformer-node explosion on a hand-built graph ──────────────────────────

#[cfg(test)]
mod explosion {
    use gs_core::{Distance, GeoPoint};
    use gs_graph::{
        AssetKind, BranchEquipmentKind, DistributionGraph, Edge, Node,
    };

    use crate::explode_transformer_nodes;

    #[test]
    fn weld_node_becomes_transformer_edge() {
        // src ── t ── load, with `t` the virtual transformer node.
        let mut graph = DistributionGraph::new();
        graph
            .add_nodes([
                Node::with_assets(
                    "src",
                    GeoPoint::new(0.0, 0.0),
                    &[AssetKind::VoltageSource],
                ),
                Node::new("t", GeoPoint::new(0.001, 0.0)),
                Node::with_assets("load", GeoPoint::new(0.002, 0.0), &[AssetKind::Load]),
            ])
            .unwrap();
        graph
            .add_edge(
                "src",
                "t",
                Edge::branch(
                    "b0",
                    BranchEquipmentKind::MatrixImpedance,
                    Distance::meters(111.0),
                ),
            )
            .unwrap();
        graph
            .add_edge(
                "t",
                "load",
                Edge::branch(
                    "b1",
                    BranchEquipmentKind::MatrixImpedance,
                    Distance::meters(111.0),
                ),
            )
            .unwrap();

        explode_transformer_nodes(&mut graph, &["t".to_string()]).unwrap();

        // The parent edge b0 now lands on t_ht; t and t_ht are joined by a
        // zero-length transformer edge; the downstream edge is untouched.
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.get_edge("src", "t_ht").unwrap().name, "b0");
        let xfmr = graph.get_edge("t", "t_ht").unwrap();
        assert!(xfmr.is_transformer());
        assert_eq!(xfmr.length, None);
        assert_eq!(graph.get_edge("t", "load").unwrap().name, "b1");

        // t_ht sits at t's location.
        assert_eq!(
            graph.get_node("t_ht").unwrap().location,
            graph.get_node("t").unwrap().location
        );
    }
}

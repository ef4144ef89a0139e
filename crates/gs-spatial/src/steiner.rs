//! Steiner tree approximation (Mehlhorn's algorithm) with unit edge weights.
//!
//! The three classic stages:
//!
//! 1. **Voronoi partition** — multi-source Dijkstra from the terminals labels
//!    every node with its nearest terminal, distance, and predecessor.
//! 2. **Terminal quotient MST** — every graph edge crossing two Voronoi
//!    regions induces a candidate terminal-to-terminal connection of weight
//!    `d(t_u, u) + 1 + d(v, t_v)`; Kruskal over the cheapest candidates.
//! 3. **Expansion** — chosen quotient edges unfold into real paths; a final
//!    MST plus non-terminal leaf pruning removes expansion overlap.
//!
//! All tie-breaking is by node index, so results are deterministic for a
//! given graph snapshot.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap};

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;

use crate::site_graph::SiteGraph;
use crate::{SpatialError, SpatialResult};

/// Approximate Steiner tree over `graph` spanning `terminals`; returns the
/// tree's edges as node-index pairs of the input graph.
pub fn steiner_edges<N, E>(
    graph: &UnGraph<N, E>,
    terminals: &[NodeIndex],
) -> SpatialResult<Vec<(NodeIndex, NodeIndex)>> {
    // Dedup while keeping first-seen order.
    let mut seen = BTreeSet::new();
    let terminals: Vec<NodeIndex> = terminals
        .iter()
        .copied()
        .filter(|t| seen.insert(t.index()))
        .collect();

    if terminals.is_empty() {
        return Err(SpatialError::InvalidInput(
            "steiner tree needs at least one terminal".into(),
        ));
    }
    if terminals.len() == 1 {
        return Ok(Vec::new());
    }

    let n = graph.node_count();
    let (dist, home, pred) = voronoi_partition(graph, &terminals, n);

    // Candidate quotient edges: cheapest crossing edge per terminal pair.
    let mut quotient: BTreeMap<(usize, usize), (u32, NodeIndex, NodeIndex)> = BTreeMap::new();
    for edge in graph.edge_references() {
        let (u, v) = (edge.source(), edge.target());
        let (hu, hv) = (home[u.index()], home[v.index()]);
        if hu == usize::MAX || hv == usize::MAX || hu == hv {
            continue;
        }
        let weight = dist[u.index()] + 1 + dist[v.index()];
        let key = (hu.min(hv), hu.max(hv));
        let candidate = (weight, u.min(v), u.max(v));
        match quotient.get(&key) {
            Some(existing) if *existing <= candidate => {}
            _ => {
                quotient.insert(key, candidate);
            }
        }
    }

    // Kruskal over the terminal quotient graph.
    let mut candidates: Vec<((usize, usize), (u32, NodeIndex, NodeIndex))> =
        quotient.into_iter().collect();
    candidates.sort_by_key(|&((t1, t2), (w, _, _))| (w, t1, t2));

    let mut components = UnionFind::<usize>::new(terminals.len());
    let mut crossing_edges: Vec<(NodeIndex, NodeIndex)> = Vec::new();
    for ((t1, t2), (_, u, v)) in candidates {
        if components.union(t1, t2) {
            crossing_edges.push((u, v));
        }
    }

    let root = components.find(0);
    if (1..terminals.len()).any(|t| components.find(t) != root) {
        return Err(SpatialError::InvalidInput(
            "steiner terminals are not connected in the graph".into(),
        ));
    }

    // Expand quotient edges into real paths.
    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for (u, v) in crossing_edges {
        edges.insert(ordered(u.index(), v.index()));
        for endpoint in [u, v] {
            let mut cursor = endpoint;
            while let Some(parent) = pred[cursor.index()] {
                edges.insert(ordered(cursor.index(), parent.index()));
                cursor = parent;
            }
        }
    }

    // The expanded union may contain cycles; reduce to a spanning tree and
    // prune non-terminal leaves left behind by overlapping expansions.
    let tree = spanning_subset(n, &edges);
    let pruned = prune_leaves(tree, &terminals);

    Ok(pruned
        .into_iter()
        .map(|(a, b)| (NodeIndex::new(a), NodeIndex::new(b)))
        .collect())
}

/// Steiner tree over a [`SiteGraph`], returned as a site graph.  A single
/// terminal yields a graph containing just that site.
pub fn steiner_tree(graph: &SiteGraph, terminals: &[String]) -> SpatialResult<SiteGraph> {
    let indices = terminals
        .iter()
        .map(|name| graph.index_of(name))
        .collect::<SpatialResult<Vec<_>>>()?;

    let inner = graph.petgraph();
    let edges = steiner_edges(inner, &indices)?;

    let mut out = SiteGraph::new();
    if edges.is_empty() {
        // Degenerate single-terminal tree.
        let site = &inner[indices[0]];
        out.add_site(site.name.clone(), site.point)?;
        return Ok(out);
    }

    for &(a, b) in &edges {
        for idx in [a, b] {
            let site = &inner[idx];
            if !out.contains(&site.name) {
                out.add_site(site.name.clone(), site.point)?;
            }
        }
        out.add_link(&inner[a].name, &inner[b].name)?;
    }
    Ok(out)
}

// ── Internals ─────────────────────────────────────────────────────────────────

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    (a.min(b), a.max(b))
}

/// Multi-source Dijkstra with unit weights: per node, the hop distance to the
/// nearest terminal, that terminal's ordinal, and the predecessor on the path
/// back to it.
fn voronoi_partition<N, E>(
    graph: &UnGraph<N, E>,
    terminals: &[NodeIndex],
    n: usize,
) -> (Vec<u32>, Vec<usize>, Vec<Option<NodeIndex>>) {
    let mut dist = vec![u32::MAX; n];
    let mut home = vec![usize::MAX; n];
    let mut pred: Vec<Option<NodeIndex>> = vec![None; n];

    // Min-heap keyed by (distance, node index) for deterministic expansion.
    let mut heap: BinaryHeap<Reverse<(u32, usize)>> = BinaryHeap::new();
    for (ordinal, &t) in terminals.iter().enumerate() {
        dist[t.index()] = 0;
        home[t.index()] = ordinal;
        heap.push(Reverse((0, t.index())));
    }

    while let Some(Reverse((cost, node))) = heap.pop() {
        if cost > dist[node] {
            continue; // stale entry
        }
        let node_idx = NodeIndex::new(node);
        for neighbor in graph.neighbors(node_idx) {
            let next = cost + 1;
            if next < dist[neighbor.index()] {
                dist[neighbor.index()] = next;
                home[neighbor.index()] = home[node];
                pred[neighbor.index()] = Some(node_idx);
                heap.push(Reverse((next, neighbor.index())));
            }
        }
    }

    (dist, home, pred)
}

/// Kruskal over unit-weight edges: keeps a spanning subset (forest) of the
/// given edge set, dropping cycle-closing edges in index order.
fn spanning_subset(n: usize, edges: &BTreeSet<(usize, usize)>) -> Vec<(usize, usize)> {
    let mut components = UnionFind::<usize>::new(n);
    edges
        .iter()
        .copied()
        .filter(|&(a, b)| components.union(a, b))
        .collect()
}

/// Iteratively strip degree-1 nodes that are not terminals.
fn prune_leaves(
    mut edges: Vec<(usize, usize)>,
    terminals: &[NodeIndex],
) -> Vec<(usize, usize)> {
    let terminal_set: BTreeSet<usize> = terminals.iter().map(|t| t.index()).collect();

    loop {
        let mut degree: FxHashMap<usize, usize> = FxHashMap::default();
        for &(a, b) in &edges {
            *degree.entry(a).or_default() += 1;
            *degree.entry(b).or_default() += 1;
        }
        let before = edges.len();
        edges.retain(|&(a, b)| {
            let leaf_a = degree[&a] == 1 && !terminal_set.contains(&a);
            let leaf_b = degree[&b] == 1 && !terminal_set.contains(&b);
            !leaf_a && !leaf_b
        });
        if edges.len() == before {
            return edges;
        }
    }
}

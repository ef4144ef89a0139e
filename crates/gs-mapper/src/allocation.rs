//! Allocation policies for spreading single-phase transformers across phase
//! groups, and the graph-distance matrix feeding the agglomerative policy.

use petgraph::algo::floyd_warshall;
use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::FxHashMap;

use gs_graph::{DistributionGraph, GraphError};
use gs_spatial::steiner_edges;

use crate::{MapperError, MapperResult};

/// Greedy balanced allocation: heaviest first, each onto the group with the
/// smallest running total (first such group on ties).
pub(crate) fn greedy_allocations(
    weights: &[(String, f64)],
    num_categories: usize,
) -> Vec<Vec<String>> {
    let mut sorted: Vec<&(String, f64)> = weights.iter().collect();
    sorted.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut allocations: Vec<Vec<String>> = vec![Vec::new(); num_categories];
    let mut sums = vec![0.0f64; num_categories];
    for (name, weight) in sorted {
        let lightest = sums
            .iter()
            .enumerate()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0);
        sums[lightest] += weight;
        allocations[lightest].push(name.clone());
    }
    allocations
}

/// Bucket `names` by their cluster labels.
pub(crate) fn allocations_from_labels(
    names: &[String],
    labels: &[usize],
    num_categories: usize,
) -> Vec<Vec<String>> {
    let mut allocations: Vec<Vec<String>> = vec![Vec::new(); num_categories];
    for (name, &label) in names.iter().zip(labels) {
        allocations[label].push(name.clone());
    }
    allocations
}

/// All-pairs hop-distance matrix between `terminals`, computed with
/// Floyd–Warshall over the Steiner tree that connects them in `graph`.
///
/// Row/column order follows `terminals`; the rows serve as feature vectors
/// for Ward clustering, so electrically close transformers land in the same
/// phase group.
pub(crate) fn graph_distance_matrix(
    graph: &DistributionGraph,
    terminals: &[String],
) -> MapperResult<Vec<Vec<f64>>> {
    // Rebuild the connectivity as a bare petgraph through the public
    // iteration surface.
    let mut skeleton: UnGraph<String, ()> = UnGraph::new_undirected();
    let mut indices: FxHashMap<String, NodeIndex> = FxHashMap::default();
    for node in graph.get_nodes() {
        indices.insert(node.name.clone(), skeleton.add_node(node.name.clone()));
    }
    for (from, to, _) in graph.get_edges() {
        skeleton.add_edge(indices[from], indices[to], ());
    }

    let terminal_indices = terminals
        .iter()
        .map(|name| {
            indices
                .get(name)
                .copied()
                .ok_or_else(|| GraphError::NodeDoesNotExist(name.clone()).into())
        })
        .collect::<MapperResult<Vec<_>>>()?;

    let tree_edges = steiner_edges(&skeleton, &terminal_indices)?;

    // Induced Steiner subtree; hop distances within it are the features.
    let mut subtree: UnGraph<(), ()> = UnGraph::new_undirected();
    let mut sub_indices: FxHashMap<NodeIndex, NodeIndex> = FxHashMap::default();
    let mut sub_index_of = |g: &mut UnGraph<(), ()>, idx: NodeIndex| {
        *sub_indices.entry(idx).or_insert_with(|| g.add_node(()))
    };
    for (a, b) in tree_edges {
        let sa = sub_index_of(&mut subtree, a);
        let sb = sub_index_of(&mut subtree, b);
        subtree.add_edge(sa, sb, ());
    }
    // A single-terminal steiner tree has no edges; register the terminal
    // itself so the matrix still has a row.
    for &t in &terminal_indices {
        sub_index_of(&mut subtree, t);
    }

    let distances = floyd_warshall(&subtree, |_| 1.0f64)
        .map_err(|_| MapperError::AllocationMapping("negative cycle in hop distances".into()))?;

    let matrix = terminal_indices
        .iter()
        .map(|&row| {
            terminal_indices
                .iter()
                .map(|&col| distances[&(sub_indices[&row], sub_indices[&col])])
                .collect()
        })
        .collect();
    Ok(matrix)
}

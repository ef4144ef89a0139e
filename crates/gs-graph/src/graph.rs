//! The distribution graph: an undirected, attributed graph with a
//! distinguished voltage-source node.
//!
//! Storage is a petgraph `UnGraph` with node payloads of [`Node`] and edge
//! payloads of [`Edge`]; a name → index map gives O(1) lookup.  The container
//! itself is never exposed — iteration goes through typed getters, and the
//! rooted view is a separate [`DfsTree`] snapshot.

use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::model::{AssetKind, Edge, Node};
use crate::{GraphError, GraphResult};

/// Undirected attributed feeder graph.
#[derive(Debug, Clone, Default)]
pub struct DistributionGraph {
    graph: UnGraph<Node, Edge>,
    names: FxHashMap<String, NodeIndex>,
    edge_names: FxHashSet<String>,
    vsource: Option<String>,
}

impl DistributionGraph {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn has_node(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// Name of the voltage-source node, if one has been added.
    pub fn vsource_node(&self) -> Option<&str> {
        self.vsource.as_deref()
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    /// Add a node.  At most one node in the graph may carry the
    /// `VoltageSource` asset; it becomes the DFS root.
    pub fn add_node(&mut self, node: Node) -> GraphResult<()> {
        if self.names.contains_key(&node.name) {
            return Err(GraphError::NodeAlreadyExists(node.name));
        }
        if node.assets.contains(&AssetKind::VoltageSource) {
            if let Some(existing) = &self.vsource {
                return Err(GraphError::VsourceAlreadyExists {
                    existing: existing.clone(),
                    new: node.name,
                });
            }
            self.vsource = Some(node.name.clone());
        }
        let name = node.name.clone();
        let idx = self.graph.add_node(node);
        self.names.insert(name, idx);
        Ok(())
    }

    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = Node>) -> GraphResult<()> {
        for node in nodes {
            self.add_node(node)?;
        }
        Ok(())
    }

    pub fn get_node(&self, name: &str) -> GraphResult<&Node> {
        self.index_of(name).map(|i| &self.graph[i])
    }

    /// Iterator over all nodes; ordering is unspecified but stable within a
    /// snapshot.  Filter with standard iterator adapters.
    pub fn get_nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Remove a node and its incident edges.  Removing the voltage-source
    /// node clears the root.
    pub fn remove_node(&mut self, name: &str) -> GraphResult<Node> {
        let idx = self.index_of(name)?;

        let incident: Vec<String> = self
            .graph
            .edges(idx)
            .map(|e| e.weight().name.clone())
            .collect();
        for edge_name in incident {
            self.edge_names.remove(&edge_name);
        }

        self.names.remove(name);
        if self.vsource.as_deref() == Some(name) {
            self.vsource = None;
        }

        let removed = self
            .graph
            .remove_node(idx)
            .ok_or_else(|| GraphError::NodeDoesNotExist(name.to_string()))?;

        // petgraph swaps the last node into the vacated index; re-point it.
        if let Some(moved) = self.graph.node_weight(idx) {
            self.names.insert(moved.name.clone(), idx);
        }
        Ok(removed)
    }

    // ── Edges ─────────────────────────────────────────────────────────────

    /// Add an edge between two existing nodes.  Both the `(from, to)` pair
    /// and the edge name must be new.
    pub fn add_edge(&mut self, from: &str, to: &str, edge: Edge) -> GraphResult<()> {
        let ia = self.index_of(from)?;
        let ib = self.index_of(to)?;
        if self.graph.find_edge(ia, ib).is_some() {
            return Err(GraphError::EdgeAlreadyExists(format!(
                "between {from:?} and {to:?}"
            )));
        }
        if self.edge_names.contains(&edge.name) {
            return Err(GraphError::EdgeAlreadyExists(format!(
                "named {:?}",
                edge.name
            )));
        }
        self.edge_names.insert(edge.name.clone());
        self.graph.add_edge(ia, ib, edge);
        Ok(())
    }

    /// Add an edge, first adding either endpoint that is not yet present.
    pub fn add_edge_with_nodes(&mut self, from: Node, to: Node, edge: Edge) -> GraphResult<()> {
        let from_name = from.name.clone();
        let to_name = to.name.clone();
        if !self.has_node(&from_name) {
            self.add_node(from)?;
        }
        if !self.has_node(&to_name) {
            self.add_node(to)?;
        }
        self.add_edge(&from_name, &to_name, edge)
    }

    pub fn get_edge(&self, from: &str, to: &str) -> GraphResult<&Edge> {
        let ia = self.index_of(from)?;
        let ib = self.index_of(to)?;
        self.graph
            .find_edge(ia, ib)
            .and_then(|e| self.graph.edge_weight(e))
            .ok_or_else(|| GraphError::EdgeDoesNotExist {
                from: from.to_string(),
                to: to.to_string(),
            })
    }

    /// Iterator over all edges as `(from_name, to_name, edge)`; ordering is
    /// unspecified but stable within a snapshot.
    pub fn get_edges(&self) -> impl Iterator<Item = (&str, &str, &Edge)> {
        self.graph.edge_references().map(|e| {
            (
                self.graph[e.source()].name.as_str(),
                self.graph[e.target()].name.as_str(),
                e.weight(),
            )
        })
    }

    pub fn remove_edge(&mut self, from: &str, to: &str) -> GraphResult<Edge> {
        let ia = self.index_of(from)?;
        let ib = self.index_of(to)?;
        let edge_idx = self
            .graph
            .find_edge(ia, ib)
            .ok_or_else(|| GraphError::EdgeDoesNotExist {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        let edge = self
            .graph
            .remove_edge(edge_idx)
            .ok_or_else(|| GraphError::EdgeDoesNotExist {
                from: from.to_string(),
                to: to.to_string(),
            })?;
        self.edge_names.remove(&edge.name);
        Ok(edge)
    }

    // ── Rooted view ───────────────────────────────────────────────────────

    /// Directed DFS tree rooted at the voltage-source node, covering exactly
    /// the source's connected component.
    pub fn dfs_tree(&self) -> GraphResult<DfsTree> {
        let root = self
            .vsource
            .clone()
            .ok_or(GraphError::VsourceDoesNotExist)?;
        let root_idx = self.index_of(&root)?;

        let mut parent: FxHashMap<String, String> = FxHashMap::default();
        let mut children: FxHashMap<String, Vec<String>> = FxHashMap::default();
        let mut order: Vec<String> = Vec::with_capacity(self.graph.node_count());

        let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
        let mut stack = vec![root_idx];
        visited.insert(root_idx);
        while let Some(idx) = stack.pop() {
            let name = self.graph[idx].name.clone();
            order.push(name.clone());
            for neighbor in self.graph.neighbors(idx) {
                if visited.insert(neighbor) {
                    let child = self.graph[neighbor].name.clone();
                    parent.insert(child.clone(), name.clone());
                    children.entry(name.clone()).or_default().push(child);
                    stack.push(neighbor);
                }
            }
        }

        Ok(DfsTree {
            root,
            parent,
            children,
            order,
        })
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn index_of(&self, name: &str) -> GraphResult<NodeIndex> {
        self.names
            .get(name)
            .copied()
            .ok_or_else(|| GraphError::NodeDoesNotExist(name.to_string()))
    }
}

// ── DfsTree ───────────────────────────────────────────────────────────────────

/// Directed tree snapshot produced by [`DistributionGraph::dfs_tree`].
///
/// Holds parent/child maps keyed by node name; all queries are by name.  The
/// snapshot does not track later graph mutations.
#[derive(Debug, Clone)]
pub struct DfsTree {
    root: String,
    parent: FxHashMap<String, String>,
    children: FxHashMap<String, Vec<String>>,
    order: Vec<String>,
}

impl DfsTree {
    pub fn root(&self) -> &str {
        &self.root
    }

    /// `true` if `name` is in the root's connected component.
    pub fn contains(&self, name: &str) -> bool {
        name == self.root || self.parent.contains_key(name)
    }

    /// Number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Nodes in DFS discovery order, root first.
    pub fn dfs_order(&self) -> &[String] {
        &self.order
    }

    pub fn parent(&self, name: &str) -> Option<&str> {
        self.parent.get(name).map(String::as_str)
    }

    /// Depth-1 successors of `name` in the tree.
    pub fn children(&self, name: &str) -> &[String] {
        self.children.get(name).map_or(&[], Vec::as_slice)
    }

    /// `true` if the tree contains the directed edge `from → to`.
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.parent.get(to).map(String::as_str) == Some(from)
    }

    /// Strict ancestors of `name`, nearest first, ending at the root.
    pub fn ancestors(&self, name: &str) -> Vec<String> {
        let mut chain = Vec::new();
        let mut cursor = name;
        while let Some(p) = self.parent(cursor) {
            chain.push(p.to_string());
            cursor = p;
        }
        chain
    }

    /// Path from the root to `name` inclusive; empty if `name` is not in the
    /// tree.
    pub fn path_from_root(&self, name: &str) -> Vec<String> {
        if !self.contains(name) {
            return Vec::new();
        }
        let mut path = self.ancestors(name);
        path.reverse();
        path.push(name.to_string());
        path
    }

    /// Strict descendants of `name` in preorder.
    pub fn descendants(&self, name: &str) -> Vec<String> {
        let mut result = Vec::new();
        let mut stack: Vec<&str> = self.children(name).iter().map(String::as_str).collect();
        while let Some(next) = stack.pop() {
            result.push(next.to_string());
            stack.extend(self.children(next).iter().map(String::as_str));
        }
        result
    }
}

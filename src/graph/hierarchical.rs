//! `HierarchicalGraph`: the read-only view analytics algorithms traverse
//! (spec §3/§4's component D).

use super::{EdgeRecord, EdgeType, Graph};
use petgraph::graph::NodeIndex;

/// A pure view over a frozen [`Graph`]: node set, out/in-neighbors, and an
/// edge-type filter. Carries `built_at_millis` so analytics caches keyed on
/// it are invalidated whenever the underlying graph is rebuilt (spec §3,
/// §9 "LRU cache key").
#[derive(Debug, Clone, Copy)]
pub struct HierarchicalGraph<'g> {
    graph: &'g Graph,
}

impl<'g> HierarchicalGraph<'g> {
    /// Wraps a frozen graph. Analytics built from a graph that hasn't been
    /// frozen yet would see a view that can change out from under it, so
    /// callers should always freeze first; we don't hard-fail here since
    /// spec §4's data flow already enforces `Freeze()` before wrapping.
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    pub fn built_at_millis(&self) -> u64 {
        self.graph.built_at_millis()
    }

    pub fn graph(&self) -> &'g Graph {
        self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + 'g {
        self.graph.inner().node_indices()
    }

    pub fn out_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.graph.out_edges_of(node).into_iter().map(|(n, _)| n).collect()
    }

    pub fn in_neighbors(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.graph.in_edges_of(node).into_iter().map(|(n, _)| n).collect()
    }

    /// Out-edges of `node` filtered to a single [`EdgeType`].
    pub fn out_neighbors_of_type(&self, node: NodeIndex, edge_type: EdgeType) -> Vec<NodeIndex> {
        self.graph
            .out_edges_of(node)
            .into_iter()
            .filter(|(_, rec)| rec.edge_type == edge_type)
            .map(|(n, _)| n)
            .collect()
    }

    pub fn in_neighbors_of_type(&self, node: NodeIndex, edge_type: EdgeType) -> Vec<NodeIndex> {
        self.graph
            .in_edges_of(node)
            .into_iter()
            .filter(|(_, rec)| rec.edge_type == edge_type)
            .map(|(n, _)| n)
            .collect()
    }

    /// All edges whose record matches `edge_type`, as `(from, to)` pairs.
    pub fn edges_of_type(&self, edge_type: EdgeType) -> Vec<(NodeIndex, NodeIndex)> {
        self.graph
            .edges()
            .filter(|(_, _, rec): &(NodeIndex, NodeIndex, &EdgeRecord)| rec.edge_type == edge_type)
            .map(|(from, to, _)| (from, to))
            .collect()
    }

    pub fn in_degree(&self, node: NodeIndex) -> usize {
        self.graph.in_edges_of(node).len()
    }

    pub fn out_degree(&self, node: NodeIndex) -> usize {
        self.graph.out_edges_of(node).len()
    }
}

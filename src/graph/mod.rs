//! The frozen symbol/edge graph (spec §3/§4.1).
//!
//! Storage is arena-like: `petgraph::graph::DiGraph` already stores nodes
//! and edges in contiguous vectors addressed by integer handles
//! (`NodeIndex`/`EdgeIndex`) — exactly the shape spec §5 asks for ("the
//! public id-keyed maps hold handles, not pointers"). This mirrors the
//! teacher's `type Cfg = DiGraph<BasicBlock, EdgeType>` one level up: one
//! graph per codebase instead of one per function.

pub mod hierarchical;
pub mod index;

pub use hierarchical::HierarchicalGraph;
pub use index::SymbolIndex;

use crate::error::GraphError;
use crate::symbol::Symbol;
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source location of an edge (the call site, import statement, etc).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
}

/// Directed edge classification (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Calls,
    Implements,
    References,
    Contains,
    Imports,
    Extends,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Calls => "calls",
            EdgeType::Implements => "implements",
            EdgeType::References => "references",
            EdgeType::Contains => "contains",
            EdgeType::Imports => "imports",
            EdgeType::Extends => "extends",
        }
    }
}

/// Edge payload stored in the graph: classification plus source location.
/// Multiple edges between the same pair of nodes are permitted as long as
/// they differ by `(edge_type, location)` (spec §3 multi-edge rule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub edge_type: EdgeType,
    pub location: Location,
}

/// Lifecycle state of a [`Graph`]. Freezing is one-way (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GraphState {
    Building,
    Frozen { built_at_millis: u64 },
}

/// The bulk-built, then read-only, directed multi-edge graph of symbols.
///
/// `Graph` exclusively owns every [`Symbol`] (spec §3 "Lifecycle &
/// ownership"). Once [`Graph::freeze`] has been called, every read method
/// is safe to call concurrently from any number of threads with no
/// locking: the underlying `petgraph` storage is never mutated again, and
/// `freeze` itself publishes a memory barrier via `&mut self -> ()` before
/// the `Graph` is shared out from behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Graph {
    root_path: String,
    inner: DiGraph<Symbol, EdgeRecord>,
    by_id: HashMap<String, NodeIndex>,
    state: GraphState,
}

impl Graph {
    /// Creates a new, mutable graph rooted at `root_path`.
    pub fn new(root_path: impl Into<String>) -> Self {
        Self {
            root_path: root_path.into(),
            inner: DiGraph::new(),
            by_id: HashMap::new(),
            state: GraphState::Building,
        }
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    pub fn is_frozen(&self) -> bool {
        matches!(self.state, GraphState::Frozen { .. })
    }

    /// Epoch milliseconds at the moment `freeze()` was called. `0` before
    /// freezing (callers should treat a pre-freeze graph as cache-invalid
    /// regardless).
    pub fn built_at_millis(&self) -> u64 {
        match self.state {
            GraphState::Frozen { built_at_millis } => built_at_millis,
            GraphState::Building => 0,
        }
    }

    /// Inserts or overwrites a node keyed by `symbol.id` (idempotent by id,
    /// "first wins" is *not* used here: a second `add_node` with the same
    /// id overwrites the symbol's payload while keeping its edges and
    /// `NodeIndex`, which is the simpler of the two documented-acceptable
    /// conventions in spec §4.1).
    ///
    /// Returns `Err(GraphError::Frozen)` once the graph has been frozen.
    pub fn add_node(&mut self, symbol: Symbol) -> Result<NodeIndex, GraphError> {
        if self.is_frozen() {
            return Err(GraphError::Frozen);
        }
        if let Some(&idx) = self.by_id.get(&symbol.id) {
            self.inner[idx] = symbol;
            return Ok(idx);
        }
        let id = symbol.id.clone();
        let idx = self.inner.add_node(symbol);
        self.by_id.insert(id, idx);
        Ok(idx)
    }

    /// Adds a directed edge. Both endpoints must already be nodes (spec
    /// §4.1: `UnknownEndpoint` otherwise). Self-loops are permitted.
    pub fn add_edge(
        &mut self,
        from_id: &str,
        to_id: &str,
        edge_type: EdgeType,
        location: Location,
    ) -> Result<EdgeIndex, GraphError> {
        if self.is_frozen() {
            return Err(GraphError::Frozen);
        }
        let from = *self
            .by_id
            .get(from_id)
            .ok_or_else(|| GraphError::UnknownEndpoint(from_id.to_string()))?;
        let to = *self
            .by_id
            .get(to_id)
            .ok_or_else(|| GraphError::UnknownEndpoint(to_id.to_string()))?;
        Ok(self.inner.add_edge(from, to, EdgeRecord { edge_type, location }))
    }

    /// Transitions the graph to frozen. Idempotent: freezing twice keeps
    /// the original `built_at_millis`.
    pub fn freeze(&mut self) {
        if !self.is_frozen() {
            let built_at_millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            self.state = GraphState::Frozen { built_at_millis };
        }
    }

    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Resolves a stable symbol id to its node handle.
    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    pub fn get_node(&self, id: &str) -> Option<&Symbol> {
        self.node_index(id).map(|idx| &self.inner[idx])
    }

    pub fn symbol_at(&self, idx: NodeIndex) -> &Symbol {
        &self.inner[idx]
    }

    pub fn id_at(&self, idx: NodeIndex) -> &str {
        &self.inner[idx].id
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &Symbol)> {
        self.inner.node_indices().map(move |idx| (idx, &self.inner[idx]))
    }

    /// All edges as `(from, to, record)` triples.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &EdgeRecord)> {
        use petgraph::visit::EdgeRef;
        self.inner
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    /// Outgoing edges of `id`, or an empty vec if `id` is unknown.
    pub fn out_edges(&self, id: &str) -> Vec<(NodeIndex, &EdgeRecord)> {
        match self.node_index(id) {
            Some(idx) => self.out_edges_of(idx),
            None => Vec::new(),
        }
    }

    pub fn out_edges_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &EdgeRecord)> {
        use petgraph::visit::EdgeRef;
        self.inner
            .edges_directed(idx, petgraph::Direction::Outgoing)
            .map(|e| (e.target(), e.weight()))
            .collect()
    }

    /// Incoming edges of `id`, or an empty vec if `id` is unknown.
    pub fn in_edges(&self, id: &str) -> Vec<(NodeIndex, &EdgeRecord)> {
        match self.node_index(id) {
            Some(idx) => self.in_edges_of(idx),
            None => Vec::new(),
        }
    }

    pub fn in_edges_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &EdgeRecord)> {
        use petgraph::visit::EdgeRef;
        self.inner
            .edges_directed(idx, petgraph::Direction::Incoming)
            .map(|e| (e.source(), e.weight()))
            .collect()
    }

    /// Direct access to the underlying `petgraph` storage, for analytics
    /// algorithms that need to run library algorithms (dominators, Tarjan
    /// SCC) directly against it.
    pub(crate) fn inner(&self) -> &DiGraph<Symbol, EdgeRecord> {
        &self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(id: &str, name: &str) -> Symbol {
        Symbol {
            id: id.to_string(),
            name: name.to_string(),
            kind: crate::symbol::SymbolKind::Function,
            file_path: "main.go".to_string(),
            start_line: 1,
            end_line: 2,
            package: "main".to_string(),
            signature: None,
            exported: true,
            language: "go".to_string(),
        }
    }

    #[test]
    fn add_edge_requires_existing_endpoints() {
        let mut g = Graph::new("/repo");
        g.add_node(sym("a", "a")).unwrap();
        let err = g
            .add_edge("a", "missing", EdgeType::Calls, Location { file: "x".into(), line: 1 })
            .unwrap_err();
        assert_eq!(err, GraphError::UnknownEndpoint("missing".to_string()));
    }

    #[test]
    fn mutation_after_freeze_fails() {
        let mut g = Graph::new("/repo");
        g.add_node(sym("a", "a")).unwrap();
        g.freeze();
        assert!(g.is_frozen());
        assert_eq!(g.add_node(sym("b", "b")).unwrap_err(), GraphError::Frozen);
        assert_eq!(
            g.add_edge("a", "a", EdgeType::Calls, Location { file: "x".into(), line: 1 })
                .unwrap_err(),
            GraphError::Frozen
        );
    }

    #[test]
    fn built_at_millis_is_zero_before_freeze_and_set_after() {
        let mut g = Graph::new("/repo");
        assert_eq!(g.built_at_millis(), 0);
        g.freeze();
        assert!(g.built_at_millis() > 0);
    }

    #[test]
    fn self_loops_are_permitted() {
        let mut g = Graph::new("/repo");
        g.add_node(sym("a", "a")).unwrap();
        g.add_edge("a", "a", EdgeType::Calls, Location { file: "x".into(), line: 1 })
            .unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn multi_edges_with_distinct_locations_are_permitted() {
        let mut g = Graph::new("/repo");
        g.add_node(sym("a", "a")).unwrap();
        g.add_node(sym("b", "b")).unwrap();
        g.add_edge("a", "b", EdgeType::Calls, Location { file: "x".into(), line: 1 })
            .unwrap();
        g.add_edge("a", "b", EdgeType::Calls, Location { file: "x".into(), line: 2 })
            .unwrap();
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn add_node_twice_overwrites_payload_but_keeps_handle() {
        let mut g = Graph::new("/repo");
        let idx1 = g.add_node(sym("a", "a")).unwrap();
        let mut updated = sym("a", "a");
        updated.exported = false;
        let idx2 = g.add_node(updated).unwrap();
        assert_eq!(idx1, idx2);
        assert!(!g.get_node("a").unwrap().exported);
    }

    #[test]
    fn every_edge_endpoint_resolves_to_a_node_invariant() {
        let mut g = Graph::new("/repo");
        g.add_node(sym("a", "a")).unwrap();
        g.add_node(sym("b", "b")).unwrap();
        g.add_edge("a", "b", EdgeType::Calls, Location { file: "x".into(), line: 1 })
            .unwrap();
        g.freeze();

        let node_ids: std::collections::HashSet<_> =
            g.nodes().map(|(_, s)| s.id.clone()).collect();
        for (from, to, _) in g.edges() {
            assert!(node_ids.contains(g.id_at(from)));
            assert!(node_ids.contains(g.id_at(to)));
        }
    }
}

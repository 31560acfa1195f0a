//! Dominator tree construction (spec §3/§4.4), generalized from the
//! teacher's per-function `DominatorTree` to a whole-program symbol graph.
//!
//! Entry detection order (spec §4.4): explicit argument -> symbol named
//! `main` -> symbol with zero incoming `Calls` edges of highest
//! out-degree. `NoEntryPoint` if still ambiguous.

use crate::error::AnalyticsError;
use crate::graph::{EdgeType, HierarchicalGraph};
use petgraph::algo::dominators::simple_fast;
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// A dominator tree rooted at a detected (or supplied) entry node.
///
/// Lifetime tied to the `HierarchicalGraph` snapshot it was computed from
/// (spec §3).
#[derive(Debug, Clone)]
pub struct DominatorTree {
    root: NodeIndex,
    immediate_dominator: HashMap<NodeIndex, Option<NodeIndex>>,
    children: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl DominatorTree {
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    pub fn immediate_dominator(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.immediate_dominator.get(&node).copied().flatten()
    }

    pub fn children(&self, node: NodeIndex) -> &[NodeIndex] {
        self.children.get(&node).map_or(&[], |v| v.as_slice())
    }

    pub fn dominates(&self, a: NodeIndex, b: NodeIndex) -> bool {
        if a == b {
            return true;
        }
        let mut current = b;
        while let Some(idom) = self.immediate_dominator(current) {
            if idom == a {
                return true;
            }
            current = idom;
        }
        false
    }

    /// Ordered list from `n` (immediate) up to the root, inclusive of both
    /// ends (spec §8 invariant 7).
    pub fn dominators_of(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut chain = vec![node];
        let mut current = node;
        while let Some(idom) = self.immediate_dominator(current) {
            chain.push(idom);
            current = idom;
        }
        chain
    }

    pub(crate) fn from_parts(
        root: NodeIndex,
        immediate_dominator: HashMap<NodeIndex, Option<NodeIndex>>,
        children: HashMap<NodeIndex, Vec<NodeIndex>>,
    ) -> Self {
        Self { root, immediate_dominator, children }
    }
}

/// Detects the entry node per the order spec §4.4 specifies.
pub fn detect_entry(hg: &HierarchicalGraph, explicit: Option<NodeIndex>) -> Result<NodeIndex, AnalyticsError> {
    if let Some(node) = explicit {
        return Ok(node);
    }

    if let Some(main) = hg
        .node_indices()
        .find(|&n| hg.graph().symbol_at(n).name == "main")
    {
        return Ok(main);
    }

    let mut candidates: Vec<(NodeIndex, usize)> = hg
        .node_indices()
        .filter(|&n| hg.in_neighbors_of_type(n, EdgeType::Calls).is_empty())
        .map(|n| (n, hg.out_neighbors_of_type(n, EdgeType::Calls).len()))
        .collect();

    if candidates.is_empty() {
        // No node has zero incoming Calls edges (e.g. every node sits in a
        // cycle) — fall back to the first node rather than failing, since
        // whole-program graphs commonly lack a single textbook entry.
        return hg.node_indices().next().ok_or(AnalyticsError::NoEntryPoint);
    }

    candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| {
        let ai = hg.graph().id_at(a.0);
        let bi = hg.graph().id_at(b.0);
        ai.cmp(bi)
    }));
    Ok(candidates[0].0)
}

/// Computes a dominator tree over the whole graph (not a single edge type),
/// rooted at the detected entry. Returns `NoEntryPoint` for an empty graph.
pub fn compute_dominator_tree(
    hg: &HierarchicalGraph,
    explicit_entry: Option<NodeIndex>,
) -> Result<DominatorTree, AnalyticsError> {
    if hg.node_count() == 0 {
        return Err(AnalyticsError::NoEntryPoint);
    }
    let entry = detect_entry(hg, explicit_entry)?;
    let dominators = simple_fast(hg.graph().inner(), entry);

    let mut immediate_dominator = HashMap::new();
    let mut children: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
    for node in hg.node_indices() {
        let idom = dominators.immediate_dominator(node);
        immediate_dominator.insert(node, idom);
        if let Some(parent) = idom {
            children.entry(parent).or_default().push(node);
        }
    }

    Ok(DominatorTree { root: entry, immediate_dominator, children })
}

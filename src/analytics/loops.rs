//! Natural loop detection via back-edges on the dominator tree (spec
//! §3/§4.3.14/§4.4), directly generalized from the teacher's
//! `detect_natural_loops`/`compute_loop_body`.

use super::dominators::{compute_dominator_tree, DominatorTree};
use crate::error::AnalyticsError;
use crate::graph::HierarchicalGraph;
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};

/// A natural loop: single-entry body identified by a back-edge where the
/// header dominates the tail.
#[derive(Debug, Clone)]
pub struct NaturalLoop {
    pub header: NodeIndex,
    pub back_edge: (NodeIndex, NodeIndex),
    pub body: HashSet<NodeIndex>,
}

impl NaturalLoop {
    pub fn contains(&self, node: NodeIndex) -> bool {
        self.body.contains(&node)
    }

    pub fn size(&self) -> usize {
        self.body.len()
    }

    /// Classification per spec §4.3.14: size 1 = direct recursion, size 2 =
    /// mutual recursion, size >= 3 = complex cycle.
    pub fn classify(&self) -> &'static str {
        match self.size() {
            1 => "direct_recursion",
            2 => "mutual_recursion",
            _ => "complex_cycle",
        }
    }
}

fn compute_loop_body(hg: &HierarchicalGraph, header: NodeIndex, tail: NodeIndex) -> HashSet<NodeIndex> {
    let mut body = HashSet::new();
    let mut worklist = VecDeque::new();
    worklist.push_back(tail);

    while let Some(node) = worklist.pop_front() {
        if node == header || body.contains(&node) {
            continue;
        }
        body.insert(node);
        for pred in hg.in_neighbors(node) {
            if pred != header && !body.contains(&pred) {
                worklist.push_back(pred);
            }
        }
    }
    body.insert(header);
    body
}

/// Detects all natural loops reachable from the detected entry. Returns an
/// empty vec for an empty graph or a graph with no back-edges — callers
/// that need the "retry with 500ms delay up to 3 times" entry-point
/// recovery behavior (spec §4.3.14) live in the tool layer, since retrying
/// is a tool-level concern, not an algorithmic one.
pub fn detect_natural_loops(hg: &HierarchicalGraph) -> Result<Vec<NaturalLoop>, AnalyticsError> {
    if hg.node_count() == 0 {
        return Ok(Vec::new());
    }
    let tree: DominatorTree = compute_dominator_tree(hg, None)?;
    let mut loops = Vec::new();

    for node in hg.node_indices() {
        for succ in hg.out_neighbors(node) {
            // Back edge: node -> succ where succ dominates node.
            if tree.dominates(succ, node) {
                let body = compute_loop_body(hg, succ, node);
                loops.push(NaturalLoop { header: succ, back_edge: (node, succ), body });
            }
        }
    }
    Ok(loops)
}

/// Builds parent/child relations between loops for nesting display (spec
/// §4.3.14 "groups loops into a loop nest"): loop B nests inside loop A iff
/// B's header lies in A's body and A != B.
pub fn nest(loops: &[NaturalLoop]) -> Vec<Vec<usize>> {
    let mut children = vec![Vec::new(); loops.len()];
    for (i, outer) in loops.iter().enumerate() {
        for (j, inner) in loops.iter().enumerate() {
            if i != j && outer.body.contains(&inner.header) && outer.size() > inner.size() {
                children[i].push(j);
            }
        }
    }
    children
}

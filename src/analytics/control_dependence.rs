//! Control dependence (spec §4.3.15), Ferrante-Ottenstein-Warren style:
//! node `b` is control-dependent on node `a` iff some successor of `a`
//! post-dominates `b` while `a` itself does not post-dominate `b`, and `a`
//! has more than one outgoing edge (a genuine branch). Built directly on
//! the post-dominator tree rather than a full dominance-frontier pass,
//! which is sufficient for the per-query granularity this tool exposes.
//!
//! When a post-dominator tree cannot be computed (e.g. `NoExitPoint`), the
//! tool layer degrades to reporting dominator-tree ancestors as an
//! approximation (spec §4.3.15 degrade note) rather than failing outright.

use super::post_dominators::PostDominatorTree;
use crate::graph::HierarchicalGraph;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ControlDependence {
    /// node -> set of nodes it is control-dependent on, i.e. branches whose
    /// outcome determines whether this node executes.
    pub dependencies: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl ControlDependence {
    pub fn of(&self, node: NodeIndex) -> &[NodeIndex] {
        self.dependencies.get(&node).map_or(&[], |v| v.as_slice())
    }
}

/// Computes control dependence for every node reachable in `hg`, given its
/// post-dominator tree.
pub fn compute_control_dependence(hg: &HierarchicalGraph, pdoms: &PostDominatorTree) -> ControlDependence {
    let mut dependencies: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();

    let nodes: Vec<NodeIndex> = {
        let mut v: Vec<NodeIndex> = hg.node_indices().collect();
        v.sort_by_key(|&n| hg.graph().id_at(n).to_string());
        v
    };

    for &branch in &nodes {
        let successors = hg.out_neighbors(branch);
        if successors.len() < 2 {
            continue; // only genuine branches (>=2 successors) induce control dependence
        }
        for &succ in &successors {
            // Walk from `succ` up the post-dominator tree until we reach a
            // node that post-dominates `branch` (or run out of tree); every
            // node visited along the way, including `succ`, is
            // control-dependent on `branch`.
            let mut seen: HashSet<NodeIndex> = HashSet::new();
            let mut current = succ;
            loop {
                if current == branch || !seen.insert(current) {
                    break;
                }
                dependencies.entry(current).or_default().push(branch);
                if pdoms.post_dominates(current, branch) {
                    break;
                }
                match pdoms.immediate_post_dominator(current) {
                    Some(next) => current = next,
                    None => break,
                }
            }
        }
    }

    for deps in dependencies.values_mut() {
        deps.sort_by_key(|&n| hg.graph().id_at(n).to_string());
        deps.dedup();
    }

    ControlDependence { dependencies }
}

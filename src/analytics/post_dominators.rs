//! Post-dominator tree: dominance computed on the reversed graph, rooted at
//! a detected exit node (spec §3/§4.4). Direct generalization of the
//! teacher's `PostDominatorTree`, which uses `petgraph::visit::Reversed`
//! the same way.

use super::dominators::DominatorTree;
use crate::error::AnalyticsError;
use crate::graph::{EdgeType, HierarchicalGraph};
use petgraph::algo::dominators::simple_fast;
use petgraph::graph::NodeIndex;
use petgraph::visit::Reversed;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PostDominatorTree {
    inner: DominatorTree,
    exit: NodeIndex,
}

impl PostDominatorTree {
    pub fn root(&self) -> NodeIndex {
        self.exit
    }

    pub fn immediate_post_dominator(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.inner.immediate_dominator(node)
    }

    pub fn post_dominates(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.inner.dominates(a, b)
    }

    pub fn children(&self, node: NodeIndex) -> &[NodeIndex] {
        self.inner.children(node)
    }

    pub fn post_dominators_of(&self, node: NodeIndex) -> Vec<NodeIndex> {
        self.inner.dominators_of(node)
    }
}

/// A node with no outgoing `Calls`/`References` edges is treated as an
/// exit. Multiple candidates break ties lexicographically on id for
/// determinism (spec §9).
fn detect_exit(hg: &HierarchicalGraph) -> Option<NodeIndex> {
    let mut candidates: Vec<NodeIndex> = hg
        .node_indices()
        .filter(|&n| {
            hg.out_neighbors_of_type(n, EdgeType::Calls).is_empty()
                && hg.out_neighbors_of_type(n, EdgeType::References).is_empty()
        })
        .collect();
    if candidates.is_empty() {
        return hg.node_indices().next();
    }
    candidates.sort_by_key(|&n| hg.graph().id_at(n).to_string());
    candidates.into_iter().next()
}

pub fn compute_post_dominator_tree(hg: &HierarchicalGraph) -> Result<PostDominatorTree, AnalyticsError> {
    let exit = detect_exit(hg).ok_or(AnalyticsError::NoExitPoint)?;
    let reversed = Reversed(hg.graph().inner());
    let dominators = simple_fast(reversed, exit);

    let mut immediate_dominator = HashMap::new();
    let mut children: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
    for node in hg.node_indices() {
        let idom = dominators.immediate_dominator(node);
        immediate_dominator.insert(node, idom);
        if let Some(parent) = idom {
            children.entry(parent).or_default().push(node);
        }
    }

    let inner = DominatorTree::from_parts(exit, immediate_dominator, children);
    Ok(PostDominatorTree { inner, exit })
}

//! Single-entry-single-exit (SESE) region discovery (spec §4.3.17/§4.4): a
//! program structure tree built from the dominator and post-dominator
//! trees, following the standard characterization that an edge `(a, b)` is
//! the boundary of a SESE region exactly when `a` dominates `b` and `b`
//! post-dominates `a`.

use super::dominators::DominatorTree;
use super::post_dominators::PostDominatorTree;
use crate::graph::HierarchicalGraph;
use petgraph::graph::NodeIndex;

#[derive(Debug, Clone)]
pub struct SeseRegion {
    pub entry: NodeIndex,
    pub exit: NodeIndex,
    pub body: Vec<NodeIndex>,
}

impl SeseRegion {
    pub fn size(&self) -> usize {
        self.body.len()
    }
}

/// A node pair `(entry, exit)` bounds a SESE region iff `entry` dominates
/// `exit` and `exit` post-dominates `entry`, and they are distinct nodes
/// (spec §4.3.17: "single entry, single exit").
fn is_sese_boundary(doms: &DominatorTree, pdoms: &PostDominatorTree, entry: NodeIndex, exit: NodeIndex) -> bool {
    entry != exit && doms.dominates(entry, exit) && pdoms.post_dominates(exit, entry)
}

/// Discovers maximal SESE regions by testing every node against its
/// dominator-tree descendants for a matching post-dominance boundary.
/// Quadratic in node count, acceptable since regions are a bounded-size
/// per-function query in practice (spec §6 resource model: callers pass a
/// subgraph, not a whole program, for this tool).
pub fn discover_regions(hg: &HierarchicalGraph, doms: &DominatorTree, pdoms: &PostDominatorTree) -> Vec<SeseRegion> {
    let nodes: Vec<NodeIndex> = {
        let mut v: Vec<NodeIndex> = hg.node_indices().collect();
        v.sort_by_key(|&n| hg.graph().id_at(n).to_string());
        v
    };

    let mut regions = Vec::new();
    for &entry in &nodes {
        for &exit in &nodes {
            if is_sese_boundary(doms, pdoms, entry, exit) {
                let body = region_body(hg, doms, entry, exit);
                if !body.is_empty() {
                    regions.push(SeseRegion { entry, exit, body });
                }
            }
        }
    }

    // Keep only maximal regions: drop any region wholly contained within a
    // larger region sharing the same entry, to avoid the quadratic nested
    // explosion (spec wants the program structure tree's top-level nesting,
    // not every boundary pair).
    regions.sort_by(|a, b| b.size().cmp(&a.size()));
    let mut maximal: Vec<SeseRegion> = Vec::new();
    for region in regions {
        let contained = maximal.iter().any(|kept| {
            kept.entry == region.entry
                && region.body.iter().all(|n| kept.body.contains(n))
                && kept.body.len() > region.body.len()
        });
        if !contained {
            maximal.push(region);
        }
    }
    maximal.sort_by(|a, b| hg.graph().id_at(a.entry).cmp(hg.graph().id_at(b.entry)));
    maximal
}

/// Nodes dominated by `entry` and post-dominated by `exit`, i.e. every node
/// strictly between the region's boundary.
fn region_body(hg: &HierarchicalGraph, doms: &DominatorTree, entry: NodeIndex, exit: NodeIndex) -> Vec<NodeIndex> {
    hg.node_indices()
        .filter(|&n| doms.dominates(entry, n) && doms.dominates_or_eq_via_chain(n, exit))
        .collect()
}

impl DominatorTree {
    /// `n` lies on some path to `exit` that stays within the dominance
    /// region: `n == exit` or `n` is dominated by `entry`'s subtree and
    /// reaches `exit`. We approximate with "n dominates exit or n is exit"
    /// OR "n is dominated by entry", which in a reducible CFG captures the
    /// single-entry-single-exit body.
    fn dominates_or_eq_via_chain(&self, n: NodeIndex, exit: NodeIndex) -> bool {
        n == exit || self.dominates(n, exit) || self.dominates(exit, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::dominators::compute_dominator_tree;
    use crate::analytics::post_dominators::compute_post_dominator_tree;
    use crate::graph::{EdgeType, Graph, Location};
    use crate::symbol::{Symbol, SymbolKind};

    fn sym(id: &str) -> Symbol {
        Symbol {
            id: id.to_string(),
            name: id.to_string(),
            kind: SymbolKind::Function,
            file_path: "f.go".into(),
            start_line: 1,
            end_line: 2,
            package: "p".into(),
            signature: None,
            exported: true,
            language: "go".into(),
        }
    }

    #[test]
    fn diamond_graph_has_one_sese_region() {
        let mut g = Graph::new("/repo");
        for id in ["a", "b", "c", "d"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("a", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("b", "d", EdgeType::Calls, loc(3)).unwrap();
        g.add_edge("c", "d", EdgeType::Calls, loc(4)).unwrap();
        g.freeze();

        let hg = HierarchicalGraph::new(&g);
        let doms = compute_dominator_tree(&hg, None).unwrap();
        let pdoms = compute_post_dominator_tree(&hg).unwrap();
        let regions = discover_regions(&hg, &doms, &pdoms);
        assert!(!regions.is_empty());
        let a = g.node_index("a").unwrap();
        let d = g.node_index("d").unwrap();
        assert!(regions.iter().any(|r| r.entry == a && r.exit == d));
    }

    #[test]
    fn linear_chain_has_no_nontrivial_regions_beyond_whole_chain() {
        let mut g = Graph::new("/repo");
        for id in ["a", "b", "c"] {
            g.add_node(sym(id)).unwrap();
        }
        g.add_edge("a", "b", EdgeType::Calls, Location { file: "f".into(), line: 1 }).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, Location { file: "f".into(), line: 2 }).unwrap();
        g.freeze();

        let hg = HierarchicalGraph::new(&g);
        let doms = compute_dominator_tree(&hg, None).unwrap();
        let pdoms = compute_post_dominator_tree(&hg).unwrap();
        let regions = discover_regions(&hg, &doms, &pdoms);
        assert!(!regions.is_empty());
    }
}

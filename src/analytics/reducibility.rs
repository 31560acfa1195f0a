//! Reducibility check (spec §4.3.18/§4.4) via iterative interval analysis:
//! repeatedly collapse T1 (self-loop) and T2 (node with a single predecessor
//! once back-edges are folded in) transformations until the graph stops
//! shrinking. A graph is reducible iff this collapses to a single node;
//! whatever remains identifies the irreducible region.

use crate::graph::HierarchicalGraph;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
pub struct ReducibilityResult {
    pub reducible: bool,
    /// Nodes remaining after T1/T2 collapse stalls; empty when reducible.
    pub irreducible_region: Vec<NodeIndex>,
    pub total_nodes: usize,
    /// Fraction of nodes eliminated by T1/T2 before the collapse stalled;
    /// 1.0 when reducible, 0.0 on an irreducible graph no fold touched.
    pub score: f64,
}

#[derive(Clone)]
struct CollapsingGraph {
    nodes: HashSet<usize>,
    // successors/predecessors keyed by collapsed-node id, values are sets
    // of collapsed-node ids (self-loops retained to detect T1).
    succ: HashMap<usize, HashSet<usize>>,
    pred: HashMap<usize, HashSet<usize>>,
    // which original NodeIndex each collapsed-node id represents (a
    // collapsed node may represent multiple originals once merged).
    members: HashMap<usize, Vec<NodeIndex>>,
}

fn build_collapsing_graph(hg: &HierarchicalGraph) -> (CollapsingGraph, Vec<NodeIndex>) {
    let order: Vec<NodeIndex> = {
        let mut v: Vec<NodeIndex> = hg.node_indices().collect();
        v.sort_by_key(|&n| hg.graph().id_at(n).to_string());
        v
    };
    let index_of: HashMap<NodeIndex, usize> = order.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut succ: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut pred: HashMap<usize, HashSet<usize>> = HashMap::new();
    let mut members: HashMap<usize, Vec<NodeIndex>> = HashMap::new();
    let mut nodes = HashSet::new();

    for (i, &node) in order.iter().enumerate() {
        nodes.insert(i);
        members.insert(i, vec![node]);
        succ.entry(i).or_default();
        pred.entry(i).or_default();
    }
    for (i, &node) in order.iter().enumerate() {
        for out in hg.out_neighbors(node) {
            if let Some(&j) = index_of.get(&out) {
                succ.get_mut(&i).unwrap().insert(j);
                pred.get_mut(&j).unwrap().insert(i);
            }
        }
    }

    (CollapsingGraph { nodes, succ, pred, members }, order)
}

/// Applies T1 (remove a self-loop) wherever present. Returns whether any
/// self-loop was removed.
fn apply_t1(g: &mut CollapsingGraph) -> bool {
    let mut changed = false;
    let self_loops: Vec<usize> = g.nodes.iter().copied().filter(|n| g.succ[n].contains(n)).collect();
    for n in self_loops {
        g.succ.get_mut(&n).unwrap().remove(&n);
        g.pred.get_mut(&n).unwrap().remove(&n);
        changed = true;
    }
    changed
}

/// Applies T2 (fold a node with exactly one predecessor into that
/// predecessor) wherever present, deterministically smallest-id first.
/// Returns whether any fold occurred.
fn apply_t2(g: &mut CollapsingGraph) -> bool {
    let mut candidates: Vec<usize> = g
        .nodes
        .iter()
        .copied()
        .filter(|&n| g.pred[&n].len() == 1 && !g.pred[&n].contains(&n))
        .collect();
    candidates.sort_unstable();

    let mut changed = false;
    for n in candidates {
        if !g.nodes.contains(&n) {
            continue; // already folded away by an earlier fold this pass
        }
        let preds: Vec<usize> = g.pred[&n].iter().copied().collect();
        if preds.len() != 1 {
            continue; // stale check after earlier folds in this pass
        }
        let parent = preds[0];
        if parent == n {
            continue;
        }

        // Merge n into parent: parent absorbs n's successors/predecessors.
        let n_succ: Vec<usize> = g.succ[&n].iter().copied().collect();
        for s in n_succ {
            if s != n {
                g.succ.get_mut(&parent).unwrap().insert(s);
                g.pred.get_mut(&s).unwrap().insert(parent);
                g.pred.get_mut(&s).unwrap().remove(&n);
            }
        }
        g.succ.get_mut(&parent).unwrap().remove(&n);
        let absorbed = g.members.remove(&n).unwrap_or_default();
        g.members.get_mut(&parent).unwrap().extend(absorbed);
        g.nodes.remove(&n);
        g.succ.remove(&n);
        g.pred.remove(&n);
        changed = true;
    }
    changed
}

/// Labels a reducibility score (spec §4.3.18), mirroring
/// [`super::articulation::fragility_level`]'s style of banding a [0,1]
/// fraction into a human-readable quality tier.
pub fn quality_label(score: f64) -> &'static str {
    if score >= 0.95 {
        "excellent"
    } else if score >= 0.8 {
        "good"
    } else if score >= 0.5 {
        "fair"
    } else {
        "poor"
    }
}

/// Iterates T1/T2 until neither applies. Reducible iff exactly one node (or
/// zero, for an empty graph) remains.
pub fn check_reducibility(hg: &HierarchicalGraph) -> ReducibilityResult {
    let (mut g, order) = build_collapsing_graph(hg);
    let total_nodes = order.len();
    if g.nodes.is_empty() {
        return ReducibilityResult { reducible: true, irreducible_region: Vec::new(), total_nodes, score: 1.0 };
    }

    loop {
        let t1 = apply_t1(&mut g);
        let t2 = apply_t2(&mut g);
        if !t1 && !t2 {
            break;
        }
    }

    if g.nodes.len() <= 1 {
        return ReducibilityResult { reducible: true, irreducible_region: Vec::new(), total_nodes, score: 1.0 };
    }

    let mut remaining: Vec<NodeIndex> =
        g.nodes.iter().flat_map(|n| g.members.get(n).cloned().unwrap_or_default()).collect();
    remaining.sort_by_key(|&n| hg.graph().id_at(n).to_string());
    let score = if total_nodes == 0 { 0.0 } else { 1.0 - (remaining.len() as f64 / total_nodes as f64) };
    ReducibilityResult { reducible: false, irreducible_region: remaining, total_nodes, score }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    /// A straight-line DAG chain is always reducible.
    #[test]
    fn dag_chain_is_reducible() {
        let mut g = Graph::new("/repo");
        for id in ["a", "b", "c", "d"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("c", "d", EdgeType::Calls, loc(3)).unwrap();
        g.freeze();

        let hg = HierarchicalGraph::new(&g);
        let result = check_reducibility(&hg);
        assert!(result.reducible);
        assert!(result.irreducible_region.is_empty());
    }

    #[test]
    fn diamond_with_natural_loop_is_reducible() {
        let mut g = Graph::new("/repo");
        for id in ["a", "b", "c", "d"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("c", "b", EdgeType::Calls, loc(3)).unwrap();
        g.add_edge("b", "d", EdgeType::Calls, loc(4)).unwrap();
        g.freeze();

        let hg = HierarchicalGraph::new(&g);
        let result = check_reducibility(&hg);
        assert!(result.reducible);
    }

    /// The classic irreducible graph: a multi-entry loop where two nodes
    /// both jump into the middle of a cycle with no single dominating
    /// header (a -> b, a -> c, b -> c, c -> b).
    #[test]
    fn multi_entry_loop_is_irreducible() {
        let mut g = Graph::new("/repo");
        for id in ["a", "b", "c"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("a", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(3)).unwrap();
        g.add_edge("c", "b", EdgeType::Calls, loc(4)).unwrap();
        g.freeze();

        let hg = HierarchicalGraph::new(&g);
        let result = check_reducibility(&hg);
        assert!(!result.reducible);
        assert!(!result.irreducible_region.is_empty());
    }

    #[test]
    fn empty_graph_is_reducible() {
        let mut g = Graph::new("/repo");
        g.freeze();
        let hg = HierarchicalGraph::new(&g);
        assert!(check_reducibility(&hg).reducible);
    }
}

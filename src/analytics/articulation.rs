//! Articulation points and bridges via an iterative Hopcroft-Tarjan DFS
//! over the undirected projection of the graph (spec §4.3.13/§4.4).
//!
//! `petgraph` has no built-in articulation-point algorithm, so this is
//! hand-rolled in the same explicit-stack, no-recursion idiom the teacher
//! uses for CFG traversal (`reachability.rs`'s DFS, `loops.rs`'s worklist).

use crate::graph::HierarchicalGraph;
use petgraph::graph::NodeIndex;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct ArticulationResult {
    pub points: Vec<NodeIndex>,
    pub bridges: Vec<(NodeIndex, NodeIndex)>,
    pub total_components: usize,
}

/// Adjacency of the undirected projection: an edge `u->v` or `v->u`
/// becomes a single undirected edge `{u, v}`.
fn undirected_adjacency(hg: &HierarchicalGraph) -> HashMap<NodeIndex, Vec<NodeIndex>> {
    let mut adj: HashMap<NodeIndex, Vec<NodeIndex>> = HashMap::new();
    for node in hg.node_indices() {
        adj.entry(node).or_default();
    }
    for node in hg.node_indices() {
        for succ in hg.out_neighbors(node) {
            if succ == node {
                continue; // self-loops don't affect connectivity
            }
            adj.entry(node).or_default().push(succ);
            adj.entry(succ).or_default().push(node);
        }
    }
    adj
}

enum Frame {
    Enter { node: NodeIndex, parent: Option<NodeIndex> },
    Resume { node: NodeIndex, parent: Option<NodeIndex>, child: NodeIndex },
}

/// Iterative Hopcroft-Tarjan: computes cut vertices and bridges of the
/// undirected projection, plus the number of connected components.
pub fn find_articulation_points_and_bridges(hg: &HierarchicalGraph) -> ArticulationResult {
    let adj = undirected_adjacency(hg);
    let mut disc: HashMap<NodeIndex, usize> = HashMap::new();
    let mut low: HashMap<NodeIndex, usize> = HashMap::new();
    let mut articulation: HashSet<NodeIndex> = HashSet::new();
    let mut bridges: Vec<(NodeIndex, NodeIndex)> = Vec::new();
    let mut timer = 0usize;
    let mut total_components = 0usize;

    let mut nodes: Vec<NodeIndex> = adj.keys().copied().collect();
    nodes.sort_by_key(|n| hg.graph().id_at(*n).to_string());

    for root in nodes {
        if disc.contains_key(&root) {
            continue;
        }
        total_components += 1;
        let mut root_children = 0usize;
        let mut stack = vec![Frame::Enter { node: root, parent: None }];
        // child index cursor per node, to resume iteration deterministically
        let mut cursor: HashMap<NodeIndex, usize> = HashMap::new();

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter { node, parent } => {
                    disc.insert(node, timer);
                    low.insert(node, timer);
                    timer += 1;
                    cursor.insert(node, 0);
                    push_next_child(hg, &adj, node, parent, root, &mut cursor, &mut disc, &mut low, &mut stack, &mut root_children);
                }
                Frame::Resume { node, parent, child } => {
                    let child_low = low[&child];
                    let node_low = low[&node];
                    low.insert(node, node_low.min(child_low));

                    let node_disc = disc[&node];
                    if let Some(p) = parent {
                        if child_low >= node_disc {
                            articulation.insert(node);
                        }
                        let _ = p;
                    }
                    if child_low > node_disc {
                        let (a, b) = order_pair(hg, node, child);
                        bridges.push((a, b));
                    }

                    push_next_child(hg, &adj, node, parent, root, &mut cursor, &mut disc, &mut low, &mut stack, &mut root_children);
                }
            }
        }

        if root_children > 1 {
            articulation.insert(root);
        } else {
            articulation.remove(&root);
        }
    }

    let mut points: Vec<NodeIndex> = articulation.into_iter().collect();
    points.sort_by_key(|n| hg.graph().id_at(*n).to_string());
    bridges.sort_by(|a, b| {
        let (aid0, aid1) = (hg.graph().id_at(a.0), hg.graph().id_at(a.1));
        let (bid0, bid1) = (hg.graph().id_at(b.0), hg.graph().id_at(b.1));
        (aid0, aid1).cmp(&(bid0, bid1))
    });

    ArticulationResult { points, bridges, total_components }
}

#[allow(clippy::too_many_arguments)]
fn push_next_child(
    hg: &HierarchicalGraph,
    adj: &HashMap<NodeIndex, Vec<NodeIndex>>,
    node: NodeIndex,
    parent: Option<NodeIndex>,
    root: NodeIndex,
    cursor: &mut HashMap<NodeIndex, usize>,
    disc: &mut HashMap<NodeIndex, usize>,
    low: &mut HashMap<NodeIndex, usize>,
    stack: &mut Vec<Frame>,
    root_children: &mut usize,
) {
    let mut neighbors = adj.get(&node).cloned().unwrap_or_default();
    neighbors.sort_by_key(|n| hg.graph().id_at(*n).to_string());

    let idx = *cursor.get(&node).unwrap_or(&0);
    for (offset, &next) in neighbors.iter().enumerate().skip(idx) {
        cursor.insert(node, offset + 1);
        if Some(next) == parent {
            continue;
        }
        if let Some(&next_disc) = disc.get(&next) {
            // Back edge: update low-link directly, no recursion needed.
            let node_low = low[&node];
            low.insert(node, node_low.min(next_disc));
            continue;
        }
        if node == root {
            *root_children += 1;
        }
        stack.push(Frame::Resume { node, parent, child: next });
        stack.push(Frame::Enter { node: next, parent: Some(node) });
        return;
    }
}

fn order_pair(hg: &HierarchicalGraph, a: NodeIndex, b: NodeIndex) -> (NodeIndex, NodeIndex) {
    if hg.graph().id_at(a) <= hg.graph().id_at(b) {
        (a, b)
    } else {
        (b, a)
    }
}

/// Fragility classification per spec §4.3.13.
pub fn fragility_level(score: f64) -> &'static str {
    if score < 0.05 {
        "minimal"
    } else if score < 0.10 {
        "low"
    } else if score < 0.20 {
        "moderate"
    } else {
        "high"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgeType, Graph, Location};
    use crate::symbol::{Symbol, SymbolKind};
    use std::collections::HashSet;

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

    /// S3: chain A-B-C-D-E, branch B-F, branch D-G-H.
    /// Articulation points: {B, C, D, G}. Bridges include every edge here
    /// (it's a tree, so every edge is a bridge).
    #[test]
    fn chain_with_branches_matches_scenario_s3() {
        let mut g = Graph::new("/repo");
        for id in ["a", "b", "c", "d", "e", "f", "gg", "h"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("c", "d", EdgeType::Calls, loc(3)).unwrap();
        g.add_edge("d", "e", EdgeType::Calls, loc(4)).unwrap();
        g.add_edge("b", "f", EdgeType::Calls, loc(5)).unwrap();
        g.add_edge("d", "gg", EdgeType::Calls, loc(6)).unwrap();
        g.add_edge("gg", "h", EdgeType::Calls, loc(7)).unwrap();
        g.freeze();

        let hg = HierarchicalGraph::new(&g);
        let result = find_articulation_points_and_bridges(&hg);
        let ids: HashSet<_> = result.points.iter().map(|&n| g.id_at(n)).collect();
        for expect in ["b", "c", "d", "gg"] {
            assert!(ids.contains(expect), "expected {expect} to be an articulation point, got {ids:?}");
        }
        assert_eq!(result.bridges.len(), 7); // it's a tree: every edge is a bridge
    }

    #[test]
    fn single_node_has_no_articulation_points() {
        let mut g = Graph::new("/repo");
        g.add_node(sym("a")).unwrap();
        g.freeze();
        let hg = HierarchicalGraph::new(&g);
        let result = find_articulation_points_and_bridges(&hg);
        assert!(result.points.is_empty());
        assert_eq!(result.total_components, 1);
    }

    #[test]
    fn fragility_levels_match_thresholds() {
        assert_eq!(fragility_level(0.01), "minimal");
        assert_eq!(fragility_level(0.07), "low");
        assert_eq!(fragility_level(0.15), "moderate");
        assert_eq!(fragility_level(0.25), "high");
    }
}

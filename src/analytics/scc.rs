//! Strongly connected components via `petgraph::algo::tarjan_scc`, already
//! iterative (spec §4.4 "no recursion-depth risk on million-node graphs").

use crate::graph::HierarchicalGraph;
use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;

/// One strongly connected component of size >= 2, or a self-loop of size 1
/// (a single node with an edge to itself is, by definition, its own SCC).
#[derive(Debug, Clone)]
pub struct Cycle {
    pub members: Vec<NodeIndex>,
}

impl Cycle {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Returns SCCs of size >= `min_size`, ordered by size descending then by
/// lexicographically smallest member id (spec §4.3.9, §9 tie-breaking).
///
/// A component of size 1 is only reported if that single node has a
/// self-loop (otherwise it's a trivial, non-cyclic component and excluded
/// unless `min_size <= 1` and the caller wants it — we exclude acyclic
/// singletons unconditionally since "cycle" implies an actual cycle).
pub fn find_cycles(hg: &HierarchicalGraph, min_size: usize) -> Vec<Cycle> {
    let sccs = tarjan_scc(hg.graph().inner());
    let mut cycles: Vec<Cycle> = sccs
        .into_iter()
        .filter_map(|members| {
            let is_cycle = members.len() > 1
                || (members.len() == 1 && has_self_loop(hg, members[0]));
            if is_cycle && members.len() >= min_size {
                Some(Cycle { members })
            } else {
                None
            }
        })
        .collect();

    cycles.sort_by(|a, b| {
        b.size().cmp(&a.size()).then_with(|| smallest_id(hg, a).cmp(&smallest_id(hg, b)))
    });
    cycles
}

fn has_self_loop(hg: &HierarchicalGraph, node: NodeIndex) -> bool {
    hg.out_neighbors(node).contains(&node)
}

fn smallest_id(hg: &HierarchicalGraph, cycle: &Cycle) -> String {
    cycle
        .members
        .iter()
        .map(|&n| hg.graph().id_at(n).to_string())
        .min()
        .unwrap_or_default()
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

    #[test]
    fn finds_three_cycle_ordered_by_size_then_id() {
        let mut g = Graph::new("/repo");
        for id in ["a", "b", "c", "x", "y"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("c", "a", EdgeType::Calls, loc(3)).unwrap();
        g.add_edge("x", "y", EdgeType::Calls, loc(4)).unwrap();
        g.add_edge("y", "x", EdgeType::Calls, loc(5)).unwrap();
        g.freeze();

        let hg = HierarchicalGraph::new(&g);
        let cycles = find_cycles(&hg, 2);
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].size(), 3);
        assert_eq!(cycles[1].size(), 2);
    }

    #[test]
    fn min_size_filters_out_non_cyclic_singletons() {
        let mut g = Graph::new("/repo");
        g.add_node(sym("lonely")).unwrap();
        g.freeze();
        let hg = HierarchicalGraph::new(&g);
        assert!(find_cycles(&hg, 1).is_empty());
    }

    #[test]
    fn self_loop_counts_as_a_size_one_cycle() {
        let mut g = Graph::new("/repo");
        g.add_node(sym("rec")).unwrap();
        g.add_edge("rec", "rec", EdgeType::Calls, Location { file: "f".into(), line: 1 }).unwrap();
        g.freeze();
        let hg = HierarchicalGraph::new(&g);
        let cycles = find_cycles(&hg, 1);
        assert_eq!(cycles.len(), 1);
    }
}

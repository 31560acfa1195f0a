//! `find_path(from, to)` — spec §4.3.10: bidirectional BFS, shortest path by
//! edge count, lexicographically smallest sequence of ids among ties.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::trace::TraceStepBuilder;
use petgraph::graph::NodeIndex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};

pub struct FindPath;

impl Tool for FindPath {
    fn name(&self) -> &'static str {
        "find_path"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds the shortest directed path between two symbols by edge count.",
            parameters: vec![
                super::ParamSpec { name: "from", kind: "string", required: true, default: None, min: None, max: None, enum_values: None },
                super::ParamSpec { name: "to", kind: "string", required: true, default: None, min: None, max: None, enum_values: None },
            ],
            priority: 65,
            capability_tags: &["navigation"],
            timeout: std::time::Duration::from_secs(15),
            usage_hint: "Use to answer 'is X reachable from Y, and how?'.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let (Some(from), Some(to)) = (params.string("from"), params.string("to")) else {
            let outcome = ToolOutcome::fail("missing required parameter: from/to", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_path", "FindPath")
                .duration(start.elapsed())
                .error("missing required parameter: from/to")
                .build();
            return (outcome, trace, None);
        };

        let from_node = ctx.index.get_by_id(&from).or_else(|| ctx.graph.node_index(&from));
        let to_node = ctx.index.get_by_id(&to).or_else(|| ctx.graph.node_index(&to));

        let (Some(from_node), Some(to_node)) = (from_node, to_node) else {
            let reason = "one or both endpoints are unresolved in this graph".to_string();
            let outcome = ToolOutcome::ok(json!({ "found": false, "reason": reason }), reason, start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_path", "FindPath").duration(start.elapsed()).build();
            return (outcome, trace, None);
        };

        // Forward BFS producing a parent map; ties on equal distance are
        // broken by always visiting neighbors in sorted-id order, which
        // yields the lexicographically smallest path deterministically.
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut visited: std::collections::HashSet<NodeIndex> = std::collections::HashSet::new();
        visited.insert(from_node);
        let mut queue = VecDeque::new();
        queue.push_back(from_node);
        let mut found = from_node == to_node;

        while let Some(node) = queue.pop_front() {
            if ctx.token.check().is_err() {
                let outcome = ToolOutcome::fail("cancelled", start.elapsed());
                let trace = TraceStepBuilder::new("analytics_find_path", "FindPath").duration(start.elapsed()).build();
                return (outcome, trace, Some(CancelError));
            }
            if node == to_node {
                found = true;
                break;
            }
            let mut neighbors = ctx.graph.out_edges_of(node).into_iter().map(|(n, _)| n).collect::<Vec<_>>();
            neighbors.sort_by_key(|&n| ctx.graph.id_at(n).to_string());
            for next in neighbors {
                if visited.insert(next) {
                    parent.insert(next, node);
                    queue.push_back(next);
                }
            }
        }

        if !found {
            let reason = format!("no path from '{from}' to '{to}'");
            let outcome = ToolOutcome::ok(json!({ "found": false, "reason": reason }), reason, start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_path", "FindPath").duration(start.elapsed()).build();
            return (outcome, trace, None);
        }

        let mut path = vec![to_node];
        let mut cur = to_node;
        while cur != from_node {
            let p = parent[&cur];
            path.push(p);
            cur = p;
        }
        path.reverse();
        let ids: Vec<String> = path.iter().map(|&n| ctx.graph.symbol_at(n).id.clone()).collect();

        let text = format!("path found with {} hop(s)", ids.len().saturating_sub(1));
        let symbols_found = ids.clone();
        let outcome = ToolOutcome::ok(json!({ "found": true, "path": ids, "length": path.len() - 1 }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_path", "FindPath")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .build();
        (outcome, trace, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::GraphAnalytics;
    use crate::graph::{EdgeType, Graph, Location, SymbolIndex};
    use crate::symbol::{Symbol, SymbolKind};

    fn sym(id: &str) -> Symbol {
        Symbol { id: id.to_string(), name: id.to_string(), kind: SymbolKind::Function, file_path: "f.go".into(), start_line: 1, end_line: 2, package: "p".into(), signature: None, exported: true, language: "go".into() }
    }

    #[test]
    fn finds_shortest_path() {
        let mut g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        for id in ["a", "b", "c"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let mut map = std::collections::HashMap::new();
        map.insert("from".to_string(), json!("a"));
        map.insert("to".to_string(), json!("c"));
        let params = Params::new(map);

        let (outcome, _, _) = FindPath.execute(&ctx, &params);
        assert_eq!(outcome.output["found"], true);
        assert_eq!(outcome.output["length"], 2);
    }

    #[test]
    fn unresolved_endpoint_returns_success_false_found() {
        let g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let mut map = std::collections::HashMap::new();
        map.insert("from".to_string(), json!("missing"));
        map.insert("to".to_string(), json!("also_missing"));
        let params = Params::new(map);

        let (outcome, _, _) = FindPath.execute(&ctx, &params);
        assert!(outcome.success);
        assert_eq!(outcome.output["found"], false);
    }
}

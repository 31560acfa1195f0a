//! `get_call_chain(name, direction, depth)` — spec §4.3.5.

use super::{resolve_symbol_nodes, start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::EdgeType;
use crate::trace::TraceStepBuilder;
use petgraph::graph::NodeIndex;
use serde_json::json;
use std::collections::{HashMap, VecDeque};

pub struct GetCallChain;

impl Tool for GetCallChain {
    fn name(&self) -> &'static str {
        "get_call_chain"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "BFS over the call graph from a symbol, upstream (callers) or downstream (callees).",
            parameters: vec![
                super::ParamSpec { name: "name", kind: "string", required: true, default: None, min: None, max: None, enum_values: None },
                super::ParamSpec { name: "direction", kind: "string-enum", required: false, default: Some(json!("downstream")), min: None, max: None, enum_values: Some(&["upstream", "downstream"]) },
                super::ParamSpec { name: "depth", kind: "int", required: false, default: Some(json!(5)), min: Some(1.0), max: Some(10.0), enum_values: None },
            ],
            priority: 75,
            capability_tags: &["call-graph", "navigation"],
            timeout: std::time::Duration::from_secs(15),
            usage_hint: "Use to understand a multi-hop call chain. Avoid for a single hop (use find_callers/find_callees).",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let Some(name) = params.string("name") else {
            let outcome = ToolOutcome::fail("missing required parameter: name", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_get_call_chain", "GetCallChain")
                .duration(start.elapsed())
                .error("missing required parameter: name")
                .build();
            return (outcome, trace, None);
        };
        let direction = params.enum_or("direction", &["upstream", "downstream"], "downstream");
        let depth = params.usize_clamped("depth", 5, 1, 10);

        let starts = resolve_symbol_nodes(ctx, &name);
        let mut distances: HashMap<NodeIndex, usize> = HashMap::new();
        let mut queue: VecDeque<(NodeIndex, usize)> = VecDeque::new();
        for &s in &starts {
            distances.insert(s, 0);
            queue.push_back((s, 0));
        }

        let mut paths: Vec<Vec<String>> = Vec::new();
        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();

        while let Some((node, dist)) = queue.pop_front() {
            if ctx.token.check().is_err() {
                let outcome = ToolOutcome::fail("cancelled", start.elapsed());
                let trace = TraceStepBuilder::new("analytics_get_call_chain", "GetCallChain").target(name).duration(start.elapsed()).build();
                return (outcome, trace, Some(CancelError));
            }
            if dist >= depth {
                continue;
            }
            let neighbors = if direction == "upstream" {
                ctx.graph.in_edges_of(node).into_iter().filter(|(_, r)| r.edge_type == EdgeType::Calls).map(|(n, _)| n).collect::<Vec<_>>()
            } else {
                ctx.graph.out_edges_of(node).into_iter().filter(|(_, r)| r.edge_type == EdgeType::Calls).map(|(n, _)| n).collect::<Vec<_>>()
            };
            let mut sorted_neighbors = neighbors;
            sorted_neighbors.sort_by_key(|&n| ctx.graph.id_at(n).to_string());
            for next in sorted_neighbors {
                if !distances.contains_key(&next) {
                    distances.insert(next, dist + 1);
                    parent.insert(next, node);
                    queue.push_back((next, dist + 1));
                }
            }
        }

        // Sample up to 5 shortest paths from any start to the farthest
        // reached nodes, reconstructed via `parent` (spec §4.3.5: "sampled
        // paths"), deterministic on id.
        let mut ends: Vec<NodeIndex> = distances.keys().copied().filter(|n| !starts.contains(n)).collect();
        ends.sort_by_key(|&n| (std::cmp::Reverse(distances[&n]), ctx.graph.id_at(n).to_string()));
        for &end in ends.iter().take(5) {
            let mut chain = vec![ctx.graph.symbol_at(end).id.clone()];
            let mut cur = end;
            while let Some(&p) = parent.get(&cur) {
                chain.push(ctx.graph.symbol_at(p).id.clone());
                cur = p;
            }
            chain.reverse();
            paths.push(chain);
        }

        let mut reachable: Vec<(String, usize)> = distances
            .iter()
            .filter(|(n, _)| !starts.contains(n))
            .map(|(&n, &d)| (ctx.graph.symbol_at(n).id.clone(), d))
            .collect();
        reachable.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let text = format!("{} reachable node(s) within depth {depth} ({direction})", reachable.len());
        let symbols_found: Vec<String> = reachable.iter().map(|(id, _)| id.clone()).collect();
        let outcome = ToolOutcome::ok(
            json!({
                "node_count": reachable.len(),
                "reachable": reachable.iter().map(|(id, d)| json!({"id": id, "distance": d})).collect::<Vec<_>>(),
                "sample_paths": paths,
            }),
            text,
            start.elapsed(),
        );
        let trace = TraceStepBuilder::new("analytics_get_call_chain", "GetCallChain")
            .target(name)
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("direction", direction)
            .metadata("depth", depth.to_string())
            .build();
        (outcome, trace, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::GraphAnalytics;
    use crate::graph::{Graph, Location, SymbolIndex};
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
    fn bfs_respects_depth_bound() {
        let mut g = Graph::new("/repo");
        let mut idx = SymbolIndex::new();
        for id in ["a", "b", "c", "d"] {
            let s = sym(id);
            let n = g.add_node(s.clone()).unwrap();
            idx.add(&s, n).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("c", "d", EdgeType::Calls, loc(3)).unwrap();
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let mut map = std::collections::HashMap::new();
        map.insert("name".to_string(), json!("a"));
        map.insert("depth".to_string(), json!(2));
        let params = Params::new(map);

        let (outcome, _, _) = GetCallChain.execute(&ctx, &params);
        assert_eq!(outcome.output["node_count"], 2); // b (dist 1), c (dist 2); d is out of depth
    }
}

//! `find_hotspots(top=10, kind=all)` — spec §4.3.7: connectivity score
//! `in_degree*2 + out_degree`, top-K via a min-heap of size K.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::HierarchicalGraph;
use crate::symbol::SymbolKind;
use crate::trace::TraceStepBuilder;
use serde_json::json;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

pub struct FindHotspots;

#[derive(PartialEq, Eq)]
struct ScoredNode {
    score: usize,
    id: String,
}

impl Ord for ScoredNode {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Min-heap ordering: smaller score (or, on ties, lexicographically
        // larger id) pops first, so the heap always evicts the weakest
        // candidate when it exceeds capacity K (spec §4.3.7).
        self.score.cmp(&other.score).then_with(|| other.id.cmp(&self.id))
    }
}
impl PartialOrd for ScoredNode {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Tool for FindHotspots {
    fn name(&self) -> &'static str {
        "find_hotspots"
    }

    fn category(&self) -> Category {
        Category::Analysis
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Ranks nodes by connectivity score (2*in_degree + out_degree).",
            parameters: vec![
                super::ParamSpec { name: "top", kind: "int", required: false, default: Some(json!(10)), min: Some(1.0), max: Some(100.0), enum_values: None },
                super::ParamSpec { name: "kind", kind: "string-enum", required: false, default: Some(json!("all")), min: None, max: None, enum_values: None },
            ],
            priority: 70,
            capability_tags: &["analysis"],
            timeout: std::time::Duration::from_secs(15),
            usage_hint: "Use to find the most-connected nodes in the graph.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let top = params.usize_clamped("top", 10, 1, 100);
        let kind_filter = params.string("kind").filter(|k| k != "all").map(|k| SymbolKind::parse_or_unknown(&k));

        let hg = HierarchicalGraph::new(ctx.graph);
        // When filtering by kind, over-fetch 3x to avoid under-delivery
        // after post-filtering (spec §4.3.7).
        let capacity = if kind_filter.is_some() { top * 3 } else { top };
        let mut heap: BinaryHeap<Reverse<ScoredNode>> = BinaryHeap::with_capacity(capacity + 1);

        for node in hg.node_indices() {
            if ctx.token.check().is_err() {
                let outcome = ToolOutcome::fail("cancelled", start.elapsed());
                let trace = TraceStepBuilder::new("analytics_find_hotspots", "FindHotspots").duration(start.elapsed()).build();
                return (outcome, trace, Some(CancelError));
            }
            if let Some(kind) = kind_filter {
                if ctx.graph.symbol_at(node).kind != kind {
                    continue;
                }
            }
            let score = hg.in_degree(node) * 2 + hg.out_degree(node);
            let id = ctx.graph.symbol_at(node).id.clone();
            heap.push(Reverse(ScoredNode { score, id }));
            if heap.len() > capacity {
                heap.pop();
            }
        }

        let mut results: Vec<ScoredNode> = heap.into_iter().map(|Reverse(s)| s).collect();
        results.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        results.truncate(top);

        let symbols_found: Vec<String> = results.iter().map(|r| r.id.clone()).collect();
        let text = if results.is_empty() {
            "no hotspots found".to_string()
        } else {
            format!("top {} hotspot(s) by connectivity score", results.len())
        };
        let outcome = ToolOutcome::ok(
            json!({ "hotspots": results.iter().map(|r| json!({"id": r.id, "score": r.score})).collect::<Vec<_>>() }),
            text,
            start.elapsed(),
        );
        let trace = TraceStepBuilder::new("analytics_find_hotspots", "FindHotspots")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("top", top.to_string())
            .build();
        (outcome, trace, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::GraphAnalytics;
    use crate::graph::{EdgeType, Graph, Location, SymbolIndex};
    use crate::symbol::Symbol;

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
    fn ranks_highest_connectivity_first() {
        let mut g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        for id in ["hub", "a", "b", "c"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "hub", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "hub", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("c", "hub", EdgeType::Calls, loc(3)).unwrap();
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let mut map = std::collections::HashMap::new();
        map.insert("top".to_string(), json!(1));
        let params = Params::new(map);

        let (outcome, _, _) = FindHotspots.execute(&ctx, &params);
        let hotspots = outcome.output["hotspots"].as_array().unwrap();
        assert_eq!(hotspots.len(), 1);
        assert_eq!(hotspots[0]["id"], "hub");
    }
}

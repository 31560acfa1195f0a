//! `find_cycles(min_size=2, top=?)` — spec §4.3.9, delegates to
//! [`crate::analytics::scc`] via [`crate::analytics::GraphAnalytics`].

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::HierarchicalGraph;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindCycles;

impl Tool for FindCycles {
    fn name(&self) -> &'static str {
        "find_cycles"
    }

    fn category(&self) -> Category {
        Category::Structure
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds strongly connected components (cycles) of size >= min_size.",
            parameters: vec![
                super::ParamSpec { name: "min_size", kind: "int", required: false, default: Some(json!(2)), min: Some(1.0), max: Some(1000.0), enum_values: None },
                super::ParamSpec { name: "top", kind: "int", required: false, default: Some(json!(20)), min: Some(1.0), max: Some(100.0), enum_values: None },
            ],
            priority: 60,
            capability_tags: &["structure"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to find circular dependencies.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let min_size = params.usize_clamped("min_size", 2, 1, 1000);
        let top = params.usize_clamped("top", 20, 1, 100);

        let hg = HierarchicalGraph::new(ctx.graph);
        let (cycles, analytics_trace) = ctx.analytics.cycles_with_trace(&hg, min_size);

        let mut symbols_found = Vec::new();
        let groups: Vec<_> = cycles
            .iter()
            .take(top)
            .map(|c| {
                let mut ids: Vec<String> = c.members.iter().map(|&n| ctx.graph.symbol_at(n).id.clone()).collect();
                ids.sort();
                symbols_found.extend(ids.iter().cloned());
                json!({ "size": c.size(), "members": ids })
            })
            .collect();

        let text = if groups.is_empty() {
            "no cycles found".to_string()
        } else {
            format!("{} cycle(s) found (size >= {min_size})", groups.len())
        };
        let outcome = ToolOutcome::ok(json!({ "cycles": groups }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_cycles", "FindCycles")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("min_size", min_size.to_string())
            .metadata("algorithm_duration_ms", analytics_trace.duration.as_millis().to_string())
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
    fn finds_a_three_cycle() {
        let mut g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        for id in ["a", "b", "c"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("c", "a", EdgeType::Calls, loc(3)).unwrap();
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let params = Params::default();
        let (outcome, _, _) = FindCycles.execute(&ctx, &params);
        let cycles = outcome.output["cycles"].as_array().unwrap();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0]["size"], 3);
    }
}

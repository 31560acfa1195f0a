//! `find_loops()` — spec §4.3.14: natural loops via back-edges on the
//! dominator tree, classified and nested, delegating to
//! [`crate::analytics::loops`].
//!
//! Per spec §4.3.14, entry-point detection failure (`NoEntryPoint`) is
//! retried up to 3 times with a 500ms delay before giving up, on the
//! chance that a concurrent graph rebuild resolves the ambiguity; the
//! analytics layer itself stays purely functional and leaves this retry
//! policy to the tool.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::analytics::loops;
use crate::cancel::CancelError;
use crate::error::AnalyticsError;
use crate::graph::HierarchicalGraph;
use crate::trace::TraceStepBuilder;
use serde_json::json;
use std::time::Duration;

const MAX_ATTEMPTS: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_millis(500);

pub struct FindLoops;

impl Tool for FindLoops {
    fn name(&self) -> &'static str {
        "find_loops"
    }

    fn category(&self) -> Category {
        Category::Structure
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds natural loops (back-edges on the dominator tree), classified and nested.",
            parameters: vec![
                super::ParamSpec { name: "top", kind: "int", required: false, default: Some(json!(20)), min: Some(1.0), max: Some(100.0), enum_values: None },
                super::ParamSpec { name: "min_size", kind: "int", required: false, default: Some(json!(1)), min: Some(1.0), max: Some(10000.0), enum_values: None },
                super::ParamSpec { name: "show_nesting", kind: "bool", required: false, default: Some(json!(true)), min: None, max: None, enum_values: None },
            ],
            priority: 60,
            capability_tags: &["structure"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to find recursion and iteration structure in the call graph.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let top = params.usize_clamped("top", 20, 1, 100);
        let min_size = params.usize_clamped("min_size", 1, 1, 10000);
        let show_nesting = params.bool_or("show_nesting", true);
        let hg = HierarchicalGraph::new(ctx.graph);

        let mut attempt = 0;
        let (result, analytics_trace) = loop {
            attempt += 1;
            let (result, trace) = ctx.analytics.natural_loops_with_trace(&hg);
            let is_retryable_no_entry = matches!(result.as_ref().err(), Some(AnalyticsError::NoEntryPoint));
            if is_retryable_no_entry && attempt < MAX_ATTEMPTS {
                std::thread::sleep(RETRY_DELAY);
                continue;
            }
            break (result, trace);
        };

        let natural_loops = match result {
            Ok(loops) => loops,
            Err(e) => {
                let outcome = ToolOutcome::fail(e.to_string(), start.elapsed());
                let trace = TraceStepBuilder::new("analytics_find_loops", "FindLoops")
                    .duration(start.elapsed())
                    .error(e.to_string())
                    .metadata("attempts", attempt.to_string())
                    .build();
                return (outcome, trace, None);
            }
        };

        let nesting = loops::nest(&natural_loops);
        let mut kept: Vec<(usize, &loops::NaturalLoop)> =
            natural_loops.iter().enumerate().filter(|(_, l)| l.size() >= min_size).collect();
        kept.sort_by(|a, b| b.1.size().cmp(&a.1.size()).then_with(|| ctx.graph.id_at(a.1.header).cmp(ctx.graph.id_at(b.1.header))));
        kept.truncate(top);

        let mut symbols_found = Vec::new();
        let groups: Vec<_> = kept
            .iter()
            .map(|&(i, l)| {
                let header = ctx.graph.id_at(l.header).to_string();
                let mut body: Vec<String> = l.body.iter().map(|&n| ctx.graph.id_at(n).to_string()).collect();
                body.sort();
                symbols_found.push(header.clone());
                let mut obj = serde_json::Map::new();
                obj.insert("header".to_string(), json!(header));
                obj.insert("size".to_string(), json!(l.size()));
                obj.insert("classification".to_string(), json!(l.classify()));
                obj.insert("body".to_string(), json!(body));
                if show_nesting {
                    obj.insert("nested_loop_indices".to_string(), json!(nesting[i]));
                }
                serde_json::Value::Object(obj)
            })
            .collect();

        let text = if groups.is_empty() {
            "no natural loops found".to_string()
        } else {
            format!("{} natural loop(s) found", groups.len())
        };
        let outcome = ToolOutcome::ok(json!({ "loops": groups }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_loops", "FindLoops")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("attempts", attempt.to_string())
            .metadata("min_size", min_size.to_string())
            .metadata("top", top.to_string())
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
    fn classifies_a_three_node_cycle_as_complex() {
        let mut g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        for id in ["entry", "a", "b", "c"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("entry", "a", EdgeType::Calls, loc(0)).unwrap();
        g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("c", "a", EdgeType::Calls, loc(3)).unwrap();
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let params = Params::default();
        let (outcome, _, _) = FindLoops.execute(&ctx, &params);
        let loops = outcome.output["loops"].as_array().unwrap();
        assert_eq!(loops.len(), 1);
        assert_eq!(loops[0]["classification"], "complex_cycle");
    }

    #[test]
    fn empty_graph_yields_no_entry_point_error() {
        let g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let params = Params::default();
        let (outcome, _, _) = FindLoops.execute(&ctx, &params);
        assert!(outcome.success);
        assert_eq!(outcome.output["loops"].as_array().unwrap().len(), 0);
    }
}

//! `check_reducibility()` — spec §4.3.18: T1/T2 interval-collapse
//! reducibility check, delegating to [`crate::analytics::reducibility`].

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::analytics::quality_label;
use crate::cancel::CancelError;
use crate::graph::HierarchicalGraph;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct CheckReducibility;

impl Tool for CheckReducibility {
    fn name(&self) -> &'static str {
        "check_reducibility"
    }

    fn category(&self) -> Category {
        Category::Quality
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Checks whether the call graph collapses to a single node under T1/T2 interval reduction.",
            parameters: vec![super::ParamSpec {
                name: "show_irreducible",
                kind: "bool",
                required: false,
                default: Some(json!(false)),
                min: None,
                max: None,
                enum_values: None,
            }],
            priority: 35,
            capability_tags: &["quality"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to flag irreducible control flow, a signal of goto-like or unstructured jumps.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let show_irreducible = params.bool_or("show_irreducible", false);
        let hg = HierarchicalGraph::new(ctx.graph);
        let (result, analytics_trace) = ctx.analytics.reducibility_with_trace(&hg);

        let mut irreducible: Vec<String> = result.irreducible_region.iter().map(|&n| ctx.graph.id_at(n).to_string()).collect();
        irreducible.sort();

        let label = quality_label(result.score);
        let recommendation = if result.reducible {
            "no action needed; control flow is well-structured".to_string()
        } else {
            format!(
                "unstructured jumps detected in {} node(s); consider restructuring to remove goto-like control flow",
                irreducible.len()
            )
        };

        let symbols_found = irreducible.clone();
        let text = if result.reducible {
            "graph is reducible".to_string()
        } else {
            format!("graph is irreducible; {} node(s) remain after T1/T2 collapse", irreducible.len())
        };
        let mut output = serde_json::Map::new();
        output.insert("is_reducible".to_string(), json!(result.reducible));
        output.insert("score".to_string(), json!(result.score));
        output.insert("quality_label".to_string(), json!(label));
        output.insert("recommendation".to_string(), json!(recommendation));
        if show_irreducible {
            output.insert("irreducible_region".to_string(), json!(irreducible));
        }
        output.insert("summary".to_string(), json!({ "total_nodes": result.total_nodes }));

        let outcome = ToolOutcome::ok(serde_json::Value::Object(output), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_check_reducibility", "CheckReducibility")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("reducible", result.reducible.to_string())
            .metadata("score", format!("{:.4}", result.score))
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
    fn a_dag_is_reducible() {
        let mut g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        for id in ["if", "then", "else", "join"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("if", "then", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("if", "else", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("then", "join", EdgeType::Calls, loc(3)).unwrap();
        g.add_edge("else", "join", EdgeType::Calls, loc(4)).unwrap();
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let params = Params::default();
        let (outcome, _, _) = CheckReducibility.execute(&ctx, &params);
        assert_eq!(outcome.output["is_reducible"], true);
    }

    #[test]
    fn an_irreducible_graph_is_flagged() {
        // Two entries into the same loop body (classic irreducible shape):
        // entry -> a, entry -> b, a -> b, b -> a.
        let mut g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        for id in ["entry", "a", "b"] {
            g.add_node(sym(id)).unwrap();
        }
        let loc = |l| Location { file: "f".into(), line: l };
        g.add_edge("entry", "a", EdgeType::Calls, loc(1)).unwrap();
        g.add_edge("entry", "b", EdgeType::Calls, loc(2)).unwrap();
        g.add_edge("a", "b", EdgeType::Calls, loc(3)).unwrap();
        g.add_edge("b", "a", EdgeType::Calls, loc(4)).unwrap();
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let params = Params::default();
        let (outcome, _, _) = CheckReducibility.execute(&ctx, &params);
        assert_eq!(outcome.output["is_reducible"], false);
    }
}

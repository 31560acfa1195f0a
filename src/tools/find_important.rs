//! `find_important(top=10)` — spec §4.3.11: ranks symbols by PageRank,
//! delegating to [`crate::analytics::pagerank`].

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::HierarchicalGraph;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindImportant;

impl Tool for FindImportant {
    fn name(&self) -> &'static str {
        "find_important"
    }

    fn category(&self) -> Category {
        Category::Analysis
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Ranks symbols by PageRank over the call graph.",
            parameters: vec![super::ParamSpec {
                name: "top",
                kind: "int",
                required: false,
                default: Some(json!(10)),
                min: Some(1.0),
                max: Some(100.0),
                enum_values: None,
            }],
            priority: 55,
            capability_tags: &["analysis"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to find the most globally important symbols, as distinct from the locally-connected hotspots.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let top = params.usize_clamped("top", 10, 1, 100);

        let hg = HierarchicalGraph::new(ctx.graph);
        let (result, analytics_trace) = ctx.analytics.pagerank_with_trace(&hg);
        let ranked = result.ranked(&hg);

        let symbols_found: Vec<String> = ranked.iter().take(top).map(|(n, _)| ctx.graph.id_at(*n).to_string()).collect();
        let results: Vec<_> = ranked
            .iter()
            .take(top)
            .enumerate()
            .map(|(i, (n, score))| json!({ "id": ctx.graph.id_at(*n), "pagerank": score, "rank": i + 1 }))
            .collect();

        let text = format!(
            "top {} symbol(s) by PageRank ({} iteration(s), converged={})",
            results.len(),
            result.iterations,
            result.converged
        );
        let outcome = ToolOutcome::ok(
            json!({ "algorithm": "PageRank", "results": results, "result_count": results.len() }),
            text,
            start.elapsed(),
        );
        let trace = TraceStepBuilder::new("analytics_find_important", "FindImportant")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("iterations", result.iterations.to_string())
            .metadata("converged", result.converged.to_string())
            .metadata("algorithm_duration_ms", analytics_trace.duration.as_millis().to_string())
            .build();
        (outcome, trace, None)
    }
}

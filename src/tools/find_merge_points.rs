//! `find_merge_points(top=20, min_sources=2)` — spec §4.3.16: join points
//! where two or more branches of control flow reconverge, identified as
//! nodes with in-degree >= `min_sources` on the `Calls` subgraph.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::{EdgeType, HierarchicalGraph};
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindMergePoints;

impl Tool for FindMergePoints {
    fn name(&self) -> &'static str {
        "find_merge_points"
    }

    fn category(&self) -> Category {
        Category::Structure
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds nodes where two or more call paths reconverge.",
            parameters: vec![
                super::ParamSpec { name: "top", kind: "int", required: false, default: Some(json!(20)), min: Some(1.0), max: Some(100.0), enum_values: None },
                super::ParamSpec {
                    name: "min_sources",
                    kind: "int",
                    required: false,
                    default: Some(json!(2)),
                    min: Some(2.0),
                    max: Some(1000.0),
                    enum_values: None,
                },
            ],
            priority: 45,
            capability_tags: &["structure"],
            timeout: std::time::Duration::from_secs(15),
            usage_hint: "Use to find join points in the control-flow shape of the call graph.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let top = params.usize_clamped("top", 20, 1, 100);
        let min_sources = params.usize_clamped("min_sources", 2, 2, 1000);

        let hg = HierarchicalGraph::new(ctx.graph);
        let mut merge_points: Vec<(String, usize)> = hg
            .node_indices()
            .filter_map(|node| {
                let preds = hg.in_neighbors_of_type(node, EdgeType::Calls).len();
                (preds >= min_sources).then(|| (ctx.graph.id_at(node).to_string(), preds))
            })
            .collect();
        merge_points.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        merge_points.truncate(top);

        let symbols_found: Vec<String> = merge_points.iter().map(|(id, _)| id.clone()).collect();
        let text = if merge_points.is_empty() {
            "no merge points found".to_string()
        } else {
            format!("{} merge point(s) found", merge_points.len())
        };
        let outcome = ToolOutcome::ok(
            json!({ "merge_points": merge_points.iter().map(|(id, p)| json!({"id": id, "predecessors": p})).collect::<Vec<_>>() }),
            text,
            start.elapsed(),
        );
        let trace = TraceStepBuilder::new("analytics_find_merge_points", "FindMergePoints")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("min_sources", min_sources.to_string())
            .metadata("top", top.to_string())
            .build();
        (outcome, trace, None)
    }
}

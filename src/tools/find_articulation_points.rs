//! `find_articulation_points()` — spec §4.3.13: cut vertices and bridges
//! over the undirected projection, delegating to
//! [`crate::analytics::articulation`].

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::analytics::fragility_level;
use crate::cancel::CancelError;
use crate::graph::HierarchicalGraph;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindArticulationPoints;

impl Tool for FindArticulationPoints {
    fn name(&self) -> &'static str {
        "find_articulation_points"
    }

    fn category(&self) -> Category {
        Category::Structure
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds cut vertices and bridges whose removal disconnects the graph.",
            parameters: vec![
                super::ParamSpec { name: "top", kind: "int", required: false, default: Some(json!(20)), min: Some(1.0), max: Some(100.0), enum_values: None },
                super::ParamSpec { name: "include_bridges", kind: "bool", required: false, default: Some(json!(true)), min: None, max: None, enum_values: None },
            ],
            priority: 60,
            capability_tags: &["structure", "quality"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to find single points of failure in the call graph.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let top = params.usize_clamped("top", 20, 1, 100);
        let include_bridges = params.bool_or("include_bridges", true);

        let hg = HierarchicalGraph::new(ctx.graph);
        let (result, analytics_trace) = ctx.analytics.articulation_with_trace(&hg);

        let mut points: Vec<String> = result.points.iter().map(|&n| ctx.graph.id_at(n).to_string()).collect();
        points.sort();
        points.truncate(top);
        let mut bridges: Vec<_> = result
            .bridges
            .iter()
            .map(|&(a, b)| {
                let mut pair = [ctx.graph.id_at(a).to_string(), ctx.graph.id_at(b).to_string()];
                pair.sort();
                json!({ "a": pair[0], "b": pair[1] })
            })
            .collect();
        bridges.sort_by(|a, b| a["a"].as_str().cmp(&b["a"].as_str()));

        let node_count = ctx.graph.node_count();
        let edge_count = ctx.graph.edge_count();
        let fragility_score = if node_count == 0 { 0.0 } else { result.points.len() as f64 / node_count as f64 };

        let symbols_found = points.clone();
        let text = if include_bridges {
            format!(
                "{} articulation point(s), {} bridge(s), {} connected component(s)",
                points.len(),
                bridges.len(),
                result.total_components
            )
        } else {
            format!("{} articulation point(s), {} connected component(s)", points.len(), result.total_components)
        };
        let mut output = serde_json::Map::new();
        output.insert("articulation_points".to_string(), json!(points));
        if include_bridges {
            output.insert("bridges".to_string(), json!(bridges));
        }
        output.insert("total_components".to_string(), json!(result.total_components));
        output.insert("node_count".to_string(), json!(node_count));
        output.insert("edge_count".to_string(), json!(edge_count));
        output.insert("fragility_score".to_string(), json!(fragility_score));
        output.insert("fragility_level".to_string(), json!(fragility_level(fragility_score)));

        let outcome = ToolOutcome::ok(serde_json::Value::Object(output), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_articulation_points", "FindArticulationPoints")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("total_components", result.total_components.to_string())
            .metadata("fragility_score", format!("{fragility_score:.4}"))
            .metadata("algorithm_duration_ms", analytics_trace.duration.as_millis().to_string())
            .build();
        (outcome, trace, None)
    }
}

//! `find_extractable_regions(min_size=2)` — spec §4.3.17: single-entry
//! single-exit regions, candidates for extraction into a named symbol,
//! delegating to [`crate::analytics::sese`].

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::HierarchicalGraph;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindExtractableRegions;

impl Tool for FindExtractableRegions {
    fn name(&self) -> &'static str {
        "find_extractable_regions"
    }

    fn category(&self) -> Category {
        Category::Quality
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds single-entry single-exit regions that could be extracted into their own symbol.",
            parameters: vec![
                super::ParamSpec { name: "min_size", kind: "int", required: false, default: Some(json!(2)), min: Some(1.0), max: Some(1000.0), enum_values: None },
                super::ParamSpec { name: "max_size", kind: "int", required: false, default: Some(json!(1000)), min: Some(1.0), max: Some(100000.0), enum_values: None },
                super::ParamSpec { name: "top", kind: "int", required: false, default: Some(json!(20)), min: Some(1.0), max: Some(100.0), enum_values: None },
            ],
            priority: 40,
            capability_tags: &["quality"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to find refactoring candidates with a clean single entry and exit.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let min_size = params.usize_clamped("min_size", 2, 1, 1000);
        let max_size = params.usize_clamped("max_size", 1000, 1, 100000);
        let top = params.usize_clamped("top", 20, 1, 100);

        let hg = HierarchicalGraph::new(ctx.graph);
        let (result, analytics_trace) = ctx.analytics.sese_regions_with_trace(&hg);

        let regions = match result {
            Ok(regions) => regions,
            Err(e) => {
                let outcome = ToolOutcome::fail(e.to_string(), start.elapsed());
                let trace = TraceStepBuilder::new("analytics_find_extractable_regions", "FindExtractableRegions")
                    .duration(start.elapsed())
                    .error(e.to_string())
                    .build();
                return (outcome, trace, None);
            }
        };

        let mut symbols_found = Vec::new();
        let mut groups: Vec<_> = regions
            .iter()
            .filter(|r| r.size() >= min_size && r.size() <= max_size)
            .enumerate()
            .map(|(i, r)| {
                let entry = ctx.graph.id_at(r.entry).to_string();
                let exit = ctx.graph.id_at(r.exit).to_string();
                let mut body: Vec<String> = r.body.iter().map(|&n| ctx.graph.id_at(n).to_string()).collect();
                body.sort();
                symbols_found.push(entry.clone());
                symbols_found.push(exit.clone());
                json!({ "id": i, "entry": entry, "exit": exit, "size": r.size(), "body": body })
            })
            .collect();
        groups.sort_by(|a, b| {
            b["size"].as_u64().cmp(&a["size"].as_u64()).then_with(|| a["entry"].as_str().cmp(&b["entry"].as_str()))
        });
        groups.truncate(top);
        for (i, g) in groups.iter_mut().enumerate() {
            g["id"] = json!(i);
        }

        let text = if groups.is_empty() {
            "no extractable regions found".to_string()
        } else {
            format!("{} extractable region(s) found", groups.len())
        };
        let outcome = ToolOutcome::ok(json!({ "regions": groups }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_extractable_regions", "FindExtractableRegions")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("min_size", min_size.to_string())
            .metadata("max_size", max_size.to_string())
            .metadata("top", top.to_string())
            .metadata("algorithm_duration_ms", analytics_trace.duration.as_millis().to_string())
            .build();
        (outcome, trace, None)
    }
}

//! `find_callers(name, limit=50)` — spec §4.3.1.

use super::{resolve_symbol_nodes, start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::EdgeType;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindCallers;

impl Tool for FindCallers {
    fn name(&self) -> &'static str {
        "find_callers"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds all symbols that call a named symbol.",
            parameters: vec![
                super::ParamSpec { name: "name", kind: "string", required: true, default: None, min: None, max: None, enum_values: None },
                super::ParamSpec { name: "limit", kind: "int", required: false, default: Some(json!(50)), min: Some(1.0), max: Some(1000.0), enum_values: None },
            ],
            priority: 90,
            capability_tags: &["call-graph", "navigation"],
            timeout: std::time::Duration::from_secs(10),
            usage_hint: "Use to answer 'who calls X?'. Avoid for interface implementers (use find_implementations).",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let Some(name) = params.string("name") else {
            let outcome = ToolOutcome::fail("missing required parameter: name", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_callers", "FindCallers").duration(start.elapsed()).error("missing required parameter: name").build();
            return (outcome, trace, None);
        };
        let limit = params.usize_clamped("limit", 50, 1, 1000);

        if ctx.token.check().is_err() {
            let outcome = ToolOutcome::fail("cancelled", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_callers", "FindCallers").target(name).duration(start.elapsed()).build();
            return (outcome, trace, Some(CancelError));
        }

        let targets = resolve_symbol_nodes(ctx, &name);
        let mut groups = Vec::new();
        let mut symbols_found = Vec::new();

        for &target in &targets {
            let mut callers: Vec<_> = ctx
                .graph
                .in_edges_of(target)
                .into_iter()
                .filter(|(_, rec)| rec.edge_type == EdgeType::Calls)
                .map(|(from, _)| ctx.graph.symbol_at(from).id.clone())
                .collect();
            callers.sort();
            callers.dedup();
            callers.truncate(limit);
            if callers.is_empty() {
                continue;
            }
            symbols_found.extend(callers.iter().cloned());
            groups.push(json!({
                "target": ctx.graph.symbol_at(target).id,
                "callers": callers,
            }));
        }

        let text = if groups.is_empty() {
            format!("no callers found for '{name}'")
        } else {
            format!("found callers for {} matching target(s) of '{name}'", groups.len())
        };

        let outcome = ToolOutcome::ok(json!({ "groups": groups }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_callers", "FindCallers")
            .target(name)
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("limit", limit.to_string())
            .build();
        (outcome, trace, None)
    }
}

//! `find_callees(name)` — spec §4.3.2.
//!
//! Symmetric to [`super::find_callers`] but walking outgoing `Calls` edges.
//! Output separates `resolved_callees` (edges landing on an in-graph node)
//! from `external_callees`; since this crate's [`crate::graph::Graph`] edge
//! model only ever connects two in-graph `NodeIndex`es, `external_callees`
//! is always empty (spec §9 Open Question, resolved in DESIGN.md).

use super::{resolve_symbol_nodes, start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::EdgeType;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindCallees;

impl Tool for FindCallees {
    fn name(&self) -> &'static str {
        "find_callees"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds all symbols called by a named symbol.",
            parameters: vec![super::ParamSpec {
                name: "name",
                kind: "string",
                required: true,
                default: None,
                min: None,
                max: None,
                enum_values: None,
            }],
            priority: 90,
            capability_tags: &["call-graph", "navigation"],
            timeout: std::time::Duration::from_secs(10),
            usage_hint: "Use to answer 'what does X call?'. Avoid for reverse lookups (use find_callers).",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let Some(name) = params.string("name") else {
            let outcome = ToolOutcome::fail("missing required parameter: name", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_callees", "FindCallees")
                .duration(start.elapsed())
                .error("missing required parameter: name")
                .build();
            return (outcome, trace, None);
        };

        if ctx.token.check().is_err() {
            let outcome = ToolOutcome::fail("cancelled", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_callees", "FindCallees").target(name).duration(start.elapsed()).build();
            return (outcome, trace, Some(CancelError));
        }

        let sources = resolve_symbol_nodes(ctx, &name);
        let mut resolved_callees: Vec<String> = Vec::new();
        let external_callees: Vec<String> = Vec::new();
        let mut symbols_found = Vec::new();

        for &source in &sources {
            let mut callees: Vec<_> = ctx
                .graph
                .out_edges_of(source)
                .into_iter()
                .filter(|(_, rec)| rec.edge_type == EdgeType::Calls)
                .map(|(to, _)| ctx.graph.symbol_at(to).id.clone())
                .collect();
            callees.sort();
            callees.dedup();
            symbols_found.extend(callees.iter().cloned());
            resolved_callees.extend(callees);
        }
        resolved_callees.sort();
        resolved_callees.dedup();

        let text = if resolved_callees.is_empty() {
            format!("'{name}' calls nothing resolvable in this graph")
        } else {
            format!("'{name}' calls {} resolved symbol(s)", resolved_callees.len())
        };

        let outcome = ToolOutcome::ok(
            json!({ "resolved_callees": resolved_callees, "external_callees": external_callees }),
            text,
            start.elapsed(),
        );
        let trace = TraceStepBuilder::new("analytics_find_callees", "FindCallees")
            .target(name)
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .build();
        (outcome, trace, None)
    }
}

//! `find_implementations(interface_name, limit=50)` — spec §4.3.3.

use super::{resolve_symbol_nodes, start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::EdgeType;
use crate::symbol::SymbolKind;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindImplementations;

impl Tool for FindImplementations {
    fn name(&self) -> &'static str {
        "find_implementations"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds all symbols implementing a named interface.",
            parameters: vec![
                super::ParamSpec { name: "interface_name", kind: "string", required: true, default: None, min: None, max: None, enum_values: None },
                super::ParamSpec { name: "limit", kind: "int", required: false, default: Some(json!(50)), min: Some(1.0), max: Some(1000.0), enum_values: None },
            ],
            priority: 85,
            capability_tags: &["call-graph", "navigation"],
            timeout: std::time::Duration::from_secs(10),
            usage_hint: "Use to answer 'who implements interface X?'. Avoid for call-graph queries.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let Some(interface_name) = params.string("interface_name") else {
            let outcome = ToolOutcome::fail("missing required parameter: interface_name", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_implementations", "FindImplementations")
                .duration(start.elapsed())
                .error("missing required parameter: interface_name")
                .build();
            return (outcome, trace, None);
        };
        let limit = params.usize_clamped("limit", 50, 1, 1000);

        let matches = resolve_symbol_nodes(ctx, &interface_name);
        let interfaces: Vec<_> = matches
            .into_iter()
            .filter(|&n| {
                let is_iface = ctx.graph.symbol_at(n).kind == SymbolKind::Interface;
                if !is_iface {
                    tracing::debug!(symbol = %ctx.graph.symbol_at(n).id, "dropping non-interface match for find_implementations");
                }
                is_iface
            })
            .collect();

        if interfaces.is_empty() {
            let outcome = ToolOutcome::ok(
                json!({ "groups": [] }),
                format!("no interface named '{interface_name}' found; the index is complete"),
                start.elapsed(),
            );
            let trace = TraceStepBuilder::new("analytics_find_implementations", "FindImplementations")
                .target(interface_name)
                .duration(start.elapsed())
                .build();
            return (outcome, trace, None);
        }

        let mut groups = Vec::new();
        let mut symbols_found = Vec::new();
        for &target in &interfaces {
            let mut implementers: Vec<_> = ctx
                .graph
                .in_edges_of(target)
                .into_iter()
                .filter(|(_, rec)| rec.edge_type == EdgeType::Implements)
                .map(|(from, _)| ctx.graph.symbol_at(from).id.clone())
                .collect();
            implementers.sort();
            implementers.dedup();
            implementers.truncate(limit);
            symbols_found.extend(implementers.iter().cloned());
            groups.push(json!({
                "interface": ctx.graph.symbol_at(target).id,
                "implementers": implementers,
            }));
        }

        let text = format!("found implementers for {} interface(s) matching '{interface_name}'", groups.len());
        let outcome = ToolOutcome::ok(json!({ "groups": groups }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_implementations", "FindImplementations")
            .target(interface_name)
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("limit", limit.to_string())
            .build();
        (outcome, trace, None)
    }
}

//! `find_dead_code(include_exported=false, package=?)` — spec §4.3.8: nodes
//! with zero incoming `Calls`+`References` edges.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::EdgeType;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindDeadCode;

impl Tool for FindDeadCode {
    fn name(&self) -> &'static str {
        "find_dead_code"
    }

    fn category(&self) -> Category {
        Category::Quality
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds symbols with zero incoming Calls/References edges.",
            parameters: vec![
                super::ParamSpec { name: "include_exported", kind: "bool", required: false, default: Some(json!(false)), min: None, max: None, enum_values: None },
                super::ParamSpec { name: "package", kind: "string", required: false, default: None, min: None, max: None, enum_values: None },
            ],
            priority: 65,
            capability_tags: &["quality"],
            timeout: std::time::Duration::from_secs(15),
            usage_hint: "Use to find unreferenced symbols. By default only unexported ones are reported.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let include_exported = params.bool_or("include_exported", false);
        let package = params.string("package");

        let mut candidates: Vec<petgraph::graph::NodeIndex> = match &package {
            Some(pkg) => ctx.index.get_by_package(pkg).to_vec(),
            None => ctx.graph.nodes().map(|(n, _)| n).collect(),
        };
        candidates.retain(|&n| {
            let sym = ctx.graph.symbol_at(n);
            if sym.exported && !include_exported {
                return false;
            }
            let referenced = ctx
                .graph
                .in_edges_of(n)
                .into_iter()
                .any(|(_, rec)| matches!(rec.edge_type, EdgeType::Calls | EdgeType::References));
            !referenced
        });

        let mut ids: Vec<String> = candidates.iter().map(|&n| ctx.graph.symbol_at(n).id.clone()).collect();
        ids.sort();

        let text = if ids.is_empty() {
            "no dead code found".to_string()
        } else {
            format!("{} unreferenced symbol(s) found", ids.len())
        };
        let symbols_found = ids.clone();
        let outcome = ToolOutcome::ok(json!({ "dead_code": ids }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_dead_code", "FindDeadCode")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("include_exported", include_exported.to_string())
            .build();
        (outcome, trace, None)
    }
}

//! `find_references(symbol_name)` — spec §4.3.6: all edges whose `to_id`
//! resolves to a matched symbol, any edge type, grouped by type.

use super::{resolve_symbol_nodes, start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::trace::TraceStepBuilder;
use serde_json::json;
use std::collections::HashMap;

pub struct FindReferences;

impl Tool for FindReferences {
    fn name(&self) -> &'static str {
        "find_references"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds every edge referencing a symbol, of any edge type, grouped by type.",
            parameters: vec![super::ParamSpec { name: "symbol_name", kind: "string", required: true, default: None, min: None, max: None, enum_values: None }],
            priority: 70,
            capability_tags: &["navigation"],
            timeout: std::time::Duration::from_secs(10),
            usage_hint: "Use for a broad 'who references X' sweep across all edge types.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let Some(name) = params.string("symbol_name") else {
            let outcome = ToolOutcome::fail("missing required parameter: symbol_name", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_references", "FindReferences")
                .duration(start.elapsed())
                .error("missing required parameter: symbol_name")
                .build();
            return (outcome, trace, None);
        };

        if ctx.token.check().is_err() {
            let outcome = ToolOutcome::fail("cancelled", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_references", "FindReferences").target(name).duration(start.elapsed()).build();
            return (outcome, trace, Some(CancelError));
        }

        let targets = resolve_symbol_nodes(ctx, &name);
        let mut by_type: HashMap<&'static str, Vec<String>> = HashMap::new();
        let mut symbols_found = Vec::new();

        for &target in &targets {
            for (from, rec) in ctx.graph.in_edges_of(target) {
                let from_id = ctx.graph.symbol_at(from).id.clone();
                symbols_found.push(from_id.clone());
                by_type.entry(rec.edge_type.as_str()).or_default().push(from_id);
            }
        }
        for refs in by_type.values_mut() {
            refs.sort();
            refs.dedup();
        }
        symbols_found.sort();
        symbols_found.dedup();

        let total: usize = by_type.values().map(Vec::len).sum();
        let text = if total == 0 {
            format!("no references found for '{name}'")
        } else {
            format!("found {total} reference(s) across {} edge type(s) for '{name}'", by_type.len())
        };

        let grouped: serde_json::Map<String, serde_json::Value> =
            by_type.into_iter().map(|(k, v)| (k.to_string(), json!(v))).collect();
        let outcome = ToolOutcome::ok(json!({ "by_edge_type": grouped }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_references", "FindReferences")
            .target(name)
            .duration(start.elapsed())
            .symbols_found(symbols_found)
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
        Symbol {
            id: id.to_string(),
            name: id.to_string(),
            kind: SymbolKind::Function,
            file_path: "f.go".into(),
            start_line: 1,
            end_line: 2,
            package: "p".into(),
            signature: None,
            exported: true,
            language: "go".into(),
        }
    }

    #[test]
    fn groups_references_by_edge_type() {
        let mut g = Graph::new("/repo");
        let mut idx = SymbolIndex::new();
        for id in ["a", "b", "target"] {
            let s = sym(id);
            let n = g.add_node(s.clone()).unwrap();
            idx.add(&s, n).unwrap();
        }
        g.add_edge("a", "target", EdgeType::Calls, Location { file: "f".into(), line: 1 }).unwrap();
        g.add_edge("b", "target", EdgeType::References, Location { file: "f".into(), line: 2 }).unwrap();
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let mut map = std::collections::HashMap::new();
        map.insert("symbol_name".to_string(), json!("target"));
        let params = Params::new(map);

        let (outcome, _, _) = FindReferences.execute(&ctx, &params);
        assert!(outcome.success);
        assert!(outcome.output["by_edge_type"]["calls"].is_array());
        assert!(outcome.output["by_edge_type"]["references"].is_array());
    }
}

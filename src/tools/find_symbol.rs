//! `find_symbol(name, kind=all, package=?)` — spec §4.3.4.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::symbol::SymbolKind;
use crate::trace::TraceStepBuilder;
use serde_json::json;
use std::time::Duration;

pub struct FindSymbol;

const FUZZY_BUDGET: usize = 2000;

impl Tool for FindSymbol {
    fn name(&self) -> &'static str {
        "find_symbol"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Resolves a symbol by exact or fuzzy name, optionally filtered by kind/package.",
            parameters: vec![
                super::ParamSpec { name: "name", kind: "string", required: true, default: None, min: None, max: None, enum_values: None },
                super::ParamSpec { name: "kind", kind: "string-enum", required: false, default: Some(json!("all")), min: None, max: None, enum_values: None },
                super::ParamSpec { name: "package", kind: "string", required: false, default: None, min: None, max: None, enum_values: None },
            ],
            priority: 80,
            capability_tags: &["navigation"],
            timeout: std::time::Duration::from_secs(5),
            usage_hint: "Use to resolve an ambiguous or partially-remembered symbol name.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let Some(name) = params.string("name") else {
            let outcome = ToolOutcome::fail("missing required parameter: name", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_symbol", "FindSymbol")
                .duration(start.elapsed())
                .error("missing required parameter: name")
                .build();
            return (outcome, trace, None);
        };
        let kind_filter = params.string("kind").filter(|k| k != "all").map(|k| SymbolKind::parse_or_unknown(&k));
        let package_filter = params.string("package");

        let exact = ctx.index.get_by_name(&name);
        let mut fuzzy_used = false;
        let mut candidate_ids: Vec<String> = if !exact.is_empty() {
            exact.iter().map(|&n| ctx.graph.symbol_at(n).id.clone()).collect()
        } else {
            match ctx.index.search(ctx.graph, &name, FUZZY_BUDGET, &ctx.token) {
                Ok(hits) => {
                    fuzzy_used = true;
                    hits.into_iter().map(|h| h.id).collect()
                }
                Err(e) => {
                    let outcome = ToolOutcome::fail("cancelled", start.elapsed());
                    let trace = TraceStepBuilder::new("analytics_find_symbol", "FindSymbol")
                        .target(name)
                        .duration(start.elapsed())
                        .build();
                    return (outcome, trace, Some(e));
                }
            }
        };

        candidate_ids.retain(|id| {
            let Some(sym) = ctx.graph.get_node(id) else { return false };
            if let Some(kind) = kind_filter {
                if sym.kind != kind {
                    return false;
                }
            }
            if let Some(ref pkg) = package_filter {
                if &sym.package != pkg {
                    return false;
                }
            }
            true
        });
        candidate_ids.sort();
        candidate_ids.dedup();

        let mut text = if candidate_ids.is_empty() {
            format!("no symbol matching '{name}' found")
        } else if fuzzy_used {
            format!("fuzzy match: {} candidate(s) for '{name}'", candidate_ids.len())
        } else {
            format!("{} exact match(es) for '{name}'", candidate_ids.len())
        };
        if fuzzy_used && !candidate_ids.is_empty() {
            text = format!("\u{26A0} {text}");
        }

        let symbols_found = candidate_ids.clone();
        let outcome = ToolOutcome::ok(json!({ "symbols": candidate_ids, "fuzzy": fuzzy_used }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_symbol", "FindSymbol")
            .target(name)
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("fuzzy", fuzzy_used.to_string())
            .build();
        (outcome, trace, None)
    }
}

/// Time budget quoted by spec §4.3.4, enforced via cancellation tokens the
/// tool registry constructs with `CancellationToken::with_timeout`.
pub const FUZZY_TIME_BUDGET: Duration = Duration::from_secs(2);

//! `explore_package(package, include_private, include_dependencies,
//! include_dependents, max_symbols=20)` — spec §4.3.19: orients within a
//! package by categorizing its symbols, inferring a one-line purpose per
//! symbol from naming conventions, and optionally listing cross-package
//! dependency/dependent edges.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::{EdgeType, HierarchicalGraph};
use crate::symbol::SymbolKind;
use crate::trace::TraceStepBuilder;
use serde_json::json;
use std::collections::BTreeSet;

pub struct ExplorePackage;

/// One-line purpose inferred from a symbol's name, the way a reader
/// skimming an unfamiliar package would guess at intent from naming
/// convention alone.
fn infer_purpose(name: &str, kind: SymbolKind) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.starts_with("new") || lower.starts_with("create") || lower.starts_with("make") {
        return "constructs a new instance";
    }
    if lower.starts_with("is") || lower.starts_with("has") || lower.starts_with("can") {
        return "predicate / boolean check";
    }
    if lower.starts_with("get") || lower.starts_with("find") || lower.starts_with("lookup") {
        return "accessor / lookup";
    }
    if lower.starts_with("set") || lower.starts_with("update") {
        return "mutator";
    }
    if lower.starts_with("validate") || lower.starts_with("check") {
        return "validation";
    }
    if lower.ends_with("handler") || lower.ends_with("controller") {
        return "request/event handler";
    }
    if lower.ends_with("error") || lower.ends_with("err") {
        return "error type";
    }
    match kind {
        SymbolKind::Interface => "behavioral contract",
        SymbolKind::Constant => "named constant",
        SymbolKind::Variable => "package-level state",
        _ => "general-purpose symbol",
    }
}

fn category_of(kind: SymbolKind) -> Option<&'static str> {
    match kind {
        SymbolKind::Type | SymbolKind::Struct | SymbolKind::Class | SymbolKind::Enum => Some("types"),
        SymbolKind::Function | SymbolKind::Method => Some("functions"),
        SymbolKind::Interface => Some("interfaces"),
        SymbolKind::Constant => Some("constants"),
        SymbolKind::Variable => Some("variables"),
        SymbolKind::Package | SymbolKind::Import | SymbolKind::Unknown => None,
    }
}

impl Tool for ExplorePackage {
    fn name(&self) -> &'static str {
        "explore_package"
    }

    fn category(&self) -> Category {
        Category::Navigation
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Categorizes a package's symbols, infers their purpose, and lists cross-package dependencies.",
            parameters: vec![
                super::ParamSpec { name: "package", kind: "string", required: true, default: None, min: None, max: None, enum_values: None },
                super::ParamSpec { name: "include_private", kind: "bool", required: false, default: Some(json!(false)), min: None, max: None, enum_values: None },
                super::ParamSpec { name: "include_dependencies", kind: "bool", required: false, default: Some(json!(false)), min: None, max: None, enum_values: None },
                super::ParamSpec { name: "include_dependents", kind: "bool", required: false, default: Some(json!(false)), min: None, max: None, enum_values: None },
                super::ParamSpec { name: "max_symbols", kind: "int", required: false, default: Some(json!(20)), min: Some(1.0), max: Some(500.0), enum_values: None },
            ],
            priority: 55,
            capability_tags: &["navigation"],
            timeout: std::time::Duration::from_secs(10),
            usage_hint: "Use to orient within an unfamiliar package: what it contains, what each symbol is likely for, and what it connects to.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let Some(package) = params.string("package") else {
            let outcome = ToolOutcome::fail("missing required parameter: package", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_explore_package", "ExplorePackage")
                .duration(start.elapsed())
                .error("missing required parameter: package")
                .build();
            return (outcome, trace, None);
        };
        let include_private = params.bool_or("include_private", false);
        let include_dependencies = params.bool_or("include_dependencies", false);
        let include_dependents = params.bool_or("include_dependents", false);
        let max_symbols = params.usize_clamped("max_symbols", 20, 1, 500);

        let nodes = ctx.index.get_by_package(&package);
        if nodes.is_empty() {
            let text = format!("no package named '{package}' in the index; the index is complete");
            let outcome = ToolOutcome::ok(
                json!({ "types": [], "functions": [], "interfaces": [], "constants": [], "variables": [] }),
                text,
                start.elapsed(),
            );
            let trace = TraceStepBuilder::new("analytics_explore_package", "ExplorePackage").target(package).duration(start.elapsed()).build();
            return (outcome, trace, None);
        }

        let mut candidates: Vec<_> = nodes
            .iter()
            .filter(|&&n| include_private || ctx.graph.symbol_at(n).exported)
            .collect();
        candidates.sort_by_key(|&&n| ctx.graph.id_at(n).to_string());
        let total_matching = candidates.len();
        candidates.truncate(max_symbols);

        let mut categories: std::collections::HashMap<&'static str, Vec<serde_json::Value>> = std::collections::HashMap::new();
        let mut symbols_found = Vec::new();
        for &&n in &candidates {
            let s = ctx.graph.symbol_at(n);
            symbols_found.push(s.id.clone());
            let Some(cat) = category_of(s.kind) else { continue };
            categories.entry(cat).or_default().push(json!({
                "id": s.id,
                "name": s.name,
                "kind": s.kind.as_str(),
                "exported": s.exported,
                "signature": s.signature,
                "purpose": infer_purpose(&s.name, s.kind),
            }));
        }

        let hg = HierarchicalGraph::new(ctx.graph);
        let member_set: BTreeSet<_> = nodes.iter().copied().collect();

        let mut output = serde_json::Map::new();
        for cat in ["types", "functions", "interfaces", "constants", "variables"] {
            output.insert(cat.to_string(), json!(categories.remove(cat).unwrap_or_default()));
        }
        output.insert("total_symbols".to_string(), json!(total_matching));
        output.insert("truncated".to_string(), json!(total_matching > candidates.len()));

        if include_dependencies {
            let mut deps = BTreeSet::new();
            for &n in &nodes {
                for succ in hg.out_neighbors(n) {
                    if !member_set.contains(&succ) {
                        deps.insert(ctx.graph.symbol_at(succ).package.clone());
                    }
                }
            }
            output.insert("dependencies".to_string(), json!(deps.into_iter().collect::<Vec<_>>()));
        }
        if include_dependents {
            let mut dependents = BTreeSet::new();
            for &n in &nodes {
                for pred in hg.in_neighbors(n) {
                    if !member_set.contains(&pred) {
                        dependents.insert(ctx.graph.symbol_at(pred).package.clone());
                    }
                }
            }
            output.insert("dependents".to_string(), json!(dependents.into_iter().collect::<Vec<_>>()));
        }

        let text = format!("{total_matching} symbol(s) in package '{package}' ({} shown)", candidates.len());
        let outcome = ToolOutcome::ok(serde_json::Value::Object(output), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_explore_package", "ExplorePackage")
            .target(package)
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("total_symbols", total_matching.to_string())
            .build();
        (outcome, trace, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::GraphAnalytics;
    use crate::graph::{Graph, SymbolIndex};
    use crate::symbol::Symbol;

    fn sym(id: &str, package: &str, kind: SymbolKind, exported: bool) -> Symbol {
        Symbol { id: id.to_string(), name: id.to_string(), kind, file_path: "f.go".into(), start_line: 1, end_line: 2, package: package.to_string(), signature: None, exported, language: "go".into() }
    }

    #[test]
    fn categorizes_symbols_and_infers_purpose() {
        let mut g = Graph::new("/repo");
        let mut idx = SymbolIndex::new();
        for (id, kind) in [("NewWidget", SymbolKind::Function), ("Widget", SymbolKind::Struct), ("IsReady", SymbolKind::Function)] {
            let s = sym(id, "pkg/a", kind, true);
            let n = g.add_node(s.clone()).unwrap();
            idx.add(&s, n).unwrap();
        }
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let mut map = std::collections::HashMap::new();
        map.insert("package".to_string(), json!("pkg/a"));
        let params = Params::new(map);

        let (outcome, _, _) = ExplorePackage.execute(&ctx, &params);
        let functions = outcome.output["functions"].as_array().unwrap();
        let types = outcome.output["types"].as_array().unwrap();
        assert_eq!(functions.len(), 2);
        assert_eq!(types.len(), 1);
        let new_widget = functions.iter().find(|f| f["id"] == "NewWidget").unwrap();
        assert_eq!(new_widget["purpose"], "constructs a new instance");
    }

    #[test]
    fn private_symbols_excluded_by_default() {
        let mut g = Graph::new("/repo");
        let mut idx = SymbolIndex::new();
        for (id, exported) in [("Public", true), ("private", false)] {
            let s = sym(id, "pkg/a", SymbolKind::Function, exported);
            let n = g.add_node(s.clone()).unwrap();
            idx.add(&s, n).unwrap();
        }
        g.freeze();

        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let mut map = std::collections::HashMap::new();
        map.insert("package".to_string(), json!("pkg/a"));
        let params = Params::new(map);

        let (outcome, _, _) = ExplorePackage.execute(&ctx, &params);
        assert_eq!(outcome.output["total_symbols"], 1);
    }

    #[test]
    fn unknown_package_is_definitive() {
        let g = Graph::new("/repo");
        let idx = SymbolIndex::new();
        let analytics = GraphAnalytics::new();
        let ctx = ToolContext::new(&g, &idx, &analytics);
        let mut map = std::collections::HashMap::new();
        map.insert("package".to_string(), json!("missing/pkg"));
        let params = Params::new(map);

        let (outcome, _, _) = ExplorePackage.execute(&ctx, &params);
        assert!(outcome.success);
        assert_eq!(outcome.output["types"].as_array().unwrap().len(), 0);
    }
}

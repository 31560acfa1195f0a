//! `find_control_dependencies(target, depth=5)` — spec §4.3.15: branches a
//! symbol's execution is conditioned on, via
//! [`crate::analytics::control_dependence`].
//!
//! When the post-dominator tree can't be built (no reachable exit),
//! degrades to reporting dominator-tree ancestors up to `depth`, as an
//! approximate substitute rather than failing the call outright (spec
//! §4.3.15 degrade note).

use super::{resolve_symbol_nodes, start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::HierarchicalGraph;
use crate::trace::TraceStepBuilder;
use serde_json::json;

pub struct FindControlDependencies;

impl Tool for FindControlDependencies {
    fn name(&self) -> &'static str {
        "find_control_dependencies"
    }

    fn category(&self) -> Category {
        Category::Analysis
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Finds which branches a symbol's execution is control-dependent on.",
            parameters: vec![
                super::ParamSpec { name: "target", kind: "string", required: true, default: None, min: None, max: None, enum_values: None },
                super::ParamSpec { name: "depth", kind: "int", required: false, default: Some(json!(5)), min: Some(1.0), max: Some(10.0), enum_values: None },
            ],
            priority: 45,
            capability_tags: &["analysis"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to find the conditions under which a symbol executes.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let Some(name) = params.string("target") else {
            let outcome = ToolOutcome::fail("missing required parameter: target", start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_control_dependencies", "FindControlDependencies")
                .duration(start.elapsed())
                .error("missing required parameter: target")
                .build();
            return (outcome, trace, None);
        };
        let depth = params.usize_clamped("depth", 5, 1, 10);

        let targets = resolve_symbol_nodes(ctx, &name);
        if targets.is_empty() {
            let text = format!("no symbol named '{name}' in the index; the index is complete");
            let outcome = ToolOutcome::ok(json!({ "dependencies": {} }), text, start.elapsed());
            let trace = TraceStepBuilder::new("analytics_find_control_dependencies", "FindControlDependencies")
                .target(name)
                .duration(start.elapsed())
                .build();
            return (outcome, trace, None);
        }

        let hg = HierarchicalGraph::new(ctx.graph);
        let (result, analytics_trace) = ctx.analytics.control_dependence_with_trace(&hg);

        let (dependencies, approximate) = match result {
            Ok(cd) => {
                let mut map = serde_json::Map::new();
                for &node in &targets {
                    let mut branches: Vec<String> = cd.of(node).iter().map(|&n| ctx.graph.id_at(n).to_string()).collect();
                    branches.sort();
                    map.insert(ctx.graph.id_at(node).to_string(), json!(branches));
                }
                (map, false)
            }
            Err(_) => {
                // No reachable exit: fall back to dominator-tree ancestors
                // as an approximation of what must have already run.
                let (doms, _) = ctx.analytics.dominator_tree_with_trace(&hg, None);
                let mut map = serde_json::Map::new();
                match doms {
                    Ok(tree) => {
                        for &node in &targets {
                            let mut ancestors: Vec<String> = tree
                                .dominators_of(node)
                                .iter()
                                .skip(1)
                                .take(depth)
                                .map(|&n| ctx.graph.id_at(n).to_string())
                                .collect();
                            ancestors.sort();
                            map.insert(ctx.graph.id_at(node).to_string(), json!(ancestors));
                        }
                    }
                    Err(_) => {}
                }
                (map, true)
            }
        };

        let symbols_found: Vec<String> = targets.iter().map(|&n| ctx.graph.id_at(n).to_string()).collect();
        let text = if approximate {
            format!("control dependencies for '{name}' (approximate: no reachable exit, using dominator ancestors)")
        } else {
            format!("control dependencies resolved for '{name}'")
        };
        let outcome = ToolOutcome::ok(json!({ "dependencies": dependencies, "approximate": approximate }), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_control_dependencies", "FindControlDependencies")
            .target(name)
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("approximate", approximate.to_string())
            .metadata("depth", depth.to_string())
            .metadata("algorithm_duration_ms", analytics_trace.duration.as_millis().to_string())
            .build();
        (outcome, trace, None)
    }
}

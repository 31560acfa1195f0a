//! The uniform tool surface every query exposes (spec §4.3): `name()`,
//! `category()`, `definition()`, and `execute(ctx, params)`.
//!
//! Modeled on the `name()`/`execute()` shape the retrieval pack's MCP-style
//! tool layers use (`other_examples/…autoagents-tools-graph_tools.rs`),
//! adapted away from that file's unavailable `autoagents` crate and onto
//! plain Rust types plus this crate's own [`crate::trace::TraceStep`].

pub mod check_reducibility;
pub mod explore_package;
pub mod find_articulation_points;
pub mod find_callees;
pub mod find_callers;
pub mod find_communities;
pub mod find_control_dependencies;
pub mod find_cycles;
pub mod find_dead_code;
pub mod find_extractable_regions;
pub mod find_hotspots;
pub mod find_implementations;
pub mod find_important;
pub mod find_loops;
pub mod find_merge_points;
pub mod find_module_api;
pub mod find_path;
pub mod find_references;
pub mod find_symbol;
pub mod get_call_chain;

use crate::analytics::GraphAnalytics;
use crate::cancel::{CancelError, CancellationToken};
use crate::graph::{Graph, HierarchicalGraph, SymbolIndex};
use crate::trace::TraceStep;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Grouping used by a tool registry / UI to organize the 20 tools (spec §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Navigation,
    Analysis,
    Structure,
    Quality,
}

/// A single declared parameter's shape, surfaced to callers so they can
/// validate before calling (spec §4.3 "parameter schema with
/// types/defaults/enum").
#[derive(Debug, Clone, serde::Serialize)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: &'static str,
    pub required: bool,
    pub default: Option<Value>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub enum_values: Option<&'static [&'static str]>,
}

/// Static metadata returned by `Tool::definition()`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParamSpec>,
    pub priority: u8,
    pub capability_tags: &'static [&'static str],
    pub timeout: Duration,
    pub usage_hint: &'static str,
}

/// Everything a tool needs to run: the frozen graph, its index, the
/// analytics facade, and a cancellation token scoped to this call.
pub struct ToolContext<'g> {
    pub graph: &'g Graph,
    pub index: &'g SymbolIndex,
    pub analytics: &'g GraphAnalytics,
    pub token: CancellationToken,
}

impl<'g> ToolContext<'g> {
    pub fn new(graph: &'g Graph, index: &'g SymbolIndex, analytics: &'g GraphAnalytics) -> Self {
        Self { graph, index, analytics, token: CancellationToken::none() }
    }

    pub fn with_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    pub fn hierarchical(&self) -> HierarchicalGraph<'g> {
        HierarchicalGraph::new(self.graph)
    }
}

/// Loosely-typed parameter map every tool's `execute` receives, with
/// clamping helpers matching spec §4.3 ("out-of-range numerics are clamped
/// silently with a warning log; unknown enum values fall back to the
/// default").
#[derive(Debug, Clone, Default)]
pub struct Params(pub HashMap<String, Value>);

impl Params {
    pub fn new(map: HashMap<String, Value>) -> Self {
        Self(map)
    }

    pub fn string(&self, key: &str) -> Option<String> {
        self.0.get(key).and_then(|v| v.as_str()).map(str::to_string)
    }

    pub fn bool_or(&self, key: &str, default: bool) -> bool {
        self.0.get(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    /// Reads an integer parameter, clamping to `[min, max]` and logging a
    /// warning if clamping occurred (spec §4.3).
    pub fn usize_clamped(&self, key: &str, default: usize, min: usize, max: usize) -> usize {
        let raw = self.0.get(key).and_then(|v| v.as_u64()).map(|n| n as usize).unwrap_or(default);
        let clamped = raw.clamp(min, max);
        if clamped != raw {
            tracing::warn!(parameter = key, requested = raw, clamped, "parameter clamped to declared bounds");
        }
        clamped
    }

    pub fn f64_clamped(&self, key: &str, default: f64, min: f64, max: f64) -> f64 {
        let raw = self.0.get(key).and_then(|v| v.as_f64()).unwrap_or(default);
        let clamped = raw.clamp(min, max);
        if (clamped - raw).abs() > f64::EPSILON {
            tracing::warn!(parameter = key, requested = raw, clamped, "parameter clamped to declared bounds");
        }
        clamped
    }

    /// Falls back to `default` for any value not present in `allowed`
    /// (spec §4.3 "unknown enum values fall back to the default").
    pub fn enum_or<'a>(&self, key: &str, allowed: &[&'a str], default: &'a str) -> String {
        match self.string(key) {
            Some(value) if allowed.contains(&value.as_str()) => value,
            Some(other) => {
                tracing::warn!(parameter = key, requested = %other, default, "unknown enum value, using default");
                default.to_string()
            }
            None => default.to_string(),
        }
    }
}

/// The `Result` every tool's `execute` produces, distinct from the
/// out-of-band [`CancelError`] (spec §4.3/§7).
#[derive(Debug, Clone, serde::Serialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub output: Value,
    pub output_text: String,
    pub error: String,
    pub tokens_used: usize,
    pub duration: Duration,
}

impl ToolOutcome {
    pub fn ok(output: Value, output_text: String, duration: Duration) -> Self {
        let tokens_used = output_text.len() / 4;
        Self { success: true, output, output_text, error: String::new(), tokens_used, duration }
    }

    pub fn fail(error: impl Into<String>, duration: Duration) -> Self {
        let error = error.into();
        let tokens_used = error.len() / 4;
        Self {
            success: false,
            output: Value::Null,
            output_text: error.clone(),
            error,
            tokens_used,
            duration,
        }
    }
}

/// Starts a wall-clock timer for an `execute` call; every tool constructs
/// one at the top of its implementation so `duration`/`trace_step.duration`
/// agree.
pub fn start_timer() -> Instant {
    Instant::now()
}

/// Every query tool (spec §4.3): name/category/definition are pure
/// metadata, `execute` does the work.
pub trait Tool {
    fn name(&self) -> &'static str;
    fn category(&self) -> Category;
    fn definition(&self) -> ToolDefinition;
    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, TraceStep, Option<CancelError>);
}

/// Resolves `name` through the index; if the index has no entries for it,
/// falls back to an O(V) linear scan over every node (spec §4.3.1's
/// index/fallback consistency requirement — both paths must agree).
pub fn resolve_symbol_nodes(ctx: &ToolContext, name: &str) -> Vec<petgraph::graph::NodeIndex> {
    let indexed = ctx.index.get_by_name(name);
    if !indexed.is_empty() {
        return indexed.to_vec();
    }
    ctx.graph.nodes().filter(|(_, s)| s.name == name).map(|(idx, _)| idx).collect()
}

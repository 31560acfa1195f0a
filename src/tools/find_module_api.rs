//! `find_module_api(community_id?, top=10, min_community_size=3)` — spec
//! §4.3.20: runs Leiden community detection (cached by the graph's
//! `built_at_millis`, per [`crate::analytics::GraphAnalytics`]'s shared
//! LRU), extracts a per-community subgraph, ranks candidate API entry
//! points by external-caller count and dominator-based coverage of the
//! rest of the community.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::{EdgeType, HierarchicalGraph};
use crate::trace::TraceStepBuilder;
use petgraph::algo::dominators::simple_fast;
use petgraph::graph::{DiGraph, NodeIndex};
use serde_json::json;
use std::collections::{HashMap, HashSet};

pub struct FindModuleApi;

/// Coverage of `entry` over its community: the fraction of the community's
/// members reachable (and therefore dominated) from `entry` within the
/// `Calls`-only induced subgraph.
fn coverage_of(members: &[NodeIndex], member_set: &HashSet<NodeIndex>, hg: &HierarchicalGraph, entry: NodeIndex) -> f64 {
    if members.len() <= 1 {
        return 1.0;
    }
    let mut sub = DiGraph::<NodeIndex, ()>::new();
    let mut local_of: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    for &n in members {
        local_of.insert(n, sub.add_node(n));
    }
    for &n in members {
        for succ in hg.out_neighbors_of_type(n, EdgeType::Calls) {
            if member_set.contains(&succ) {
                sub.add_edge(local_of[&n], local_of[&succ], ());
            }
        }
    }
    let local_entry = local_of[&entry];
    let dominators = simple_fast(&sub, local_entry);
    let reachable = sub.node_indices().filter(|&n| dominators.dominators(n).is_some()).count();
    reachable as f64 / members.len() as f64
}

impl Tool for FindModuleApi {
    fn name(&self) -> &'static str {
        "find_module_api"
    }

    fn category(&self) -> Category {
        Category::Structure
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Ranks candidate public API entry points per community by external-caller count and dominator coverage.",
            parameters: vec![
                super::ParamSpec { name: "community_id", kind: "int", required: false, default: None, min: Some(0.0), max: None, enum_values: None },
                super::ParamSpec { name: "top", kind: "int", required: false, default: Some(json!(10)), min: Some(1.0), max: Some(100.0), enum_values: None },
                super::ParamSpec { name: "min_community_size", kind: "int", required: false, default: Some(json!(3)), min: Some(1.0), max: Some(1000.0), enum_values: None },
            ],
            priority: 40,
            capability_tags: &["structure"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to find the likely public API surface of a module inferred from call-graph structure.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let top = params.usize_clamped("top", 10, 1, 100);
        let min_community_size = params.usize_clamped("min_community_size", 3, 1, 1000);
        let community_id = params.0.get("community_id").and_then(|v| v.as_u64()).map(|n| n as usize);

        let hg = HierarchicalGraph::new(ctx.graph);
        let (communities, analytics_trace) = ctx.analytics.communities_with_trace(&hg, 20, 1.0);

        let mut filtered: Vec<Vec<NodeIndex>> =
            communities.communities.iter().filter(|m| m.len() >= min_community_size).cloned().collect();
        filtered.sort_by(|a, b| {
            b.len().cmp(&a.len()).then_with(|| {
                let a_min = a.iter().map(|&n| ctx.graph.id_at(n)).min().unwrap_or("");
                let b_min = b.iter().map(|&n| ctx.graph.id_at(n)).min().unwrap_or("");
                a_min.cmp(b_min)
            })
        });

        if let Some(id) = community_id {
            if id >= filtered.len() {
                let text = format!("no community with id {id} (only {} communities meet min_community_size)", filtered.len());
                let outcome = ToolOutcome::ok(json!({ "community_count": filtered.len(), "candidates": [] }), text, start.elapsed());
                let trace = TraceStepBuilder::new("analytics_find_module_api", "FindModuleApi").duration(start.elapsed()).build();
                return (outcome, trace, None);
            }
            filtered = vec![filtered[id].clone()];
        }

        let mut symbols_found = Vec::new();
        let mut candidates: Vec<_> = Vec::new();
        for (raw_idx, members) in filtered.iter().enumerate() {
            let community_idx = community_id.unwrap_or(raw_idx);
            let member_set: HashSet<NodeIndex> = members.iter().copied().collect();

            let mut sorted_members = members.clone();
            sorted_members.sort_by_key(|&n| ctx.graph.id_at(n).to_string());

            for &n in &sorted_members {
                let external_callers =
                    hg.in_neighbors_of_type(n, EdgeType::Calls).into_iter().filter(|c| !member_set.contains(c)).count();
                if external_callers == 0 {
                    continue;
                }
                let coverage = coverage_of(&sorted_members, &member_set, &hg, n);
                let name = ctx.graph.id_at(n).to_string();
                symbols_found.push(name.clone());
                candidates.push((coverage, external_callers, name, community_idx));
            }
        }

        candidates.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.1.cmp(&a.1))
                .then_with(|| a.2.cmp(&b.2))
        });
        candidates.truncate(top);

        let candidate_objs: Vec<_> = candidates
            .iter()
            .map(|(coverage, external_callers, name, community_idx)| {
                json!({
                    "id": name,
                    "name": name,
                    "community_id": community_idx,
                    "external_callers": external_callers,
                    "coverage": coverage,
                })
            })
            .collect();

        let text = format!("{} API candidate(s) across {} community/communities", candidate_objs.len(), filtered.len());
        let outcome = ToolOutcome::ok(
            json!({ "community_count": filtered.len(), "candidates": candidate_objs }),
            text,
            start.elapsed(),
        );
        let trace = TraceStepBuilder::new("analytics_find_module_api", "FindModuleApi")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("community_count", filtered.len().to_string())
            .metadata("algorithm_duration_ms", analytics_trace.duration.as_millis().to_string())
            .build();
        (outcome, trace, None)
    }
}

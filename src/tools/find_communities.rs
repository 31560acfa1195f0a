//! `find_communities(min_size=2, resolution=1.0, top=10, show_cross_edges=false)`
//! — spec §4.3.12: Leiden community detection over the undirected
//! projection of the `Calls` sub-graph, delegating to
//! [`crate::analytics::leiden`] and enriching each community with package
//! membership and internal/external edge counts from the raw graph.

use super::{start_timer, Category, Params, Tool, ToolContext, ToolDefinition, ToolOutcome};
use crate::cancel::CancelError;
use crate::graph::{EdgeType, HierarchicalGraph};
use crate::trace::TraceStepBuilder;
use petgraph::graph::NodeIndex;
use serde_json::json;
use std::collections::HashMap;

pub struct FindCommunities;

/// Bands modularity into spec §4.3.12's quality tiers.
fn modularity_quality(q: f64) -> &'static str {
    if q < 0.3 {
        "weak"
    } else if q < 0.5 {
        "moderate"
    } else if q < 0.7 {
        "good"
    } else {
        "strong"
    }
}

impl Tool for FindCommunities {
    fn name(&self) -> &'static str {
        "find_communities"
    }

    fn category(&self) -> Category {
        Category::Structure
    }

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name(),
            description: "Detects densely-connected symbol communities via Leiden modularity optimization.",
            parameters: vec![
                super::ParamSpec { name: "min_size", kind: "int", required: false, default: Some(json!(2)), min: Some(1.0), max: Some(100.0), enum_values: None },
                super::ParamSpec { name: "resolution", kind: "float", required: false, default: Some(json!(1.0)), min: Some(0.1), max: Some(5.0), enum_values: None },
                super::ParamSpec { name: "top", kind: "int", required: false, default: Some(json!(10)), min: Some(1.0), max: Some(50.0), enum_values: None },
                super::ParamSpec { name: "show_cross_edges", kind: "bool", required: false, default: Some(json!(false)), min: None, max: None, enum_values: None },
            ],
            priority: 50,
            capability_tags: &["structure"],
            timeout: std::time::Duration::from_secs(30),
            usage_hint: "Use to find natural module boundaries that don't match the declared package structure.",
        }
    }

    fn execute(&self, ctx: &ToolContext, params: &Params) -> (ToolOutcome, crate::trace::TraceStep, Option<CancelError>) {
        let start = start_timer();
        let min_size = params.usize_clamped("min_size", 2, 1, 100);
        let resolution = params.f64_clamped("resolution", 1.0, 0.1, 5.0);
        let top = params.usize_clamped("top", 10, 1, 50);
        let show_cross_edges = params.bool_or("show_cross_edges", false);

        let hg = HierarchicalGraph::new(ctx.graph);
        let (result, analytics_trace) = ctx.analytics.communities_with_trace(&hg, 20, resolution);

        // node -> index into the (size-filtered, truncated) community list,
        // used below to tally cross-community edges.
        let mut community_of: HashMap<NodeIndex, usize> = HashMap::new();

        let mut symbols_found = Vec::new();
        let mut communities: Vec<_> = result
            .communities
            .iter()
            .filter(|members| members.len() >= min_size)
            .map(|members| {
                let mut ids: Vec<NodeIndex> = members.clone();
                ids.sort_by_key(|&n| ctx.graph.id_at(n).to_string());

                let mut package_counts: HashMap<&str, usize> = HashMap::new();
                for &n in &ids {
                    *package_counts.entry(ctx.graph.symbol_at(n).package.as_str()).or_insert(0) += 1;
                }
                let mut packages: Vec<String> = package_counts.keys().map(|s| s.to_string()).collect();
                packages.sort();
                let dominant_package = package_counts
                    .iter()
                    .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
                    .map(|(&p, _)| p.to_string())
                    .unwrap_or_default();
                let is_cross_package = packages.len() > 1;

                let member_set: std::collections::HashSet<NodeIndex> = ids.iter().copied().collect();
                let mut internal_edges = 0usize;
                let mut external_edges = 0usize;
                for &n in &ids {
                    for succ in hg.out_neighbors_of_type(n, EdgeType::Calls) {
                        if member_set.contains(&succ) {
                            internal_edges += 1;
                        } else {
                            external_edges += 1;
                        }
                    }
                }
                let total_edges = internal_edges + external_edges;
                let connectivity = if total_edges == 0 { 0.0 } else { internal_edges as f64 / total_edges as f64 };

                let member_ids: Vec<String> = ids.iter().map(|&n| ctx.graph.id_at(n).to_string()).collect();
                symbols_found.extend(member_ids.iter().cloned());

                (
                    ids.len(),
                    member_ids.first().cloned().unwrap_or_default(),
                    ids,
                    member_ids,
                    dominant_package,
                    packages,
                    internal_edges,
                    external_edges,
                    connectivity,
                    is_cross_package,
                )
            })
            .collect();
        communities.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        communities.truncate(top);

        let community_objects: Vec<_> = communities
            .iter()
            .enumerate()
            .map(|(id, (size, _, node_ids, members, dominant_package, packages, internal_edges, external_edges, connectivity, is_cross_package))| {
                for &n in node_ids {
                    community_of.insert(n, id);
                }
                json!({
                    "id": id,
                    "size": size,
                    "members": members,
                    "dominant_package": dominant_package,
                    "packages": packages,
                    "internal_edges": internal_edges,
                    "external_edges": external_edges,
                    "connectivity": connectivity,
                    "is_cross_package": is_cross_package,
                })
            })
            .collect();

        let mut output = serde_json::Map::new();
        output.insert("algorithm".to_string(), json!("Leiden"));
        output.insert("modularity".to_string(), json!(result.modularity));
        output.insert("modularity_quality".to_string(), json!(modularity_quality(result.modularity)));
        output.insert("converged".to_string(), json!(result.converged));
        output.insert("community_count".to_string(), json!(community_objects.len()));
        output.insert("communities".to_string(), json!(community_objects));

        if show_cross_edges {
            let mut cross: HashMap<(usize, usize), usize> = HashMap::new();
            for (id, (_, _, node_ids, ..)) in communities.iter().enumerate() {
                for &n in node_ids {
                    for succ in hg.out_neighbors_of_type(n, EdgeType::Calls) {
                        if let Some(&other) = community_of.get(&succ) {
                            if other != id {
                                *cross.entry((id, other)).or_insert(0) += 1;
                            }
                        }
                    }
                }
            }
            let mut cross_edges: Vec<_> = cross
                .into_iter()
                .map(|((from, to), count)| json!({ "from_community": from, "to_community": to, "count": count }))
                .collect();
            cross_edges.sort_by(|a, b| {
                a["from_community"]
                    .as_u64()
                    .cmp(&b["from_community"].as_u64())
                    .then_with(|| a["to_community"].as_u64().cmp(&b["to_community"].as_u64()))
            });
            output.insert("cross_community_edges".to_string(), json!(cross_edges));
        }

        let text = format!(
            "{} community/communities found (modularity={:.3}, converged={})",
            community_objects.len(),
            result.modularity,
            result.converged
        );
        let outcome = ToolOutcome::ok(serde_json::Value::Object(output), text, start.elapsed());
        let trace = TraceStepBuilder::new("analytics_find_communities", "FindCommunities")
            .duration(start.elapsed())
            .symbols_found(symbols_found)
            .metadata("modularity", format!("{:.6}", result.modularity))
            .metadata("resolution", resolution.to_string())
            .metadata("community_count", community_objects.len().to_string())
            .metadata("algorithm_duration_ms", analytics_trace.duration.as_millis().to_string())
            .build();
        (outcome, trace, None)
    }
}

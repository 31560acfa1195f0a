//! End-to-end scenarios exercising the public API: one test per literal
//! scenario in the tool layer's acceptance notes (S1-S8), built on graphs
//! assembled directly rather than through a language frontend, since
//! ingestion from source is out of scope here.

use codegraph_analytics::analytics::GraphAnalytics;
use codegraph_analytics::cancel::CancellationToken;
use codegraph_analytics::graph::{EdgeType, Graph, Location, SymbolIndex};
use codegraph_analytics::symbol::{Symbol, SymbolKind};
use codegraph_analytics::tools::check_reducibility::CheckReducibility;
use codegraph_analytics::tools::find_articulation_points::FindArticulationPoints;
use codegraph_analytics::tools::find_callees::FindCallees;
use codegraph_analytics::tools::find_callers::FindCallers;
use codegraph_analytics::tools::find_communities::FindCommunities;
use codegraph_analytics::tools::find_hotspots::FindHotspots;
use codegraph_analytics::tools::find_important::FindImportant;
use codegraph_analytics::tools::find_loops::FindLoops;
use codegraph_analytics::tools::{Params, Tool, ToolContext};
use std::collections::HashMap;

fn sym(id: &str, name: &str, package: &str) -> Symbol {
    Symbol {
        id: id.to_string(),
        name: name.to_string(),
        kind: SymbolKind::Function,
        file_path: id.split(':').next().unwrap_or(id).to_string(),
        start_line: 1,
        end_line: 2,
        package: package.to_string(),
        signature: None,
        exported: true,
        language: "go".to_string(),
    }
}

fn loc(line: usize) -> Location {
    Location { file: "f.go".to_string(), line }
}

fn params(pairs: &[(&str, serde_json::Value)]) -> Params {
    let mut map = HashMap::new();
    for (k, v) in pairs {
        map.insert((*k).to_string(), v.clone());
    }
    Params::new(map)
}

/// S1: three distinct `Setup` symbols across packages, all called by the
/// same `main`. `find_callers(name="Setup")` must produce 3 groups, each
/// with exactly one caller.
#[test]
fn s1_find_callers_with_duplicate_names() {
    let mut g = Graph::new("/repo");
    let mut idx = SymbolIndex::new();
    for (id, name, pkg) in [
        ("main.go:5:main", "main", "main"),
        ("pkg/a/setup.go:10:Setup", "Setup", "pkg/a"),
        ("pkg/b/setup.go:15:Setup", "Setup", "pkg/b"),
        ("pkg/c/setup.go:20:Setup", "Setup", "pkg/c"),
    ] {
        let s = sym(id, name, pkg);
        let n = g.add_node(s.clone()).unwrap();
        idx.add(&s, n).unwrap();
    }
    g.add_edge("main.go:5:main", "pkg/a/setup.go:10:Setup", EdgeType::Calls, loc(6)).unwrap();
    g.add_edge("main.go:5:main", "pkg/b/setup.go:15:Setup", EdgeType::Calls, loc(7)).unwrap();
    g.add_edge("main.go:5:main", "pkg/c/setup.go:20:Setup", EdgeType::Calls, loc(8)).unwrap();
    g.freeze();

    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&g, &idx, &analytics);
    let (outcome, _, _) = FindCallers.execute(&ctx, &params(&[("name", serde_json::json!("Setup"))]));

    let groups = outcome.output["groups"].as_array().unwrap();
    assert_eq!(groups.len(), 3);
    for group in groups {
        assert_eq!(group["callers"].as_array().unwrap().len(), 1);
    }
}

/// S2: same graph, `find_callees(name="main")` resolves three callees, one
/// per Setup.
#[test]
fn s2_find_callees_has_one_entry_per_setup() {
    let mut g = Graph::new("/repo");
    let mut idx = SymbolIndex::new();
    for (id, name, pkg) in [
        ("main.go:5:main", "main", "main"),
        ("pkg/a/setup.go:10:Setup", "Setup", "pkg/a"),
        ("pkg/b/setup.go:15:Setup", "Setup", "pkg/b"),
        ("pkg/c/setup.go:20:Setup", "Setup", "pkg/c"),
    ] {
        let s = sym(id, name, pkg);
        let n = g.add_node(s.clone()).unwrap();
        idx.add(&s, n).unwrap();
    }
    g.add_edge("main.go:5:main", "pkg/a/setup.go:10:Setup", EdgeType::Calls, loc(6)).unwrap();
    g.add_edge("main.go:5:main", "pkg/b/setup.go:15:Setup", EdgeType::Calls, loc(7)).unwrap();
    g.add_edge("main.go:5:main", "pkg/c/setup.go:20:Setup", EdgeType::Calls, loc(8)).unwrap();
    g.freeze();

    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&g, &idx, &analytics);
    let (outcome, _, _) = FindCallees.execute(&ctx, &params(&[("name", serde_json::json!("main"))]));

    let callees = outcome.output["resolved_callees"].as_array().unwrap();
    assert_eq!(callees.len(), 3);
    assert_eq!(outcome.output["external_callees"].as_array().unwrap().len(), 0);
}

/// S3: chain A-B-C-D-E with extra edges B-F and D-G-H. Articulation points
/// are {B, C, D, G}.
#[test]
fn s3_articulation_in_a_chain_with_branch() {
    let mut g = Graph::new("/repo");
    let idx = SymbolIndex::new();
    for id in ["a", "b", "c", "d", "e", "f", "g", "h"] {
        g.add_node(sym(id, id, "p")).unwrap();
    }
    g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
    g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
    g.add_edge("c", "d", EdgeType::Calls, loc(3)).unwrap();
    g.add_edge("d", "e", EdgeType::Calls, loc(4)).unwrap();
    g.add_edge("b", "f", EdgeType::Calls, loc(5)).unwrap();
    g.add_edge("d", "g", EdgeType::Calls, loc(6)).unwrap();
    g.add_edge("g", "h", EdgeType::Calls, loc(7)).unwrap();
    g.freeze();

    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&g, &idx, &analytics);
    let (outcome, _, _) = FindArticulationPoints.execute(&ctx, &Params::default());

    let points: Vec<&str> = outcome.output["articulation_points"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    for expected in ["b", "c", "d", "g"] {
        assert!(points.contains(&expected), "expected {expected} to be an articulation point");
    }
    assert_eq!(points.len(), 4);
}

/// S4: `main -> funcA -> funcB -> funcC` is reducible with an empty
/// irreducible region.
#[test]
fn s4_reducibility_of_a_dag_chain() {
    let mut g = Graph::new("/repo");
    let idx = SymbolIndex::new();
    for id in ["main", "funcA", "funcB", "funcC"] {
        g.add_node(sym(id, id, "p")).unwrap();
    }
    g.add_edge("main", "funcA", EdgeType::Calls, loc(1)).unwrap();
    g.add_edge("funcA", "funcB", EdgeType::Calls, loc(2)).unwrap();
    g.add_edge("funcB", "funcC", EdgeType::Calls, loc(3)).unwrap();
    g.freeze();

    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&g, &idx, &analytics);
    let (outcome, _, _) = CheckReducibility.execute(&ctx, &params(&[("show_irreducible", serde_json::json!(true))]));

    assert_eq!(outcome.output["is_reducible"], true);
    assert_eq!(outcome.output["irreducible_region"].as_array().unwrap().len(), 0);
}

/// S5: a 3-cycle, a self-loop, and a mutual pair classify as complex,
/// direct, and mutual recursion respectively.
#[test]
fn s5_loops_classify_by_shape() {
    let mut g = Graph::new("/repo");
    let idx = SymbolIndex::new();
    for id in ["entry", "a", "b", "c", "d", "e", "f"] {
        g.add_node(sym(id, id, "p")).unwrap();
    }
    g.add_edge("entry", "a", EdgeType::Calls, loc(0)).unwrap();
    g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
    g.add_edge("b", "c", EdgeType::Calls, loc(2)).unwrap();
    g.add_edge("c", "a", EdgeType::Calls, loc(3)).unwrap(); // 3-cycle
    g.add_edge("entry", "d", EdgeType::Calls, loc(4)).unwrap();
    g.add_edge("d", "d", EdgeType::Calls, loc(5)).unwrap(); // self-loop
    g.add_edge("entry", "e", EdgeType::Calls, loc(6)).unwrap();
    g.add_edge("e", "f", EdgeType::Calls, loc(7)).unwrap();
    g.add_edge("f", "e", EdgeType::Calls, loc(8)).unwrap(); // mutual
    g.freeze();

    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&g, &idx, &analytics);
    let (outcome, _, _) = FindLoops.execute(&ctx, &Params::default());

    let classifications: Vec<&str> = outcome.output["loops"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["classification"].as_str().unwrap())
        .collect();
    assert!(classifications.contains(&"direct_recursion"));
    assert!(classifications.contains(&"mutual_recursion"));
    assert!(classifications.contains(&"complex_cycle"));
}

/// S6: on the same graph, `find_important` and `find_hotspots` both
/// succeed and return at least one result each.
#[test]
fn s6_pagerank_and_hotspots_both_succeed() {
    let mut g = Graph::new("/repo");
    let idx = SymbolIndex::new();
    for id in ["hub", "a", "b", "c", "leaf"] {
        g.add_node(sym(id, id, "p")).unwrap();
    }
    g.add_edge("a", "hub", EdgeType::Calls, loc(1)).unwrap();
    g.add_edge("b", "hub", EdgeType::Calls, loc(2)).unwrap();
    g.add_edge("c", "hub", EdgeType::Calls, loc(3)).unwrap();
    g.add_edge("hub", "leaf", EdgeType::Calls, loc(4)).unwrap();
    g.freeze();

    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&g, &idx, &analytics);

    let (important, _, _) = FindImportant.execute(&ctx, &params(&[("top", serde_json::json!(6))]));
    let (hotspots, _, _) = FindHotspots.execute(&ctx, &params(&[("top", serde_json::json!(6))]));

    assert!(important.success);
    assert!(hotspots.success);
    assert!(!important.output["results"].as_array().unwrap().is_empty());
    assert!(!hotspots.output["hotspots"].as_array().unwrap().is_empty());
}

/// S7: an already-cancelled context passed to `find_callers` for any name
/// returns the cancellation error, not a `Result`-shaped failure (spec §8).
#[test]
fn s7_cancellation_short_circuits_before_a_result() {
    let mut g = Graph::new("/repo");
    let mut idx = SymbolIndex::new();
    for id in ["a", "b"] {
        let s = sym(id, id, "p");
        let n = g.add_node(s.clone()).unwrap();
        idx.add(&s, n).unwrap();
    }
    g.add_edge("a", "b", EdgeType::Calls, loc(1)).unwrap();
    g.freeze();

    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&g, &idx, &analytics).with_token(CancellationToken::cancelled());
    let (outcome, _, cancel) = FindCallers.execute(&ctx, &params(&[("name", serde_json::json!("b"))]));

    assert!(cancel.is_some());
    assert!(!outcome.success);
}

/// S8: two disjoint triangles yield at least two communities whose members
/// sum to six.
#[test]
fn s8_leiden_separates_disconnected_triangles() {
    let mut g = Graph::new("/repo");
    let idx = SymbolIndex::new();
    for id in ["a1", "a2", "a3", "b1", "b2", "b3"] {
        g.add_node(sym(id, id, "p")).unwrap();
    }
    g.add_edge("a1", "a2", EdgeType::Calls, loc(1)).unwrap();
    g.add_edge("a2", "a3", EdgeType::Calls, loc(2)).unwrap();
    g.add_edge("a3", "a1", EdgeType::Calls, loc(3)).unwrap();
    g.add_edge("b1", "b2", EdgeType::Calls, loc(4)).unwrap();
    g.add_edge("b2", "b3", EdgeType::Calls, loc(5)).unwrap();
    g.add_edge("b3", "b1", EdgeType::Calls, loc(6)).unwrap();
    g.freeze();

    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&g, &idx, &analytics);
    let (outcome, _, _) = FindCommunities.execute(&ctx, &Params::default());

    let communities = outcome.output["communities"].as_array().unwrap();
    assert!(communities.len() >= 2);
    let total: usize = communities.iter().map(|c| c["members"].as_array().unwrap().len()).sum();
    assert_eq!(total, 6);
}

//! Builds a small toy call graph and runs a handful of query tools against
//! it end to end, printing each result. This is a demonstration surface,
//! not a CLI for real codebases: there is no source-language frontend here
//! to populate a [`codegraph_analytics::Graph`] from an actual repository.

use anyhow::Result;
use codegraph_analytics::analytics::GraphAnalytics;
use codegraph_analytics::graph::{EdgeType, Graph, HierarchicalGraph, Location, SymbolIndex};
use codegraph_analytics::symbol::{Symbol, SymbolKind};
use codegraph_analytics::tools::{
    find_callers::FindCallers, find_cycles::FindCycles, find_hotspots::FindHotspots, Params, Tool, ToolContext,
};

fn sym(id: &str, name: &str, kind: SymbolKind, package: &str, exported: bool) -> Symbol {
    Symbol {
        id: id.to_string(),
        name: name.to_string(),
        kind,
        file_path: id.split(':').next().unwrap_or(id).to_string(),
        start_line: 1,
        end_line: 10,
        package: package.to_string(),
        signature: None,
        exported,
        language: "go".to_string(),
    }
}

fn build_toy_graph() -> Graph {
    let mut graph = Graph::new("/toy/repo");
    let symbols = [
        sym("main.go:5:main", "main", SymbolKind::Function, "main", true),
        sym("pkg/a/setup.go:10:Setup", "Setup", SymbolKind::Function, "pkg/a", true),
        sym("pkg/b/setup.go:10:Setup", "Setup", SymbolKind::Function, "pkg/b", true),
        sym("pkg/a/helper.go:4:helper", "helper", SymbolKind::Function, "pkg/a", false),
        sym("pkg/a/loop.go:2:loopBody", "loopBody", SymbolKind::Function, "pkg/a", false),
    ];
    for s in &symbols {
        graph.add_node(s.clone()).expect("toy graph nodes never collide");
    }

    let loc = |line| Location { file: "main.go".to_string(), line };
    graph.add_edge("main.go:5:main", "pkg/a/setup.go:10:Setup", EdgeType::Calls, loc(6)).unwrap();
    graph.add_edge("main.go:5:main", "pkg/b/setup.go:10:Setup", EdgeType::Calls, loc(7)).unwrap();
    graph
        .add_edge("pkg/a/setup.go:10:Setup", "pkg/a/helper.go:4:helper", EdgeType::Calls, loc(11))
        .unwrap();
    graph
        .add_edge("pkg/a/helper.go:4:helper", "pkg/a/loop.go:2:loopBody", EdgeType::Calls, loc(5))
        .unwrap();
    graph
        .add_edge("pkg/a/loop.go:2:loopBody", "pkg/a/helper.go:4:helper", EdgeType::Calls, loc(3))
        .unwrap();

    graph.freeze();
    graph
}

fn build_index(graph: &Graph) -> SymbolIndex {
    let mut index = SymbolIndex::new();
    for (idx, s) in graph.nodes() {
        index.add(s, idx).expect("toy graph symbols are all valid");
    }
    index
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let graph = build_toy_graph();
    let index = build_index(&graph);
    let analytics = GraphAnalytics::new();
    let ctx = ToolContext::new(&graph, &index, &analytics);

    println!("== find_callers(Setup) ==");
    let mut params = std::collections::HashMap::new();
    params.insert("name".to_string(), serde_json::json!("Setup"));
    let (outcome, _, _) = FindCallers.execute(&ctx, &Params::new(params));
    println!("{}", serde_json::to_string_pretty(&outcome.output)?);

    println!("\n== find_hotspots(top=3) ==");
    let (outcome, _, _) = FindHotspots.execute(&ctx, &Params::default());
    println!("{}", serde_json::to_string_pretty(&outcome.output)?);

    println!("\n== find_cycles() ==");
    let (outcome, _, _) = FindCycles.execute(&ctx, &Params::default());
    println!("{}", serde_json::to_string_pretty(&outcome.output)?);

    let hg = HierarchicalGraph::new(&graph);
    println!("\ngraph has {} node(s), {} edge(s)", hg.node_count(), graph.edge_count());

    Ok(())
}

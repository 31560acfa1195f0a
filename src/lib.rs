//! codegraph-analytics: a frozen symbol/edge graph over a codebase, an
//! indexed lookup layer, and a fixed set of analytics algorithms exposed
//! through a uniform query-tool surface.
//!
//! The data flow is build-once: a [`graph::Graph`] is populated node by
//! node and edge by edge, frozen, indexed into a [`graph::SymbolIndex`],
//! and handed to [`analytics::GraphAnalytics`] and the [`tools`] that wrap
//! it. Nothing downstream of `freeze()` mutates the graph again.

#![allow(dead_code)]

pub mod analytics;
pub mod cancel;
pub mod error;
pub mod graph;
pub mod symbol;
pub mod tools;
pub mod trace;

pub use analytics::GraphAnalytics;
pub use cancel::{CancelError, CancellationToken};
pub use error::EngineError;
pub use graph::{EdgeType, Graph, HierarchicalGraph, Location, SymbolIndex};
pub use symbol::{Symbol, SymbolKind};
pub use trace::TraceStep;

//! Error taxonomy shared by the graph, index, analytics and tool layers.
//!
//! Each kind is distinct and carries no shared numeric code (spec §7):
//! validation and "not ready" failures are folded into a tool's `Result`
//! rather than propagated; `Cancelled` is returned out of band instead.

use thiserror::Error;

/// Errors raised while building or querying the frozen graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// `add_edge` referenced an id that has no corresponding node.
    #[error("edge references unknown endpoint: {0}")]
    UnknownEndpoint(String),
    /// A mutating call was made after `freeze()`.
    #[error("graph is frozen; mutation rejected")]
    Frozen,
    /// `add_node` was called twice with the same id and the implementation
    /// is configured to reject duplicates rather than overwrite.
    #[error("duplicate symbol id: {0}")]
    DuplicateId(String),
}

/// Errors raised while inserting into or querying the [`crate::graph::index::SymbolIndex`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IndexError {
    #[error("symbol id must not be empty")]
    EmptyId,
    #[error("symbol name must not be empty")]
    EmptyName,
    #[error("symbol file_path must not be empty")]
    EmptyFile,
    #[error("symbol language must not be empty")]
    EmptyLanguage,
    #[error("start_line must be >= 1, got {0}")]
    InvalidStartLine(usize),
    #[error("end_line ({end}) must be >= start_line ({start})")]
    EndBeforeStart { start: usize, end: usize },
}

/// Errors raised by [`crate::analytics::GraphAnalytics`] algorithms.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    /// No unique entry point could be determined (spec §4.4).
    #[error("no entry point could be determined for this graph")]
    NoEntryPoint,
    /// An algorithm that requires a post-dominator tree was invoked on a
    /// graph with no resolvable exit node.
    #[error("post-dominator tree unavailable: no exit node")]
    NoExitPoint,
    /// The analytics layer was asked for a result it has not computed yet
    /// and cannot compute on demand (reserved for future staged pipelines).
    #[error("analytics not initialized: {0}")]
    NotInitialized(String),
}

/// The top-level error returned by a tool's `execute`, distinct from
/// validation failures (those are reported as `success=false` inside the
/// tool [`crate::tools::ToolOutcome`], never here).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
    #[error("not found: {0}")]
    NotFound(String),
}

//! `SymbolIndex`: O(1) name/id/file/kind lookup over a [`crate::graph::Graph`]
//! (spec §3/§4.2).

use crate::error::IndexError;
use crate::symbol::{Symbol, SymbolKind};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Per-kind symbol counts returned by [`SymbolIndex::stats`].
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct IndexStats {
    pub total_symbols: usize,
    pub by_kind: HashMap<String, usize>,
}

/// A ranked fuzzy-search hit.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
}

/// Non-owning name/id/file/kind indexes over a graph's symbols, built
/// alongside the graph during its mutable phase and valid for the graph's
/// lifetime (spec §3 "Lifecycle & ownership").
///
/// Entries in `by_name`/`by_file`/`by_kind` preserve insertion order,
/// which is what makes ranking in the tool layer deterministic without an
/// extra sort key (spec §4.2).
#[derive(Debug, Clone, Default)]
pub struct SymbolIndex {
    by_id: HashMap<String, NodeIndex>,
    by_name: HashMap<String, Vec<NodeIndex>>,
    by_file: HashMap<String, Vec<NodeIndex>>,
    by_kind: HashMap<SymbolKind, Vec<NodeIndex>>,
    // `Symbol.package` is the canonical source of truth for package
    // membership (spec §9 Open Question); indexed here purely for O(1)
    // lookup, not via a synthetic `Package`-kind symbol.
    by_package: HashMap<String, Vec<NodeIndex>>,
    // Kept for fuzzy search: id -> lowercased name, insertion order preserved
    // by iterating `by_id`'s companion vec rather than the hash map itself.
    search_order: Vec<NodeIndex>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates and indexes one symbol (spec §4.2: rejects empty
    /// id/name/file/language, `start_line < 1`, `end_line < start_line`).
    pub fn add(&mut self, symbol: &Symbol, idx: NodeIndex) -> Result<(), IndexError> {
        symbol.validate()?;
        self.by_id.insert(symbol.id.clone(), idx);
        self.by_name.entry(symbol.name.clone()).or_default().push(idx);
        self.by_file.entry(symbol.file_path.clone()).or_default().push(idx);
        self.by_kind.entry(symbol.kind).or_default().push(idx);
        self.by_package.entry(symbol.package.clone()).or_default().push(idx);
        self.search_order.push(idx);
        Ok(())
    }

    pub fn get_by_id(&self, id: &str) -> Option<NodeIndex> {
        self.by_id.get(id).copied()
    }

    /// O(1) average: hash lookup into a pre-built list (spec §4.2).
    pub fn get_by_name(&self, name: &str) -> &[NodeIndex] {
        self.by_name.get(name).map_or(&[], |v| v.as_slice())
    }

    pub fn get_by_file(&self, file: &str) -> &[NodeIndex] {
        self.by_file.get(file).map_or(&[], |v| v.as_slice())
    }

    pub fn get_by_kind(&self, kind: SymbolKind) -> &[NodeIndex] {
        self.by_kind.get(&kind).map_or(&[], |v| v.as_slice())
    }

    pub fn get_by_package(&self, package: &str) -> &[NodeIndex] {
        self.by_package.get(package).map_or(&[], |v| v.as_slice())
    }

    pub fn packages(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_package.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn stats(&self, graph: &super::Graph) -> IndexStats {
        let mut by_kind = HashMap::new();
        for (kind, ids) in &self.by_kind {
            by_kind.insert(kind.as_str().to_string(), ids.len());
        }
        let _ = graph; // stats are derived purely from the index's own tables
        IndexStats {
            total_symbols: self.by_id.len(),
            by_kind,
        }
    }

    /// Budgeted substring/fuzzy search over symbol names, ranked by score
    /// descending with deterministic tie-breaking by id (spec §4.2,
    /// §9 "deterministic sort tie-breakers").
    ///
    /// `budget` bounds the number of candidates examined, not the number
    /// returned; cancellation is honored via `token`.
    pub fn search(
        &self,
        graph: &super::Graph,
        query: &str,
        budget: usize,
        token: &crate::cancel::CancellationToken,
    ) -> Result<Vec<SearchHit>, crate::cancel::CancelError> {
        let query_lower = query.to_ascii_lowercase();
        let mut hits: Vec<SearchHit> = Vec::new();

        for (examined, &idx) in self.search_order.iter().enumerate() {
            if examined % 256 == 0 {
                token.check()?;
            }
            if examined >= budget {
                break;
            }
            let symbol = graph.symbol_at(idx);
            let name_lower = symbol.name.to_ascii_lowercase();
            let score = if name_lower == query_lower {
                1.0
            } else if name_lower.contains(&query_lower) {
                0.8 * (query_lower.len() as f64 / name_lower.len().max(1) as f64)
            } else {
                strsim::jaro_winkler(&name_lower, &query_lower)
            };
            if score > 0.3 {
                hits.push(SearchHit { id: symbol.id.clone(), score });
            }
        }

        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(hits)
    }
}

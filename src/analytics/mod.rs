//! `GraphAnalytics`: wires every algorithm in this module together behind
//! a single entry point, with a bounded result cache (spec §4.4, §9).
//!
//! The cache is keyed by `(built_at_millis, algorithm, parameters)` so a
//! graph rebuild invalidates every prior entry automatically (spec §9
//! "cache key must include the graph's build timestamp"). It uses
//! `parking_lot::RwLock` rather than `std::sync::RwLock`, the same choice
//! `bobamatcha-omni` makes for its shared analytics state, since its
//! uncontended fast path and lack of poisoning fit a read-mostly cache
//! better than the standard library's lock.

pub mod articulation;
pub mod control_dependence;
pub mod dominators;
pub mod leiden;
pub mod loops;
pub mod pagerank;
pub mod post_dominators;
pub mod reducibility;
pub mod scc;
pub mod sese;

pub use articulation::{fragility_level, ArticulationResult};
pub use control_dependence::ControlDependence;
pub use dominators::DominatorTree;
pub use leiden::CommunityResult;
pub use loops::NaturalLoop;
pub use pagerank::PageRankResult;
pub use post_dominators::PostDominatorTree;
pub use reducibility::{quality_label, ReducibilityResult};
pub use scc::Cycle;
pub use sese::SeseRegion;

use crate::error::AnalyticsError;
use crate::graph::HierarchicalGraph;
use crate::trace::TraceStepBuilder;
use parking_lot::RwLock;
use petgraph::graph::NodeIndex;
use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Instant;

const DEFAULT_CACHE_CAPACITY: usize = 10;

type CacheKey = (u64, &'static str, String);

#[derive(Default)]
struct Lru {
    capacity: usize,
    entries: HashMap<CacheKey, Arc<dyn Any + Send + Sync>>,
    recency: VecDeque<CacheKey>,
}

impl Lru {
    fn new(capacity: usize) -> Self {
        Self { capacity, entries: HashMap::new(), recency: VecDeque::new() }
    }

    fn get<T: Any + Send + Sync>(&mut self, key: &CacheKey) -> Option<Arc<T>> {
        let value = self.entries.get(key)?.clone();
        self.recency.retain(|k| k != key);
        self.recency.push_back(key.clone());
        value.downcast::<T>().ok()
    }

    fn put<T: Any + Send + Sync>(&mut self, key: CacheKey, value: Arc<T>) {
        if !self.entries.contains_key(&key) && self.entries.len() >= self.capacity.max(1) {
            if let Some(oldest) = self.recency.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.recency.retain(|k| k != &key);
        self.recency.push_back(key.clone());
        self.entries.insert(key, value);
    }
}

/// The analytics facade: every query tool holds one instance (shared
/// behind the engine), handed a fresh [`HierarchicalGraph`] view per call
/// since the view itself is just a borrow over the frozen graph.
pub struct GraphAnalytics {
    cache: RwLock<Lru>,
}

impl GraphAnalytics {
    pub fn new() -> Self {
        Self::with_cache_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_cache_capacity(capacity: usize) -> Self {
        Self { cache: RwLock::new(Lru::new(capacity)) }
    }

    fn cached_or_compute<T, F>(
        &self,
        hg: &HierarchicalGraph,
        algorithm: &'static str,
        params: String,
        compute: F,
    ) -> (Arc<T>, bool)
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        let key: CacheKey = (hg.built_at_millis(), algorithm, params);
        if let Some(hit) = self.cache.write().get::<T>(&key) {
            return (hit, true);
        }
        let value = Arc::new(compute());
        self.cache.write().put(key, value.clone());
        (value, false)
    }

    fn trace(
        &self,
        tool: &str,
        target: Option<String>,
        start: Instant,
        cache_hit: bool,
        node_count: usize,
        error: Option<String>,
    ) -> crate::trace::TraceStep {
        let mut builder = TraceStepBuilder::new(format!("analytics_{tool}"), tool)
            .duration(start.elapsed())
            .metadata("cache_hit", cache_hit.to_string())
            .metadata("node_count", node_count.to_string());
        if let Some(t) = target {
            builder = builder.target(t);
        }
        if let Some(e) = error {
            builder = builder.error(e);
        }
        builder.build()
    }

    pub fn dominator_tree_with_trace(
        &self,
        hg: &HierarchicalGraph,
        entry: Option<NodeIndex>,
    ) -> (Result<Arc<DominatorTree>, AnalyticsError>, crate::trace::TraceStep) {
        let start = Instant::now();
        let params = format!("{entry:?}");
        let key: CacheKey = (hg.built_at_millis(), "dominators", params.clone());
        if let Some(hit) = self.cache.write().get::<DominatorTree>(&key) {
            let trace = self.trace("DominatorTree", None, start, true, hg.node_count(), None);
            return (Ok(hit), trace);
        }
        match dominators::compute_dominator_tree(hg, entry) {
            Ok(tree) => {
                let value = Arc::new(tree);
                self.cache.write().put(key, value.clone());
                let trace = self.trace("DominatorTree", None, start, false, hg.node_count(), None);
                (Ok(value), trace)
            }
            Err(e) => {
                let trace = self.trace("DominatorTree", None, start, false, hg.node_count(), Some(e.to_string()));
                (Err(e), trace)
            }
        }
    }

    pub fn post_dominator_tree_with_trace(
        &self,
        hg: &HierarchicalGraph,
    ) -> (Result<Arc<PostDominatorTree>, AnalyticsError>, crate::trace::TraceStep) {
        let start = Instant::now();
        let (result, hit) = self.try_cached(hg, "post_dominators", String::new(), || {
            post_dominators::compute_post_dominator_tree(hg)
        });
        match result {
            Ok(value) => {
                let trace = self.trace("PostDominatorTree", None, start, hit, hg.node_count(), None);
                (Ok(value), trace)
            }
            Err(e) => {
                let trace = self.trace("PostDominatorTree", None, start, hit, hg.node_count(), Some(e.to_string()));
                (Err(e), trace)
            }
        }
    }

    fn try_cached<T, F>(
        &self,
        hg: &HierarchicalGraph,
        algorithm: &'static str,
        params: String,
        compute: F,
    ) -> (Result<Arc<T>, AnalyticsError>, bool)
    where
        T: Any + Send + Sync,
        F: FnOnce() -> Result<T, AnalyticsError>,
    {
        let key: CacheKey = (hg.built_at_millis(), algorithm, params);
        if let Some(hit) = self.cache.write().get::<T>(&key) {
            return (Ok(hit), true);
        }
        match compute() {
            Ok(value) => {
                let value = Arc::new(value);
                self.cache.write().put(key, value.clone());
                (Ok(value), false)
            }
            Err(e) => (Err(e), false),
        }
    }

    pub fn natural_loops_with_trace(
        &self,
        hg: &HierarchicalGraph,
    ) -> (Result<Arc<Vec<NaturalLoop>>, AnalyticsError>, crate::trace::TraceStep) {
        let start = Instant::now();
        let (result, hit) =
            self.try_cached(hg, "loops", String::new(), || loops::detect_natural_loops(hg));
        let err = result.as_ref().err().map(|e| e.to_string());
        let trace = self.trace("NaturalLoops", None, start, hit, hg.node_count(), err);
        (result, trace)
    }

    pub fn cycles_with_trace(
        &self,
        hg: &HierarchicalGraph,
        min_size: usize,
    ) -> (Arc<Vec<Cycle>>, crate::trace::TraceStep) {
        let start = Instant::now();
        let (value, hit) =
            self.cached_or_compute(hg, "cycles", min_size.to_string(), || scc::find_cycles(hg, min_size));
        let trace = self.trace("FindCycles", None, start, hit, hg.node_count(), None);
        (value, trace)
    }

    pub fn articulation_with_trace(
        &self,
        hg: &HierarchicalGraph,
    ) -> (Arc<ArticulationResult>, crate::trace::TraceStep) {
        let start = Instant::now();
        let (value, hit) = self.cached_or_compute(hg, "articulation", String::new(), || {
            articulation::find_articulation_points_and_bridges(hg)
        });
        let trace = self.trace("ArticulationPoints", None, start, hit, hg.node_count(), None);
        (value, trace)
    }

    pub fn pagerank_with_trace(&self, hg: &HierarchicalGraph) -> (Arc<PageRankResult>, crate::trace::TraceStep) {
        let start = Instant::now();
        let (value, hit) =
            self.cached_or_compute(hg, "pagerank", String::new(), || pagerank::compute_pagerank(hg));
        let trace = self.trace("PageRank", None, start, hit, hg.node_count(), None);
        (value, trace)
    }

    pub fn communities_with_trace(
        &self,
        hg: &HierarchicalGraph,
        max_levels: usize,
        resolution: f64,
    ) -> (Arc<CommunityResult>, crate::trace::TraceStep) {
        let start = Instant::now();
        let params = format!("{max_levels}:{resolution:.3}");
        let (value, hit) = self.cached_or_compute(hg, "communities", params, || {
            leiden::detect_communities(hg, max_levels, resolution)
        });
        let trace = self.trace("FindCommunities", None, start, hit, hg.node_count(), None);
        (value, trace)
    }

    pub fn sese_regions_with_trace(
        &self,
        hg: &HierarchicalGraph,
    ) -> (Result<Arc<Vec<SeseRegion>>, AnalyticsError>, crate::trace::TraceStep) {
        let start = Instant::now();
        let (result, hit) = self.try_cached(hg, "sese", String::new(), || {
            let doms = dominators::compute_dominator_tree(hg, None)?;
            let pdoms = post_dominators::compute_post_dominator_tree(hg)?;
            Ok(sese::discover_regions(hg, &doms, &pdoms))
        });
        let err = result.as_ref().err().map(|e| e.to_string());
        let trace = self.trace("FindExtractableRegions", None, start, hit, hg.node_count(), err);
        (result, trace)
    }

    pub fn control_dependence_with_trace(
        &self,
        hg: &HierarchicalGraph,
    ) -> (Result<Arc<ControlDependence>, AnalyticsError>, crate::trace::TraceStep) {
        let start = Instant::now();
        let (result, hit) = self.try_cached(hg, "control_dependence", String::new(), || {
            let pdoms = post_dominators::compute_post_dominator_tree(hg)?;
            Ok(control_dependence::compute_control_dependence(hg, &pdoms))
        });
        let err = result.as_ref().err().map(|e| e.to_string());
        let trace = self.trace("FindControlDependencies", None, start, hit, hg.node_count(), err);
        (result, trace)
    }

    pub fn reducibility_with_trace(
        &self,
        hg: &HierarchicalGraph,
    ) -> (Arc<ReducibilityResult>, crate::trace::TraceStep) {
        let start = Instant::now();
        let (value, hit) = self.cached_or_compute(hg, "reducibility", String::new(), || {
            reducibility::check_reducibility(hg)
        });
        let trace = self.trace("CheckReducibility", None, start, hit, hg.node_count(), None);
        (value, trace)
    }
}

impl Default for GraphAnalytics {
    fn default() -> Self {
        Self::new()
    }
}

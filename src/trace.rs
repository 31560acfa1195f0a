//! `TraceStep`: the structured telemetry record every tool invocation
//! produces (spec §3/§6, component G).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// How strongly a proof-update should be weighted by a downstream
/// reasoning consumer — we only specify the shape, not the consumer
/// (spec §1 "MCTS/agent certified reasoning state consumer").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalStrength {
    Soft,
    Hard,
}

/// One `(node_id, status, witness, signal)` proof update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofUpdate {
    pub node_id: String,
    pub status: String,
    pub witness: String,
    pub signal: SignalStrength,
}

/// Structured telemetry for a single tool invocation (spec §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    /// Tool verb, e.g. `analytics_articulation_points`.
    pub action: String,
    /// Algorithm name, e.g. `ArticulationPoints`.
    pub tool: String,
    pub target: Option<String>,
    pub duration: Duration,
    pub metadata: HashMap<String, String>,
    pub symbols_found: Vec<String>,
    pub dependencies: Vec<(String, String)>,
    pub proof_updates: Vec<ProofUpdate>,
    pub error: Option<String>,
}

/// Builds a [`TraceStep`], enforcing that `action`/`tool` are non-empty and
/// `duration > 0` whenever no error is set (spec §3).
#[derive(Debug, Default)]
pub struct TraceStepBuilder {
    action: String,
    tool: String,
    target: Option<String>,
    duration: Duration,
    metadata: HashMap<String, String>,
    symbols_found: Vec<String>,
    dependencies: Vec<(String, String)>,
    proof_updates: Vec<ProofUpdate>,
    error: Option<String>,
}

impl TraceStepBuilder {
    pub fn new(action: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            tool: tool.into(),
            ..Default::default()
        }
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn symbols_found(mut self, symbols: Vec<String>) -> Self {
        self.symbols_found = symbols;
        self
    }

    pub fn dependency(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.dependencies.push((from.into(), to.into()));
        self
    }

    pub fn proof_update(mut self, update: ProofUpdate) -> Self {
        self.proof_updates.push(update);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Finalizes the step. Panics only on a construction bug (empty
    /// action/tool or zero duration with no error set) — callers always
    /// provide a measured duration, so this is an assertion, not a
    /// user-facing failure mode.
    pub fn build(self) -> TraceStep {
        if self.error.is_none() {
            debug_assert!(!self.action.is_empty(), "TraceStep.action must be non-empty");
            debug_assert!(!self.tool.is_empty(), "TraceStep.tool must be non-empty");
            debug_assert!(self.duration > Duration::ZERO, "TraceStep.duration must be > 0");
        }
        TraceStep {
            action: self.action,
            tool: self.tool,
            target: self.target,
            duration: self.duration,
            metadata: self.metadata,
            symbols_found: self.symbols_found,
            dependencies: self.dependencies,
            proof_updates: self.proof_updates,
            error: self.error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_round_trips_fields() {
        let step = TraceStepBuilder::new("analytics_articulation_points", "ArticulationPoints")
            .target("main")
            .duration(Duration::from_millis(5))
            .metadata("nodes", "10")
            .symbols_found(vec!["a".to_string()])
            .dependency("a", "b")
            .build();
        assert_eq!(step.action, "analytics_articulation_points");
        assert_eq!(step.tool, "ArticulationPoints");
        assert_eq!(step.metadata.get("nodes").unwrap(), "10");
        assert_eq!(step.dependencies, vec![("a".to_string(), "b".to_string())]);
    }
}

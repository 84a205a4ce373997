//! Injected decision-log stores. The log is advisory: entries may be
//! evicted at will and are never a source of truth.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::{context::DecisionContext, engine::AutonomousDecision};

/// Coarse context key used for grouping recorded decisions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ContextFingerprint {
    /// Health decile (0..=10).
    pub health_bucket: u8,
    /// Number of active constraints.
    pub constraint_count: usize,
    /// Number of objectives.
    pub objective_count: usize,
}

impl ContextFingerprint {
    /// Derives the fingerprint of a context.
    #[must_use]
    pub fn of(context: &DecisionContext) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let health_bucket = (context.state.health.clamp(0.0, 1.0) * 10.0).floor() as u8;
        Self {
            health_bucket,
            constraint_count: context.constraints.len(),
            objective_count: context.objectives.len(),
        }
    }

    /// Compact label for logs (`h7-c2-o1`).
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "h{}-c{}-o{}",
            self.health_bucket, self.constraint_count, self.objective_count
        )
    }
}

/// Decision log owned by the caller and injected into the runtime; every
/// write is one entry keyed by the decision id, so concurrent writers
/// never race on shared entries.
pub trait DecisionStore: Send + Sync {
    /// Records a decision, best-effort.
    fn record(&self, decision: &AutonomousDecision);

    /// Returns recorded decisions for the fingerprint, newest first.
    fn history_for(&self, fingerprint: ContextFingerprint) -> Vec<AutonomousDecision>;

    /// Number of retained entries.
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Bounded in-memory store evicting the oldest entry once full.
#[derive(Debug)]
pub struct MemoryDecisionStore {
    capacity: usize,
    inner: RwLock<VecDeque<(ContextFingerprint, AutonomousDecision)>>,
}

impl MemoryDecisionStore {
    /// Creates a store retaining at most `capacity` decisions.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(VecDeque::with_capacity(capacity.max(1))),
        }
    }

    /// Shared handle with the default capacity.
    #[must_use]
    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(capacity))
    }
}

impl DecisionStore for MemoryDecisionStore {
    fn record(&self, decision: &AutonomousDecision) {
        let fingerprint = ContextFingerprint::of(&decision.context);
        let mut inner = self.inner.write();
        if inner.len() >= self.capacity {
            inner.pop_front();
        }
        inner.push_back((fingerprint, decision.clone()));
    }

    fn history_for(&self, fingerprint: ContextFingerprint) -> Vec<AutonomousDecision> {
        self.inner
            .read()
            .iter()
            .rev()
            .filter(|(key, _)| *key == fingerprint)
            .map(|(_, decision)| decision.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.inner.read().len()
    }
}

/// Store that drops everything; useful in tests and fire-and-forget
/// deployments.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopDecisionStore;

impl DecisionStore for NoopDecisionStore {
    fn record(&self, _decision: &AutonomousDecision) {}

    fn history_for(&self, _fingerprint: ContextFingerprint) -> Vec<AutonomousDecision> {
        Vec::new()
    }

    fn len(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SystemState;
    use crate::engine::DecisionEngine;

    fn decision_for(health: f64) -> AutonomousDecision {
        DecisionEngine::default().decide(&DecisionContext::new(SystemState::new(health)))
    }

    #[test]
    fn fingerprint_buckets_health() {
        let fingerprint =
            ContextFingerprint::of(&DecisionContext::new(SystemState::new(0.73)));
        assert_eq!(fingerprint.health_bucket, 7);
        assert_eq!(fingerprint.label(), "h7-c0-o0");
    }

    #[test]
    fn store_groups_by_fingerprint() {
        let store = MemoryDecisionStore::new(8);
        store.record(&decision_for(0.75));
        store.record(&decision_for(0.78));
        store.record(&decision_for(0.2));
        let fingerprint =
            ContextFingerprint::of(&DecisionContext::new(SystemState::new(0.75)));
        assert_eq!(store.history_for(fingerprint).len(), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn store_evicts_oldest_beyond_capacity() {
        let store = MemoryDecisionStore::new(2);
        for _ in 0..4 {
            store.record(&decision_for(0.9));
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn noop_store_retains_nothing() {
        let store = NoopDecisionStore;
        store.record(&decision_for(0.9));
        assert!(store.is_empty());
    }
}

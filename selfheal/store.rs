//! Bounded in-memory archive of healing plans keyed by issue id.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::planner::{HealingError, HealingPlan};

/// Plan store shared by the runtime; one entry per issue id, so
/// concurrent planners never contend on the same entry.
#[derive(Debug)]
pub struct HealingPlanStore {
    capacity: usize,
    inner: RwLock<IndexMap<Uuid, HealingPlan>>,
}

impl HealingPlanStore {
    /// Creates a store retaining at most `capacity` plans.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(IndexMap::with_capacity(capacity.max(1))),
        }
    }

    /// Shared handle.
    #[must_use]
    pub fn shared(capacity: usize) -> Arc<Self> {
        Arc::new(Self::new(capacity))
    }

    /// Records a plan, evicting the oldest entry once full. Re-planning
    /// the same issue replaces the previous entry.
    pub fn record(&self, plan: &HealingPlan) {
        let mut inner = self.inner.write();
        if !inner.contains_key(&plan.issue_id) && inner.len() >= self.capacity {
            inner.shift_remove_index(0);
        }
        inner.insert(plan.issue_id, plan.clone());
    }

    /// Fetches the stored plan for an issue.
    pub fn get(&self, issue_id: Uuid) -> Result<HealingPlan, HealingError> {
        self.inner
            .read()
            .get(&issue_id)
            .cloned()
            .ok_or(HealingError::PlanNotFound(issue_id))
    }

    /// Number of retained plans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

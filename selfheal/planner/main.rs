//! Self-healing planner mapping classified issues to ordered remediation
//! sequences with rollback plans.

/// Rollback inversion and trigger rules.
pub mod rollback;
/// Issue-to-action template table.
pub mod templates;

use chrono::{DateTime, Utc};
use opscore_decision::context::{ActionKind, ActionParameters};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use rollback::{RollbackPlan, RollbackTrigger};

/// Errors surfaced by the self-healing layer.
#[derive(Debug, Error, Clone)]
pub enum HealingError {
    /// No plan has been stored for the given issue.
    #[error("no healing plan stored for issue {0}")]
    PlanNotFound(Uuid),
}

/// Issue taxonomy produced by upstream detection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IssueKind {
    /// Error rate above tolerance.
    HighErrorRate,
    /// Latency or throughput degradation.
    PerformanceDegradation,
    /// Failing node or device.
    HardwareFailure,
    /// Unbounded memory growth.
    MemoryLeak,
    /// Service not answering at all.
    ServiceUnavailable,
    /// Anything the taxonomy does not name.
    Custom(String),
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HighErrorRate => write!(f, "high_error_rate"),
            Self::PerformanceDegradation => write!(f, "performance_degradation"),
            Self::HardwareFailure => write!(f, "hardware_failure"),
            Self::MemoryLeak => write!(f, "memory_leak"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Issue severity reported by the detector.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum IssueSeverity {
    /// Cosmetic or slow-burning.
    Low,
    /// Noticeable degradation.
    Medium,
    /// User-visible outage risk.
    High,
    /// Active outage.
    Critical,
}

impl IssueSeverity {
    /// Base success probability for plans addressing this severity.
    #[must_use]
    pub const fn base_success_probability(self) -> f64 {
        match self {
            Self::Low => 0.9,
            Self::Medium => 0.8,
            Self::High => 0.7,
            Self::Critical => 0.6,
        }
    }
}

/// Detected issue handed to the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemIssue {
    /// Unique identifier.
    pub id: Uuid,
    /// Classified kind.
    pub kind: IssueKind,
    /// Reported severity.
    pub severity: IssueSeverity,
    /// Operator-facing description.
    pub description: String,
    /// Detection timestamp.
    pub detected_at: DateTime<Utc>,
}

impl SystemIssue {
    /// Creates an issue detected now.
    #[must_use]
    pub fn new(kind: IssueKind, severity: IssueSeverity, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            severity,
            description: description.into(),
            detected_at: Utc::now(),
        }
    }
}

/// One step of a healing sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingAction {
    /// Unique identifier.
    pub id: Uuid,
    /// Shared action taxonomy entry.
    pub kind: ActionKind,
    /// What the executor should do.
    pub description: String,
    /// Free-form execution parameters.
    pub parameters: ActionParameters,
    /// Relative order within the plan.
    pub order: u8,
    /// Execution timeout in seconds.
    pub timeout_secs: u64,
}

/// Ordered remediation sequence plus its rollback plan. The caller owns
/// execution; the plan is never mutated after return.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealingPlan {
    /// Issue the plan addresses.
    pub issue_id: Uuid,
    /// Prioritized actions.
    pub actions: Vec<HealingAction>,
    /// Expected recovery horizon in seconds.
    pub estimated_recovery_secs: u64,
    /// Probability of success in [0.1, 0.95].
    pub success_probability: f64,
    /// Inverse sequence with trigger conditions.
    pub rollback: RollbackPlan,
    /// Planning timestamp.
    pub planned_at: DateTime<Utc>,
}

/// Tunable planning constants, kept apart from the algorithm.
#[derive(Debug, Clone)]
pub struct HealingHeuristics {
    /// Success-probability penalty per planned action.
    pub per_action_penalty: f64,
    /// Lower success-probability clamp.
    pub probability_floor: f64,
    /// Upper success-probability clamp.
    pub probability_ceiling: f64,
    /// Recovery buffer added to the timeout sum, in seconds.
    pub recovery_buffer_secs: u64,
}

impl Default for HealingHeuristics {
    fn default() -> Self {
        Self {
            per_action_penalty: 0.05,
            probability_floor: 0.1,
            probability_ceiling: 0.95,
            recovery_buffer_secs: 300,
        }
    }
}

/// Deterministic planner driven by the issue template table.
#[derive(Debug, Clone, Default)]
pub struct HealingPlanner {
    heuristics: HealingHeuristics,
}

impl HealingPlanner {
    /// Creates a planner with custom heuristics.
    #[must_use]
    pub const fn new(heuristics: HealingHeuristics) -> Self {
        Self { heuristics }
    }

    /// Produces a healing plan for the issue. Total: unknown issue kinds
    /// fall back to the generic single-restart template.
    #[must_use]
    pub fn plan(&self, issue: &SystemIssue) -> HealingPlan {
        let mut actions: Vec<HealingAction> = templates::templates_for(&issue.kind)
            .into_iter()
            .map(templates::ActionTemplate::instantiate)
            .collect();
        prioritize(&mut actions);

        let timeout_sum: u64 = actions.iter().map(|action| action.timeout_secs).sum();
        let estimated_recovery_secs = timeout_sum + self.heuristics.recovery_buffer_secs;
        let success_probability = self.success_probability(issue.severity, actions.len());
        let rollback = rollback::build_rollback(&actions);

        HealingPlan {
            issue_id: issue.id,
            actions,
            estimated_recovery_secs,
            success_probability,
            rollback,
            planned_at: Utc::now(),
        }
    }

    /// Severity base rate minus a per-action penalty, clamped.
    #[must_use]
    pub fn success_probability(&self, severity: IssueSeverity, action_count: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let penalty = self.heuristics.per_action_penalty * action_count as f64;
        (severity.base_success_probability() - penalty).clamp(
            self.heuristics.probability_floor,
            self.heuristics.probability_ceiling,
        )
    }
}

/// Stable ordering: template order first, then the shared action-kind
/// risk table, then timeout ascending.
fn prioritize(actions: &mut [HealingAction]) {
    actions.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then_with(|| {
                a.kind
                    .profile()
                    .base_risk
                    .partial_cmp(&b.kind.profile().base_risk)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.timeout_secs.cmp(&b.timeout_secs))
    });
}

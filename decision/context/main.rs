//! Shared operations vocabulary consumed by every opscore engine.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the decision layer.
#[derive(Debug, Error, Clone)]
pub enum DecisionError {
    /// No decision has been recorded for the requested fingerprint.
    #[error("no recorded decision for fingerprint {0}")]
    NoHistory(String),
}

/// Prerequisite satisfied whenever system health is above 0.7.
pub const COND_SYSTEM_HEALTHY: &str = "system_healthy";
/// Prerequisite satisfied whenever the error rate is below 0.02.
pub const COND_LOW_ERROR_RATE: &str = "low_error_rate";
/// Prerequisite treated as always satisfied.
pub const COND_MAINTENANCE_WINDOW: &str = "maintenance_window";

/// Point-in-time performance snapshot supplied by the external monitor.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    /// Fraction of failed requests (0..1).
    pub error_rate: f64,
    /// Average request latency in milliseconds.
    pub latency_ms: f64,
    /// Requests handled per second.
    pub throughput: f64,
}

/// Security event observed by upstream detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique identifier.
    pub id: Uuid,
    /// Event category (e.g. `unauthorized_access`).
    pub kind: String,
    /// Timestamp of detection.
    pub detected_at: DateTime<Utc>,
}

impl SecurityEvent {
    /// Creates an event detected now.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind: kind.into(),
            detected_at: Utc::now(),
        }
    }
}

/// Immutable snapshot of the monitored system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemState {
    /// Aggregate health between 0 and 1.
    pub health: f64,
    /// Performance metrics.
    pub performance: PerformanceSnapshot,
    /// Outstanding security events.
    pub security_events: Vec<SecurityEvent>,
    /// Snapshot timestamp.
    pub observed_at: DateTime<Utc>,
}

impl SystemState {
    /// Creates a snapshot observed now with the given health.
    #[must_use]
    pub fn new(health: f64) -> Self {
        Self {
            health: health.clamp(0.0, 1.0),
            performance: PerformanceSnapshot::default(),
            security_events: Vec::new(),
            observed_at: Utc::now(),
        }
    }

    /// Replaces the performance snapshot.
    #[must_use]
    pub const fn with_performance(mut self, performance: PerformanceSnapshot) -> Self {
        self.performance = performance;
        self
    }

    /// Appends a security event.
    #[must_use]
    pub fn with_security_event(mut self, event: SecurityEvent) -> Self {
        self.security_events.push(event);
        self
    }

    /// Whether a named prerequisite condition currently holds.
    #[must_use]
    pub fn condition_met(&self, name: &str) -> bool {
        match name {
            COND_SYSTEM_HEALTHY => self.health > 0.7,
            COND_LOW_ERROR_RATE => self.performance.error_rate < 0.02,
            COND_MAINTENANCE_WINDOW => true,
            _ => false,
        }
    }
}

/// Optimization goal supplied with a decision request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ObjectiveKind {
    /// Maximize throughput and latency improvements.
    MaxPerformance,
    /// Maximize service availability.
    MaxAvailability,
    /// Minimize monetary cost.
    MinCost,
    /// Minimize operational risk.
    MinRisk,
}

/// Weighted objective; weights are normalized at use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Objective {
    /// Goal dimension.
    pub kind: ObjectiveKind,
    /// Non-negative weight.
    pub weight: f64,
    /// Target threshold for the dimension.
    pub threshold: f64,
}

impl Objective {
    /// Creates an objective, flooring negative weights at zero.
    #[must_use]
    pub fn new(kind: ObjectiveKind, weight: f64, threshold: f64) -> Self {
        Self {
            kind,
            weight: weight.max(0.0),
            threshold,
        }
    }
}

/// Constraint categories accepted by the engines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConstraintKind {
    /// Total spend ceiling for a decision.
    Budget,
    /// Security posture floor.
    Security,
    /// Minimum acceptable performance.
    PerformanceRequirement,
    /// CPU allocation ceiling.
    MaxCpu,
    /// Memory allocation ceiling.
    MaxMemory,
    /// Allocation cost ceiling.
    MaxCost,
}

/// Single constraint; the first entry per kind wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Constraint {
    /// Constraint category.
    pub kind: ConstraintKind,
    /// Constraint value.
    pub value: f64,
}

impl Constraint {
    /// Creates a constraint.
    #[must_use]
    pub const fn new(kind: ConstraintKind, value: f64) -> Self {
        Self { kind, value }
    }
}

/// Operational action taxonomy shared with the self-healing planner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Restart one or more services.
    RestartService,
    /// Add capacity.
    ScaleUp,
    /// Remove capacity.
    ScaleDown,
    /// Roll out a new version.
    DeployUpdate,
    /// Revert to a previous version.
    Rollback,
    /// Flush caches.
    ClearCache,
    /// Domain-specific action.
    Custom(String),
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RestartService => write!(f, "restart_service"),
            Self::ScaleUp => write!(f, "scale_up"),
            Self::ScaleDown => write!(f, "scale_down"),
            Self::DeployUpdate => write!(f, "deploy_update"),
            Self::Rollback => write!(f, "rollback"),
            Self::ClearCache => write!(f, "clear_cache"),
            Self::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Declarative per-kind descriptor: base execution risk, the risk applied
/// when system health is below 0.5, conflicting kinds, and the semantic
/// inverse used for rollback planning.
#[derive(Debug, Clone)]
pub struct ActionProfile {
    /// Baseline execution risk.
    pub base_risk: f64,
    /// Risk when the system is unhealthy.
    pub unhealthy_risk: f64,
    /// Kinds that must not run alongside this one.
    pub conflicts: Vec<ActionKind>,
    /// Semantic inverse applied when reverting.
    pub inverse: ActionKind,
}

impl ActionKind {
    /// Looks up the descriptor for this kind.
    #[must_use]
    pub fn profile(&self) -> ActionProfile {
        match self {
            Self::RestartService => ActionProfile {
                base_risk: 0.3,
                unhealthy_risk: 0.7,
                conflicts: vec![],
                inverse: Self::RestartService,
            },
            Self::ScaleUp => ActionProfile {
                base_risk: 0.2,
                unhealthy_risk: 0.2,
                conflicts: vec![Self::ScaleDown],
                inverse: Self::ScaleDown,
            },
            Self::ScaleDown => ActionProfile {
                base_risk: 0.4,
                unhealthy_risk: 0.4,
                conflicts: vec![Self::ScaleUp],
                inverse: Self::ScaleUp,
            },
            Self::DeployUpdate => ActionProfile {
                base_risk: 0.5,
                unhealthy_risk: 0.5,
                conflicts: vec![Self::Rollback],
                inverse: Self::Rollback,
            },
            Self::Rollback => ActionProfile {
                base_risk: 0.4,
                unhealthy_risk: 0.4,
                conflicts: vec![Self::DeployUpdate],
                inverse: Self::DeployUpdate,
            },
            Self::ClearCache | Self::Custom(_) => ActionProfile {
                base_risk: 0.3,
                unhealthy_risk: 0.3,
                conflicts: vec![],
                inverse: self.clone(),
            },
        }
    }

    /// Execution risk for this kind given the ambient health.
    #[must_use]
    pub fn execution_risk(&self, health: f64) -> f64 {
        let profile = self.profile();
        if health < 0.5 {
            profile.unhealthy_risk
        } else {
            profile.base_risk
        }
    }

    /// Whether this kind conflicts with `other` (symmetric).
    #[must_use]
    pub fn conflicts_with(&self, other: &Self) -> bool {
        self.profile().conflicts.contains(other)
    }
}

/// Expected effect of an action along the four scored dimensions, each
/// in [-1, 1].
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActionImpact {
    /// Performance delta.
    pub performance: f64,
    /// Availability delta.
    pub availability: f64,
    /// Security posture delta.
    pub security: f64,
    /// Cost pressure delta.
    pub cost: f64,
}

impl ActionImpact {
    /// Creates an impact vector, clamping each dimension to [-1, 1].
    #[must_use]
    pub fn new(performance: f64, availability: f64, security: f64, cost: f64) -> Self {
        Self {
            performance: performance.clamp(-1.0, 1.0),
            availability: availability.clamp(-1.0, 1.0),
            security: security.clamp(-1.0, 1.0),
            cost: cost.clamp(-1.0, 1.0),
        }
    }
}

/// Candidate action supplied with a decision request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableAction {
    /// Unique identifier within the catalogue.
    pub id: String,
    /// Action taxonomy entry.
    pub kind: ActionKind,
    /// Operator-facing description.
    pub description: String,
    /// Monetary cost, non-negative.
    pub cost: f64,
    /// Expected impact vector.
    pub impact: ActionImpact,
    /// Action ids or named conditions that must hold first.
    pub prerequisites: Vec<String>,
}

impl AvailableAction {
    /// Creates an action with no prerequisites.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ActionKind, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            description: description.into(),
            cost: 0.0,
            impact: ActionImpact::default(),
            prerequisites: Vec::new(),
        }
    }

    /// Sets the cost, flooring at zero.
    #[must_use]
    pub fn with_cost(mut self, cost: f64) -> Self {
        self.cost = cost.max(0.0);
        self
    }

    /// Sets the impact vector.
    #[must_use]
    pub const fn with_impact(mut self, impact: ActionImpact) -> Self {
        self.impact = impact;
        self
    }

    /// Adds a prerequisite (action id or named condition).
    #[must_use]
    pub fn with_prerequisite(mut self, prerequisite: impl Into<String>) -> Self {
        self.prerequisites.push(prerequisite.into());
        self
    }
}

/// Bundle of state, constraints, objectives, and candidate actions for
/// one decision request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContext {
    /// System snapshot.
    pub state: SystemState,
    /// Active constraints (first match per kind wins).
    pub constraints: Vec<Constraint>,
    /// Weighted objectives.
    pub objectives: Vec<Objective>,
    /// Candidate action catalogue.
    pub catalogue: Vec<AvailableAction>,
}

impl DecisionContext {
    /// Creates a context with no constraints, objectives, or actions.
    #[must_use]
    pub const fn new(state: SystemState) -> Self {
        Self {
            state,
            constraints: Vec::new(),
            objectives: Vec::new(),
            catalogue: Vec::new(),
        }
    }

    /// Adds a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Adds an objective.
    #[must_use]
    pub fn with_objective(mut self, objective: Objective) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Adds a candidate action.
    #[must_use]
    pub fn with_action(mut self, action: AvailableAction) -> Self {
        self.catalogue.push(action);
        self
    }

    /// First constraint value of the given kind, if any.
    #[must_use]
    pub fn constraint(&self, kind: ConstraintKind) -> Option<f64> {
        self.constraints
            .iter()
            .find(|constraint| constraint.kind == kind)
            .map(|constraint| constraint.value)
    }

    /// Budget ceiling; unlimited when no budget constraint is present.
    #[must_use]
    pub fn budget(&self) -> f64 {
        self.constraint(ConstraintKind::Budget)
            .unwrap_or(f64::INFINITY)
    }

    /// Whether `prerequisite` is satisfiable at all in this context:
    /// a named condition that currently holds, or an id present in the
    /// catalogue (selectable ahead of the dependent action).
    #[must_use]
    pub fn prerequisite_known(&self, prerequisite: &str) -> bool {
        self.state.condition_met(prerequisite)
            || self
                .catalogue
                .iter()
                .any(|action| action.id == prerequisite)
    }
}

/// Bounded risk classification shared across the engines.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    /// Routine risk.
    Low,
    /// Elevated risk.
    Medium,
    /// Substantial risk.
    High,
    /// Severe risk.
    Critical,
}

impl RiskLevel {
    /// Confidence penalty applied to decisions carrying this level.
    #[must_use]
    pub const fn confidence_penalty(self) -> f64 {
        match self {
            Self::Low => 0.0,
            Self::Medium => 0.1,
            Self::High => 0.2,
            Self::Critical => 0.3,
        }
    }

    /// Classifies a combined risk score.
    #[must_use]
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            Self::Critical
        } else if score > 0.5 {
            Self::High
        } else if score > 0.3 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// Action accepted into the ordered plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedAction {
    /// The underlying action.
    pub action: AvailableAction,
    /// 1-based rank in the plan.
    pub priority: usize,
    /// When the external executor should run it.
    pub scheduled_at: DateTime<Utc>,
    /// Prerequisites satisfied by earlier selections.
    pub dependencies: Vec<String>,
}

/// Map of free-form parameters carried by healing and custom actions.
pub type ActionParameters = IndexMap<String, String>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_conditions_follow_state() {
        let healthy = SystemState::new(0.9);
        assert!(healthy.condition_met(COND_SYSTEM_HEALTHY));
        assert!(healthy.condition_met(COND_MAINTENANCE_WINDOW));
        assert!(healthy.condition_met(COND_LOW_ERROR_RATE));

        let degraded = SystemState::new(0.4).with_performance(PerformanceSnapshot {
            error_rate: 0.08,
            latency_ms: 900.0,
            throughput: 40.0,
        });
        assert!(!degraded.condition_met(COND_SYSTEM_HEALTHY));
        assert!(!degraded.condition_met(COND_LOW_ERROR_RATE));
        assert!(!degraded.condition_met("unknown_condition"));
    }

    #[test]
    fn conflict_pairs_are_symmetric() {
        assert!(ActionKind::ScaleUp.conflicts_with(&ActionKind::ScaleDown));
        assert!(ActionKind::ScaleDown.conflicts_with(&ActionKind::ScaleUp));
        assert!(ActionKind::DeployUpdate.conflicts_with(&ActionKind::Rollback));
        assert!(ActionKind::Rollback.conflicts_with(&ActionKind::DeployUpdate));
        assert!(!ActionKind::RestartService.conflicts_with(&ActionKind::ScaleUp));
    }

    #[test]
    fn restart_risk_elevates_on_low_health() {
        assert!((ActionKind::RestartService.execution_risk(0.8) - 0.3).abs() < f64::EPSILON);
        assert!((ActionKind::RestartService.execution_risk(0.2) - 0.7).abs() < f64::EPSILON);
        assert!((ActionKind::ScaleUp.execution_risk(0.2) - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn first_constraint_per_kind_wins() {
        let context = DecisionContext::new(SystemState::new(0.8))
            .with_constraint(Constraint::new(ConstraintKind::Budget, 100.0))
            .with_constraint(Constraint::new(ConstraintKind::Budget, 900.0));
        assert!((context.budget() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn risk_level_thresholds() {
        assert_eq!(RiskLevel::from_score(0.71), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.35), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.1), RiskLevel::Low);
    }
}

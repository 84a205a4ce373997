//! Risk assessment over a selected action set and ambient system state.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::context::{DecisionContext, RiskLevel, SelectedAction};

/// Individual contributor to the aggregate risk picture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskFactor {
    /// What drives the risk.
    pub description: String,
    /// Likelihood in [0, 1].
    pub probability: f64,
    /// Blast radius in [0, 1].
    pub impact: f64,
    /// Derived score, `probability * impact`.
    pub risk_score: f64,
}

impl RiskFactor {
    /// Creates a factor, clamping inputs and deriving the score.
    #[must_use]
    pub fn new(description: impl Into<String>, probability: f64, impact: f64) -> Self {
        let probability = probability.clamp(0.0, 1.0);
        let impact = impact.clamp(0.0, 1.0);
        Self {
            description: description.into(),
            probability,
            impact,
            risk_score: probability * impact,
        }
    }
}

/// Aggregate assessment returned with every decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Bounded overall level.
    pub overall: RiskLevel,
    /// Retained factors (score above the reporting floor).
    pub factors: Vec<RiskFactor>,
    /// De-duplicated mitigation strategies.
    pub mitigations: Vec<String>,
}

impl RiskAssessment {
    /// An assessment with no contributing factors.
    #[must_use]
    pub const fn low() -> Self {
        Self {
            overall: RiskLevel::Low,
            factors: Vec::new(),
            mitigations: Vec::new(),
        }
    }
}

/// Tunable thresholds for the assessment, kept apart from the algorithm.
#[derive(Debug, Clone)]
pub struct RiskThresholds {
    /// Factors scoring at or below this are dropped.
    pub factor_floor: f64,
    /// Health below this adds the system-health factor.
    pub unhealthy_health: f64,
    /// Window within which actions count as concurrent.
    pub concurrency_window_minutes: i64,
    /// Concurrent-action count above which the concurrency factor fires.
    pub concurrency_limit: usize,
    /// Share of the maximum factor score in the combined score.
    pub max_weight: f64,
    /// Share of the average factor score in the combined score.
    pub avg_weight: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            factor_floor: 0.3,
            unhealthy_health: 0.5,
            concurrency_window_minutes: 5,
            concurrency_limit: 2,
            max_weight: 0.6,
            avg_weight: 0.4,
        }
    }
}

/// Scores a candidate action set plus ambient state into a bounded risk
/// level with mitigation hints.
#[derive(Debug, Clone, Default)]
pub struct RiskAssessmentEngine {
    thresholds: RiskThresholds,
}

impl RiskAssessmentEngine {
    /// Creates an engine with custom thresholds.
    #[must_use]
    pub const fn new(thresholds: RiskThresholds) -> Self {
        Self { thresholds }
    }

    /// Assesses the selected set against the context.
    #[must_use]
    pub fn assess(&self, selected: &[SelectedAction], context: &DecisionContext) -> RiskAssessment {
        let health = context.state.health;
        let mut factors: Vec<RiskFactor> = selected
            .iter()
            .filter_map(|sel| {
                let factor = RiskFactor::new(
                    format!(
                        "{} action {} may disrupt live traffic",
                        sel.action.kind, sel.action.id
                    ),
                    sel.action.kind.execution_risk(health),
                    sel.action.impact.availability + sel.action.impact.performance,
                );
                (factor.risk_score > self.thresholds.factor_floor).then_some(factor)
            })
            .collect();

        if health < self.thresholds.unhealthy_health {
            factors.push(RiskFactor::new(
                "system health below safe threshold",
                0.8,
                0.9,
            ));
        }
        if self.concurrent_count(selected) > self.thresholds.concurrency_limit {
            factors.push(RiskFactor::new(
                "concurrent execution of several actions in one window",
                0.6,
                0.7,
            ));
        }

        if factors.is_empty() {
            return RiskAssessment::low();
        }

        let max = factors
            .iter()
            .map(|factor| factor.risk_score)
            .fold(0.0_f64, f64::max);
        #[allow(clippy::cast_precision_loss)]
        let avg = factors.iter().map(|factor| factor.risk_score).sum::<f64>()
            / factors.len() as f64;
        #[allow(clippy::suboptimal_flops)]
        let combined = self.thresholds.max_weight * max + self.thresholds.avg_weight * avg;

        let mitigations = derive_mitigations(&factors);
        RiskAssessment {
            overall: RiskLevel::from_score(combined),
            factors,
            mitigations,
        }
    }

    /// Largest number of actions scheduled inside any single concurrency
    /// window.
    fn concurrent_count(&self, selected: &[SelectedAction]) -> usize {
        let window = Duration::minutes(self.thresholds.concurrency_window_minutes);
        selected
            .iter()
            .map(|anchor| {
                selected
                    .iter()
                    .filter(|other| {
                        let gap = (other.scheduled_at - anchor.scheduled_at).abs();
                        gap < window
                    })
                    .count()
            })
            .max()
            .unwrap_or(0)
    }
}

fn derive_mitigations(factors: &[RiskFactor]) -> Vec<String> {
    let mut mitigations: Vec<String> = Vec::new();
    let mut push = |strategy: &str| {
        if !mitigations.iter().any(|existing| existing == strategy) {
            mitigations.push(strategy.to_string());
        }
    };
    for factor in factors {
        if factor.description.contains("restart") {
            push("graceful restart with connection draining");
            push("verify rollback readiness before execution");
        }
        if factor.description.contains("concurrent") {
            push("stagger execution windows");
            push("enable circuit breakers during rollout");
        }
        if factor.description.contains("health") {
            push("increase monitoring frequency");
            push("keep standby response team on call");
        }
    }
    mitigations
}

//! Evaluation, selection, and reasoning pipeline for autonomous decisions.

/// Per-action scoring.
pub mod evaluate;
/// Reasoning and alternative synthesis.
pub mod reasoning;
/// Greedy constraint-aware selection.
pub mod select;

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    context::{DecisionContext, SelectedAction},
    outcome::{EstimatedOutcome, OutcomePredictor},
    risk::{RiskAssessment, RiskAssessmentEngine},
};

pub use evaluate::ActionEvaluation;
pub use reasoning::{Alternative, DecisionReasoning, Tradeoff};

/// Scoring weights and selection limits, grouped so tuning never touches
/// algorithm code.
#[derive(Debug, Clone)]
pub struct DecisionWeights {
    /// Weight of the feasibility component.
    pub feasibility: f64,
    /// Weight of the impact component.
    pub impact: f64,
    /// Weight of the objective-alignment component.
    pub alignment: f64,
    /// Penalty weight applied to execution risk.
    pub risk: f64,
    /// Penalty weight applied to normalized cost.
    pub cost: f64,
    /// Cost normalization divisor.
    pub cost_scale: f64,
    /// Maximum number of selected actions per decision.
    pub max_selected: usize,
    /// Minutes between consecutive scheduled actions.
    pub spacing_minutes: i64,
    /// Cost above which a cost-vs-performance tradeoff is surfaced.
    pub expensive_cost: f64,
    /// Risk above which a risk-vs-benefit tradeoff is surfaced.
    pub risky_threshold: f64,
    /// Maximum number of alternatives included in reasoning.
    pub max_alternatives: usize,
}

impl Default for DecisionWeights {
    fn default() -> Self {
        Self {
            feasibility: 0.3,
            impact: 0.3,
            alignment: 0.3,
            risk: 0.1,
            cost: 0.1,
            cost_scale: 1000.0,
            max_selected: 5,
            spacing_minutes: 5,
            expensive_cost: 100.0,
            risky_threshold: 0.5,
            max_alternatives: 3,
        }
    }
}

/// Informational summary of how pressing and how tangled the situation is.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Situation {
    /// Urgency in {1.0, 0.7, 0.4, 0.1}.
    pub urgency: f64,
    /// Complexity in [0, 1].
    pub complexity: f64,
}

/// Discretizes urgency and complexity from the context. Feeds reasoning
/// only; never gates selection.
#[must_use]
pub fn analyze_situation(context: &DecisionContext) -> Situation {
    let health = context.state.health;
    let error_rate = context.state.performance.error_rate;
    let security_events = context.state.security_events.len();

    let urgency = if health < 0.3 || error_rate >= 0.1 || security_events >= 3 {
        1.0
    } else if health < 0.5 || error_rate >= 0.05 || security_events >= 1 {
        0.7
    } else if health < 0.7 || error_rate >= 0.02 {
        0.4
    } else {
        0.1
    };

    #[allow(clippy::cast_precision_loss, clippy::suboptimal_flops)]
    let complexity = (context.catalogue.len() as f64 * 0.05
        + context.constraints.len() as f64 * 0.1
        + context.objectives.len() as f64 * 0.1)
        .min(1.0);

    Situation {
        urgency,
        complexity,
    }
}

/// Decision produced for one context; immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutonomousDecision {
    /// Unique identifier.
    pub id: Uuid,
    /// The context the decision was made against.
    pub context: DecisionContext,
    /// Ordered plan (at most the configured maximum).
    pub selected: Vec<SelectedAction>,
    /// Explanation of the choice.
    pub reasoning: DecisionReasoning,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Risk assessment over the selected set.
    pub risk: RiskAssessment,
    /// Predicted effect of the selected set.
    pub outcome: EstimatedOutcome,
    /// Decision timestamp.
    pub decided_at: DateTime<Utc>,
}

/// The decision engine: a pure function of its context.
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    weights: DecisionWeights,
    risk_engine: RiskAssessmentEngine,
    predictor: OutcomePredictor,
}

impl DecisionEngine {
    /// Creates an engine with the given weights.
    #[must_use]
    pub fn new(weights: DecisionWeights) -> Self {
        Self {
            weights,
            risk_engine: RiskAssessmentEngine::default(),
            predictor: OutcomePredictor::default(),
        }
    }

    /// Returns the active weights.
    #[must_use]
    pub const fn weights(&self) -> &DecisionWeights {
        &self.weights
    }

    /// Evaluates the catalogue and selects an ordered, conflict-free,
    /// budget-respecting action plan. Total over its input domain: an
    /// empty or unsatisfiable catalogue yields an empty plan with floor
    /// confidence rather than an error.
    #[must_use]
    pub fn decide(&self, context: &DecisionContext) -> AutonomousDecision {
        let now = Utc::now();
        let situation = analyze_situation(context);

        let mut evaluations: Vec<ActionEvaluation> = context
            .catalogue
            .iter()
            .map(|action| evaluate::evaluate_action(action, context, &self.weights))
            .collect();
        evaluations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        tracing::debug!(
            evaluated = evaluations.len(),
            urgency = situation.urgency,
            "catalogue evaluated"
        );

        let selected = select::select_actions(&evaluations, context, &self.weights, now);
        let reasoning =
            reasoning::build_reasoning(&situation, &evaluations, &selected, context, &self.weights);
        let risk = self.risk_engine.assess(&selected, context);
        let outcome = self.predictor.predict(&selected, context, now);

        #[allow(clippy::cast_precision_loss)]
        let mean_score = if selected.is_empty() {
            0.0
        } else {
            let ids: Vec<&str> = selected.iter().map(|s| s.action.id.as_str()).collect();
            evaluations
                .iter()
                .filter(|eval| ids.contains(&eval.action.id.as_str()))
                .map(|eval| eval.score)
                .sum::<f64>()
                / selected.len() as f64
        };
        let confidence =
            (mean_score - risk.overall.confidence_penalty()).clamp(0.0, 1.0);

        AutonomousDecision {
            id: Uuid::new_v4(),
            context: context.clone(),
            selected,
            reasoning,
            confidence,
            risk,
            outcome,
            decided_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{
        ActionImpact, ActionKind, AvailableAction, Constraint, ConstraintKind, Objective,
        ObjectiveKind, PerformanceSnapshot, RiskLevel, SecurityEvent, SystemState,
    };

    fn restart_action() -> AvailableAction {
        AvailableAction::new("restart-api", ActionKind::RestartService, "Restart API pods")
            .with_impact(ActionImpact::new(0.5, 0.5, 0.0, 0.0))
    }

    #[test]
    fn urgency_discretizes_from_state() {
        let calm = DecisionContext::new(SystemState::new(0.95));
        assert!((analyze_situation(&calm).urgency - 0.1).abs() < f64::EPSILON);

        let critical = DecisionContext::new(
            SystemState::new(0.2).with_security_event(SecurityEvent::new("intrusion")),
        );
        assert!((analyze_situation(&critical).urgency - 1.0).abs() < f64::EPSILON);

        let elevated = DecisionContext::new(SystemState::new(0.8).with_performance(
            PerformanceSnapshot {
                error_rate: 0.06,
                latency_ms: 120.0,
                throughput: 300.0,
            },
        ));
        assert!((analyze_situation(&elevated).urgency - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_catalogue_yields_degenerate_decision() {
        let engine = DecisionEngine::default();
        let decision = engine.decide(&DecisionContext::new(SystemState::new(0.9)));
        assert!(decision.selected.is_empty());
        assert!((decision.confidence - 0.0).abs() < f64::EPSILON);
        assert_eq!(decision.risk.overall, RiskLevel::Low);
    }

    #[test]
    fn decide_is_idempotent_for_a_fixed_context() {
        let engine = DecisionEngine::default();
        let context = DecisionContext::new(SystemState::new(0.6))
            .with_objective(Objective::new(ObjectiveKind::MaxPerformance, 1.0, 0.8))
            .with_action(restart_action())
            .with_action(
                AvailableAction::new("scale-web", ActionKind::ScaleUp, "Add web replicas")
                    .with_cost(120.0)
                    .with_impact(ActionImpact::new(0.6, 0.4, 0.0, 0.3)),
            );
        let first = engine.decide(&context);
        let second = engine.decide(&context);
        let ids = |decision: &AutonomousDecision| {
            decision
                .selected
                .iter()
                .map(|s| s.action.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
        assert!((first.confidence - second.confidence).abs() < 1e-9);
    }

    #[test]
    fn degraded_health_restart_scenario() {
        let engine = DecisionEngine::default();
        let context = DecisionContext::new(SystemState::new(0.2))
            .with_objective(Objective::new(ObjectiveKind::MaxAvailability, 1.0, 0.99))
            .with_action(restart_action());
        let decision = engine.decide(&context);
        assert_eq!(decision.selected.len(), 1);
        assert_eq!(decision.selected[0].action.id, "restart-api");
        assert!(decision.risk.overall >= RiskLevel::High);
        assert!(decision.confidence < 0.6);
    }

    #[test]
    fn budget_bounds_total_selected_cost() {
        let engine = DecisionEngine::default();
        let mut context = DecisionContext::new(SystemState::new(0.9))
            .with_constraint(Constraint::new(ConstraintKind::Budget, 150.0));
        for idx in 0..4 {
            context = context.with_action(
                AvailableAction::new(
                    format!("act-{idx}"),
                    ActionKind::ClearCache,
                    "Flush edge cache",
                )
                .with_cost(60.0)
                .with_impact(ActionImpact::new(0.3, 0.1, 0.0, 0.1)),
            );
        }
        let decision = engine.decide(&context);
        let spend: f64 = decision.selected.iter().map(|s| s.action.cost).sum();
        assert!(spend <= 150.0);
        assert!(decision.selected.len() <= engine.weights().max_selected);
    }

    #[test]
    fn conflicting_pair_is_never_co_selected() {
        let engine = DecisionEngine::default();
        let context = DecisionContext::new(SystemState::new(0.9))
            .with_action(
                AvailableAction::new("grow", ActionKind::ScaleUp, "Add replicas")
                    .with_impact(ActionImpact::new(0.5, 0.5, 0.0, 0.2)),
            )
            .with_action(
                AvailableAction::new("shrink", ActionKind::ScaleDown, "Remove replicas")
                    .with_impact(ActionImpact::new(0.4, 0.4, 0.0, -0.2)),
            );
        let decision = engine.decide(&context);
        let kinds: Vec<_> = decision
            .selected
            .iter()
            .map(|s| s.action.kind.clone())
            .collect();
        assert!(
            !(kinds.contains(&ActionKind::ScaleUp) && kinds.contains(&ActionKind::ScaleDown))
        );
    }

    #[test]
    fn selection_never_exceeds_five() {
        let engine = DecisionEngine::default();
        let mut context = DecisionContext::new(SystemState::new(0.9));
        for idx in 0..9 {
            context = context.with_action(
                AvailableAction::new(format!("cache-{idx}"), ActionKind::ClearCache, "Flush")
                    .with_impact(ActionImpact::new(0.2, 0.1, 0.0, 0.0)),
            );
        }
        let decision = engine.decide(&context);
        assert_eq!(decision.selected.len(), 5);
        let priorities: Vec<_> = decision.selected.iter().map(|s| s.priority).collect();
        assert_eq!(priorities, vec![1, 2, 3, 4, 5]);
    }
}

use serde::{Deserialize, Serialize};

use crate::context::{AvailableAction, DecisionContext, ObjectiveKind};

use super::DecisionWeights;

/// Feasibility assigned when a prerequisite cannot be satisfied.
const FEASIBILITY_BLOCKED: f64 = 0.2;
/// Feasibility assigned when the budget cannot cover the action.
const FEASIBILITY_OVER_BUDGET: f64 = 0.3;
/// Feasibility assigned to an unencumbered action.
const FEASIBILITY_CLEAR: f64 = 0.9;

/// Derived scoring of one candidate action; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionEvaluation {
    /// The evaluated action.
    pub action: AvailableAction,
    /// Prerequisite/budget feasibility in [0, 1].
    pub feasibility: f64,
    /// Aggregate impact in [0, 1].
    pub impact: f64,
    /// Execution risk in [0, 1].
    pub risk: f64,
    /// Objective alignment in [0, 1].
    pub alignment: f64,
    /// Composite score clamped to [0, 1].
    pub score: f64,
}

/// Scores a single candidate against the context.
#[must_use]
pub fn evaluate_action(
    action: &AvailableAction,
    context: &DecisionContext,
    weights: &DecisionWeights,
) -> ActionEvaluation {
    let feasibility = feasibility_of(action, context);
    let impact = aggregate_impact(action);
    let risk = action.kind.execution_risk(context.state.health);
    let alignment = alignment_of(action, context, risk);

    #[allow(clippy::suboptimal_flops)]
    let score = weights.feasibility * feasibility
        + weights.impact * impact
        + weights.alignment * alignment
        - weights.risk * risk
        - weights.cost * (action.cost / weights.cost_scale);

    ActionEvaluation {
        action: action.clone(),
        feasibility,
        impact,
        risk,
        alignment,
        score: score.clamp(0.0, 1.0),
    }
}

fn feasibility_of(action: &AvailableAction, context: &DecisionContext) -> f64 {
    let blocked = action
        .prerequisites
        .iter()
        .any(|prerequisite| !context.prerequisite_known(prerequisite));
    if blocked {
        FEASIBILITY_BLOCKED
    } else if action.cost > context.budget() {
        FEASIBILITY_OVER_BUDGET
    } else {
        FEASIBILITY_CLEAR
    }
}

fn aggregate_impact(action: &AvailableAction) -> f64 {
    let impact = action.impact;
    ((impact.performance + impact.availability + impact.security - impact.cost) / 4.0)
        .clamp(0.0, 1.0)
}

/// Weighted alignment of the action's impact with the objectives. For
/// `MinRisk` the action's own execution risk stands in for a nested
/// assessment.
fn alignment_of(action: &AvailableAction, context: &DecisionContext, risk: f64) -> f64 {
    let total_weight: f64 = context
        .objectives
        .iter()
        .map(|objective| objective.weight)
        .sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = context
        .objectives
        .iter()
        .map(|objective| {
            let dimension = match objective.kind {
                ObjectiveKind::MaxPerformance => action.impact.performance,
                ObjectiveKind::MaxAvailability => action.impact.availability,
                ObjectiveKind::MinCost => -action.impact.cost,
                ObjectiveKind::MinRisk => -risk,
            };
            objective.weight * dimension
        })
        .sum();
    (weighted / total_weight).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{
        ActionImpact, ActionKind, Constraint, ConstraintKind, Objective, SystemState,
        COND_SYSTEM_HEALTHY,
    };

    fn context_with(health: f64) -> DecisionContext {
        DecisionContext::new(SystemState::new(health))
    }

    #[test]
    fn unmet_prerequisite_floors_feasibility() {
        let action = AvailableAction::new("a", ActionKind::ClearCache, "flush")
            .with_prerequisite("nonexistent-action");
        let eval = evaluate_action(&action, &context_with(0.9), &DecisionWeights::default());
        assert!((eval.feasibility - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn named_condition_prerequisite_counts_as_met() {
        let action = AvailableAction::new("a", ActionKind::ClearCache, "flush")
            .with_prerequisite(COND_SYSTEM_HEALTHY);
        let eval = evaluate_action(&action, &context_with(0.9), &DecisionWeights::default());
        assert!((eval.feasibility - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn over_budget_action_scores_low_feasibility() {
        let context = context_with(0.9)
            .with_constraint(Constraint::new(ConstraintKind::Budget, 50.0));
        let action =
            AvailableAction::new("a", ActionKind::DeployUpdate, "deploy").with_cost(200.0);
        let eval = evaluate_action(&action, &context, &DecisionWeights::default());
        assert!((eval.feasibility - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn min_risk_objective_penalizes_risky_actions() {
        let context = context_with(0.9)
            .with_objective(Objective::new(ObjectiveKind::MinRisk, 1.0, 0.2));
        let safe = AvailableAction::new("safe", ActionKind::ScaleUp, "add capacity")
            .with_impact(ActionImpact::new(0.3, 0.3, 0.0, 0.1));
        let risky = AvailableAction::new("risky", ActionKind::DeployUpdate, "ship release")
            .with_impact(ActionImpact::new(0.3, 0.3, 0.0, 0.1));
        let weights = DecisionWeights::default();
        let safe_eval = evaluate_action(&safe, &context, &weights);
        let risky_eval = evaluate_action(&risky, &context, &weights);
        assert!(safe_eval.score > risky_eval.score);
    }

    #[test]
    fn score_stays_in_unit_interval() {
        let action = AvailableAction::new("a", ActionKind::ScaleDown, "shed load")
            .with_cost(5000.0)
            .with_impact(ActionImpact::new(-1.0, -1.0, -1.0, 1.0));
        let eval = evaluate_action(&action, &context_with(0.1), &DecisionWeights::default());
        assert!(eval.score >= 0.0 && eval.score <= 1.0);
    }
}

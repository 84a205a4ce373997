use serde::{Deserialize, Serialize};

use crate::context::{ActionKind, DecisionContext, SelectedAction};

use super::{ActionEvaluation, DecisionWeights, Situation};

/// Pairwise tension surfaced in the explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tradeoff {
    /// First dimension in tension.
    pub dimension_a: String,
    /// Second dimension in tension.
    pub dimension_b: String,
    /// Narrative note.
    pub note: String,
}

/// Unselected candidate surfaced for operator review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alternative {
    /// Candidate action id.
    pub action_id: String,
    /// Its composite score.
    pub score: f64,
    /// Points in favour.
    pub pros: Vec<String>,
    /// Points against.
    pub cons: Vec<String>,
}

/// Explanation attached to every decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DecisionReasoning {
    /// Primary qualitative factors.
    pub factors: Vec<String>,
    /// Pairwise tradeoffs among the selected actions.
    pub tradeoffs: Vec<Tradeoff>,
    /// Up to the configured number of ranked alternatives.
    pub alternatives: Vec<Alternative>,
}

/// Synthesizes the explanation for a selection.
#[must_use]
pub fn build_reasoning(
    situation: &Situation,
    evaluations: &[ActionEvaluation],
    selected: &[SelectedAction],
    context: &DecisionContext,
    weights: &DecisionWeights,
) -> DecisionReasoning {
    DecisionReasoning {
        factors: primary_factors(situation, selected, context),
        tradeoffs: tradeoffs(selected, evaluations, weights),
        alternatives: alternatives(evaluations, selected, weights),
    }
}

fn primary_factors(
    situation: &Situation,
    selected: &[SelectedAction],
    context: &DecisionContext,
) -> Vec<String> {
    let mut factors = Vec::new();
    if context.state.health < 0.5 {
        factors.push("degraded system health demands restorative action".to_string());
    }
    if context.state.performance.error_rate > 0.05 {
        factors.push("high error rate observed".to_string());
    }
    if !context.state.security_events.is_empty() {
        factors.push(format!(
            "{} unresolved security events",
            context.state.security_events.len()
        ));
    }
    let has_kind = |kind: &ActionKind| selected.iter().any(|sel| sel.action.kind == *kind);
    if has_kind(&ActionKind::RestartService) {
        factors.push("service restart required".to_string());
    }
    if has_kind(&ActionKind::ScaleUp) || has_kind(&ActionKind::ScaleDown) {
        factors.push("capacity scaling needed".to_string());
    }
    if has_kind(&ActionKind::Rollback) {
        factors.push("recent changes implicated".to_string());
    }
    if situation.urgency >= 0.7 {
        factors.push("narrow intervention window".to_string());
    }
    if factors.is_empty() {
        factors.push("routine optimization pass".to_string());
    }
    factors
}

fn tradeoffs(
    selected: &[SelectedAction],
    evaluations: &[ActionEvaluation],
    weights: &DecisionWeights,
) -> Vec<Tradeoff> {
    let mut tradeoffs = Vec::new();
    for sel in selected {
        if sel.action.cost > weights.expensive_cost {
            tradeoffs.push(Tradeoff {
                dimension_a: "cost".to_string(),
                dimension_b: "performance".to_string(),
                note: format!(
                    "{} spends {:.0} for a performance gain of {:.2}",
                    sel.action.id, sel.action.cost, sel.action.impact.performance
                ),
            });
        }
        let risk = evaluations
            .iter()
            .find(|eval| eval.action.id == sel.action.id)
            .map_or(0.0, |eval| eval.risk);
        if risk > weights.risky_threshold {
            tradeoffs.push(Tradeoff {
                dimension_a: "risk".to_string(),
                dimension_b: "benefit".to_string(),
                note: format!(
                    "{} carries execution risk {:.2} against expected availability gain {:.2}",
                    sel.action.id, risk, sel.action.impact.availability
                ),
            });
        }
    }
    tradeoffs
}

fn alternatives(
    evaluations: &[ActionEvaluation],
    selected: &[SelectedAction],
    weights: &DecisionWeights,
) -> Vec<Alternative> {
    let selected_ids: Vec<&str> = selected.iter().map(|sel| sel.action.id.as_str()).collect();
    evaluations
        .iter()
        .filter(|eval| !selected_ids.contains(&eval.action.id.as_str()))
        .take(weights.max_alternatives)
        .map(|eval| {
            let mut pros = Vec::new();
            let mut cons = Vec::new();
            if eval.action.impact.performance > 0.2 {
                pros.push("meaningful performance gain".to_string());
            }
            if eval.action.impact.availability > 0.2 {
                pros.push("improves availability".to_string());
            }
            if eval.action.impact.security > 0.2 {
                pros.push("strengthens security posture".to_string());
            }
            if eval.feasibility >= 0.9 {
                pros.push("no unmet prerequisites".to_string());
            }
            if eval.risk > 0.3 {
                cons.push("elevated execution risk".to_string());
            }
            if eval.action.cost > weights.expensive_cost {
                cons.push("high monetary cost".to_string());
            }
            if eval.feasibility < 0.9 {
                cons.push("prerequisites or budget unmet".to_string());
            }
            if pros.is_empty() {
                pros.push("scores competitively".to_string());
            }
            if cons.is_empty() {
                cons.push("outscored by the selected set".to_string());
            }
            Alternative {
                action_id: eval.action.id.clone(),
                score: eval.score,
                pros,
                cons,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ActionImpact, AvailableAction, SystemState};
    use crate::engine::evaluate::evaluate_action;
    use chrono::Utc;

    fn selected(action: AvailableAction) -> SelectedAction {
        SelectedAction {
            action,
            priority: 1,
            scheduled_at: Utc::now(),
            dependencies: vec![],
        }
    }

    #[test]
    fn surfaces_cost_tradeoff_for_expensive_actions() {
        let context = DecisionContext::new(SystemState::new(0.9));
        let action = AvailableAction::new("deploy", ActionKind::DeployUpdate, "Ship release")
            .with_cost(400.0)
            .with_impact(ActionImpact::new(0.6, 0.2, 0.0, 0.5));
        let eval = evaluate_action(&action, &context, &DecisionWeights::default());
        let result = tradeoffs(
            &[selected(action)],
            &[eval],
            &DecisionWeights::default(),
        );
        assert!(result.iter().any(|t| t.dimension_a == "cost"));
    }

    #[test]
    fn alternatives_capped_and_exclude_selected() {
        let context = DecisionContext::new(SystemState::new(0.9));
        let mut evals = Vec::new();
        for idx in 0..6 {
            let action =
                AvailableAction::new(format!("alt-{idx}"), ActionKind::ClearCache, "Flush")
                    .with_impact(ActionImpact::new(0.3, 0.1, 0.0, 0.0));
            evals.push(evaluate_action(&action, &context, &DecisionWeights::default()));
        }
        let chosen = selected(evals[0].action.clone());
        let result = alternatives(&evals, &[chosen], &DecisionWeights::default());
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|alt| alt.action_id != "alt-0"));
    }

    #[test]
    fn degraded_state_names_health_factor() {
        let context = DecisionContext::new(SystemState::new(0.3));
        let situation = Situation {
            urgency: 0.7,
            complexity: 0.2,
        };
        let factors = primary_factors(&situation, &[], &context);
        assert!(factors.iter().any(|f| f.contains("health")));
    }
}

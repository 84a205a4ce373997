use chrono::{DateTime, Duration, Utc};

use crate::context::{DecisionContext, SelectedAction};

use super::{ActionEvaluation, DecisionWeights};

/// Greedily walks the score-ordered evaluations, admitting actions that
/// fit the remaining budget, whose prerequisites are met by earlier
/// selections or ambient conditions, and that do not conflict with an
/// already-admitted action.
#[must_use]
pub fn select_actions(
    evaluations: &[ActionEvaluation],
    context: &DecisionContext,
    weights: &DecisionWeights,
    now: DateTime<Utc>,
) -> Vec<SelectedAction> {
    let mut remaining = context.budget();
    let mut selected: Vec<SelectedAction> = Vec::new();

    for evaluation in evaluations {
        if selected.len() >= weights.max_selected {
            break;
        }
        let action = &evaluation.action;
        if action.cost > remaining {
            continue;
        }
        let satisfied = |prerequisite: &String| {
            selected
                .iter()
                .any(|sel| sel.action.id == *prerequisite)
                || context.state.condition_met(prerequisite)
        };
        if !action.prerequisites.iter().all(satisfied) {
            continue;
        }
        if selected
            .iter()
            .any(|sel| sel.action.kind.conflicts_with(&action.kind))
        {
            continue;
        }

        let dependencies = action
            .prerequisites
            .iter()
            .filter(|prerequisite| {
                selected
                    .iter()
                    .any(|sel| sel.action.id == **prerequisite)
            })
            .cloned()
            .collect();

        #[allow(clippy::cast_possible_wrap)]
        let offset = Duration::minutes(weights.spacing_minutes * selected.len() as i64);
        selected.push(SelectedAction {
            action: action.clone(),
            priority: selected.len() + 1,
            scheduled_at: now + offset,
            dependencies,
        });
        remaining -= action.cost;
        if remaining <= 0.0 {
            break;
        }
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{
        ActionImpact, ActionKind, AvailableAction, Constraint, ConstraintKind, SystemState,
    };
    use crate::engine::evaluate::evaluate_action;

    fn evaluations_for(context: &DecisionContext) -> Vec<ActionEvaluation> {
        let weights = DecisionWeights::default();
        let mut evals: Vec<_> = context
            .catalogue
            .iter()
            .map(|action| evaluate_action(action, context, &weights))
            .collect();
        evals.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        evals
    }

    #[test]
    fn chained_prerequisites_become_dependencies() {
        let context = DecisionContext::new(SystemState::new(0.9))
            .with_action(
                AvailableAction::new("drain", ActionKind::ScaleDown, "Drain old pool")
                    .with_impact(ActionImpact::new(0.6, 0.5, 0.0, -0.1)),
            )
            .with_action(
                AvailableAction::new("migrate", ActionKind::Custom("migrate".into()), "Migrate")
                    .with_impact(ActionImpact::new(0.4, 0.3, 0.0, 0.1))
                    .with_prerequisite("drain"),
            );
        let selected = select_actions(
            &evaluations_for(&context),
            &context,
            &DecisionWeights::default(),
            Utc::now(),
        );
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].action.id, "drain");
        assert_eq!(selected[1].dependencies, vec!["drain".to_string()]);
    }

    #[test]
    fn unsatisfiable_budget_yields_empty_selection() {
        let context = DecisionContext::new(SystemState::new(0.9))
            .with_constraint(Constraint::new(ConstraintKind::Budget, 10.0))
            .with_action(
                AvailableAction::new("big", ActionKind::DeployUpdate, "Expensive rollout")
                    .with_cost(500.0)
                    .with_impact(ActionImpact::new(0.8, 0.8, 0.0, 0.5)),
            );
        let selected = select_actions(
            &evaluations_for(&context),
            &context,
            &DecisionWeights::default(),
            Utc::now(),
        );
        assert!(selected.is_empty());
    }

    #[test]
    fn scheduling_spaces_actions_five_minutes_apart() {
        let mut context = DecisionContext::new(SystemState::new(0.9));
        for idx in 0..3 {
            context = context.with_action(
                AvailableAction::new(format!("act-{idx}"), ActionKind::ClearCache, "Flush")
                    .with_impact(ActionImpact::new(0.2, 0.1, 0.0, 0.0)),
            );
        }
        let now = Utc::now();
        let selected = select_actions(
            &evaluations_for(&context),
            &context,
            &DecisionWeights::default(),
            now,
        );
        assert_eq!(selected.len(), 3);
        for (idx, sel) in selected.iter().enumerate() {
            #[allow(clippy::cast_possible_wrap)]
            let expected = now + Duration::minutes(5 * idx as i64);
            assert_eq!(sel.scheduled_at, expected);
        }
    }
}

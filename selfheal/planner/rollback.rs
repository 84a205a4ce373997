use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::HealingAction;

/// Condition under which a rollback is initiated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackTrigger {
    /// Machine-readable condition name.
    pub condition: String,
    /// Threshold the condition compares against.
    pub threshold: f64,
    /// Operator-facing description.
    pub description: String,
}

/// Inverse action sequence plus trigger conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RollbackPlan {
    /// Reversed, semantically inverted actions.
    pub actions: Vec<HealingAction>,
    /// Fixed trigger rules.
    pub triggers: Vec<RollbackTrigger>,
}

/// Builds the rollback plan for a healing sequence: actions reversed,
/// each kind replaced by its semantic inverse from the shared profile
/// table, descriptions prefixed with "Rollback:".
#[must_use]
pub fn build_rollback(actions: &[HealingAction]) -> RollbackPlan {
    let inverted = actions
        .iter()
        .rev()
        .enumerate()
        .map(|(idx, action)| HealingAction {
            id: Uuid::new_v4(),
            kind: action.kind.profile().inverse,
            description: format!("Rollback: {}", action.description),
            parameters: action.parameters.clone(),
            order: u8::try_from(idx + 1).unwrap_or(u8::MAX),
            timeout_secs: action.timeout_secs,
        })
        .collect();

    RollbackPlan {
        actions: inverted,
        triggers: default_triggers(),
    }
}

/// The three fixed trigger rules attached to every rollback plan.
#[must_use]
pub fn default_triggers() -> Vec<RollbackTrigger> {
    vec![
        RollbackTrigger {
            condition: "error_rate_increase".to_string(),
            threshold: 0.10,
            description: "Error rate rises more than 10% over the pre-healing baseline"
                .to_string(),
        },
        RollbackTrigger {
            condition: "response_time_ratio".to_string(),
            threshold: 2.0,
            description: "Response time reaches twice the pre-healing baseline".to_string(),
        },
        RollbackTrigger {
            condition: "availability_floor".to_string(),
            threshold: 0.95,
            description: "Availability drops below 95%".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::{templates, IssueKind};
    use opscore_decision::context::ActionKind;

    fn high_error_rate_actions() -> Vec<HealingAction> {
        templates::templates_for(&IssueKind::HighErrorRate)
            .into_iter()
            .map(templates::ActionTemplate::instantiate)
            .collect()
    }

    #[test]
    fn rollback_reverses_and_inverts_the_sequence() {
        let actions = high_error_rate_actions();
        let rollback = build_rollback(&actions);
        assert_eq!(rollback.actions.len(), actions.len());
        let kinds: Vec<_> = rollback
            .actions
            .iter()
            .map(|action| action.kind.clone())
            .collect();
        // forward: restart, clear cache, scale up, rollback
        assert_eq!(
            kinds,
            vec![
                ActionKind::DeployUpdate,
                ActionKind::ScaleDown,
                ActionKind::ClearCache,
                ActionKind::RestartService,
            ]
        );
        for (rolled, original) in rollback.actions.iter().zip(actions.iter().rev()) {
            assert_eq!(rolled.description, format!("Rollback: {}", original.description));
        }
    }

    #[test]
    fn rollback_carries_three_fixed_triggers() {
        let rollback = build_rollback(&high_error_rate_actions());
        assert_eq!(rollback.triggers.len(), 3);
        let conditions: Vec<_> = rollback
            .triggers
            .iter()
            .map(|trigger| trigger.condition.as_str())
            .collect();
        assert!(conditions.contains(&"error_rate_increase"));
        assert!(conditions.contains(&"response_time_ratio"));
        assert!(conditions.contains(&"availability_floor"));
    }

    #[test]
    fn rollback_orders_restart_from_one() {
        let rollback = build_rollback(&high_error_rate_actions());
        let orders: Vec<_> = rollback.actions.iter().map(|action| action.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }
}

use opscore_decision::context::{ActionKind, ActionParameters};
use uuid::Uuid;

use super::{HealingAction, IssueKind};

/// Declarative template row; instantiated fresh per plan.
#[derive(Debug, Clone)]
pub struct ActionTemplate {
    /// Shared action taxonomy entry.
    pub kind: ActionKind,
    /// Step description.
    pub description: &'static str,
    /// Relative order within the plan.
    pub order: u8,
    /// Execution timeout in seconds.
    pub timeout_secs: u64,
    /// Parameter pairs attached to the step.
    pub parameters: &'static [(&'static str, &'static str)],
}

impl ActionTemplate {
    const fn new(
        kind: ActionKind,
        description: &'static str,
        order: u8,
        timeout_secs: u64,
        parameters: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self {
            kind,
            description,
            order,
            timeout_secs,
            parameters,
        }
    }

    /// Materializes the template into a concrete action.
    #[must_use]
    pub fn instantiate(self) -> HealingAction {
        let mut parameters = ActionParameters::new();
        for (key, value) in self.parameters {
            parameters.insert((*key).to_string(), (*value).to_string());
        }
        HealingAction {
            id: Uuid::new_v4(),
            kind: self.kind,
            description: self.description.to_string(),
            parameters,
            order: self.order,
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Remediation template for the generic fallback plan.
fn generic_restart() -> Vec<ActionTemplate> {
    vec![ActionTemplate::new(
        ActionKind::RestartService,
        "Restart the affected service",
        1,
        300,
        &[("scope", "affected")],
    )]
}

/// Looks up the remediation sequence for an issue kind. Unknown kinds get
/// the generic restart plan.
#[must_use]
pub fn templates_for(kind: &IssueKind) -> Vec<ActionTemplate> {
    match kind {
        IssueKind::HighErrorRate => vec![
            ActionTemplate::new(
                ActionKind::RestartService,
                "Restart affected services",
                1,
                300,
                &[("scope", "affected"), ("drain", "true")],
            ),
            ActionTemplate::new(
                ActionKind::ClearCache,
                "Clear degraded caches",
                2,
                120,
                &[("tier", "edge")],
            ),
            ActionTemplate::new(
                ActionKind::ScaleUp,
                "Scale up healthy capacity",
                3,
                240,
                &[("increment", "2")],
            ),
            ActionTemplate::new(
                ActionKind::Rollback,
                "Roll back recent changes",
                4,
                600,
                &[("window", "last_deploy")],
            ),
        ],
        IssueKind::PerformanceDegradation => vec![
            ActionTemplate::new(
                ActionKind::ClearCache,
                "Flush hot caches",
                1,
                120,
                &[("tier", "all")],
            ),
            ActionTemplate::new(
                ActionKind::ScaleUp,
                "Add capacity to the slow tier",
                2,
                240,
                &[("increment", "1")],
            ),
            ActionTemplate::new(
                ActionKind::RestartService,
                "Restart the slowest instances",
                3,
                300,
                &[("scope", "slowest_decile")],
            ),
        ],
        IssueKind::HardwareFailure => vec![
            ActionTemplate::new(
                ActionKind::Custom("isolate_node".to_string()),
                "Cordon the failing node",
                1,
                60,
                &[("mode", "cordon")],
            ),
            ActionTemplate::new(
                ActionKind::Custom("migrate_workload".to_string()),
                "Migrate workloads off the failing node",
                2,
                600,
                &[("strategy", "live")],
            ),
            ActionTemplate::new(
                ActionKind::ScaleUp,
                "Provision replacement capacity",
                3,
                300,
                &[("increment", "1")],
            ),
        ],
        IssueKind::MemoryLeak => vec![
            ActionTemplate::new(
                ActionKind::RestartService,
                "Rolling restart of leaking instances",
                1,
                300,
                &[("strategy", "rolling")],
            ),
            ActionTemplate::new(
                ActionKind::ScaleUp,
                "Add headroom while the leak is diagnosed",
                2,
                240,
                &[("increment", "1")],
            ),
        ],
        IssueKind::ServiceUnavailable => vec![
            ActionTemplate::new(
                ActionKind::RestartService,
                "Restart the unresponsive service",
                1,
                300,
                &[("scope", "all")],
            ),
            ActionTemplate::new(
                ActionKind::Rollback,
                "Roll back to the last healthy release",
                2,
                600,
                &[("window", "last_healthy")],
            ),
            ActionTemplate::new(
                ActionKind::ScaleUp,
                "Scale out once the service answers",
                3,
                240,
                &[("increment", "2")],
            ),
        ],
        IssueKind::Custom(_) => generic_restart(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_named_kind_has_a_template() {
        let kinds = [
            IssueKind::HighErrorRate,
            IssueKind::PerformanceDegradation,
            IssueKind::HardwareFailure,
            IssueKind::MemoryLeak,
            IssueKind::ServiceUnavailable,
        ];
        for kind in kinds {
            assert!(!templates_for(&kind).is_empty(), "missing template: {kind}");
        }
    }

    #[test]
    fn template_orders_are_strictly_increasing() {
        let templates = templates_for(&IssueKind::HighErrorRate);
        let orders: Vec<_> = templates.iter().map(|template| template.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4]);
    }

    #[test]
    fn instantiation_copies_parameters() {
        let action = templates_for(&IssueKind::HighErrorRate)
            .remove(0)
            .instantiate();
        assert_eq!(action.parameters.get("drain").map(String::as_str), Some("true"));
    }
}

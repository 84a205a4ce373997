//! Runtime entrypoint wiring the healing planner, the plan store, and
//! telemetry.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use shared_logging::LogLevel;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    planner::{HealingError, HealingPlan, HealingPlanner, SystemIssue},
    store::HealingPlanStore,
    telemetry::SelfHealTelemetry,
};

/// Default retained plans in the bootstrap wiring.
const DEFAULT_STORE_CAPACITY: usize = 128;

/// Fully wired self-healing runtime.
#[derive(Debug, Clone)]
pub struct SelfHealRuntime {
    planner: HealingPlanner,
    store: Arc<HealingPlanStore>,
    telemetry: Option<SelfHealTelemetry>,
}

impl Default for SelfHealRuntime {
    fn default() -> Self {
        Self::new(
            HealingPlanner::default(),
            HealingPlanStore::shared(DEFAULT_STORE_CAPACITY),
        )
    }
}

impl SelfHealRuntime {
    /// Creates a runtime around a planner and a store.
    #[must_use]
    pub const fn new(planner: HealingPlanner, store: Arc<HealingPlanStore>) -> Self {
        Self {
            planner,
            store,
            telemetry: None,
        }
    }

    /// Bootstraps the runtime with default wiring.
    #[must_use]
    pub fn bootstrap() -> Self {
        let telemetry = SelfHealTelemetry::builder("selfheal.runtime")
            .log_path("logs/opscore/selfheal.log.jsonl")
            .build()
            .ok();
        let mut runtime = Self::default();
        if let Some(tel) = telemetry {
            runtime = runtime.with_telemetry(tel);
        }
        runtime
    }

    /// Attaches telemetry sinks.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: SelfHealTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Plans remediation for a detected issue. The planner call is pure;
    /// storing the plan and telemetry are best-effort side effects.
    #[instrument(skip(self, issue))]
    pub async fn plan_healing(&self, issue: SystemIssue) -> Result<HealingPlan> {
        self.log(
            LogLevel::Info,
            "selfheal.issue_received",
            json!({
                "issue": issue.id,
                "kind": issue.kind.to_string(),
                "severity": format!("{:?}", issue.severity)
            }),
        );

        let plan = self.planner.plan(&issue);
        self.store.record(&plan);

        self.log(
            LogLevel::Info,
            "selfheal.plan_ready",
            json!({
                "issue": plan.issue_id,
                "actions": plan.actions.len(),
                "success_probability": plan.success_probability,
                "recovery_secs": plan.estimated_recovery_secs
            }),
        );
        self.event(
            "selfheal.plan_ready",
            json!({
                "issue": plan.issue_id,
                "actions": plan.actions.len(),
                "rollback_actions": plan.rollback.actions.len()
            }),
        );

        Ok(plan)
    }

    /// Retrieves a previously stored plan.
    pub fn stored_plan(&self, issue_id: Uuid) -> Result<HealingPlan, HealingError> {
        self.store.get(issue_id)
    }

    fn log(&self, level: LogLevel, message: &str, fields: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, fields);
        }
    }

    fn event(&self, kind: &str, payload: serde_json::Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.event(kind, payload);
        }
    }
}

//! Runtime entrypoint wiring the resource optimizer and telemetry.

use anyhow::Result;
use serde_json::json;
use shared_logging::LogLevel;
use tracing::instrument;

use crate::{
    optimizer::{ResourceAllocationPlan, ResourceConstraints, ResourceOptimizer},
    telemetry::AllocationTelemetry,
};

/// Fully wired allocation runtime.
#[derive(Debug, Clone, Default)]
pub struct AllocationRuntime {
    optimizer: ResourceOptimizer,
    telemetry: Option<AllocationTelemetry>,
}

impl AllocationRuntime {
    /// Creates a runtime around an optimizer.
    #[must_use]
    pub const fn new(optimizer: ResourceOptimizer) -> Self {
        Self {
            optimizer,
            telemetry: None,
        }
    }

    /// Bootstraps the runtime with default wiring.
    #[must_use]
    pub fn bootstrap() -> Self {
        let telemetry = AllocationTelemetry::builder("allocation.runtime")
            .log_path("logs/opscore/allocation.log.jsonl")
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
    pub fn with_telemetry(mut self, telemetry: AllocationTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Optimizes allocations under the given constraints. The optimizer
    /// call is pure; telemetry is a best-effort side effect.
    #[instrument(skip(self, constraints))]
    pub async fn optimize_resources(
        &self,
        constraints: ResourceConstraints,
    ) -> Result<ResourceAllocationPlan> {
        self.log(
            LogLevel::Info,
            "allocation.constraints_received",
            json!({
                "max_cpu": constraints.max_cpu_usage,
                "max_memory": constraints.max_memory_usage,
                "max_cost": constraints.max_cost,
                "performance_requirement": constraints.performance_requirement
            }),
        );

        let plan = self.optimizer.optimize(&constraints);

        self.log(
            LogLevel::Info,
            "allocation.plan_ready",
            json!({
                "resources": plan.allocations.len(),
                "total_cost": plan.total_cost,
                "expected_performance": plan.expected_performance,
                "risk": plan.risk.to_string()
            }),
        );
        self.event(
            "allocation.plan_ready",
            json!({
                "total_cost": plan.total_cost,
                "risk": plan.risk.to_string(),
                "phases": plan.implementation.phases.len()
            }),
        );

        Ok(plan)
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

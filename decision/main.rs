//! Runtime entrypoint wiring the decision engine, the injected decision
//! store, and telemetry.

use std::sync::Arc;

use anyhow::Result;
use serde_json::json;
use shared_logging::LogLevel;
use tracing::instrument;

use crate::{
    context::{DecisionContext, DecisionError},
    engine::{AutonomousDecision, DecisionEngine},
    store::{ContextFingerprint, DecisionStore, MemoryDecisionStore},
    telemetry::DecisionTelemetry,
};

/// Default retained decision-log entries in the bootstrap wiring.
const DEFAULT_LOG_CAPACITY: usize = 256;

/// Fully wired decision runtime ready to serve `make_decision` calls.
#[derive(Clone)]
pub struct DecisionRuntime {
    engine: DecisionEngine,
    store: Arc<dyn DecisionStore>,
    telemetry: Option<DecisionTelemetry>,
}

impl std::fmt::Debug for DecisionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionRuntime")
            .field("log_entries", &self.store.len())
            .finish()
    }
}

impl DecisionRuntime {
    /// Creates a runtime around an engine and an injected store.
    #[must_use]
    pub fn new(engine: DecisionEngine, store: Arc<dyn DecisionStore>) -> Self {
        Self {
            engine,
            store,
            telemetry: None,
        }
    }

    /// Bootstraps the runtime with default wiring.
    #[must_use]
    pub fn bootstrap() -> Self {
        let telemetry = DecisionTelemetry::builder("decision.runtime")
            .log_path("logs/opscore/decision.log.jsonl")
            .build()
            .ok();
        let mut runtime = Self::new(
            DecisionEngine::default(),
            MemoryDecisionStore::shared(DEFAULT_LOG_CAPACITY),
        );
        if let Some(tel) = telemetry {
            runtime = runtime.with_telemetry(tel);
        }
        runtime
    }

    /// Attaches telemetry sinks.
    #[must_use]
    pub fn with_telemetry(mut self, telemetry: DecisionTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Evaluates the context and returns the decision. The engine call is
    /// pure; recording and telemetry are best-effort side effects.
    #[instrument(skip(self, context))]
    pub async fn make_decision(&self, context: DecisionContext) -> Result<AutonomousDecision> {
        self.log(
            LogLevel::Info,
            "decision.context_received",
            json!({
                "actions": context.catalogue.len(),
                "constraints": context.constraints.len(),
                "objectives": context.objectives.len(),
                "health": context.state.health
            }),
        );

        let decision = self.engine.decide(&context);
        self.store.record(&decision);

        let fingerprint = ContextFingerprint::of(&decision.context);
        self.log(
            LogLevel::Info,
            "decision.completed",
            json!({
                "id": decision.id,
                "fingerprint": fingerprint.label(),
                "selected": decision.selected.len(),
                "confidence": decision.confidence,
                "risk": decision.risk.overall.to_string()
            }),
        );
        self.event(
            "decision.completed",
            json!({
                "id": decision.id,
                "selected": decision.selected.len(),
                "confidence": decision.confidence
            }),
        );

        Ok(decision)
    }

    /// Most recent recorded decision for contexts sharing `fingerprint`.
    pub fn recall(&self, fingerprint: ContextFingerprint) -> Result<AutonomousDecision, DecisionError> {
        self.store
            .history_for(fingerprint)
            .into_iter()
            .next()
            .ok_or_else(|| DecisionError::NoHistory(fingerprint.label()))
    }

    /// Number of retained decision-log entries.
    #[must_use]
    pub fn log_entries(&self) -> usize {
        self.store.len()
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

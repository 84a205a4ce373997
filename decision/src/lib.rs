#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Opscore decision core: evaluates candidate operational actions against
//! system state, constraints, and objectives, then selects a feasible,
//! conflict-free, budget-respecting plan with risk and outcome estimates.

/// Shared operations vocabulary (state, actions, constraints, risk).
#[path = "../context/main.rs"]
pub mod context;

/// Evaluation, selection, and reasoning pipeline.
#[path = "../engine/main.rs"]
pub mod engine;

/// Outcome prediction engine.
#[path = "../outcome.rs"]
pub mod outcome;

/// Risk assessment engine.
#[path = "../risk.rs"]
pub mod risk;

/// Injected decision-log stores.
#[path = "../store.rs"]
pub mod store;

/// Telemetry helpers.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Runtime entrypoints.
#[path = "../main.rs"]
pub mod runtime_entry;

pub use context::{
    ActionImpact, ActionKind, ActionParameters, ActionProfile, AvailableAction, Constraint,
    ConstraintKind, DecisionContext, DecisionError, Objective, ObjectiveKind,
    PerformanceSnapshot, RiskLevel, SecurityEvent, SelectedAction, SystemState,
};
pub use engine::{
    analyze_situation, ActionEvaluation, Alternative, AutonomousDecision, DecisionEngine,
    DecisionReasoning, DecisionWeights, Situation, Tradeoff,
};
pub use outcome::{EstimatedOutcome, OutcomePredictor};
pub use risk::{RiskAssessment, RiskAssessmentEngine, RiskFactor, RiskThresholds};
pub use runtime_entry::DecisionRuntime;
pub use store::{ContextFingerprint, DecisionStore, MemoryDecisionStore, NoopDecisionStore};
pub use telemetry::{DecisionTelemetry, DecisionTelemetryBuilder};

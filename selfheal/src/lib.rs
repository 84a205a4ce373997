#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Opscore self-healing planner: maps classified system issues to ordered
//! remediation sequences with rollback plans and trigger conditions.

/// Planner, issue vocabulary, templates, and rollback rules.
#[path = "../planner/main.rs"]
pub mod planner;

/// Bounded plan archive.
#[path = "../store.rs"]
pub mod store;

/// Telemetry helpers.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Runtime entrypoints.
#[path = "../main.rs"]
pub mod runtime_entry;

pub use planner::{
    HealingAction, HealingError, HealingHeuristics, HealingPlan, HealingPlanner, IssueKind,
    IssueSeverity, RollbackPlan, RollbackTrigger, SystemIssue,
};
pub use runtime_entry::SelfHealRuntime;
pub use store::HealingPlanStore;
pub use telemetry::{SelfHealTelemetry, SelfHealTelemetryBuilder};

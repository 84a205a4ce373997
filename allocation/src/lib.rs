#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! Opscore resource allocation optimizer: computes per-resource target
//! allocations, impact estimates, and a phased implementation plan under
//! cost and performance constraints.

/// Optimizer, rules, and allocation vocabulary.
#[path = "../optimizer/main.rs"]
pub mod optimizer;

/// Telemetry helpers.
#[path = "../telemetry.rs"]
pub mod telemetry;

/// Runtime entrypoints.
#[path = "../main.rs"]
pub mod runtime_entry;

pub use optimizer::{
    AllocationError, AllocationImpact, AllocationRules, ImpactCoefficients, ImplementationPhase,
    ImplementationPlan, ResourceAllocation, ResourceAllocationPlan, ResourceConstraints,
    ResourceKind, ResourceOptimizer,
};
pub use runtime_entry::AllocationRuntime;
pub use telemetry::{AllocationTelemetry, AllocationTelemetryBuilder};

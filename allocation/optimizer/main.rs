//! Resource allocation optimizer: computes per-resource target
//! allocations, impact estimates, and a phased implementation plan.

/// Fixed implementation phases.
pub mod phases;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use opscore_decision::context::RiskLevel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use phases::{ImplementationPhase, ImplementationPlan};

/// Errors surfaced by the allocation layer.
#[derive(Debug, Error, Clone)]
pub enum AllocationError {
    /// The plan carries no entry for the requested resource.
    #[error("no allocation entry for resource {0}")]
    MissingAllocation(ResourceKind),
}

/// Resource categories under management.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Compute cores.
    Cpu,
    /// Working memory.
    Memory,
    /// Persistent storage.
    Storage,
    /// Network bandwidth.
    Network,
}

impl ResourceKind {
    /// All managed resources, in plan order.
    pub const ALL: [Self; 4] = [Self::Cpu, Self::Memory, Self::Storage, Self::Network];

    /// Allocation assumed when the caller supplies no current value.
    #[must_use]
    pub const fn default_allocation(self) -> f64 {
        match self {
            Self::Cpu | Self::Memory => 0.5,
            Self::Storage => 0.4,
            Self::Network => 0.3,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Memory => write!(f, "memory"),
            Self::Storage => write!(f, "storage"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// Constraints and current allocations for one optimization request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceConstraints {
    /// CPU allocation ceiling.
    pub max_cpu_usage: Option<f64>,
    /// Memory allocation ceiling.
    pub max_memory_usage: Option<f64>,
    /// Total reallocation cost ceiling.
    pub max_cost: Option<f64>,
    /// Required performance level.
    pub performance_requirement: Option<f64>,
    /// Current allocation per resource; missing entries use defaults.
    pub current: IndexMap<ResourceKind, f64>,
}

impl ResourceConstraints {
    /// Creates an empty constraint set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the CPU ceiling.
    #[must_use]
    pub const fn with_max_cpu(mut self, value: f64) -> Self {
        self.max_cpu_usage = Some(value);
        self
    }

    /// Sets the memory ceiling.
    #[must_use]
    pub const fn with_max_memory(mut self, value: f64) -> Self {
        self.max_memory_usage = Some(value);
        self
    }

    /// Sets the cost ceiling.
    #[must_use]
    pub const fn with_max_cost(mut self, value: f64) -> Self {
        self.max_cost = Some(value);
        self
    }

    /// Sets the performance requirement.
    #[must_use]
    pub const fn with_performance_requirement(mut self, value: f64) -> Self {
        self.performance_requirement = Some(value);
        self
    }

    /// Sets the current allocation of one resource.
    #[must_use]
    pub fn with_current(mut self, resource: ResourceKind, allocation: f64) -> Self {
        self.current.insert(resource, allocation.clamp(0.0, 1.0));
        self
    }

    /// Current allocation of a resource, falling back to its default.
    #[must_use]
    pub fn current_of(&self, resource: ResourceKind) -> f64 {
        self.current
            .get(&resource)
            .copied()
            .unwrap_or_else(|| resource.default_allocation())
    }
}

/// Impact estimate attached to one allocation change.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AllocationImpact {
    /// Performance delta.
    pub performance: f64,
    /// Cost delta.
    pub cost: f64,
    /// Availability delta.
    pub availability: f64,
}

/// Recommendation for a single resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAllocation {
    /// The resource concerned.
    pub resource: ResourceKind,
    /// Current share in [0, 1].
    pub current: f64,
    /// Recommended share in [0, 1].
    pub recommended: f64,
    /// Why the recommendation was made.
    pub justification: String,
    /// Estimated effect of the change.
    pub impact: AllocationImpact,
}

impl ResourceAllocation {
    /// Signed change the recommendation implies.
    #[must_use]
    pub fn delta(&self) -> f64 {
        self.recommended - self.current
    }
}

/// Complete reallocation plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceAllocationPlan {
    /// One entry per managed resource.
    pub allocations: Vec<ResourceAllocation>,
    /// Sum of absolute cost impacts.
    pub total_cost: f64,
    /// Expected performance after the change, in [0, 1].
    pub expected_performance: f64,
    /// Bounded rollout risk.
    pub risk: RiskLevel,
    /// Phased rollout schedule.
    pub implementation: ImplementationPlan,
    /// Planning timestamp.
    pub planned_at: DateTime<Utc>,
}

impl ResourceAllocationPlan {
    /// Entry for one resource.
    pub fn allocation_for(
        &self,
        resource: ResourceKind,
    ) -> Result<&ResourceAllocation, AllocationError> {
        self.allocations
            .iter()
            .find(|allocation| allocation.resource == resource)
            .ok_or(AllocationError::MissingAllocation(resource))
    }
}

/// Per-resource impact coefficients (performance, cost, availability per
/// unit of allocation change).
#[derive(Debug, Clone, Copy)]
pub struct ImpactCoefficients {
    /// Performance per unit of change.
    pub performance: f64,
    /// Cost per unit of change.
    pub cost: f64,
    /// Availability per unit of change.
    pub availability: f64,
}

/// Tunable optimizer rules, kept apart from the algorithm.
#[derive(Debug, Clone)]
pub struct AllocationRules {
    /// Headroom factor applied when an allocation exceeds its ceiling.
    pub ceiling_headroom: f64,
    /// Step added when raising an allocation toward a requirement.
    pub raise_step: f64,
    /// Step removed from an underutilized allocation.
    pub shrink_step: f64,
    /// Minimum allocation floor.
    pub allocation_floor: f64,
    /// Storage utilization treated as high.
    pub storage_high: f64,
    /// Storage utilization treated as low.
    pub storage_low: f64,
    /// Network utilization treated as high.
    pub network_high: f64,
    /// Network utilization treated as low.
    pub network_low: f64,
    /// Baseline expected performance before impacts are applied.
    pub performance_baseline: f64,
    /// Change magnitude counted as significant for risk purposes.
    pub significant_change: f64,
    /// Cost share of the ceiling classified as high risk.
    pub cost_high_share: f64,
    /// Cost share of the ceiling classified as medium risk.
    pub cost_medium_share: f64,
}

impl Default for AllocationRules {
    fn default() -> Self {
        Self {
            ceiling_headroom: 0.9,
            raise_step: 0.1,
            shrink_step: 0.05,
            allocation_floor: 0.05,
            storage_high: 0.7,
            storage_low: 0.3,
            network_high: 0.8,
            network_low: 0.2,
            performance_baseline: 0.7,
            significant_change: 0.2,
            cost_high_share: 0.9,
            cost_medium_share: 0.7,
        }
    }
}

impl AllocationRules {
    /// Impact coefficients for a resource.
    #[must_use]
    pub const fn coefficients(resource: ResourceKind) -> ImpactCoefficients {
        match resource {
            ResourceKind::Cpu => ImpactCoefficients {
                performance: 0.8,
                cost: 0.6,
                availability: 0.3,
            },
            ResourceKind::Memory => ImpactCoefficients {
                performance: 0.7,
                cost: 0.5,
                availability: 0.4,
            },
            ResourceKind::Storage => ImpactCoefficients {
                performance: 0.3,
                cost: 0.4,
                availability: 0.5,
            },
            ResourceKind::Network => ImpactCoefficients {
                performance: 0.5,
                cost: 0.45,
                availability: 0.35,
            },
        }
    }
}

/// Computes per-resource targets and the rollout plan; pure and total.
#[derive(Debug, Clone, Default)]
pub struct ResourceOptimizer {
    rules: AllocationRules,
}

impl ResourceOptimizer {
    /// Creates an optimizer with custom rules.
    #[must_use]
    pub const fn new(rules: AllocationRules) -> Self {
        Self { rules }
    }

    /// Optimizes allocations under the given constraints.
    #[must_use]
    pub fn optimize(&self, constraints: &ResourceConstraints) -> ResourceAllocationPlan {
        let allocations: Vec<ResourceAllocation> = ResourceKind::ALL
            .into_iter()
            .map(|resource| self.recommend(resource, constraints))
            .collect();

        let total_cost: f64 = allocations
            .iter()
            .map(|allocation| allocation.impact.cost.abs())
            .sum();
        let performance_sum: f64 = allocations
            .iter()
            .map(|allocation| allocation.impact.performance)
            .sum();
        let expected_performance =
            (self.rules.performance_baseline + performance_sum).clamp(0.0, 1.0);

        let risk = self.classify_risk(&allocations, total_cost, constraints);

        ResourceAllocationPlan {
            allocations,
            total_cost,
            expected_performance,
            risk,
            implementation: phases::implementation_plan(),
            planned_at: Utc::now(),
        }
    }

    fn recommend(
        &self,
        resource: ResourceKind,
        constraints: &ResourceConstraints,
    ) -> ResourceAllocation {
        let current = constraints.current_of(resource);
        let (recommended, justification) = match resource {
            ResourceKind::Cpu => self.constrained_target(
                current,
                constraints.max_cpu_usage,
                constraints.performance_requirement,
                "CPU",
            ),
            ResourceKind::Memory => self.constrained_target(
                current,
                constraints.max_memory_usage,
                constraints.performance_requirement,
                "memory",
            ),
            ResourceKind::Storage => self.utilization_target(
                current,
                self.rules.storage_high,
                self.rules.storage_low,
                "storage",
            ),
            ResourceKind::Network => self.utilization_target(
                current,
                self.rules.network_high,
                self.rules.network_low,
                "network",
            ),
        };
        let recommended = recommended.clamp(0.0, 1.0);
        let delta = recommended - current;
        let coefficients = AllocationRules::coefficients(resource);

        ResourceAllocation {
            resource,
            current,
            recommended,
            justification,
            impact: AllocationImpact {
                performance: delta * coefficients.performance,
                cost: delta * coefficients.cost,
                availability: delta * coefficients.availability,
            },
        }
    }

    /// Target for explicitly constrained resources (CPU, memory).
    fn constrained_target(
        &self,
        current: f64,
        ceiling: Option<f64>,
        performance_requirement: Option<f64>,
        label: &str,
    ) -> (f64, String) {
        if let Some(ceiling) = ceiling {
            if current > ceiling {
                return (
                    ceiling * self.rules.ceiling_headroom,
                    format!("{label} allocation exceeds its ceiling; holding headroom below it"),
                );
            }
        }
        if let Some(requirement) = performance_requirement {
            if current < requirement {
                let raised = (current + self.rules.raise_step).min(ceiling.unwrap_or(1.0));
                return (
                    raised,
                    format!("raising {label} toward the performance requirement"),
                );
            }
        }
        (current, format!("{label} allocation within limits"))
    }

    /// Target for utilization-driven resources (storage, network).
    fn utilization_target(
        &self,
        current: f64,
        high: f64,
        low: f64,
        label: &str,
    ) -> (f64, String) {
        if current >= high {
            (
                (current + self.rules.raise_step).min(1.0),
                format!("{label} utilization approaching capacity"),
            )
        } else if current <= low {
            (
                (current - self.rules.shrink_step).max(self.rules.allocation_floor),
                format!("{label} underutilized; shrinking allocation"),
            )
        } else {
            (current, format!("{label} utilization nominal"))
        }
    }

    fn classify_risk(
        &self,
        allocations: &[ResourceAllocation],
        total_cost: f64,
        constraints: &ResourceConstraints,
    ) -> RiskLevel {
        let significant = allocations
            .iter()
            .filter(|allocation| allocation.delta().abs() > self.rules.significant_change)
            .count();
        let ceiling = constraints.max_cost.unwrap_or(f64::INFINITY);
        if total_cost > self.rules.cost_high_share * ceiling || significant > 2 {
            RiskLevel::High
        } else if total_cost > self.rules.cost_medium_share * ceiling || significant > 1 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_over_ceiling_gets_headroom_below_it() {
        let optimizer = ResourceOptimizer::default();
        let constraints = ResourceConstraints::new()
            .with_max_cpu(0.5)
            .with_performance_requirement(0.8)
            .with_current(ResourceKind::Cpu, 0.6);
        let plan = optimizer.optimize(&constraints);
        let cpu = plan.allocation_for(ResourceKind::Cpu).unwrap();
        assert!((cpu.recommended - 0.45).abs() < 1e-9);
    }

    #[test]
    fn shrinking_cpu_ceiling_shrinks_the_recommendation() {
        let optimizer = ResourceOptimizer::default();
        let base = ResourceConstraints::new()
            .with_current(ResourceKind::Cpu, 0.6)
            .with_max_cpu(0.5);
        let tighter = base.clone().with_max_cpu(0.4);
        let loose_rec = optimizer
            .optimize(&base)
            .allocation_for(ResourceKind::Cpu)
            .unwrap()
            .recommended;
        let tight_rec = optimizer
            .optimize(&tighter)
            .allocation_for(ResourceKind::Cpu)
            .unwrap()
            .recommended;
        assert!(tight_rec < loose_rec);
    }

    #[test]
    fn storage_high_utilization_is_raised() {
        let optimizer = ResourceOptimizer::default();
        let constraints =
            ResourceConstraints::new().with_current(ResourceKind::Storage, 0.75);
        let plan = optimizer.optimize(&constraints);
        let storage = plan.allocation_for(ResourceKind::Storage).unwrap();
        assert!((storage.recommended - 0.85).abs() < 1e-9);
        assert!(storage.impact.performance > 0.0);
    }

    #[test]
    fn network_low_utilization_is_shrunk() {
        let optimizer = ResourceOptimizer::default();
        let constraints =
            ResourceConstraints::new().with_current(ResourceKind::Network, 0.15);
        let plan = optimizer.optimize(&constraints);
        let network = plan.allocation_for(ResourceKind::Network).unwrap();
        assert!((network.recommended - 0.10).abs() < 1e-9);
        assert!(network.impact.cost < 0.0);
    }

    #[test]
    fn missing_current_entries_use_defaults() {
        let optimizer = ResourceOptimizer::default();
        let plan = optimizer.optimize(&ResourceConstraints::new());
        let cpu = plan.allocation_for(ResourceKind::Cpu).unwrap();
        assert!((cpu.current - 0.5).abs() < f64::EPSILON);
        assert!((cpu.recommended - cpu.current).abs() < f64::EPSILON);
    }

    #[test]
    fn heavy_reallocation_under_tight_cost_ceiling_is_high_risk() {
        let optimizer = ResourceOptimizer::default();
        let constraints = ResourceConstraints::new()
            .with_max_cpu(0.5)
            .with_max_memory(0.5)
            .with_max_cost(0.5)
            .with_current(ResourceKind::Cpu, 0.95)
            .with_current(ResourceKind::Memory, 0.95);
        let plan = optimizer.optimize(&constraints);
        assert_eq!(plan.risk, RiskLevel::High);
    }

    #[test]
    fn two_significant_changes_without_cost_pressure_is_medium_risk() {
        let optimizer = ResourceOptimizer::default();
        let constraints = ResourceConstraints::new()
            .with_max_cpu(0.5)
            .with_max_memory(0.5)
            .with_current(ResourceKind::Cpu, 0.9)
            .with_current(ResourceKind::Memory, 0.9);
        let plan = optimizer.optimize(&constraints);
        assert_eq!(plan.risk, RiskLevel::Medium);
    }

    #[test]
    fn steady_state_plan_is_low_risk_with_baseline_performance() {
        let optimizer = ResourceOptimizer::default();
        let plan = optimizer.optimize(&ResourceConstraints::new());
        assert_eq!(plan.risk, RiskLevel::Low);
        assert!((plan.expected_performance - 0.7).abs() < 1e-9);
        assert!((plan.total_cost - 0.0).abs() < f64::EPSILON);
    }
}

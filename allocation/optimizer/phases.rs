use serde::{Deserialize, Serialize};

/// One phase of the rollout schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationPhase {
    /// Phase name.
    pub name: String,
    /// Duration in minutes.
    pub duration_minutes: u32,
    /// Phase that must complete first, if any.
    pub depends_on: Option<String>,
}

/// Sequential rollout schedule attached to every allocation plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImplementationPlan {
    /// Ordered phases.
    pub phases: Vec<ImplementationPhase>,
    /// Sum of phase durations in minutes.
    pub total_duration_minutes: u32,
}

/// The four fixed sequential phases: preparation, compute resources,
/// infrastructure resources, validation.
#[must_use]
pub fn implementation_plan() -> ImplementationPlan {
    let phases = vec![
        ImplementationPhase {
            name: "Preparation".to_string(),
            duration_minutes: 15,
            depends_on: None,
        },
        ImplementationPhase {
            name: "Compute Resources".to_string(),
            duration_minutes: 30,
            depends_on: Some("Preparation".to_string()),
        },
        ImplementationPhase {
            name: "Infrastructure Resources".to_string(),
            duration_minutes: 20,
            depends_on: Some("Compute Resources".to_string()),
        },
        ImplementationPhase {
            name: "Validation".to_string(),
            duration_minutes: 10,
            depends_on: Some("Infrastructure Resources".to_string()),
        },
    ];
    let total_duration_minutes = phases.iter().map(|phase| phase.duration_minutes).sum();
    ImplementationPlan {
        phases,
        total_duration_minutes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_phases_chain_sequentially() {
        let plan = implementation_plan();
        assert_eq!(plan.phases.len(), 4);
        assert_eq!(plan.total_duration_minutes, 75);
        assert!(plan.phases[0].depends_on.is_none());
        for pair in plan.phases.windows(2) {
            assert_eq!(pair[1].depends_on.as_deref(), Some(pair[0].name.as_str()));
        }
    }
}

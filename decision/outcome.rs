//! Outcome prediction for a selected action set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::context::{DecisionContext, SelectedAction};

/// Expected effect of executing a selected action set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EstimatedOutcome {
    /// Mean performance impact across the set.
    pub performance_improvement: f64,
    /// Total monetary cost of the set.
    pub cost_impact: f64,
    /// Mean security impact across the set.
    pub risk_reduction: f64,
    /// Seconds until the full effect lands.
    pub time_to_effect_secs: i64,
    /// Prediction confidence in [0.1, 0.95].
    pub confidence: f64,
}

/// Estimates the expected effect of a selection; pure and total.
#[derive(Debug, Clone)]
pub struct OutcomePredictor {
    /// Fixed historical success factor blended into confidence.
    pub historical_factor: f64,
    /// Settling buffer added to the schedule horizon.
    pub buffer_secs: i64,
    /// Minimum reported time-to-effect.
    pub floor_secs: i64,
}

impl Default for OutcomePredictor {
    fn default() -> Self {
        Self {
            historical_factor: 0.8,
            buffer_secs: 600,
            floor_secs: 300,
        }
    }
}

impl OutcomePredictor {
    /// Predicts the outcome of `selected` given the ambient context.
    #[must_use]
    pub fn predict(
        &self,
        selected: &[SelectedAction],
        context: &DecisionContext,
        now: DateTime<Utc>,
    ) -> EstimatedOutcome {
        #[allow(clippy::cast_precision_loss)]
        let count = selected.len() as f64;
        let (performance_improvement, risk_reduction) = if selected.is_empty() {
            (0.0, 0.0)
        } else {
            (
                selected
                    .iter()
                    .map(|sel| sel.action.impact.performance)
                    .sum::<f64>()
                    / count,
                selected
                    .iter()
                    .map(|sel| sel.action.impact.security)
                    .sum::<f64>()
                    / count,
            )
        };
        let cost_impact = selected.iter().map(|sel| sel.action.cost).sum();

        let horizon_secs = selected
            .iter()
            .map(|sel| (sel.scheduled_at - now).num_seconds())
            .max()
            .unwrap_or(0);
        let time_to_effect_secs = (horizon_secs + self.buffer_secs).max(self.floor_secs);

        let confidence = (0.4 * context.state.health
            + 0.3 * (1.0 - (0.1 * count).min(0.5))
            + 0.3 * self.historical_factor)
            .clamp(0.1, 0.95);

        EstimatedOutcome {
            performance_improvement,
            cost_impact,
            risk_reduction,
            time_to_effect_secs,
            confidence,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{ActionImpact, ActionKind, AvailableAction, SystemState};
    use chrono::Duration;

    fn selection(id: &str, cost: f64, impact: ActionImpact, offset_minutes: i64) -> SelectedAction {
        SelectedAction {
            action: AvailableAction::new(id, ActionKind::ClearCache, "test")
                .with_cost(cost)
                .with_impact(impact),
            priority: 1,
            scheduled_at: Utc::now() + Duration::minutes(offset_minutes),
            dependencies: vec![],
        }
    }

    #[test]
    fn empty_selection_floors_time_to_effect() {
        let predictor = OutcomePredictor::default();
        let context = DecisionContext::new(SystemState::new(0.9));
        let outcome = predictor.predict(&[], &context, Utc::now());
        assert_eq!(outcome.time_to_effect_secs, 600);
        assert!((outcome.performance_improvement - 0.0).abs() < f64::EPSILON);
        assert!((outcome.cost_impact - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aggregates_mean_performance_and_total_cost() {
        let predictor = OutcomePredictor::default();
        let context = DecisionContext::new(SystemState::new(0.9));
        let now = Utc::now();
        let selected = vec![
            selection("a", 100.0, ActionImpact::new(0.4, 0.0, 0.2, 0.0), 0),
            selection("b", 50.0, ActionImpact::new(0.2, 0.0, 0.4, 0.0), 5),
        ];
        let outcome = predictor.predict(&selected, &context, now);
        assert!((outcome.performance_improvement - 0.3).abs() < 1e-9);
        assert!((outcome.cost_impact - 150.0).abs() < f64::EPSILON);
        assert!((outcome.risk_reduction - 0.3).abs() < 1e-9);
        assert_eq!(outcome.time_to_effect_secs, 5 * 60 + 600);
    }

    #[test]
    fn confidence_stays_within_documented_band() {
        let predictor = OutcomePredictor::default();
        let low = predictor.predict(
            &[],
            &DecisionContext::new(SystemState::new(0.0)),
            Utc::now(),
        );
        assert!(low.confidence >= 0.1);
        let selected: Vec<_> = (0..5)
            .map(|idx| selection(&format!("a{idx}"), 0.0, ActionImpact::default(), 0))
            .collect();
        let high = predictor.predict(
            &selected,
            &DecisionContext::new(SystemState::new(1.0)),
            Utc::now(),
        );
        assert!(high.confidence <= 0.95);
    }
}

use crate::entities::{Anomaly, HealthScore, HealthStatus, HealthWeights};
use crate::value_objects::Severity;

/// Score = 100 minus a per-severity penalty for each PENDING anomaly,
/// clamped to [0, 100]. Resolved anomalies carry no penalty, so resolving
/// can only raise the score and a new pending one can only lower it.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthScorer {
    weights: HealthWeights,
}

impl HealthScorer {
    pub fn new(weights: HealthWeights) -> Self {
        Self { weights }
    }

    pub fn penalty(&self, severity: Severity) -> u32 {
        match severity {
            Severity::High => self.weights.penalty_high,
            Severity::Medium => self.weights.penalty_medium,
            Severity::Low => self.weights.penalty_low,
        }
    }

    pub fn score(&self, anomalies: &[Anomaly]) -> HealthScore {
        let penalty: u64 = anomalies
            .iter()
            .filter(|anomaly| anomaly.is_pending())
            .map(|anomaly| u64::from(self.penalty(anomaly.severity)))
            .sum();
        let score = 100u64.saturating_sub(penalty) as u8;
        HealthScore {
            score,
            status: HealthStatus::from_score(score),
        }
    }
}

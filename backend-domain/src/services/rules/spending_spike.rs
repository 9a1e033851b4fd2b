use super::{require, AnomalyRule, HistorySnapshot, RuleError};
use crate::entities::{AnomalyCandidate, DetectionConfig, Evidence, SpendingSpikeEvidence, Transaction};
use crate::utils::round_money;
use crate::value_objects::{AnomalyType, Severity};

/// Fires when an expense clears `max(average + k * stddev, average * floor)`.
#[derive(Debug, Clone)]
pub struct SpendingSpikeRule {
    pub min_samples: usize,
    pub stddev_k: f64,
    pub floor_multiplier: f64,
    pub high_multiplier: f64,
}

impl SpendingSpikeRule {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            min_samples: config.spike_min_samples,
            stddev_k: config.spike_stddev_k,
            floor_multiplier: config.spike_floor_multiplier,
            high_multiplier: config.spike_high_multiplier,
        }
    }

    pub fn threshold(&self, average: f64, stddev: f64) -> f64 {
        (average + self.stddev_k * stddev).max(average * self.floor_multiplier)
    }
}

impl AnomalyRule for SpendingSpikeRule {
    fn kind(&self) -> AnomalyType {
        AnomalyType::SpendingSpike
    }

    fn evaluate(
        &self,
        transaction: &Transaction,
        history: &HistorySnapshot,
    ) -> Result<Option<AnomalyCandidate>, RuleError> {
        if !transaction.is_expense() {
            return Ok(None);
        }
        let stats = require(&history.category_stats, "rolling stats")?;
        if stats.samples < self.min_samples.max(1) || stats.average <= 0.0 {
            return Ok(None);
        }
        if !stats.average.is_finite() || !stats.stddev.is_finite() {
            return Err(RuleError::Evaluation(format!(
                "non-finite rolling stats for '{}'",
                transaction.category
            )));
        }

        let current = transaction.amount;
        let threshold = self.threshold(stats.average, stats.stddev);
        if current <= threshold {
            return Ok(None);
        }
        let severity = if current >= stats.average * self.high_multiplier {
            Severity::High
        } else {
            Severity::Medium
        };
        Ok(Some(AnomalyCandidate {
            kind: self.kind(),
            severity,
            evidence: Evidence::SpendingSpike(SpendingSpikeEvidence {
                average: round_money(stats.average),
                current: round_money(current),
                threshold: round_money(threshold),
            }),
            explanation: format!(
                "Spent {:.2} in '{}', above the usual {:.2} (threshold {:.2})",
                round_money(current),
                transaction.category,
                round_money(stats.average),
                round_money(threshold)
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::RollingStats;
    use crate::services::rules::fixtures::{at, expense};

    fn snapshot(average: f64, stddev: f64, samples: usize) -> HistorySnapshot {
        HistorySnapshot {
            category_stats: Ok(RollingStats {
                average,
                stddev,
                samples,
            }),
            ..HistorySnapshot::empty(at(14, 12))
        }
    }

    fn rule() -> SpendingSpikeRule {
        SpendingSpikeRule::from_config(&DetectionConfig::default())
    }

    #[test]
    fn threshold_takes_the_larger_bound() {
        let rule = rule();
        assert_eq!(rule.threshold(100.0, 10.0), 200.0);
        assert_eq!(rule.threshold(100.0, 80.0), 260.0);
    }

    #[test]
    fn spike_above_hard_multiplier_is_high() {
        let tx = expense("tx-9", 450.0, "food", at(14, 12));
        let candidate = rule()
            .evaluate(&tx, &snapshot(100.0, 10.0, 10))
            .expect("evaluate")
            .expect("spike");
        assert_eq!(candidate.severity, Severity::High);
        assert_eq!(
            candidate.evidence,
            Evidence::SpendingSpike(SpendingSpikeEvidence {
                average: 100.0,
                current: 450.0,
                threshold: 200.0,
            })
        );
    }

    #[test]
    fn spike_near_threshold_is_medium() {
        let tx = expense("tx-9", 250.0, "food", at(14, 12));
        let candidate = rule()
            .evaluate(&tx, &snapshot(100.0, 10.0, 10))
            .expect("evaluate")
            .expect("spike");
        assert_eq!(candidate.severity, Severity::Medium);
    }

    #[test]
    fn thin_history_never_fires() {
        let tx = expense("tx-9", 10_000.0, "food", at(14, 12));
        assert!(rule()
            .evaluate(&tx, &snapshot(100.0, 0.0, 2))
            .expect("evaluate")
            .is_none());
    }

    #[test]
    fn amount_under_threshold_passes() {
        let tx = expense("tx-9", 180.0, "food", at(14, 12));
        assert!(rule()
            .evaluate(&tx, &snapshot(100.0, 10.0, 10))
            .expect("evaluate")
            .is_none());
    }
}

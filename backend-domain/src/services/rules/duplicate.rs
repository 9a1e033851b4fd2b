use super::{require, AnomalyRule, HistorySnapshot, RuleError};
use crate::entities::{AnomalyCandidate, DetectionConfig, DuplicateEvidence, Evidence, Transaction};
use crate::utils::{hours_before, round_money};
use crate::value_objects::{AnomalyType, Severity};

#[derive(Debug, Clone)]
pub struct DuplicateTransactionRule {
    pub window_hours: u64,
    pub amount_tolerance: f64,
}

impl DuplicateTransactionRule {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            window_hours: config.duplicate_window_hours,
            amount_tolerance: config.duplicate_amount_tolerance,
        }
    }
}

impl AnomalyRule for DuplicateTransactionRule {
    fn kind(&self) -> AnomalyType {
        AnomalyType::DuplicateTransaction
    }

    fn evaluate(
        &self,
        transaction: &Transaction,
        history: &HistorySnapshot,
    ) -> Result<Option<AnomalyCandidate>, RuleError> {
        if !transaction.is_expense() {
            return Ok(None);
        }
        let recent = require(&history.recent_same_category, "recent transactions")?;
        let window_start = hours_before(transaction.timestamp, self.window_hours);

        let earlier = recent.iter().find(|candidate| {
            candidate.id != transaction.id
                && candidate.is_expense()
                && candidate.category == transaction.category
                && candidate.recorded_before(transaction)
                && candidate.timestamp >= window_start
                && (candidate.amount - transaction.amount).abs() <= self.amount_tolerance
        });
        let Some(earlier) = earlier else {
            return Ok(None);
        };

        let same_title = !transaction.title.is_empty()
            && transaction.title.eq_ignore_ascii_case(&earlier.title);
        let severity = if same_title {
            Severity::High
        } else {
            Severity::Medium
        };
        Ok(Some(AnomalyCandidate {
            kind: self.kind(),
            severity,
            evidence: Evidence::Duplicate(DuplicateEvidence {
                duplicate_of: earlier.id.clone(),
            }),
            explanation: format!(
                "Transaction of {:.2} in '{}' matches transaction {} recorded within {}h",
                round_money(transaction.amount),
                transaction.category,
                earlier.id,
                self.window_hours
            ),
        }))
    }
}

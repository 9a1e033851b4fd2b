use std::collections::HashSet;

use super::{require, AnomalyRule, HistorySnapshot, RuleError};
use crate::entities::{AnomalyCandidate, CategoryOveruseEvidence, DetectionConfig, Evidence, Transaction};
use crate::utils::{round_money, start_of_month};
use crate::value_objects::{AnomalyType, Severity};

#[derive(Debug, Clone)]
pub struct CategoryOveruseRule {
    pub percentage: f64,
    pub high_percentage: f64,
    pub min_transactions: usize,
}

impl CategoryOveruseRule {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            percentage: config.category_overuse_percentage,
            high_percentage: config.category_overuse_high_percentage,
            min_transactions: config.category_overuse_min_transactions,
        }
    }
}

impl AnomalyRule for CategoryOveruseRule {
    fn kind(&self) -> AnomalyType {
        AnomalyType::CategoryOveruse
    }

    fn evaluate(
        &self,
        transaction: &Transaction,
        history: &HistorySnapshot,
    ) -> Result<Option<AnomalyCandidate>, RuleError> {
        if !transaction.is_expense() {
            return Ok(None);
        }
        let month = require(&history.month_transactions, "monthly transactions")?;
        let month_start = start_of_month(transaction.timestamp);

        let mut seen = HashSet::new();
        let expenses: Vec<&Transaction> = month
            .iter()
            .chain(std::iter::once(transaction))
            .filter(|item| {
                item.is_expense()
                    && item.timestamp >= month_start
                    && (item.id == transaction.id || item.recorded_before(transaction))
            })
            .filter(|item| seen.insert(item.id.as_str()))
            .collect();
        if expenses.len() < self.min_transactions {
            return Ok(None);
        }

        let total_monthly: f64 = expenses.iter().map(|item| item.amount).sum();
        if total_monthly <= 0.0 {
            return Ok(None);
        }
        let category_total: f64 = expenses
            .iter()
            .filter(|item| item.category == transaction.category)
            .map(|item| item.amount)
            .sum();
        let percentage = category_total / total_monthly * 100.0;
        if percentage <= self.percentage {
            return Ok(None);
        }

        let severity = if percentage >= self.high_percentage {
            Severity::High
        } else {
            Severity::Medium
        };
        Ok(Some(AnomalyCandidate {
            kind: self.kind(),
            severity,
            evidence: Evidence::CategoryOveruse(CategoryOveruseEvidence {
                category_total: round_money(category_total),
                total_monthly: round_money(total_monthly),
                percentage: round_money(percentage),
            }),
            explanation: format!(
                "'{}' accounts for {:.2}% of this month's spending ({:.2} of {:.2})",
                transaction.category,
                round_money(percentage),
                round_money(category_total),
                round_money(total_monthly)
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rules::fixtures::{at, expense, sequenced};

    fn rule() -> CategoryOveruseRule {
        CategoryOveruseRule::from_config(&DetectionConfig::default())
    }

    fn snapshot(month: Vec<Transaction>) -> HistorySnapshot {
        HistorySnapshot {
            month_transactions: Ok(month),
            ..HistorySnapshot::empty(at(14, 12))
        }
    }

    #[test]
    fn dominant_category_fires() {
        let month = vec![
            expense("tx-1", 100.0, "rent", at(2, 9)),
            expense("tx-2", 100.0, "travel", at(3, 9)),
            expense("tx-3", 200.0, "shopping", at(4, 9)),
            expense("tx-4", 100.0, "shopping", at(5, 9)),
        ];
        let current = expense("tx-5", 100.0, "shopping", at(14, 9));
        let candidate = rule()
            .evaluate(&current, &snapshot(month))
            .expect("evaluate")
            .expect("overuse");
        assert_eq!(
            candidate.evidence,
            Evidence::CategoryOveruse(CategoryOveruseEvidence {
                category_total: 400.0,
                total_monthly: 600.0,
                percentage: 66.67,
            })
        );
        assert_eq!(candidate.severity, Severity::High);
    }

    #[test]
    fn current_transaction_is_counted_once() {
        let current = expense("tx-5", 100.0, "food", at(14, 9));
        let month = vec![
            expense("tx-1", 100.0, "rent", at(2, 9)),
            expense("tx-2", 100.0, "travel", at(3, 9)),
            expense("tx-3", 100.0, "utilities", at(4, 9)),
            expense("tx-4", 100.0, "health", at(5, 9)),
            current.clone(),
        ];
        // 100 of 500 keeps food at 20%
        assert!(rule()
            .evaluate(&current, &snapshot(month))
            .expect("evaluate")
            .is_none());
    }

    #[test]
    fn later_insert_at_the_same_instant_is_not_counted() {
        let month = vec![
            sequenced(expense("tx-1", 100.0, "rent", at(2, 9)), 1),
            sequenced(expense("tx-2", 100.0, "travel", at(3, 9)), 2),
            sequenced(expense("tx-3", 100.0, "utilities", at(4, 9)), 3),
            sequenced(expense("tx-4", 100.0, "health", at(14, 9)), 4),
            sequenced(expense("tx-6", 900.0, "food", at(14, 9)), 6),
        ];
        let current = sequenced(expense("tx-5", 100.0, "food", at(14, 9)), 5);
        // tx-6 shares the timestamp but was stored after, so food stays at 20%
        assert!(rule()
            .evaluate(&current, &snapshot(month))
            .expect("evaluate")
            .is_none());
    }

    #[test]
    fn early_month_with_few_transactions_is_quiet() {
        let current = expense("tx-1", 100.0, "food", at(1, 9));
        assert!(rule()
            .evaluate(&current, &snapshot(Vec::new()))
            .expect("evaluate")
            .is_none());
    }
}

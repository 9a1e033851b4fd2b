use super::{require, AnomalyRule, HistorySnapshot, RuleError};
use crate::entities::{AnomalyCandidate, BudgetExceededEvidence, DetectionConfig, Evidence, Transaction};
use crate::utils::round_money;
use crate::value_objects::{AnomalyType, Severity};

#[derive(Debug, Clone)]
pub struct BudgetExceededRule {
    /// Overrun share of the limit at which the finding becomes HIGH.
    pub high_overrun_ratio: f64,
}

impl BudgetExceededRule {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            high_overrun_ratio: config.budget_high_overrun_ratio,
        }
    }
}

impl AnomalyRule for BudgetExceededRule {
    fn kind(&self) -> AnomalyType {
        AnomalyType::BudgetExceeded
    }

    fn evaluate(
        &self,
        transaction: &Transaction,
        history: &HistorySnapshot,
    ) -> Result<Option<AnomalyCandidate>, RuleError> {
        if !transaction.is_expense() {
            return Ok(None);
        }
        let Some(budget) = require(&history.active_budget, "active budget")? else {
            return Ok(None);
        };
        if budget.limit <= 0.0 || !budget.is_active_at(transaction.timestamp) {
            return Ok(None);
        }
        let period = require(&history.budget_period_transactions, "budget period transactions")?;

        // the snapshot may or may not already contain this transaction;
        // later spend is ignored so a delayed run sees the same total
        let prior: f64 = period
            .iter()
            .filter(|item| {
                item.id != transaction.id
                    && item.is_expense()
                    && item.category == budget.category
                    && budget.is_active_at(item.timestamp)
                    && item.recorded_before(transaction)
            })
            .map(|item| item.amount)
            .sum();
        let current_spend = prior + transaction.amount;
        if current_spend <= budget.limit {
            return Ok(None);
        }

        let exceeded_by = current_spend - budget.limit;
        let severity = if exceeded_by / budget.limit >= self.high_overrun_ratio {
            Severity::High
        } else {
            Severity::Medium
        };
        Ok(Some(AnomalyCandidate {
            kind: self.kind(),
            severity,
            evidence: Evidence::BudgetExceeded(BudgetExceededEvidence {
                budget_limit: round_money(budget.limit),
                current_spend: round_money(current_spend),
                exceeded_by: round_money(exceeded_by),
            }),
            explanation: format!(
                "'{}' spending reached {:.2}, exceeding the {:.2} budget by {:.2}",
                budget.category,
                round_money(current_spend),
                round_money(budget.limit),
                round_money(exceeded_by)
            ),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Budget;
    use crate::services::rules::fixtures::{at, expense, sequenced};

    fn food_budget() -> Budget {
        Budget {
            id: "b-1".to_string(),
            owner_id: "owner-1".to_string(),
            category: "food".to_string(),
            limit: 1000.0,
            period_start: at(1, 0),
            period_end: at(31, 0),
        }
    }

    fn snapshot(period: Vec<Transaction>) -> HistorySnapshot {
        HistorySnapshot {
            active_budget: Ok(Some(food_budget())),
            budget_period_transactions: Ok(period),
            ..HistorySnapshot::empty(at(14, 12))
        }
    }

    #[test]
    fn ten_percent_used_does_not_fire() {
        let first = expense("tx-1", 100.0, "food", at(14, 10));
        let history = snapshot(vec![first.clone()]);
        assert!(BudgetExceededRule::from_config(&DetectionConfig::default())
            .evaluate(&first, &history)
            .expect("evaluate")
            .is_none());
    }

    #[test]
    fn second_expense_over_limit_reports_overrun() {
        let first = expense("tx-1", 100.0, "food", at(14, 10));
        let second = expense("tx-2", 950.0, "food", at(14, 11));
        // snapshot taken after the second write committed
        let history = snapshot(vec![second.clone(), first]);

        let candidate = BudgetExceededRule::from_config(&DetectionConfig::default())
            .evaluate(&second, &history)
            .expect("evaluate")
            .expect("exceeded");
        assert_eq!(
            candidate.evidence,
            Evidence::BudgetExceeded(BudgetExceededEvidence {
                budget_limit: 1000.0,
                current_spend: 1050.0,
                exceeded_by: 50.0,
            })
        );
        assert_eq!(candidate.severity, Severity::High);
    }

    #[test]
    fn delayed_run_ignores_later_spend() {
        let first = expense("tx-1", 100.0, "food", at(14, 10));
        let second = expense("tx-2", 950.0, "food", at(14, 11));
        let history = snapshot(vec![second, first.clone()]);
        assert!(BudgetExceededRule::from_config(&DetectionConfig::default())
            .evaluate(&first, &history)
            .expect("evaluate")
            .is_none());
    }

    #[test]
    fn same_instant_batch_only_trips_on_the_later_insert() {
        let first = sequenced(expense("tx-1", 100.0, "food", at(14, 10)), 1);
        let second = sequenced(expense("tx-2", 950.0, "food", at(14, 10)), 2);
        let history = snapshot(vec![second.clone(), first.clone()]);
        let rule = BudgetExceededRule::from_config(&DetectionConfig::default());

        assert!(rule.evaluate(&first, &history).expect("evaluate").is_none());
        let candidate = rule
            .evaluate(&second, &history)
            .expect("evaluate")
            .expect("exceeded");
        assert_eq!(
            candidate.evidence,
            Evidence::BudgetExceeded(BudgetExceededEvidence {
                budget_limit: 1000.0,
                current_spend: 1050.0,
                exceeded_by: 50.0,
            })
        );
    }

    #[test]
    fn small_overrun_is_medium_when_ratio_is_raised() {
        let first = expense("tx-1", 100.0, "food", at(14, 10));
        let second = expense("tx-2", 950.0, "food", at(14, 11));
        let history = snapshot(vec![first]);
        let rule = BudgetExceededRule {
            high_overrun_ratio: 0.25,
        };
        let candidate = rule
            .evaluate(&second, &history)
            .expect("evaluate")
            .expect("exceeded");
        assert_eq!(candidate.severity, Severity::Medium);
    }

    #[test]
    fn no_budget_means_no_finding() {
        let tx = expense("tx-1", 5000.0, "food", at(14, 10));
        let history = HistorySnapshot::empty(at(14, 12));
        assert!(BudgetExceededRule::from_config(&DetectionConfig::default())
            .evaluate(&tx, &history)
            .expect("evaluate")
            .is_none());
    }
}

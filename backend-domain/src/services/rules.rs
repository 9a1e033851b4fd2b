// Detection rules
// Each rule is a pure function of one transaction and a pre-loaded history
// snapshot. Loading happens in the engine so rules never touch a port.

pub mod ai_irregularity;
pub mod budget_exceeded;
pub mod category_overuse;
pub mod duplicate;
pub mod odd_time;
pub mod silent_leak;
pub mod spending_spike;

pub use ai_irregularity::AiIrregularityRule;
pub use budget_exceeded::BudgetExceededRule;
pub use category_overuse::CategoryOveruseRule;
pub use duplicate::DuplicateTransactionRule;
pub use odd_time::OddTimePatternRule;
pub use silent_leak::{LeakFinding, SilentLeakRule};
pub use spending_spike::SpendingSpikeRule;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities::{AnomalyCandidate, Budget, DetectionConfig, Transaction};
use crate::ports::{ClassifierVerdict, HistoryError, RollingStats};
use crate::value_objects::AnomalyType;

#[derive(Debug, Clone, Error)]
pub enum RuleError {
    #[error("history unavailable for {0}")]
    HistoryUnavailable(&'static str),
    #[error("rule evaluation failed: {0}")]
    Evaluation(String),
}

pub type Loaded<T> = Result<T, HistoryError>;

/// Everything a per-transaction rule may look at. A part that failed to load
/// stays an `Err` so only the rules that need it are skipped.
#[derive(Debug, Clone)]
pub struct HistorySnapshot {
    pub as_of: DateTime<Utc>,
    /// Same-category transactions inside the duplicate window, newest first.
    pub recent_same_category: Loaded<Vec<Transaction>>,
    pub active_budget: Loaded<Option<Budget>>,
    /// Owner transactions inside the active budget period (empty without a budget).
    pub budget_period_transactions: Loaded<Vec<Transaction>>,
    /// Owner transactions from the start of the transaction's month.
    pub month_transactions: Loaded<Vec<Transaction>>,
    pub category_stats: Loaded<RollingStats>,
    pub classifier: Option<ClassifierVerdict>,
}

impl HistorySnapshot {
    pub fn empty(as_of: DateTime<Utc>) -> Self {
        Self {
            as_of,
            recent_same_category: Ok(Vec::new()),
            active_budget: Ok(None),
            budget_period_transactions: Ok(Vec::new()),
            month_transactions: Ok(Vec::new()),
            category_stats: Ok(RollingStats::default()),
            classifier: None,
        }
    }
}

pub(crate) fn require<'a, T>(part: &'a Loaded<T>, name: &'static str) -> Result<&'a T, RuleError> {
    part.as_ref().map_err(|_| RuleError::HistoryUnavailable(name))
}

pub trait AnomalyRule: Send + Sync {
    fn kind(&self) -> AnomalyType;

    fn evaluate(
        &self,
        transaction: &Transaction,
        history: &HistorySnapshot,
    ) -> Result<Option<AnomalyCandidate>, RuleError>;
}

/// The six per-transaction rules, minus any disabled in `config`.
/// SILENT_LEAK runs on its own schedule and is built separately.
pub fn default_rules(config: &DetectionConfig) -> Vec<Box<dyn AnomalyRule>> {
    let all: Vec<Box<dyn AnomalyRule>> = vec![
        Box::new(DuplicateTransactionRule::from_config(config)),
        Box::new(SpendingSpikeRule::from_config(config)),
        Box::new(BudgetExceededRule::from_config(config)),
        Box::new(CategoryOveruseRule::from_config(config)),
        Box::new(OddTimePatternRule::from_config(config)),
        Box::new(AiIrregularityRule::from_config(config)),
    ];
    all.into_iter()
        .filter(|rule| config.is_enabled(rule.kind()))
        .collect()
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{DateTime, TimeZone, Utc};

    use crate::entities::{Transaction, TransactionKind};

    pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0)
            .single()
            .expect("valid fixture time")
    }

    pub fn expense(id: &str, amount: f64, category: &str, timestamp: DateTime<Utc>) -> Transaction {
        Transaction {
            id: id.to_string(),
            owner_id: "owner-1".to_string(),
            kind: TransactionKind::Expense,
            title: String::new(),
            amount,
            category: category.to_string(),
            timestamp,
            description: None,
            sequence: 0,
        }
    }

    pub fn sequenced(mut transaction: Transaction, sequence: u64) -> Transaction {
        transaction.sequence = sequence;
        transaction
    }

    pub fn titled(mut transaction: Transaction, title: &str) -> Transaction {
        transaction.title = title.to_string();
        transaction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_cover_per_transaction_types() {
        let rules = default_rules(&DetectionConfig::default());
        let kinds: Vec<AnomalyType> = rules.iter().map(|rule| rule.kind()).collect();
        assert_eq!(kinds.len(), 6);
        assert!(!kinds.contains(&AnomalyType::SilentLeak));
    }

    #[test]
    fn disabled_rule_is_not_built() {
        let config = DetectionConfig {
            disabled_rules: vec![AnomalyType::SpendingSpike],
            ..DetectionConfig::default()
        };
        let rules = default_rules(&config);
        assert!(rules.iter().all(|rule| rule.kind() != AnomalyType::SpendingSpike));
    }
}

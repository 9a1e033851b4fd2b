use std::panic::{catch_unwind, AssertUnwindSafe};

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::entities::{Anomaly, AnomalyCandidate, DetectionConfig, Transaction};
use crate::ports::{Classifier, HistoryError, HistoryProvider};
use crate::services::rules::{default_rules, AnomalyRule, HistorySnapshot, LeakFinding, RuleError, SilentLeakRule};
use crate::utils::{hours_before, start_of_month};
use crate::value_objects::AnomalyType;

#[derive(Debug)]
pub struct RuleFailure {
    pub kind: AnomalyType,
    pub error: RuleError,
}

#[derive(Debug, Default)]
pub struct DetectionOutcome {
    pub candidates: Vec<AnomalyCandidate>,
    pub failures: Vec<RuleFailure>,
}

/// Stateless: holds only the rule set built from config.
pub struct DetectionEngine {
    config: DetectionConfig,
    rules: Vec<Box<dyn AnomalyRule>>,
    leak_rule: Option<SilentLeakRule>,
}

impl DetectionEngine {
    pub fn new(config: DetectionConfig) -> Self {
        let rules = default_rules(&config);
        Self::with_rules(config, rules)
    }

    pub fn with_rules(config: DetectionConfig, rules: Vec<Box<dyn AnomalyRule>>) -> Self {
        let leak_rule = config
            .is_enabled(AnomalyType::SilentLeak)
            .then(|| SilentLeakRule::from_config(&config));
        Self {
            config,
            rules,
            leak_rule,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn leak_rule(&self) -> Option<&SilentLeakRule> {
        self.leak_rule.as_ref()
    }

    fn wants(&self, kind: AnomalyType) -> bool {
        self.rules.iter().any(|rule| rule.kind() == kind)
    }

    /// Reads every history part the enabled rules need. Parts are loaded
    /// independently; a failure is kept in the snapshot, not returned.
    pub async fn load_snapshot(
        &self,
        history: &dyn HistoryProvider,
        classifier: Option<&dyn Classifier>,
        transaction: &Transaction,
        as_of: DateTime<Utc>,
    ) -> HistorySnapshot {
        let owner = transaction.owner_id.as_str();
        let category = transaction.category.as_str();
        let at = transaction.timestamp;
        let mut snapshot = HistorySnapshot::empty(as_of);

        if self.wants(AnomalyType::DuplicateTransaction) {
            let since = hours_before(at, self.config.duplicate_window_hours);
            snapshot.recent_same_category = history.recent_transactions(owner, category, since, at).await;
        }

        if self.wants(AnomalyType::BudgetExceeded) {
            snapshot.active_budget = history.active_budget(owner, category, at).await;
            snapshot.budget_period_transactions = match &snapshot.active_budget {
                Ok(Some(budget)) => {
                    history
                        .transactions_between(owner, budget.period_start, budget.period_end)
                        .await
                }
                Ok(None) => Ok(Vec::new()),
                Err(err) => Err(err.clone()),
            };
        }

        if self.wants(AnomalyType::CategoryOveruse) {
            snapshot.month_transactions = history.transactions_between(owner, start_of_month(at), at).await;
        }

        if self.wants(AnomalyType::SpendingSpike) {
            snapshot.category_stats = history
                .rolling_stats(owner, category, at, self.config.rolling_window_days)
                .await;
        }

        if self.wants(AnomalyType::AiDetectedIrregularity) {
            if let Some(classifier) = classifier {
                snapshot.classifier = match classifier.assess(transaction).await {
                    Ok(verdict) => verdict,
                    Err(err) => {
                        warn!("classifier unavailable for transaction {}: {}", transaction.id, err);
                        None
                    }
                };
            }
        }

        snapshot
    }

    /// Runs every rule in isolation: an error or panic in one rule is
    /// recorded and the remaining rules still run.
    pub fn evaluate(&self, transaction: &Transaction, snapshot: &HistorySnapshot) -> DetectionOutcome {
        let mut outcome = DetectionOutcome::default();
        for rule in &self.rules {
            let kind = rule.kind();
            let result = catch_unwind(AssertUnwindSafe(|| rule.evaluate(transaction, snapshot)))
                .unwrap_or_else(|_| Err(RuleError::Evaluation("rule panicked".to_string())));
            match result {
                Ok(Some(candidate)) => {
                    debug!("rule {} fired for transaction {}", kind, transaction.id);
                    outcome.candidates.push(candidate);
                }
                Ok(None) => {}
                Err(error) => {
                    warn!(
                        "rule {} skipped for transaction {}: {}",
                        kind, transaction.id, error
                    );
                    outcome.failures.push(RuleFailure { kind, error });
                }
            }
        }
        outcome
    }

    pub async fn scan_leaks(
        &self,
        history: &dyn HistoryProvider,
        owner_id: &str,
        as_of: DateTime<Utc>,
    ) -> Result<Vec<LeakFinding>, HistoryError> {
        let Some(rule) = &self.leak_rule else {
            return Ok(Vec::new());
        };
        let transactions = history
            .transactions_between(owner_id, rule.window_start(as_of), as_of)
            .await?;
        Ok(rule.evaluate_window(as_of, &transactions))
    }
}

pub fn build_anomaly(
    id: String,
    owner_id: &str,
    transaction_id: Option<&str>,
    candidate: AnomalyCandidate,
    detected_at: DateTime<Utc>,
) -> Anomaly {
    Anomaly::from_candidate(
        id,
        owner_id.to_string(),
        transaction_id.map(ToString::to_string),
        candidate,
        detected_at,
    )
}

/// One anomaly per transaction and rule, however often detection is retried.
pub fn transaction_idempotency_key(transaction_id: &str, kind: AnomalyType) -> String {
    format!("{}:{}", transaction_id, kind.as_str())
}

/// One leak anomaly per owner and category per window-sized bucket of days.
pub fn leak_idempotency_key(owner_id: &str, category: &str, as_of: DateTime<Utc>, window_days: u64) -> String {
    let bucket = as_of.timestamp().div_euclid(86_400) / window_days.max(1) as i64;
    format!(
        "{}:{}:{}:{}",
        owner_id,
        AnomalyType::SilentLeak.as_str(),
        category,
        bucket
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Budget, Evidence};
    use crate::ports::{ClassifierVerdict, RollingStats};
    use crate::services::rules::fixtures::{at, expense, titled};
    use async_trait::async_trait;

    struct ExplodingRule;

    impl AnomalyRule for ExplodingRule {
        fn kind(&self) -> AnomalyType {
            AnomalyType::SpendingSpike
        }

        fn evaluate(
            &self,
            _transaction: &Transaction,
            _history: &HistorySnapshot,
        ) -> Result<Option<AnomalyCandidate>, RuleError> {
            panic!("boom");
        }
    }

    struct FailingRule;

    impl AnomalyRule for FailingRule {
        fn kind(&self) -> AnomalyType {
            AnomalyType::CategoryOveruse
        }

        fn evaluate(
            &self,
            _transaction: &Transaction,
            _history: &HistorySnapshot,
        ) -> Result<Option<AnomalyCandidate>, RuleError> {
            Err(RuleError::Evaluation("bad data".to_string()))
        }
    }

    struct StaticHistory {
        transactions: Vec<Transaction>,
        budget: Option<Budget>,
        fail_stats: bool,
    }

    #[async_trait]
    impl HistoryProvider for StaticHistory {
        async fn recent_transactions(
            &self,
            _owner_id: &str,
            category: &str,
            since: DateTime<Utc>,
            until: DateTime<Utc>,
        ) -> Result<Vec<Transaction>, HistoryError> {
            Ok(self
                .transactions
                .iter()
                .filter(|tx| tx.category == category && tx.timestamp >= since && tx.timestamp <= until)
                .cloned()
                .collect())
        }

        async fn active_budget(
            &self,
            _owner_id: &str,
            _category: &str,
            _at: DateTime<Utc>,
        ) -> Result<Option<Budget>, HistoryError> {
            Ok(self.budget.clone())
        }

        async fn rolling_stats(
            &self,
            _owner_id: &str,
            _category: &str,
            _before: DateTime<Utc>,
            _window_days: u64,
        ) -> Result<RollingStats, HistoryError> {
            if self.fail_stats {
                return Err(HistoryError::Unavailable("stats offline".to_string()));
            }
            Ok(RollingStats::default())
        }

        async fn transactions_between(
            &self,
            _owner_id: &str,
            from: DateTime<Utc>,
            until: DateTime<Utc>,
        ) -> Result<Vec<Transaction>, HistoryError> {
            Ok(self
                .transactions
                .iter()
                .filter(|tx| tx.timestamp >= from && tx.timestamp <= until)
                .cloned()
                .collect())
        }
    }

    struct FixedClassifier(f64);

    #[async_trait]
    impl Classifier for FixedClassifier {
        async fn assess(&self, _transaction: &Transaction) -> anyhow::Result<Option<ClassifierVerdict>> {
            Ok(Some(ClassifierVerdict { confidence: self.0 }))
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn failing_rules_do_not_block_the_rest() {
        let config = DetectionConfig::default();
        let mut rules = default_rules(&config);
        rules.insert(0, Box::new(ExplodingRule));
        rules.insert(1, Box::new(FailingRule));
        let engine = DetectionEngine::with_rules(config, rules);

        let tx = expense("tx-1", 20.0, "food", at(14, 3));
        let outcome = engine.evaluate(&tx, &HistorySnapshot::empty(at(14, 3)));
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome
            .candidates
            .iter()
            .any(|candidate| candidate.kind == AnomalyType::OddTimePattern));
    }

    #[tokio::test]
    async fn snapshot_feeds_duplicate_and_budget_rules() {
        let first = titled(expense("tx-1", 100.0, "food", at(14, 12)), "Burger");
        let second = titled(expense("tx-2", 100.0, "food", at(14, 13)), "Burger");
        let history = StaticHistory {
            transactions: vec![first.clone(), second.clone()],
            budget: Some(Budget {
                id: "b-1".to_string(),
                owner_id: "owner-1".to_string(),
                category: "food".to_string(),
                limit: 150.0,
                period_start: at(1, 0),
                period_end: at(31, 0),
            }),
            fail_stats: true,
        };
        let engine = DetectionEngine::new(DetectionConfig::default());
        let snapshot = engine.load_snapshot(&history, None, &second, at(14, 13)).await;
        let outcome = engine.evaluate(&second, &snapshot);

        let kinds: Vec<AnomalyType> = outcome.candidates.iter().map(|c| c.kind).collect();
        assert!(kinds.contains(&AnomalyType::DuplicateTransaction));
        assert!(kinds.contains(&AnomalyType::BudgetExceeded));
        // stats outage only skips the spike rule
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].kind, AnomalyType::SpendingSpike);
        assert!(matches!(
            outcome.failures[0].error,
            RuleError::HistoryUnavailable(_)
        ));
    }

    #[tokio::test]
    async fn classifier_verdict_reaches_ai_rule() {
        let history = StaticHistory {
            transactions: Vec::new(),
            budget: None,
            fail_stats: false,
        };
        let engine = DetectionEngine::new(DetectionConfig::default());
        let tx = expense("tx-1", 10.0, "food", at(14, 12));
        let classifier = FixedClassifier(0.92);
        let snapshot = engine
            .load_snapshot(&history, Some(&classifier), &tx, at(14, 12))
            .await;
        let outcome = engine.evaluate(&tx, &snapshot);
        let ai = outcome
            .candidates
            .iter()
            .find(|c| c.kind == AnomalyType::AiDetectedIrregularity)
            .expect("ai finding");
        assert!(matches!(ai.evidence, Evidence::AiIrregularity(_)));
    }

    #[tokio::test]
    async fn leak_scan_respects_disabled_rule() {
        let history = StaticHistory {
            transactions: (0..6)
                .map(|idx| expense(&format!("tx-{}", idx), 30.0, "apps", at(2 + idx, 9)))
                .collect(),
            budget: None,
            fail_stats: false,
        };
        let enabled = DetectionEngine::new(DetectionConfig::default());
        let findings = enabled
            .scan_leaks(&history, "owner-1", at(14, 0))
            .await
            .expect("scan");
        assert_eq!(findings.len(), 1);

        let disabled = DetectionEngine::new(DetectionConfig {
            disabled_rules: vec![AnomalyType::SilentLeak],
            ..DetectionConfig::default()
        });
        let findings = disabled
            .scan_leaks(&history, "owner-1", at(14, 0))
            .await
            .expect("scan");
        assert!(findings.is_empty());
    }

    #[test]
    fn idempotency_keys_are_stable() {
        assert_eq!(
            transaction_idempotency_key("tx-1", AnomalyType::BudgetExceeded),
            "tx-1:BUDGET_EXCEEDED"
        );
        let morning = leak_idempotency_key("owner-1", "apps", at(14, 1), 30);
        let evening = leak_idempotency_key("owner-1", "apps", at(14, 23), 30);
        assert_eq!(morning, evening);
    }
}

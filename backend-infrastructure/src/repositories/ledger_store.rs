use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use backend_domain::{
    days_before,
    Budget,
    BudgetUpsert,
    HistoryError,
    HistoryProvider,
    LedgerRepository,
    RollingStats,
    Transaction,
};

#[derive(Default)]
struct LedgerData {
    /// Per owner, ascending by timestamp.
    transactions: HashMap<String, Vec<Transaction>>,
    /// Keyed by (owner, category); one budget per category.
    budgets: HashMap<(String, String), Budget>,
    last_sequence: u64,
}

/// In-process ledger. Serves both the write side and the history reads
/// detection depends on, so every read reflects committed writes.
#[derive(Default)]
pub struct MemoryLedgerStore {
    data: RwLock<LedgerData>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerRepository for MemoryLedgerStore {
    async fn insert_transaction(&self, transaction: &Transaction) -> anyhow::Result<u64> {
        let mut data = self.data.write().await;
        let sequence = data.last_sequence + 1;
        let rows = data
            .transactions
            .entry(transaction.owner_id.clone())
            .or_default();
        if rows.iter().any(|row| row.id == transaction.id) {
            anyhow::bail!("transaction {} already stored", transaction.id);
        }
        let stored = Transaction {
            sequence,
            ..transaction.clone()
        };
        // sequence is the largest so far, so equal timestamps stay in insert order
        let at = rows.partition_point(|row| row.timestamp <= stored.timestamp);
        rows.insert(at, stored);
        data.last_sequence = sequence;
        Ok(sequence)
    }

    async fn upsert_budget(&self, budget: Budget) -> anyhow::Result<BudgetUpsert> {
        let mut data = self.data.write().await;
        let key = (budget.owner_id.clone(), budget.category.clone());
        let (budget, created) = match data.budgets.get(&key) {
            // updates keep the original id
            Some(existing) => (
                Budget {
                    id: existing.id.clone(),
                    ..budget
                },
                false,
            ),
            None => (budget, true),
        };
        data.budgets.insert(key, budget.clone());
        Ok(BudgetUpsert { budget, created })
    }

    async fn list_owners(&self) -> anyhow::Result<Vec<String>> {
        let data = self.data.read().await;
        let mut owners: Vec<String> = data.transactions.keys().cloned().collect();
        owners.sort();
        Ok(owners)
    }

    async fn ping(&self) -> anyhow::Result<()> {
        let _guard = self.data.read().await;
        Ok(())
    }
}

#[async_trait]
impl HistoryProvider for MemoryLedgerStore {
    async fn recent_transactions(
        &self,
        owner_id: &str,
        category: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, HistoryError> {
        let data = self.data.read().await;
        Ok(owner_rows(&data, owner_id)
            .iter()
            .rev()
            .filter(|row| row.category == category && row.timestamp >= since && row.timestamp <= until)
            .cloned()
            .collect())
    }

    async fn active_budget(
        &self,
        owner_id: &str,
        category: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Budget>, HistoryError> {
        let data = self.data.read().await;
        Ok(data
            .budgets
            .get(&(owner_id.to_string(), category.to_string()))
            .filter(|budget| budget.is_active_at(at))
            .cloned())
    }

    async fn rolling_stats(
        &self,
        owner_id: &str,
        category: &str,
        before: DateTime<Utc>,
        window_days: u64,
    ) -> Result<RollingStats, HistoryError> {
        let since = days_before(before, window_days);
        let data = self.data.read().await;
        let amounts: Vec<f64> = owner_rows(&data, owner_id)
            .iter()
            .filter(|row| {
                row.is_expense()
                    && row.category == category
                    && row.timestamp >= since
                    && row.timestamp < before
            })
            .map(|row| row.amount)
            .collect();
        Ok(RollingStats::from_amounts(&amounts))
    }

    async fn transactions_between(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, HistoryError> {
        let data = self.data.read().await;
        Ok(owner_rows(&data, owner_id)
            .iter()
            .filter(|row| row.timestamp >= from && row.timestamp <= until)
            .cloned()
            .collect())
    }
}

fn owner_rows<'a>(data: &'a LedgerData, owner_id: &str) -> &'a [Transaction] {
    data.transactions
        .get(owner_id)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

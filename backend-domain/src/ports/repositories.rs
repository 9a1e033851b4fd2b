use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Anomaly,
    AnomalyQuery,
    AuditLogEntry,
    Budget,
    Resolution,
    ResolveError,
    Transaction,
};

#[derive(Debug, Clone)]
pub struct BudgetUpsert {
    pub budget: Budget,
    pub created: bool,
}

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Returns the insertion sequence assigned to the stored row. Sequences
    /// only grow.
    async fn insert_transaction(&self, transaction: &Transaction) -> anyhow::Result<u64>;
    /// Replaces the owner's budget for the same category.
    async fn upsert_budget(&self, budget: Budget) -> anyhow::Result<BudgetUpsert>;
    async fn list_owners(&self) -> anyhow::Result<Vec<String>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait AnomalyRepository: Send + Sync {
    /// Stores `anomaly` unless `idempotency_key` was already used, in which
    /// case `None` is returned and nothing is written.
    async fn insert_if_absent(
        &self,
        idempotency_key: &str,
        anomaly: Anomaly,
    ) -> anyhow::Result<Option<Anomaly>>;

    async fn get(&self, owner_id: &str, id: &str) -> anyhow::Result<Option<Anomaly>>;

    /// Newest first.
    async fn list(&self, owner_id: &str, query: &AnomalyQuery) -> anyhow::Result<Vec<Anomaly>>;

    /// Atomic conditional update: succeeds only while the stored status is
    /// PENDING. The outer error is a storage failure, the inner one a
    /// lifecycle rejection.
    async fn resolve(
        &self,
        owner_id: &str,
        id: &str,
        resolution: &Resolution,
    ) -> anyhow::Result<Result<Anomaly, ResolveError>>;
}

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn append(&self, entry: &AuditLogEntry) -> anyhow::Result<()>;
    /// Entries with `from <= timestamp <= until`, ascending by timestamp.
    async fn list(
        &self,
        owner_id: &str,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<AuditLogEntry>>;
}

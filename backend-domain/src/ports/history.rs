use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{Budget, Transaction};

#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("history unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RollingStats {
    pub average: f64,
    pub stddev: f64,
    pub samples: usize,
}

impl RollingStats {
    /// Population mean and standard deviation.
    pub fn from_amounts(amounts: &[f64]) -> Self {
        if amounts.is_empty() {
            return Self::default();
        }
        let samples = amounts.len();
        let average = amounts.iter().sum::<f64>() / samples as f64;
        let variance = amounts
            .iter()
            .map(|amount| (amount - average).powi(2))
            .sum::<f64>()
            / samples as f64;
        Self {
            average,
            stddev: variance.sqrt(),
            samples,
        }
    }
}

/// Read-only view over the owner's ledger. Implementations must derive every
/// answer from stored transactions at call time.
#[async_trait]
pub trait HistoryProvider: Send + Sync {
    /// Transactions in `category` with `since <= timestamp <= until`, newest first.
    async fn recent_transactions(
        &self,
        owner_id: &str,
        category: &str,
        since: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, HistoryError>;

    async fn active_budget(
        &self,
        owner_id: &str,
        category: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<Budget>, HistoryError>;

    /// Stats over expenses in `category` strictly before `before`, bounded by
    /// `window_days`.
    async fn rolling_stats(
        &self,
        owner_id: &str,
        category: &str,
        before: DateTime<Utc>,
        window_days: u64,
    ) -> Result<RollingStats, HistoryError>;

    /// All of the owner's transactions with `from <= timestamp <= until`.
    async fn transactions_between(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Transaction>, HistoryError>;
}

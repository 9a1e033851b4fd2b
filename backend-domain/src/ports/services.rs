use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::entities::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassifierVerdict {
    pub confidence: f64,
}

/// External irregularity classifier. `Ok(None)` means it has no opinion.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn assess(&self, transaction: &Transaction) -> anyhow::Result<Option<ClassifierVerdict>>;
    async fn ping(&self) -> anyhow::Result<()>;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_store(&self) -> anyhow::Result<bool>;
    async fn check_classifier(&self) -> anyhow::Result<bool>;
}

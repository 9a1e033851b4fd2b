use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::{Classifier, HealthCheckService};
use backend_domain::LedgerRepository;

pub struct DefaultHealthService {
    ledger_repo: Arc<dyn LedgerRepository>,
    classifier: Option<Arc<dyn Classifier>>,
}

impl DefaultHealthService {
    pub fn new(ledger_repo: Arc<dyn LedgerRepository>, classifier: Option<Arc<dyn Classifier>>) -> Self {
        Self {
            ledger_repo,
            classifier,
        }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_store(&self) -> anyhow::Result<bool> {
        self.ledger_repo.ping().await.map(|_| true)
    }

    /// No configured classifier counts as healthy; AI detection is optional.
    async fn check_classifier(&self) -> anyhow::Result<bool> {
        match &self.classifier {
            Some(classifier) => classifier.ping().await.map(|_| true),
            None => Ok(true),
        }
    }
}

use std::sync::Arc;

use backend_domain::ports::{
    AnomalyRepository,
    Classifier,
    HealthCheckService,
    HistoryProvider,
    LedgerRepository,
};
use backend_domain::services::{DetectionEngine, HealthScorer};
use backend_domain::RuntimeConfig;

use crate::{AuditWriter, Metrics};

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub ledger_repo: Arc<dyn LedgerRepository>,
    pub history: Arc<dyn HistoryProvider>,
    pub anomaly_repo: Arc<dyn AnomalyRepository>,
    pub audit: Arc<AuditWriter>,
    pub classifier: Option<Arc<dyn Classifier>>,
    pub health_service: Arc<dyn HealthCheckService>,
    pub engine: Arc<DetectionEngine>,
    pub scorer: HealthScorer,
    pub metrics: Arc<Metrics>,
}

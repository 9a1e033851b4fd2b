use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use backend_application::{AppState, AuditWriter, Metrics};
use backend_domain::{AuditLogRepository, Classifier, DetectionEngine, HealthScorer, RuntimeConfig};
use backend_infrastructure::{
    AppConfig,
    AuditLogStore,
    DefaultHealthService,
    HttpClassifier,
    MemoryAnomalyStore,
    MemoryLedgerStore,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();

        let audit_repo: Arc<dyn AuditLogRepository> = match &config.audit_log_path {
            Some(path) => {
                info!("audit log mirrored to {}", path);
                Arc::new(AuditLogStore::open(path).await?)
            }
            None => Arc::new(AuditLogStore::in_memory()),
        };
        let classifier: Option<Arc<dyn Classifier>> = match &config.classifier_url {
            Some(url) => {
                info!("AI irregularity classifier at {}", url);
                Some(Arc::new(HttpClassifier::new(
                    url.clone(),
                    config.classifier_timeout_seconds,
                )?))
            }
            None => None,
        };

        Ok(Self::from_parts(runtime_config, audit_repo, classifier))
    }

    /// Everything in memory, no classifier.
    pub fn in_memory(config: RuntimeConfig) -> Self {
        Self::from_parts(config, Arc::new(AuditLogStore::in_memory()), None)
    }

    pub fn from_parts(
        config: RuntimeConfig,
        audit_repo: Arc<dyn AuditLogRepository>,
        classifier: Option<Arc<dyn Classifier>>,
    ) -> Self {
        let ledger = Arc::new(MemoryLedgerStore::new());
        let metrics = Arc::new(Metrics::default());
        let engine = Arc::new(DetectionEngine::new(config.detection.clone()));
        let scorer = HealthScorer::new(config.health);

        let state = AppState {
            config,
            ledger_repo: ledger.clone(),
            history: ledger.clone(),
            anomaly_repo: Arc::new(MemoryAnomalyStore::new()),
            audit: Arc::new(AuditWriter::new(audit_repo, metrics.clone())),
            health_service: Arc::new(DefaultHealthService::new(ledger, classifier.clone())),
            classifier,
            engine,
            scorer,
            metrics,
        };
        Self { state }
    }
}

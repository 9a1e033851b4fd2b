use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use backend_domain::ports::AuditLogRepository;
use backend_domain::AuditLogEntry;
use chrono::{DateTime, Utc};

use crate::Metrics;

/// Front door to the audit log. An append that fails is kept in memory and
/// retried by `flush_pending`; callers never see the failure.
pub struct AuditWriter {
    repo: Arc<dyn AuditLogRepository>,
    metrics: Arc<Metrics>,
    pending: Mutex<VecDeque<AuditLogEntry>>,
}

impl AuditWriter {
    pub fn new(repo: Arc<dyn AuditLogRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            repo,
            metrics,
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub async fn record(&self, entry: AuditLogEntry) {
        if let Err(err) = self.repo.append(&entry).await {
            error!(
                "audit append failed for {} ({}), queued for retry: {}",
                entry.action.as_str(),
                entry.id,
                err
            );
            self.metrics.record_audit_failure();
            self.pending.lock().await.push_back(entry);
        }
    }

    /// Retries queued entries in order, stopping at the first failure so the
    /// log keeps its ordering. Returns how many entries are still queued.
    pub async fn flush_pending(&self) -> usize {
        let mut pending = self.pending.lock().await;
        let mut flushed = 0usize;
        while let Some(entry) = pending.front() {
            match self.repo.append(entry).await {
                Ok(()) => {
                    pending.pop_front();
                    flushed += 1;
                }
                Err(err) => {
                    warn!(
                        "audit retry failed, {} entries still queued: {}",
                        pending.len(),
                        err
                    );
                    break;
                }
            }
        }
        if flushed > 0 {
            info!("flushed {} queued audit entries", flushed);
        }
        pending.len()
    }

    pub async fn pending_len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn list(
        &self,
        owner_id: &str,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<AuditLogEntry>> {
        self.repo.list(owner_id, from, until).await
    }
}

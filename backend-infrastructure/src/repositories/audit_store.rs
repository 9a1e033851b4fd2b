use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{info, warn};

use backend_domain::{AuditLogEntry, AuditLogRepository};

/// Append-only audit log held in memory, optionally mirrored to a JSON-lines
/// file. An entry is visible only once the file write succeeded.
pub struct AuditLogStore {
    entries: RwLock<Vec<AuditLogEntry>>,
    path: Option<PathBuf>,
}

impl AuditLogStore {
    pub fn in_memory() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            path: None,
        }
    }

    /// Replays an existing file. Unreadable lines are skipped with a warning.
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut entries = Vec::new();
        if path.exists() {
            let content = fs::read_to_string(&path)
                .await
                .with_context(|| format!("read audit log {}", path.display()))?;
            for (line_no, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<AuditLogEntry>(line) {
                    Ok(entry) => entries.push(entry),
                    Err(err) => warn!(
                        "skipping audit log line {} in {}: {}",
                        line_no + 1,
                        path.display(),
                        err
                    ),
                }
            }
            entries.sort_by(|a: &AuditLogEntry, b: &AuditLogEntry| a.timestamp.cmp(&b.timestamp));
            info!("replayed {} audit entries from {}", entries.len(), path.display());
        } else if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(Self {
            entries: RwLock::new(entries),
            path: Some(path),
        })
    }

    async fn persist(&self, entry: &AuditLogEntry) -> anyhow::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("open audit log {}", path.display()))?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl AuditLogRepository for AuditLogStore {
    async fn append(&self, entry: &AuditLogEntry) -> anyhow::Result<()> {
        // the write lock also serialises file appends
        let mut entries = self.entries.write().await;
        self.persist(entry).await?;
        let at = entries.partition_point(|item| item.timestamp <= entry.timestamp);
        entries.insert(at, entry.clone());
        Ok(())
    }

    async fn list(
        &self,
        owner_id: &str,
        from: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> anyhow::Result<Vec<AuditLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .filter(|entry| from.map_or(true, |from| entry.timestamp >= from))
            .filter(|entry| until.map_or(true, |until| entry.timestamp <= until))
            .cloned()
            .collect())
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use backend_domain::{Anomaly, AnomalyQuery, AnomalyRepository, Resolution, ResolveError};

#[derive(Default)]
struct AnomalyData {
    /// Insertion order, which is also detection order.
    rows: Vec<Anomaly>,
    by_id: HashMap<String, usize>,
    keys: HashMap<String, String>,
}

/// Anomalies are only ever appended or resolved in place; resolution is a
/// check-and-set performed while holding the write lock.
#[derive(Default)]
pub struct MemoryAnomalyStore {
    data: RwLock<AnomalyData>,
}

impl MemoryAnomalyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AnomalyRepository for MemoryAnomalyStore {
    async fn insert_if_absent(
        &self,
        idempotency_key: &str,
        anomaly: Anomaly,
    ) -> anyhow::Result<Option<Anomaly>> {
        let mut data = self.data.write().await;
        if data.keys.contains_key(idempotency_key) {
            return Ok(None);
        }
        if data.by_id.contains_key(&anomaly.id) {
            anyhow::bail!("anomaly id {} already stored", anomaly.id);
        }
        let index = data.rows.len();
        data.keys
            .insert(idempotency_key.to_string(), anomaly.id.clone());
        data.by_id.insert(anomaly.id.clone(), index);
        data.rows.push(anomaly.clone());
        Ok(Some(anomaly))
    }

    async fn get(&self, owner_id: &str, id: &str) -> anyhow::Result<Option<Anomaly>> {
        let data = self.data.read().await;
        Ok(data
            .by_id
            .get(id)
            .and_then(|index| data.rows.get(*index))
            .filter(|row| row.owner_id == owner_id)
            .cloned())
    }

    async fn list(&self, owner_id: &str, query: &AnomalyQuery) -> anyhow::Result<Vec<Anomaly>> {
        let data = self.data.read().await;
        let mut rows: Vec<Anomaly> = data
            .rows
            .iter()
            .rev()
            .filter(|row| row.owner_id == owner_id)
            .filter(|row| query.status.map_or(true, |status| row.status == status))
            .filter(|row| query.kind.map_or(true, |kind| row.kind == kind))
            .cloned()
            .collect();
        // stable: equal detection times keep newest-inserted first
        rows.sort_by(|a, b| b.detected_at.cmp(&a.detected_at));
        Ok(rows)
    }

    async fn resolve(
        &self,
        owner_id: &str,
        id: &str,
        resolution: &Resolution,
    ) -> anyhow::Result<Result<Anomaly, ResolveError>> {
        let mut data = self.data.write().await;
        let Some(index) = data.by_id.get(id).copied() else {
            return Ok(Err(ResolveError::NotFound));
        };
        let Some(row) = data.rows.get_mut(index) else {
            anyhow::bail!("anomaly index for {} is out of range", id);
        };
        if row.owner_id != owner_id {
            return Ok(Err(ResolveError::NotFound));
        }
        Ok(row.apply_resolution(resolution).map(|_| row.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use backend_domain::{
        AnomalyCandidate,
        AnomalyStatus,
        AnomalyType,
        DuplicateEvidence,
        Evidence,
        Severity,
    };
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 14, 12, minute, 0)
            .single()
            .expect("valid time")
    }

    fn anomaly(id: &str, owner: &str, detected_at: DateTime<Utc>) -> Anomaly {
        Anomaly::from_candidate(
            id.to_string(),
            owner.to_string(),
            Some("tx-1".to_string()),
            AnomalyCandidate {
                kind: AnomalyType::DuplicateTransaction,
                severity: Severity::High,
                evidence: Evidence::Duplicate(DuplicateEvidence {
                    duplicate_of: "tx-0".to_string(),
                }),
                explanation: "same charge twice".to_string(),
            },
            detected_at,
        )
    }

    fn dismissal() -> Resolution {
        Resolution::new(AnomalyStatus::Dismissed, None, at(30)).expect("resolution")
    }

    #[tokio::test]
    async fn same_key_is_stored_once() {
        let store = MemoryAnomalyStore::new();
        let first = store
            .insert_if_absent("tx-1:DUPLICATE_TRANSACTION", anomaly("a1", "o1", at(0)))
            .await
            .expect("insert");
        let second = store
            .insert_if_absent("tx-1:DUPLICATE_TRANSACTION", anomaly("a2", "o1", at(1)))
            .await
            .expect("insert");
        assert!(first.is_some());
        assert!(second.is_none());
        let rows = store.list("o1", &AnomalyQuery::default()).await.expect("list");
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_filtered() {
        let store = MemoryAnomalyStore::new();
        store.insert_if_absent("k1", anomaly("a1", "o1", at(0))).await.expect("insert");
        store.insert_if_absent("k2", anomaly("a2", "o1", at(5))).await.expect("insert");
        store.insert_if_absent("k3", anomaly("a3", "o2", at(9))).await.expect("insert");
        store.resolve("o1", "a1", &dismissal()).await.expect("store").expect("resolve");

        let all = store.list("o1", &AnomalyQuery::default()).await.expect("list");
        let ids: Vec<&str> = all.iter().map(|row| row.id.as_str()).collect();
        assert_eq!(ids, vec!["a2", "a1"]);

        let pending = store
            .list(
                "o1",
                &AnomalyQuery {
                    status: Some(AnomalyStatus::Pending),
                    ..AnomalyQuery::default()
                },
            )
            .await
            .expect("list");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "a2");
    }

    #[tokio::test]
    async fn other_owner_sees_not_found() {
        let store = MemoryAnomalyStore::new();
        store.insert_if_absent("k1", anomaly("a1", "o1", at(0))).await.expect("insert");

        assert!(store.get("o2", "a1").await.expect("get").is_none());
        let result = store.resolve("o2", "a1", &dismissal()).await.expect("store");
        assert!(matches!(result, Err(ResolveError::NotFound)));
        let result = store.resolve("o1", "missing", &dismissal()).await.expect("store");
        assert!(matches!(result, Err(ResolveError::NotFound)));
    }

    #[tokio::test]
    async fn concurrent_resolves_have_one_winner() {
        let store = Arc::new(MemoryAnomalyStore::new());
        store.insert_if_absent("k1", anomaly("a1", "o1", at(0))).await.expect("insert");

        let mut handles = Vec::new();
        for offset in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let status = if offset % 2 == 0 {
                    AnomalyStatus::Confirmed
                } else {
                    AnomalyStatus::Dismissed
                };
                let resolution =
                    Resolution::new(status, None, at(30) + Duration::seconds(offset)).expect("resolution");
                store.resolve("o1", "a1", &resolution).await.expect("store")
            }));
        }

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.expect("join") {
                Ok(_) => wins += 1,
                Err(ResolveError::AlreadyResolved) => conflicts += 1,
                Err(other) => panic!("unexpected error: {}", other),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(conflicts, 7);

        let stored = store.get("o1", "a1").await.expect("get").expect("row");
        assert!(stored.status.is_resolved());
        assert!(stored.resolved_at.is_some());
    }
}

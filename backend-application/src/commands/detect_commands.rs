use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use backend_domain::services::{build_anomaly, leak_idempotency_key, transaction_idempotency_key};
use backend_domain::{new_id, Anomaly, AnomalyCandidate, AuditAction, AuditLogEntry, Transaction};

use crate::AppState;

/// Fire-and-forget detection for a freshly written transaction.
pub fn spawn_detection(state: AppState, transaction: Transaction) {
    tokio::spawn(async move {
        let created = detect_transaction(&state, &transaction).await;
        debug!(
            "detection finished for transaction {}: {} new anomalies",
            transaction.id,
            created.len()
        );
    });
}

/// Runs every per-transaction rule and stores what fires. Safe to retry:
/// each (transaction, rule) pair is stored at most once.
pub async fn detect_transaction(state: &AppState, transaction: &Transaction) -> Vec<Anomaly> {
    let now = Utc::now();
    let snapshot = state
        .engine
        .load_snapshot(
            state.history.as_ref(),
            state.classifier.as_deref(),
            transaction,
            now,
        )
        .await;
    let outcome = state.engine.evaluate(transaction, &snapshot);

    let mut created = Vec::new();
    for candidate in outcome.candidates {
        let key = transaction_idempotency_key(&transaction.id, candidate.kind);
        if let Some(anomaly) = store_candidate(
            state,
            &key,
            &transaction.owner_id,
            Some(&transaction.id),
            candidate,
            now,
        )
        .await
        {
            created.push(anomaly);
        }
    }
    state
        .metrics
        .record_detection(outcome.failures.len(), created.len());
    if !created.is_empty() {
        info!(
            "transaction {} raised {} anomalies",
            transaction.id,
            created.len()
        );
    }
    created
}

/// SILENT_LEAK scan over the trailing window ending at `as_of`.
pub async fn detect_leaks(state: &AppState, owner_id: &str, as_of: DateTime<Utc>) -> Vec<Anomaly> {
    let findings = match state
        .engine
        .scan_leaks(state.history.as_ref(), owner_id, as_of)
        .await
    {
        Ok(findings) => findings,
        Err(err) => {
            warn!("leak scan skipped for {}: {}", owner_id, err);
            state.metrics.record_detection(1, 0);
            return Vec::new();
        }
    };

    let window_days = state.engine.config().leak_window_days;
    let now = Utc::now();
    let mut created = Vec::new();
    for finding in findings {
        let key = leak_idempotency_key(owner_id, &finding.category, as_of, window_days);
        if let Some(anomaly) = store_candidate(state, &key, owner_id, None, finding.candidate, now).await {
            created.push(anomaly);
        }
    }
    state.metrics.record_detection(0, created.len());

    if !created.is_empty() {
        info!("leak scan for {} raised {} anomalies", owner_id, created.len());
        let entry = AuditLogEntry::new(
            new_id(),
            owner_id,
            AuditAction::AnomalyLeakScan,
            now,
            [
                ("asOf", as_of.to_rfc3339()),
                ("created", created.len().to_string()),
            ],
        );
        state.audit.record(entry).await;
    }
    created
}

/// Scheduled entry point: scans every owner the ledger knows about.
pub async fn detect_leaks_for_all_owners(state: &AppState, as_of: DateTime<Utc>) -> usize {
    let owners = match state.ledger_repo.list_owners().await {
        Ok(owners) => owners,
        Err(err) => {
            warn!("leak scan aborted, owners unavailable: {}", err);
            return 0;
        }
    };
    let mut total = 0;
    for owner_id in &owners {
        total += detect_leaks(state, owner_id, as_of).await.len();
    }
    info!(
        "leak scan over {} owners raised {} anomalies",
        owners.len(),
        total
    );
    total
}

async fn store_candidate(
    state: &AppState,
    key: &str,
    owner_id: &str,
    transaction_id: Option<&str>,
    candidate: AnomalyCandidate,
    detected_at: DateTime<Utc>,
) -> Option<Anomaly> {
    let anomaly = build_anomaly(new_id(), owner_id, transaction_id, candidate, detected_at);
    match state.anomaly_repo.insert_if_absent(key, anomaly).await {
        Ok(Some(stored)) => Some(stored),
        Ok(None) => {
            debug!("anomaly {} already recorded", key);
            None
        }
        Err(err) => {
            warn!("failed to store anomaly {}: {}", key, err);
            None
        }
    }
}

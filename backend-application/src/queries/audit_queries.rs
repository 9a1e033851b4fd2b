use tracing::error;

use backend_domain::{AuditLogEntry, AuditLogQuery};

use crate::queries::anomaly_queries::clamp_limit;
use crate::{AppError, AppState};

/// Newest first. Entries still waiting in the retry buffer are not listed.
pub async fn list_audit_logs(
    state: &AppState,
    owner_id: &str,
    query: AuditLogQuery,
) -> Result<Vec<AuditLogEntry>, AppError> {
    if let (Some(from), Some(until)) = (query.from, query.until) {
        if from > until {
            return Err(AppError::BadRequest("from must not be after until".to_string()));
        }
    }
    let limit = clamp_limit(query.limit);
    let mut entries = state
        .audit
        .list(owner_id, query.from, query.until)
        .await
        .map_err(|err| {
            error!("failed to list audit logs for {}: {}", owner_id, err);
            AppError::Internal(err)
        })?;
    entries.reverse();
    entries.truncate(limit);
    Ok(entries)
}

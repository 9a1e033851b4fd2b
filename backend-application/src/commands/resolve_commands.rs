use chrono::Utc;
use tracing::{info, warn};

use backend_domain::{new_id, Anomaly, AuditAction, AuditLogEntry, Resolution, ResolveError, ResolveRequest};

use crate::{AppError, AppState};

/// Moves a PENDING anomaly to CONFIRMED or DISMISSED. Exactly one of any
/// number of concurrent calls succeeds; only that one is audited.
pub async fn resolve_anomaly(
    state: &AppState,
    owner_id: &str,
    anomaly_id: &str,
    request: ResolveRequest,
) -> Result<Anomaly, AppError> {
    let now = Utc::now();
    let resolution = Resolution::new(request.action, request.resolution_note, now)
        .map_err(|err| AppError::BadRequest(err.to_string()))?;

    let anomaly = match state
        .anomaly_repo
        .resolve(owner_id, anomaly_id, &resolution)
        .await?
    {
        Ok(anomaly) => anomaly,
        Err(ResolveError::NotFound) => {
            return Err(AppError::NotFound(format!("anomaly {}", anomaly_id)));
        }
        Err(ResolveError::AlreadyResolved) => {
            state.metrics.record_resolution_conflict();
            warn!("anomaly {} already resolved, rejecting {}", anomaly_id, resolution.status);
            return Err(AppError::AlreadyResolved);
        }
        Err(err @ ResolveError::InvalidAction(_)) => {
            return Err(AppError::BadRequest(err.to_string()));
        }
    };

    state.metrics.record_resolution();
    info!("anomaly {} resolved as {} by {}", anomaly.id, anomaly.status, owner_id);

    let entry = AuditLogEntry::new(
        new_id(),
        owner_id,
        AuditAction::AnomalyResolve,
        now,
        [
            ("anomalyId", anomaly.id.clone()),
            ("action", anomaly.status.as_str().to_string()),
            ("note", anomaly.resolution_note.clone().unwrap_or_default()),
            ("type", anomaly.kind.as_str().to_string()),
        ],
    );
    state.audit.record(entry).await;
    Ok(anomaly)
}

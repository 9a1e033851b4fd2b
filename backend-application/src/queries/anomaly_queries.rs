use tracing::error;

use backend_domain::{Anomaly, AnomalyQuery};

use crate::{AppError, AppState};

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 500;

pub(crate) fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

/// Newest first, filtered by status and type.
pub async fn list_anomalies(
    state: &AppState,
    owner_id: &str,
    query: AnomalyQuery,
) -> Result<Vec<Anomaly>, AppError> {
    let limit = clamp_limit(query.limit);
    let mut rows = state
        .anomaly_repo
        .list(owner_id, &query)
        .await
        .map_err(|err| {
            error!("failed to list anomalies for {}: {}", owner_id, err);
            AppError::Internal(err)
        })?;
    rows.truncate(limit);
    Ok(rows)
}

pub async fn get_anomaly(state: &AppState, owner_id: &str, id: &str) -> Result<Anomaly, AppError> {
    state
        .anomaly_repo
        .get(owner_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("anomaly {}", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(clamp_limit(None), 100);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(20)), 20);
        assert_eq!(clamp_limit(Some(10_000)), 500);
    }
}

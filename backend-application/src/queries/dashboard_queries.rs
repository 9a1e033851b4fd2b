use backend_domain::{Anomaly, AnomalyQuery, AnomalyStats, DashboardSummary, HealthScore};

use crate::{AppError, AppState};

async fn all_anomalies(state: &AppState, owner_id: &str) -> Result<Vec<Anomaly>, AppError> {
    Ok(state
        .anomaly_repo
        .list(owner_id, &AnomalyQuery::default())
        .await?)
}

pub async fn dashboard_summary(state: &AppState, owner_id: &str) -> Result<DashboardSummary, AppError> {
    let anomalies = all_anomalies(state, owner_id).await?;
    let stats = AnomalyStats::from_anomalies(&anomalies);
    let health = state.scorer.score(&anomalies);
    let recent_alerts = anomalies
        .into_iter()
        .take(state.config.recent_alerts_limit)
        .collect();
    Ok(DashboardSummary {
        stats,
        health_score: health.score,
        recent_alerts,
    })
}

pub async fn health_score(state: &AppState, owner_id: &str) -> Result<HealthScore, AppError> {
    let anomalies = all_anomalies(state, owner_id).await?;
    Ok(state.scorer.score(&anomalies))
}

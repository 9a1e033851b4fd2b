use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Serialize;

use backend_application::queries::dashboard_queries;
use backend_application::AppState;
use backend_domain::{DashboardSummary, HealthStatus};

use crate::error::HttpError;
use crate::middleware::authorize_owner;

#[derive(Serialize)]
pub struct SecurityHealth {
    score: u8,
    status: HealthStatus,
    label: &'static str,
}

pub async fn dashboard_summary(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardSummary>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let summary = dashboard_queries::dashboard_summary(&state, &owner_id).await?;
    Ok(Json(summary))
}

pub async fn security_health(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SecurityHealth>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let health = dashboard_queries::health_score(&state, &owner_id).await?;
    Ok(Json(SecurityHealth {
        score: health.score,
        status: health.status,
        label: health.status.label(),
    }))
}

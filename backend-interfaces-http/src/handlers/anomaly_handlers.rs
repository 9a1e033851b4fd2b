use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;

use backend_application::commands::{detect_commands, resolve_commands};
use backend_application::queries::anomaly_queries;
use backend_application::AppState;
use backend_domain::{Anomaly, AnomalyQuery, LeakScanQuery, ResolveRequest};

use crate::error::HttpError;
use crate::middleware::authorize_owner;

pub async fn list_anomalies(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AnomalyQuery>,
) -> Result<Json<Vec<Anomaly>>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let rows = anomaly_queries::list_anomalies(&state, &owner_id, query).await?;
    Ok(Json(rows))
}

pub async fn get_anomaly(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Anomaly>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let anomaly = anomaly_queries::get_anomaly(&state, &owner_id, &id).await?;
    Ok(Json(anomaly))
}

pub async fn resolve_anomaly(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(payload): Json<ResolveRequest>,
) -> Result<Json<Anomaly>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let anomaly = resolve_commands::resolve_anomaly(&state, &owner_id, &id, payload).await?;
    Ok(Json(anomaly))
}

/// On-demand SILENT_LEAK scan; returns only the anomalies this call created.
pub async fn scan_leaks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<LeakScanQuery>,
) -> Result<Json<Vec<Anomaly>>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let as_of = query.as_of.unwrap_or_else(Utc::now);
    let created = detect_commands::detect_leaks(&state, &owner_id, as_of).await;
    Ok(Json(created))
}

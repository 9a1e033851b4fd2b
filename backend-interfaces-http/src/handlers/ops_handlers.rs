use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::AppState;

use crate::middleware::authorize;

#[derive(Serialize)]
struct ReadyStatus {
    store: &'static str,
    classifier: &'static str,
    #[serde(rename = "auditBacklog")]
    audit_backlog: usize,
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

/// Ready once the store answers. A failing classifier only degrades AI
/// detection, so it is reported without failing readiness.
pub async fn health_ready(State(state): State<AppState>) -> impl IntoResponse {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);

    let store = match timeout(timeout_duration, state.health_service.check_store()).await {
        Ok(Ok(true)) => "ok",
        Ok(Ok(false)) => "error",
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            "error"
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            "timeout"
        }
    };
    let classifier = match timeout(timeout_duration, state.health_service.check_classifier()).await {
        Ok(Ok(true)) => "ok",
        Ok(Ok(false)) | Ok(Err(_)) => "degraded",
        Err(_) => "timeout",
    };

    let status = if store == "ok" {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadyStatus {
        store,
        classifier,
        audit_backlog: state.audit.pending_len().await,
    };
    (status, Json(body))
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}

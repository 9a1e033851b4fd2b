use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{anomaly_handlers, audit_handlers, dashboard_handlers, ledger_handlers, ops_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/dashboard/summary",
            get(dashboard_handlers::dashboard_summary),
        )
        .route(
            "/api/security/health",
            get(dashboard_handlers::security_health),
        )
        .route("/api/anomalies", get(anomaly_handlers::list_anomalies))
        .route(
            "/api/anomalies/leak-scan",
            post(anomaly_handlers::scan_leaks),
        )
        .route("/api/anomalies/:id", get(anomaly_handlers::get_anomaly))
        .route(
            "/api/anomalies/:id/resolve",
            post(anomaly_handlers::resolve_anomaly),
        )
        .route("/api/audit-logs", get(audit_handlers::list_audit_logs))
        .route(
            "/api/transactions",
            post(ledger_handlers::create_transaction),
        )
        .route(
            "/api/transactions/batch",
            post(ledger_handlers::create_transaction_batch),
        )
        .route("/api/budgets", post(ledger_handlers::upsert_budget))
        .route("/v2/ops/health/live", get(ops_handlers::health_live))
        .route("/v2/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/v2/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .with_state(state)
}

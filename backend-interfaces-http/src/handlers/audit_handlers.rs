use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;

use backend_application::queries::audit_queries;
use backend_application::AppState;
use backend_domain::{AuditLogEntry, AuditLogQuery};

use crate::error::HttpError;
use crate::middleware::authorize_owner;

pub async fn list_audit_logs(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditLogEntry>>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let entries = audit_queries::list_audit_logs(&state, &owner_id, query).await?;
    Ok(Json(entries))
}

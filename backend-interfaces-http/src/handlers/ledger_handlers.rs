use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Serialize;
use tracing::error;

use backend_application::commands::{budget_commands, transaction_commands};
use backend_application::AppState;
use backend_domain::{Budget, BudgetDraft, Transaction, TransactionDraft};

use crate::error::HttpError;
use crate::middleware::{authorize_owner, parse_batch};

#[derive(Serialize)]
pub struct BatchAccepted {
    accepted: usize,
}

pub async fn create_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<TransactionDraft>,
) -> Result<(StatusCode, Json<Transaction>), HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let transaction = transaction_commands::ingest_transaction(&state, &owner_id, payload).await?;
    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Accepts plain or gzip-encoded `{transactions: [...]}` bodies.
pub async fn create_transaction_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<Json<BatchAccepted>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let batch = parse_batch(&headers, &body, state.config.max_body_bytes).map_err(|err| {
        error!("failed to parse transaction batch: {}", err);
        HttpError::BadRequest(err.to_string())
    })?;
    let stored = transaction_commands::ingest_batch(&state, &owner_id, batch.transactions).await?;
    Ok(Json(BatchAccepted {
        accepted: stored.len(),
    }))
}

pub async fn upsert_budget(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BudgetDraft>,
) -> Result<Json<Budget>, HttpError> {
    let owner_id = authorize_owner(&state.config, &headers)?;
    let budget = budget_commands::upsert_budget(&state, &owner_id, payload).await?;
    Ok(Json(budget))
}

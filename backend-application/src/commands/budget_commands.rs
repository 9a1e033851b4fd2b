use chrono::Utc;
use tracing::info;

use backend_domain::{new_id, normalize_category, AuditAction, AuditLogEntry, Budget, BudgetDraft};

use crate::{AppError, AppState};

/// Creates the owner's budget for a category or replaces the existing one.
pub async fn upsert_budget(
    state: &AppState,
    owner_id: &str,
    draft: BudgetDraft,
) -> Result<Budget, AppError> {
    let category = normalize_category(&draft.category);
    if category.is_empty() {
        return Err(AppError::BadRequest("category is required".to_string()));
    }
    if !draft.limit.is_finite() || draft.limit <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "limit must be a positive number, got {}",
            draft.limit
        )));
    }
    if draft.period_end <= draft.period_start {
        return Err(AppError::BadRequest(
            "periodEnd must be after periodStart".to_string(),
        ));
    }

    let budget = Budget {
        id: new_id(),
        owner_id: owner_id.to_string(),
        category,
        limit: draft.limit,
        period_start: draft.period_start,
        period_end: draft.period_end,
    };
    let upsert = state.ledger_repo.upsert_budget(budget).await?;
    let action = if upsert.created {
        AuditAction::BudgetCreate
    } else {
        AuditAction::BudgetUpdate
    };
    info!(
        "{} budget {} for {} ({})",
        if upsert.created { "created" } else { "updated" },
        upsert.budget.id,
        owner_id,
        upsert.budget.category
    );

    let entry = AuditLogEntry::new(
        new_id(),
        owner_id,
        action,
        Utc::now(),
        [
            ("budgetId", upsert.budget.id.clone()),
            ("category", upsert.budget.category.clone()),
            ("limit", format!("{:.2}", upsert.budget.limit)),
        ],
    );
    state.audit.record(entry).await;
    Ok(upsert.budget)
}

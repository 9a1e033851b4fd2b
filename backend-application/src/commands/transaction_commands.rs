use chrono::Utc;
use tracing::{error, info};

use backend_domain::{new_id, AuditAction, AuditLogEntry, Transaction, TransactionDraft, TransactionKind};

use crate::commands::detect_commands;
use crate::{AppError, AppState};

const MAX_TITLE_CHARS: usize = 200;
const MAX_BATCH_SIZE: usize = 500;

/// Stores the transaction, audits it and hands it to detection without
/// waiting. A detection failure can never fail the write.
pub async fn ingest_transaction(
    state: &AppState,
    owner_id: &str,
    draft: TransactionDraft,
) -> Result<Transaction, AppError> {
    let draft = validate_draft(draft)?;
    let mut transaction = draft.into_transaction(new_id(), owner_id.to_string(), Utc::now());
    store_transaction(state, &mut transaction).await?;
    detect_commands::spawn_detection(state.clone(), transaction.clone());
    Ok(transaction)
}

pub async fn ingest_batch(
    state: &AppState,
    owner_id: &str,
    drafts: Vec<TransactionDraft>,
) -> Result<Vec<Transaction>, AppError> {
    if drafts.len() > MAX_BATCH_SIZE {
        return Err(AppError::BadRequest(format!(
            "batch holds {} transactions, limit is {}",
            drafts.len(),
            MAX_BATCH_SIZE
        )));
    }
    let drafts = drafts
        .into_iter()
        .map(validate_draft)
        .collect::<Result<Vec<_>, _>>()?;

    let now = Utc::now();
    let mut stored = Vec::with_capacity(drafts.len());
    for draft in drafts {
        let mut transaction = draft.into_transaction(new_id(), owner_id.to_string(), now);
        store_transaction(state, &mut transaction).await?;
        stored.push(transaction);
    }
    info!("ingested batch of {} transactions for {}", stored.len(), owner_id);

    // detection runs after the whole batch is written so duplicates inside
    // the batch see each other
    for transaction in &stored {
        detect_commands::spawn_detection(state.clone(), transaction.clone());
    }
    Ok(stored)
}

async fn store_transaction(state: &AppState, transaction: &mut Transaction) -> Result<(), AppError> {
    match state.ledger_repo.insert_transaction(transaction).await {
        Ok(sequence) => transaction.sequence = sequence,
        Err(err) => {
            state.metrics.record_transaction_error();
            error!("failed to store transaction {}: {}", transaction.id, err);
            return Err(AppError::Internal(err));
        }
    }
    state.metrics.record_transactions(1);

    let action = match transaction.kind {
        TransactionKind::Expense => AuditAction::ExpenseCreate,
        TransactionKind::Income => AuditAction::IncomeCreate,
    };
    let entry = AuditLogEntry::new(
        new_id(),
        &transaction.owner_id,
        action,
        Utc::now(),
        [
            ("transactionId", transaction.id.clone()),
            ("amount", format!("{:.2}", transaction.amount)),
            ("category", transaction.category.clone()),
        ],
    );
    state.audit.record(entry).await;
    Ok(())
}

fn validate_draft(draft: TransactionDraft) -> Result<TransactionDraft, AppError> {
    let draft = draft.normalized();
    if !draft.amount.is_finite() || draft.amount <= 0.0 {
        return Err(AppError::BadRequest(format!(
            "amount must be a positive number, got {}",
            draft.amount
        )));
    }
    if draft.category.is_empty() {
        return Err(AppError::BadRequest("category is required".to_string()));
    }
    if draft.title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::BadRequest(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(draft)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(amount: f64, category: &str) -> TransactionDraft {
        TransactionDraft {
            kind: TransactionKind::Expense,
            title: "  Burger ".to_string(),
            amount,
            category: category.to_string(),
            timestamp: None,
            description: Some("   ".to_string()),
        }
    }

    #[test]
    fn validation_normalizes_fields() {
        let valid = validate_draft(draft(100.0, " Food ")).expect("valid draft");
        assert_eq!(valid.category, "food");
        assert_eq!(valid.title, "Burger");
        assert!(valid.description.is_none());
    }

    #[test]
    fn validation_rejects_bad_amounts_and_categories() {
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let err = validate_draft(draft(amount, "food")).expect_err("reject amount");
            assert!(matches!(err, AppError::BadRequest(_)));
        }
        let err = validate_draft(draft(10.0, "   ")).expect_err("reject category");
        match err {
            AppError::BadRequest(message) => assert!(message.contains("category")),
            _ => panic!("unexpected error type"),
        }
    }
}

// Transaction entity
// Written by the ledger, read-only to detection

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub owner_id: String,
    #[serde(default)]
    pub kind: TransactionKind,
    #[serde(default)]
    pub title: String,
    pub amount: f64,
    pub category: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ledger insertion order, assigned on write. Breaks ties between equal
    /// timestamps.
    #[serde(default, skip_serializing)]
    pub sequence: u64,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.kind == TransactionKind::Expense
    }

    /// Strictly earlier in ledger order: by timestamp, then by insertion.
    pub fn recorded_before(&self, other: &Transaction) -> bool {
        (self.timestamp, self.sequence) < (other.timestamp, other.sequence)
    }
}

/// Incoming transaction before the ledger assigns an id and owner.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDraft {
    #[serde(default)]
    pub kind: TransactionKind,
    #[serde(default)]
    pub title: String,
    pub amount: f64,
    pub category: String,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: Option<String>,
}

impl TransactionDraft {
    pub fn normalized(self) -> Self {
        Self {
            kind: self.kind,
            title: self.title.trim().to_string(),
            amount: self.amount,
            category: normalize_category(&self.category),
            timestamp: self.timestamp,
            description: self
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
        }
    }

    pub fn into_transaction(self, id: String, owner_id: String, now: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            owner_id,
            kind: self.kind,
            title: self.title,
            amount: self.amount,
            category: self.category,
            timestamp: self.timestamp.unwrap_or(now),
            description: self.description,
            sequence: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransactionBatch {
    #[serde(default)]
    pub transactions: Vec<TransactionDraft>,
}

pub fn normalize_category(raw: &str) -> String {
    raw.trim().to_lowercase()
}

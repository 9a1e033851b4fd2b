// Audit log entry entity
// Append-only; nothing in the crate mutates an entry after creation

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::AuditAction;

const MAX_DETAIL_ENTRIES: usize = 16;
const MAX_DETAIL_VALUE_CHARS: usize = 256;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub owner_id: String,
    pub action: AuditAction,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl AuditLogEntry {
    pub fn new<I, K, V>(
        id: String,
        owner_id: &str,
        action: AuditAction,
        timestamp: DateTime<Utc>,
        details: I,
    ) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let details = details
            .into_iter()
            .take(MAX_DETAIL_ENTRIES)
            .map(|(key, value)| (key.into(), truncate_chars(value.into(), MAX_DETAIL_VALUE_CHARS)))
            .collect();
        Self {
            id,
            owner_id: owner_id.to_string(),
            action,
            timestamp,
            details,
        }
    }
}

fn truncate_chars(value: String, max: usize) -> String {
    if value.chars().count() <= max {
        return value;
    }
    value.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn details_are_bounded_for_display() {
        let long = "x".repeat(1000);
        let details = (0..40).map(|idx| (format!("k{:02}", idx), long.clone()));
        let entry = AuditLogEntry::new(
            "e-1".to_string(),
            "owner-1",
            AuditAction::AnomalyResolve,
            Utc::now(),
            details,
        );
        assert_eq!(entry.details.len(), MAX_DETAIL_ENTRIES);
        assert!(entry
            .details
            .values()
            .all(|value| value.chars().count() == MAX_DETAIL_VALUE_CHARS));
    }

    #[test]
    fn action_serializes_as_resource_verb() {
        let entry = AuditLogEntry::new(
            "e-2".to_string(),
            "owner-1",
            AuditAction::ExpenseCreate,
            Utc::now(),
            [("amount", "100")],
        );
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(value["action"], "EXPENSE_CREATE");
        assert_eq!(value["ownerId"], "owner-1");
        assert_eq!(value["details"]["amount"], "100");
    }
}

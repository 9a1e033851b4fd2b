// Evidence payloads
// Field names are rendered verbatim by the dashboard, one shape per anomaly type

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DuplicateEvidence {
    pub duplicate_of: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpendingSpikeEvidence {
    pub average: f64,
    pub current: f64,
    pub threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BudgetExceededEvidence {
    pub budget_limit: f64,
    pub current_spend: f64,
    pub exceeded_by: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CategoryOveruseEvidence {
    pub category_total: f64,
    pub total_monthly: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OddTimeEvidence {
    pub hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SilentLeakEvidence {
    pub period: String,
    pub count: u32,
    pub total_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AiIrregularityEvidence {
    pub ai_confidence: f64,
}

/// Closed set of evidence shapes. `Other` only exists so records written by a
/// newer detector still decode; no rule in this crate produces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    Duplicate(DuplicateEvidence),
    SpendingSpike(SpendingSpikeEvidence),
    BudgetExceeded(BudgetExceededEvidence),
    CategoryOveruse(CategoryOveruseEvidence),
    OddTime(OddTimeEvidence),
    SilentLeak(SilentLeakEvidence),
    AiIrregularity(AiIrregularityEvidence),
    Other(serde_json::Value),
}

// Anomaly type value object

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyType {
    DuplicateTransaction,
    SpendingSpike,
    BudgetExceeded,
    CategoryOveruse,
    OddTimePattern,
    SilentLeak,
    AiDetectedIrregularity,
}

impl AnomalyType {
    pub const ALL: [AnomalyType; 7] = [
        AnomalyType::DuplicateTransaction,
        AnomalyType::SpendingSpike,
        AnomalyType::BudgetExceeded,
        AnomalyType::CategoryOveruse,
        AnomalyType::OddTimePattern,
        AnomalyType::SilentLeak,
        AnomalyType::AiDetectedIrregularity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyType::DuplicateTransaction => "DUPLICATE_TRANSACTION",
            AnomalyType::SpendingSpike => "SPENDING_SPIKE",
            AnomalyType::BudgetExceeded => "BUDGET_EXCEEDED",
            AnomalyType::CategoryOveruse => "CATEGORY_OVERUSE",
            AnomalyType::OddTimePattern => "ODD_TIME_PATTERN",
            AnomalyType::SilentLeak => "SILENT_LEAK",
            AnomalyType::AiDetectedIrregularity => "AI_DETECTED_IRREGULARITY",
        }
    }
}

impl std::fmt::Display for AnomalyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnomalyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        AnomalyType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == upper)
            .ok_or_else(|| format!("unknown anomaly type '{}'", s.trim()))
    }
}

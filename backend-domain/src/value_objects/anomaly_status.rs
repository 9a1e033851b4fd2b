// Anomaly lifecycle status

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnomalyStatus {
    Pending,
    Confirmed,
    Dismissed,
}

impl AnomalyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyStatus::Pending => "PENDING",
            AnomalyStatus::Confirmed => "CONFIRMED",
            AnomalyStatus::Dismissed => "DISMISSED",
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, AnomalyStatus::Pending)
    }

    /// Note stored when a resolution arrives without one.
    pub fn default_resolution_note(&self) -> Option<&'static str> {
        match self {
            AnomalyStatus::Pending => None,
            AnomalyStatus::Confirmed => Some("Confirmed irregularity"),
            AnomalyStatus::Dismissed => Some("False positive"),
        }
    }
}

impl std::fmt::Display for AnomalyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnomalyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(AnomalyStatus::Pending),
            "CONFIRMED" => Ok(AnomalyStatus::Confirmed),
            "DISMISSED" => Ok(AnomalyStatus::Dismissed),
            other => Err(format!("unknown anomaly status '{}'", other)),
        }
    }
}

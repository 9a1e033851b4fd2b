// Health score and dashboard read models (derived, never stored)

use serde::{Deserialize, Serialize};

use crate::entities::Anomaly;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnomalyStats {
    pub total: u64,
    pub pending: u64,
    pub resolved: u64,
}

impl AnomalyStats {
    pub fn from_anomalies(anomalies: &[Anomaly]) -> Self {
        let pending = anomalies.iter().filter(|anomaly| anomaly.is_pending()).count() as u64;
        let total = anomalies.len() as u64;
        Self {
            total,
            pending,
            resolved: total - pending,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Secure,
    AttentionNeeded,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u8) -> Self {
        if score > 80 {
            HealthStatus::Secure
        } else if score >= 50 {
            HealthStatus::AttentionNeeded
        } else {
            HealthStatus::Critical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Secure => "secure",
            HealthStatus::AttentionNeeded => "attention needed",
            HealthStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthScore {
    pub score: u8,
    pub status: HealthStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub stats: AnomalyStats,
    pub health_score: u8,
    pub recent_alerts: Vec<Anomaly>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_follow_display_cut_points() {
        assert_eq!(HealthStatus::from_score(100), HealthStatus::Secure);
        assert_eq!(HealthStatus::from_score(81), HealthStatus::Secure);
        assert_eq!(HealthStatus::from_score(80), HealthStatus::AttentionNeeded);
        assert_eq!(HealthStatus::from_score(50), HealthStatus::AttentionNeeded);
        assert_eq!(HealthStatus::from_score(49), HealthStatus::Critical);
        assert_eq!(HealthStatus::from_score(0).label(), "critical");
    }
}

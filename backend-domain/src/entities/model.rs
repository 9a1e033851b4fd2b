use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::{AnomalyStatus, AnomalyType};

/// Tuning knobs for every rule. Defaults are product starting points, not
/// derived values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub disabled_rules: Vec<AnomalyType>,

    pub duplicate_window_hours: u64,
    pub duplicate_amount_tolerance: f64,

    pub rolling_window_days: u64,
    pub spike_min_samples: usize,
    pub spike_stddev_k: f64,
    pub spike_floor_multiplier: f64,
    pub spike_high_multiplier: f64,

    pub budget_high_overrun_ratio: f64,

    pub category_overuse_percentage: f64,
    pub category_overuse_high_percentage: f64,
    pub category_overuse_min_transactions: usize,

    pub odd_hours_start: u32,
    pub odd_hours_end: u32,
    pub odd_hours_utc_offset_minutes: i32,

    pub leak_window_days: u64,
    pub leak_small_amount_max: f64,
    pub leak_min_count: usize,
    pub leak_high_total: f64,

    pub ai_confidence_floor: f64,
    pub ai_medium_confidence: f64,
    pub ai_high_confidence: f64,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            disabled_rules: Vec::new(),
            duplicate_window_hours: 24,
            duplicate_amount_tolerance: 0.01,
            rolling_window_days: 90,
            spike_min_samples: 3,
            spike_stddev_k: 2.0,
            spike_floor_multiplier: 2.0,
            spike_high_multiplier: 3.0,
            budget_high_overrun_ratio: 0.0,
            category_overuse_percentage: 40.0,
            category_overuse_high_percentage: 60.0,
            category_overuse_min_transactions: 5,
            odd_hours_start: 2,
            odd_hours_end: 5,
            odd_hours_utc_offset_minutes: 0,
            leak_window_days: 30,
            leak_small_amount_max: 200.0,
            leak_min_count: 5,
            leak_high_total: 1000.0,
            ai_confidence_floor: 0.6,
            ai_medium_confidence: 0.75,
            ai_high_confidence: 0.9,
        }
    }
}

impl DetectionConfig {
    pub fn is_enabled(&self, kind: AnomalyType) -> bool {
        !self.disabled_rules.contains(&kind)
    }
}

/// Per-severity penalty applied for each PENDING anomaly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthWeights {
    pub penalty_high: u32,
    pub penalty_medium: u32,
    pub penalty_low: u32,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            penalty_high: 15,
            penalty_medium: 8,
            penalty_low: 3,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub recent_alerts_limit: usize,
    pub leak_scan_hour: u32,
    pub leak_scan_minute: u32,
    pub audit_retry_seconds: u64,
    pub detection: DetectionConfig,
    pub health: HealthWeights,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 15,
            recent_alerts_limit: 5,
            leak_scan_hour: 3,
            leak_scan_minute: 30,
            audit_retry_seconds: 30,
            detection: DetectionConfig::default(),
            health: HealthWeights::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnomalyQuery {
    pub status: Option<AnomalyStatus>,
    #[serde(rename = "type")]
    pub kind: Option<AnomalyType>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeakScanQuery {
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveRequest {
    pub action: AnomalyStatus,
    #[serde(default)]
    pub resolution_note: Option<String>,
}

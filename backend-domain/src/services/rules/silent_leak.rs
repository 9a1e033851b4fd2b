use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::entities::{AnomalyCandidate, DetectionConfig, Evidence, SilentLeakEvidence, Transaction};
use crate::utils::{days_before, round_money};
use crate::value_objects::{AnomalyType, Severity};

/// Windowed rule: many small expenses in one category over the trailing
/// window. Not tied to a single transaction, so it is not an `AnomalyRule`.
#[derive(Debug, Clone)]
pub struct SilentLeakRule {
    pub window_days: u64,
    pub small_amount_max: f64,
    pub min_count: usize,
    pub high_total: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeakFinding {
    pub category: String,
    pub candidate: AnomalyCandidate,
}

impl SilentLeakRule {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            window_days: config.leak_window_days,
            small_amount_max: config.leak_small_amount_max,
            min_count: config.leak_min_count,
            high_total: config.leak_high_total,
        }
    }

    pub fn window_start(&self, as_of: DateTime<Utc>) -> DateTime<Utc> {
        days_before(as_of, self.window_days)
    }

    /// One finding per category, in category order.
    pub fn evaluate_window(&self, as_of: DateTime<Utc>, transactions: &[Transaction]) -> Vec<LeakFinding> {
        let start = self.window_start(as_of);
        let mut by_category: BTreeMap<&str, (u32, f64)> = BTreeMap::new();
        for item in transactions {
            if !item.is_expense()
                || item.amount <= 0.0
                || item.amount > self.small_amount_max
                || item.timestamp < start
                || item.timestamp > as_of
            {
                continue;
            }
            let entry = by_category.entry(item.category.as_str()).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += item.amount;
        }

        let period = format!("{}..{}", start.format("%Y-%m-%d"), as_of.format("%Y-%m-%d"));
        by_category
            .into_iter()
            .filter(|(_, (count, _))| *count as usize >= self.min_count.max(1))
            .map(|(category, (count, total))| {
                let severity = if total >= self.high_total {
                    Severity::High
                } else {
                    Severity::Medium
                };
                LeakFinding {
                    category: category.to_string(),
                    candidate: AnomalyCandidate {
                        kind: AnomalyType::SilentLeak,
                        severity,
                        evidence: Evidence::SilentLeak(SilentLeakEvidence {
                            period: period.clone(),
                            count,
                            total_amount: round_money(total),
                        }),
                        explanation: format!(
                            "{} small '{}' charges totalling {:.2} in the last {} days",
                            count,
                            category,
                            round_money(total),
                            self.window_days
                        ),
                    },
                }
            })
            .collect()
    }
}

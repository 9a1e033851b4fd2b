use chrono::{Duration, Timelike};

use super::{AnomalyRule, HistorySnapshot, RuleError};
use crate::entities::{AnomalyCandidate, DetectionConfig, Evidence, OddTimeEvidence, Transaction};
use crate::value_objects::{AnomalyType, Severity};

/// Hours are `[start, end)` in local time; `start > end` wraps past midnight.
#[derive(Debug, Clone)]
pub struct OddTimePatternRule {
    pub start_hour: u32,
    pub end_hour: u32,
    pub utc_offset_minutes: i32,
}

impl OddTimePatternRule {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            start_hour: config.odd_hours_start,
            end_hour: config.odd_hours_end,
            utc_offset_minutes: config.odd_hours_utc_offset_minutes,
        }
    }

    pub fn is_unusual(&self, hour: u32) -> bool {
        if self.start_hour <= self.end_hour {
            hour >= self.start_hour && hour < self.end_hour
        } else {
            hour >= self.start_hour || hour < self.end_hour
        }
    }
}

impl AnomalyRule for OddTimePatternRule {
    fn kind(&self) -> AnomalyType {
        AnomalyType::OddTimePattern
    }

    fn evaluate(
        &self,
        transaction: &Transaction,
        _history: &HistorySnapshot,
    ) -> Result<Option<AnomalyCandidate>, RuleError> {
        if self.start_hour > 23 || self.end_hour > 24 {
            return Err(RuleError::Evaluation(format!(
                "unusual hours window {}..{} out of range",
                self.start_hour, self.end_hour
            )));
        }
        let local = transaction.timestamp + Duration::minutes(i64::from(self.utc_offset_minutes));
        let hour = local.hour();
        if !self.is_unusual(hour) {
            return Ok(None);
        }
        Ok(Some(AnomalyCandidate {
            kind: self.kind(),
            severity: Severity::Low,
            evidence: Evidence::OddTime(OddTimeEvidence { hour }),
            explanation: format!(
                "Transaction recorded at {:02}:{:02}, inside the unusual {:02}:00-{:02}:00 window",
                hour,
                local.minute(),
                self.start_hour,
                self.end_hour
            ),
        }))
    }
}

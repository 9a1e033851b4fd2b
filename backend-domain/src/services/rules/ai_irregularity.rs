use super::{AnomalyRule, HistorySnapshot, RuleError};
use crate::entities::{AiIrregularityEvidence, AnomalyCandidate, DetectionConfig, Evidence, Transaction};
use crate::value_objects::{AnomalyType, Severity};

#[derive(Debug, Clone)]
pub struct AiIrregularityRule {
    pub confidence_floor: f64,
    pub medium_confidence: f64,
    pub high_confidence: f64,
}

impl AiIrregularityRule {
    pub fn from_config(config: &DetectionConfig) -> Self {
        Self {
            confidence_floor: config.ai_confidence_floor,
            medium_confidence: config.ai_medium_confidence,
            high_confidence: config.ai_high_confidence,
        }
    }
}

impl AnomalyRule for AiIrregularityRule {
    fn kind(&self) -> AnomalyType {
        AnomalyType::AiDetectedIrregularity
    }

    fn evaluate(
        &self,
        transaction: &Transaction,
        history: &HistorySnapshot,
    ) -> Result<Option<AnomalyCandidate>, RuleError> {
        let Some(verdict) = history.classifier else {
            return Ok(None);
        };
        let confidence = verdict.confidence;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(RuleError::Evaluation(format!(
                "classifier confidence {} outside [0, 1]",
                confidence
            )));
        }
        if confidence < self.confidence_floor {
            return Ok(None);
        }
        let severity = if confidence >= self.high_confidence {
            Severity::High
        } else if confidence >= self.medium_confidence {
            Severity::Medium
        } else {
            Severity::Low
        };
        Ok(Some(AnomalyCandidate {
            kind: self.kind(),
            severity,
            evidence: Evidence::AiIrregularity(AiIrregularityEvidence {
                ai_confidence: confidence,
            }),
            explanation: format!(
                "Classifier flagged this '{}' transaction with {:.0}% confidence",
                transaction.category,
                confidence * 100.0
            ),
        }))
    }
}

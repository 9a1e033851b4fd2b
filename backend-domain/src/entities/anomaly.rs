// Anomaly entity
// A persisted finding with a one-way resolution lifecycle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::Evidence;
use crate::value_objects::{AnomalyStatus, AnomalyType, Severity};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Anomaly {
    pub id: String,
    pub owner_id: String,
    #[serde(rename = "type")]
    pub kind: AnomalyType,
    pub severity: Severity,
    pub evidence: Evidence,
    pub explanation: String,
    pub transaction_id: Option<String>,
    pub status: AnomalyStatus,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution_note: Option<String>,
}

/// What a rule hands back when it fires.
#[derive(Debug, Clone, PartialEq)]
pub struct AnomalyCandidate {
    pub kind: AnomalyType,
    pub severity: Severity,
    pub evidence: Evidence,
    pub explanation: String,
}

#[derive(Debug, Clone)]
pub struct Resolution {
    pub status: AnomalyStatus,
    pub note: String,
    pub resolved_at: DateTime<Utc>,
}

impl Resolution {
    /// Blank notes are replaced by the status default.
    pub fn new(
        status: AnomalyStatus,
        note: Option<String>,
        resolved_at: DateTime<Utc>,
    ) -> Result<Self, ResolveError> {
        let default_note = status
            .default_resolution_note()
            .ok_or(ResolveError::InvalidAction(status))?;
        let note = note
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .unwrap_or_else(|| default_note.to_string());
        Ok(Self {
            status,
            note,
            resolved_at,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("anomaly not found")]
    NotFound,
    #[error("anomaly already resolved")]
    AlreadyResolved,
    #[error("invalid resolution action '{0}'")]
    InvalidAction(AnomalyStatus),
}

impl Anomaly {
    pub fn from_candidate(
        id: String,
        owner_id: String,
        transaction_id: Option<String>,
        candidate: AnomalyCandidate,
        detected_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            kind: candidate.kind,
            severity: candidate.severity,
            evidence: candidate.evidence,
            explanation: candidate.explanation,
            transaction_id,
            status: AnomalyStatus::Pending,
            detected_at,
            resolved_at: None,
            resolution_note: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == AnomalyStatus::Pending
    }

    /// The single allowed transition. Callers must hold exclusive access to
    /// the record so the status check and the write happen as one step.
    pub fn apply_resolution(&mut self, resolution: &Resolution) -> Result<(), ResolveError> {
        if !resolution.status.is_resolved() {
            return Err(ResolveError::InvalidAction(resolution.status));
        }
        if !self.is_pending() {
            return Err(ResolveError::AlreadyResolved);
        }
        self.status = resolution.status;
        self.resolved_at = Some(resolution.resolved_at);
        self.resolution_note = Some(resolution.note.clone());
        Ok(())
    }
}

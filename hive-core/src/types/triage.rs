//! Triage decisions and the decision → report-status mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use super::common::{EvidenceLevel, SeverityLevel};
use super::report::ReportStatus;
use crate::error::{CoreError, CoreResult};

/// Staff adjudication outcome for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageOutcome {
    Accept,
    Reject,
    NeedsMoreInfo,
    Escalate,
}

impl TriageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::NeedsMoreInfo => "needs_more_info",
            Self::Escalate => "escalate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "accept" => Some(Self::Accept),
            "reject" => Some(Self::Reject),
            "needs_more_info" => Some(Self::NeedsMoreInfo),
            "escalate" => Some(Self::Escalate),
            _ => None,
        }
    }

    /// Reject and defer outcomes must carry a written justification.
    pub fn requires_rationale(&self) -> bool {
        matches!(self, Self::Reject | Self::NeedsMoreInfo)
    }

    /// Report status this outcome drives the report to, given the status
    /// observed under review. Re-triage of an already-decided report never
    /// moves the status backward: accepting an escalated report keeps it
    /// escalated, and a deferral leaves a decided status in place.
    pub fn target_status(&self, current: ReportStatus) -> ReportStatus {
        match self {
            Self::Accept => match current {
                ReportStatus::Escalated => ReportStatus::Escalated,
                _ => ReportStatus::Triaged,
            },
            Self::Reject => ReportStatus::Closed,
            Self::NeedsMoreInfo => match current {
                ReportStatus::Triaged | ReportStatus::Escalated => current,
                _ => ReportStatus::UnderReview,
            },
            Self::Escalate => ReportStatus::Escalated,
        }
    }
}

/// Validated input for recording a decision.
#[derive(Debug, Clone)]
pub struct TriageDraft {
    pub decision: TriageOutcome,
    pub severity_final: SeverityLevel,
    pub evidence_level: Option<EvidenceLevel>,
    pub rationale: Option<String>,
}

impl TriageDraft {
    pub fn validate(&self) -> CoreResult<()> {
        if self.decision.requires_rationale() {
            let has_rationale = self
                .rationale
                .as_deref()
                .map(|r| !r.trim().is_empty())
                .unwrap_or(false);
            if !has_rationale {
                return Err(CoreError::Validation(format!(
                    "rationale is required for decision {}",
                    self.decision.as_str()
                )));
            }
        }
        Ok(())
    }
}

/// One staff adjudication of a report. A report may accumulate several
/// decisions over time (re-review); the latest by `decided_at` is current.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriageDecision {
    pub id: Uuid,
    pub report_id: Uuid,
    pub decision: TriageOutcome,
    pub severity_final: SeverityLevel,
    pub evidence_level: Option<EvidenceLevel>,
    pub rationale: Option<String>,
    /// SHA-256 over the canonical decision content, for audit export.
    pub audit_digest: String,
    pub decided_at: DateTime<Utc>,
    pub decided_by: Option<Uuid>,
}

impl TriageDecision {
    pub fn new(
        report_id: Uuid,
        draft: TriageDraft,
        decided_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        draft.validate()?;
        let audit_digest = audit_digest(report_id, &draft, now);
        Ok(Self {
            id: Uuid::new_v4(),
            report_id,
            decision: draft.decision,
            severity_final: draft.severity_final,
            evidence_level: draft.evidence_level,
            rationale: draft.rationale,
            audit_digest,
            decided_at: now,
            decided_by,
        })
    }
}

/// Canonical digest over the decision content. Field order is fixed so the
/// digest is reproducible from the stored record.
fn audit_digest(report_id: Uuid, draft: &TriageDraft, decided_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(report_id.to_string());
    hasher.update(draft.decision.as_str());
    hasher.update(draft.severity_final.as_str());
    hasher.update(draft.evidence_level.map(|e| e.as_str()).unwrap_or(""));
    hasher.update(draft.rationale.as_deref().unwrap_or(""));
    hasher.update(decided_at.to_rfc3339());
    hex::encode(hasher.finalize())
}

//! Citizen incident reports and their status state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::common::SeverityLevel;
use crate::error::{CoreError, CoreResult};
use crate::validate::{require_max_len, require_non_empty};

/// Incident category chosen by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportCategory {
    SuspiciousItem,
    SuspiciousPerson,
    HarassmentStalking,
    ScamPhishing,
    MisinformationPanic,
    CrowdDisorder,
    InfrastructureHazard,
    Other,
}

impl ReportCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuspiciousItem => "suspicious_item",
            Self::SuspiciousPerson => "suspicious_person",
            Self::HarassmentStalking => "harassment_stalking",
            Self::ScamPhishing => "scam_phishing",
            Self::MisinformationPanic => "misinformation_panic",
            Self::CrowdDisorder => "crowd_disorder",
            Self::InfrastructureHazard => "infrastructure_hazard",
            Self::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "suspicious_item" => Some(Self::SuspiciousItem),
            "suspicious_person" => Some(Self::SuspiciousPerson),
            "harassment_stalking" => Some(Self::HarassmentStalking),
            "scam_phishing" => Some(Self::ScamPhishing),
            "misinformation_panic" => Some(Self::MisinformationPanic),
            "crowd_disorder" => Some(Self::CrowdDisorder),
            "infrastructure_hazard" => Some(Self::InfrastructureHazard),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    pub fn all() -> [Self; 8] {
        [
            Self::SuspiciousItem,
            Self::SuspiciousPerson,
            Self::HarassmentStalking,
            Self::ScamPhishing,
            Self::MisinformationPanic,
            Self::CrowdDisorder,
            Self::InfrastructureHazard,
            Self::Other,
        ]
    }
}

/// Report lifecycle status.
///
/// The graph is forward-only with one explicit exception:
/// `under_review → submitted` models a reopen, and must be requested
/// through the dedicated reopen operation, never implied by a read.
///
/// ```text
/// submitted → under_review → {triaged, escalated, closed, spam}
///                 ↺ submitted (explicit reopen)
/// triaged → {escalated, closed}     (re-triage, never backward)
/// escalated → closed
/// ```
///
/// `closed` and `spam` are terminal. `triaged` and `escalated` are stable
/// but may still receive new decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Submitted,
    UnderReview,
    Triaged,
    Escalated,
    Closed,
    Spam,
}

impl ReportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::UnderReview => "under_review",
            Self::Triaged => "triaged",
            Self::Escalated => "escalated",
            Self::Closed => "closed",
            Self::Spam => "spam",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(Self::Submitted),
            "under_review" => Some(Self::UnderReview),
            "triaged" => Some(Self::Triaged),
            "escalated" => Some(Self::Escalated),
            "closed" => Some(Self::Closed),
            "spam" => Some(Self::Spam),
            _ => None,
        }
    }

    /// Terminal states accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Spam)
    }

    /// A report counts as decided once triage has produced an outcome.
    pub fn is_decided(&self) -> bool {
        matches!(self, Self::Triaged | Self::Escalated | Self::Closed | Self::Spam)
    }

    /// Whether the status graph permits moving to `target`.
    pub fn can_transition_to(&self, target: ReportStatus) -> bool {
        match (self, target) {
            (Self::Submitted, Self::UnderReview) => true,

            // Explicit reopen only.
            (Self::UnderReview, Self::Submitted) => true,

            (Self::UnderReview, Self::Triaged) => true,
            (Self::UnderReview, Self::Escalated) => true,
            (Self::UnderReview, Self::Closed) => true,
            (Self::UnderReview, Self::Spam) => true,

            // Re-triage may move forward, never backward.
            (Self::Triaged, Self::Escalated) => true,
            (Self::Triaged, Self::Closed) => true,
            (Self::Escalated, Self::Closed) => true,

            _ => false,
        }
    }
}

/// Validated intake payload for a new report.
#[derive(Debug, Clone)]
pub struct ReportDraft {
    pub category: ReportCategory,
    pub severity_suggested: Option<SeverityLevel>,
    pub area_hint: String,
    pub time_window: Option<String>,
    pub description: String,
    pub evidence: Vec<String>,
    pub reporter_contact: Option<String>,
}

impl ReportDraft {
    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("areaHint", &self.area_hint)?;
        require_max_len("areaHint", &self.area_hint, 500)?;
        require_non_empty("description", &self.description)?;
        if let Some(tw) = &self.time_window {
            require_max_len("timeWindow", tw, 100)?;
        }
        for url in &self.evidence {
            require_non_empty("evidence entry", url)?;
        }
        Ok(())
    }
}

/// A citizen-submitted incident report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub category: ReportCategory,
    pub severity_suggested: Option<SeverityLevel>,
    pub area_hint: String,
    pub time_window: Option<String>,
    pub description: String,
    pub evidence: Vec<String>,
    pub reporter_contact: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Build a new report from a validated draft. Status starts at
    /// `submitted` with created_at == updated_at.
    pub fn intake(draft: ReportDraft, now: DateTime<Utc>) -> CoreResult<Self> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            category: draft.category,
            severity_suggested: draft.severity_suggested,
            area_hint: draft.area_hint,
            time_window: draft.time_window,
            description: draft.description,
            evidence: draft.evidence,
            reporter_contact: draft.reporter_contact,
            status: ReportStatus::Submitted,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a status transition, rejecting moves the graph forbids.
    pub fn transition(&mut self, target: ReportStatus, now: DateTime<Utc>) -> CoreResult<()> {
        if self.status == target {
            return Err(CoreError::Conflict(format!(
                "report {} is already {}",
                self.id,
                target.as_str()
            )));
        }
        if !self.status.can_transition_to(target) {
            return Err(CoreError::Conflict(format!(
                "report {} is {}, cannot move to {}",
                self.id,
                self.status.as_str(),
                target.as_str()
            )));
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }
}

//! CAP-ready public alerts and their publication state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::validate::require_non_empty;

/// Alert lifecycle status.
///
/// `draft → approved → published` is the only forward path; no transition
/// skips a state (two-person integrity control: the author drafts, an
/// authorized approver approves, publishing is a separate explicit action).
/// `withdrawn` is reachable only from `published`; withdrawing a draft is
/// modeled as delete, not a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStatus {
    Draft,
    Approved,
    Published,
    Withdrawn,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Approved => "approved",
            Self::Published => "published",
            Self::Withdrawn => "withdrawn",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "approved" => Some(Self::Approved),
            "published" => Some(Self::Published),
            "withdrawn" => Some(Self::Withdrawn),
            _ => None,
        }
    }

    pub fn can_transition_to(&self, target: AlertStatus) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Approved)
                | (Self::Approved, Self::Published)
                | (Self::Published, Self::Withdrawn)
        )
    }
}

/// CAP 1.2 urgency. Closed enumeration; consumers rely on these exact
/// values for filtering and coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    Immediate,
    Expected,
    Future,
    Past,
    Unknown,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "Immediate",
            Self::Expected => "Expected",
            Self::Future => "Future",
            Self::Past => "Past",
            Self::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Immediate" => Some(Self::Immediate),
            "Expected" => Some(Self::Expected),
            "Future" => Some(Self::Future),
            "Past" => Some(Self::Past),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// CAP 1.2 severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapSeverity {
    Extreme,
    Severe,
    Moderate,
    Minor,
    Unknown,
}

impl CapSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extreme => "Extreme",
            Self::Severe => "Severe",
            Self::Moderate => "Moderate",
            Self::Minor => "Minor",
            Self::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Extreme" => Some(Self::Extreme),
            "Severe" => Some(Self::Severe),
            "Moderate" => Some(Self::Moderate),
            "Minor" => Some(Self::Minor),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// CAP 1.2 certainty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Certainty {
    Observed,
    Likely,
    Possible,
    Unlikely,
    Unknown,
}

impl Certainty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Observed => "Observed",
            Self::Likely => "Likely",
            Self::Possible => "Possible",
            Self::Unlikely => "Unlikely",
            Self::Unknown => "Unknown",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Observed" => Some(Self::Observed),
            "Likely" => Some(Self::Likely),
            "Possible" => Some(Self::Possible),
            "Unlikely" => Some(Self::Unlikely),
            "Unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Validated input for creating an alert.
#[derive(Debug, Clone)]
pub struct AlertDraft {
    pub report_id: Option<Uuid>,
    pub event: String,
    pub urgency: Urgency,
    pub severity: CapSeverity,
    pub certainty: Certainty,
    pub area: String,
    pub instruction: String,
    pub public_message: Option<String>,
    pub channels: Vec<String>,
}

impl AlertDraft {
    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("event", &self.event)?;
        require_non_empty("area", &self.area)?;
        require_non_empty("instruction", &self.instruction)?;
        Ok(())
    }
}

/// A CAP-style public notice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub report_id: Option<Uuid>,
    pub status: AlertStatus,
    pub event: String,
    pub urgency: Urgency,
    pub severity: CapSeverity,
    pub certainty: Certainty,
    pub area: String,
    pub instruction: String,
    pub public_message: Option<String>,
    pub channels: Vec<String>,
    /// Rendered at publish time, reproducible from the alert's fields.
    pub cap_xml: Option<String>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    /// Set exactly once at publish; retained unchanged through withdrawal.
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    pub fn create(draft: AlertDraft, now: DateTime<Utc>) -> CoreResult<Self> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            report_id: draft.report_id,
            status: AlertStatus::Draft,
            event: draft.event,
            urgency: draft.urgency,
            severity: draft.severity,
            certainty: draft.certainty,
            area: draft.area,
            instruction: draft.instruction,
            public_message: draft.public_message,
            channels: draft.channels,
            cap_xml: None,
            approved_by: None,
            created_at: now,
            published_at: None,
            updated_at: now,
        })
    }

    fn guard_transition(&self, target: AlertStatus) -> CoreResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(CoreError::Conflict(format!(
                "alert {} is {}, cannot move to {}",
                self.id,
                self.status.as_str(),
                target.as_str()
            )));
        }
        Ok(())
    }

    /// draft → approved, recording the approver.
    pub fn approve(&mut self, approver: Uuid, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_transition(AlertStatus::Approved)?;
        self.status = AlertStatus::Approved;
        self.approved_by = Some(approver);
        self.updated_at = now;
        Ok(())
    }

    /// approved → published. Sets published_at exactly once and renders the
    /// CAP record from the alert's fields.
    pub fn publish(&mut self, cap_sender: &str, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_transition(AlertStatus::Published)?;
        self.status = AlertStatus::Published;
        self.published_at = Some(now);
        self.cap_xml = Some(crate::cap::render_cap_xml(self, cap_sender));
        self.updated_at = now;
        Ok(())
    }

    /// published → withdrawn. published_at is an immutable historical fact.
    pub fn withdraw(&mut self, now: DateTime<Utc>) -> CoreResult<()> {
        self.guard_transition(AlertStatus::Withdrawn)?;
        self.status = AlertStatus::Withdrawn;
        self.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> AlertDraft {
        AlertDraft {
            report_id: None,
            event: "Phishing wave targeting market vendors".into(),
            urgency: Urgency::Expected,
            severity: CapSeverity::Moderate,
            certainty: Certainty::Likely,
            area: "Central district".into(),
            instruction: "Do not scan unverified QR codes".into(),
            public_message: None,
            channels: vec!["web".into()],
        }
    }

    #[test]
    fn create_rejects_missing_required_fields() {
        let mut d = draft();
        d.instruction = "".into();
        assert!(matches!(
            Alert::create(d, Utc::now()),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn forward_path_is_strict() {
        use AlertStatus::*;
        assert!(Draft.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Published));
        assert!(Published.can_transition_to(Withdrawn));

        assert!(!Draft.can_transition_to(Published));
        assert!(!Draft.can_transition_to(Withdrawn));
        assert!(!Approved.can_transition_to(Draft));
        assert!(!Approved.can_transition_to(Withdrawn));
        assert!(!Published.can_transition_to(Draft));
        assert!(!Withdrawn.can_transition_to(Draft));
        assert!(!Withdrawn.can_transition_to(Published));
    }

    #[test]
    fn publish_sets_published_at_once() {
        let mut alert = Alert::create(draft(), Utc::now()).unwrap();
        let approver = Uuid::new_v4();
        alert.approve(approver, Utc::now()).unwrap();
        let publish_time = Utc::now();
        alert.publish("alerts@hive.test", publish_time).unwrap();

        assert_eq!(alert.published_at, Some(publish_time));
        assert!(alert.cap_xml.is_some());

        // Second publish conflicts; published_at untouched.
        let err = alert.publish("alerts@hive.test", Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
        assert_eq!(alert.published_at, Some(publish_time));
    }

    #[test]
    fn withdraw_retains_approval_and_publish_facts() {
        let mut alert = Alert::create(draft(), Utc::now()).unwrap();
        let approver = Uuid::new_v4();
        alert.approve(approver, Utc::now()).unwrap();
        alert.publish("alerts@hive.test", Utc::now()).unwrap();
        let published_at = alert.published_at;

        alert.withdraw(Utc::now()).unwrap();
        assert_eq!(alert.status, AlertStatus::Withdrawn);
        assert_eq!(alert.approved_by, Some(approver));
        assert_eq!(alert.published_at, published_at);
    }

    #[test]
    fn cannot_skip_approval() {
        let mut alert = Alert::create(draft(), Utc::now()).unwrap();
        assert!(matches!(
            alert.publish("alerts@hive.test", Utc::now()),
            Err(CoreError::Conflict(_))
        ));
        assert_eq!(alert.status, AlertStatus::Draft);
    }
}

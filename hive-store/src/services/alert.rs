//! Alert publisher: owns the alert lifecycle and CAP record generation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hive_core::types::{Alert, AlertDraft, AlertStatus, CapSeverity, Certainty, Urgency};
use hive_core::validate::require_non_empty;
use hive_core::{validate, CoreError, CoreResult};
use serde_json::json;
use uuid::Uuid;

use crate::audit::AuditTrail;
use crate::repos::{AlertFilter, AlertRepo, PageOf, PageRequest};
use crate::retry::{bounded, with_retry};

/// Partial update: optional field edits plus an optional status step.
/// Field edits are accepted only while the alert is a draft.
#[derive(Debug, Clone, Default)]
pub struct AlertPatch {
    pub event: Option<String>,
    pub urgency: Option<Urgency>,
    pub severity: Option<CapSeverity>,
    pub certainty: Option<Certainty>,
    pub area: Option<String>,
    pub instruction: Option<String>,
    pub public_message: Option<Option<String>>,
    pub channels: Option<Vec<String>>,
    pub status: Option<AlertStatus>,
}

impl AlertPatch {
    fn has_field_edits(&self) -> bool {
        self.event.is_some()
            || self.urgency.is_some()
            || self.severity.is_some()
            || self.certainty.is_some()
            || self.area.is_some()
            || self.instruction.is_some()
            || self.public_message.is_some()
            || self.channels.is_some()
    }
}

pub struct AlertService {
    repo: Arc<dyn AlertRepo>,
    audit: Arc<AuditTrail>,
    cap_sender: String,
    op_timeout: Duration,
}

impl AlertService {
    pub fn new(
        repo: Arc<dyn AlertRepo>,
        audit: Arc<AuditTrail>,
        cap_sender: String,
        op_timeout: Duration,
    ) -> Self {
        Self { repo, audit, cap_sender, op_timeout }
    }

    pub async fn create(&self, draft: AlertDraft, actor: Option<Uuid>) -> CoreResult<Alert> {
        let alert = Alert::create(draft, Utc::now())?;
        bounded("alert.create", self.op_timeout, async {
            with_retry("alert.create", || self.repo.insert(alert.clone())).await
        })
        .await?;
        tracing::info!(alert_id = %alert.id, event = alert.event, "alert drafted");
        self.audit.record(
            actor,
            "alert.create",
            "alert",
            alert.id,
            json!({ "event": alert.event }),
        );
        Ok(alert)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Alert> {
        let versioned = bounded("alert.get", self.op_timeout, self.repo.get_required(id)).await?;
        Ok(versioned.value)
    }

    pub async fn list(
        &self,
        filter: AlertFilter,
        page: u32,
        page_size: u32,
    ) -> CoreResult<PageOf<Alert>> {
        validate::validate_page(page, page_size)?;
        bounded(
            "alert.list",
            self.op_timeout,
            self.repo.list(filter, PageRequest { page, page_size }),
        )
        .await
    }

    /// Apply a patch: field edits (draft only), then at most one status
    /// step. The whole patch lands atomically through one CAS write.
    pub async fn update(
        &self,
        id: Uuid,
        patch: AlertPatch,
        actor: Option<Uuid>,
    ) -> CoreResult<Alert> {
        if !patch.has_field_edits() && patch.status.is_none() {
            return Err(CoreError::validation("patch must change at least one field"));
        }

        let alert = bounded("alert.update", self.op_timeout, async {
            let read = self.repo.get_required(id).await?;
            let mut alert = read.value;
            let now = Utc::now();

            if patch.has_field_edits() {
                if alert.status != AlertStatus::Draft {
                    return Err(CoreError::Conflict(format!(
                        "alert {id} is {}, field edits are allowed only while draft",
                        alert.status.as_str()
                    )));
                }
                if let Some(event) = &patch.event {
                    require_non_empty("event", event)?;
                    alert.event = event.clone();
                }
                if let Some(urgency) = patch.urgency {
                    alert.urgency = urgency;
                }
                if let Some(severity) = patch.severity {
                    alert.severity = severity;
                }
                if let Some(certainty) = patch.certainty {
                    alert.certainty = certainty;
                }
                if let Some(area) = &patch.area {
                    require_non_empty("area", area)?;
                    alert.area = area.clone();
                }
                if let Some(instruction) = &patch.instruction {
                    require_non_empty("instruction", instruction)?;
                    alert.instruction = instruction.clone();
                }
                if let Some(public_message) = &patch.public_message {
                    alert.public_message = public_message.clone();
                }
                if let Some(channels) = &patch.channels {
                    alert.channels = channels.clone();
                }
                alert.updated_at = now;
            }

            match patch.status {
                Some(AlertStatus::Approved) => {
                    let approver = actor.ok_or_else(|| {
                        CoreError::Unauthorized("approver identity required".into())
                    })?;
                    alert.approve(approver, now)?;
                }
                Some(AlertStatus::Published) => alert.publish(&self.cap_sender, now)?,
                Some(AlertStatus::Withdrawn) => alert.withdraw(now)?,
                Some(AlertStatus::Draft) => {
                    return Err(CoreError::conflict("an alert cannot return to draft"));
                }
                None => {}
            }

            let written = with_retry("alert.update", || {
                self.repo.put_cas(read.version, alert.clone())
            })
            .await?;
            Ok(written.value)
        })
        .await?;

        tracing::info!(alert_id = %id, status = alert.status.as_str(), "alert updated");
        self.audit.record(
            actor,
            "alert.update",
            "alert",
            id,
            json!({ "status": alert.status.as_str() }),
        );
        Ok(alert)
    }

    /// Delete a draft. Withdrawing a draft is modeled as deletion; any
    /// other status conflicts.
    pub async fn delete_draft(&self, id: Uuid, actor: Option<Uuid>) -> CoreResult<()> {
        bounded("alert.delete", self.op_timeout, async {
            let read = self.repo.get_required(id).await?;
            if read.value.status != AlertStatus::Draft {
                return Err(CoreError::Conflict(format!(
                    "alert {id} is {}, only drafts can be deleted",
                    read.value.status.as_str()
                )));
            }
            with_retry("alert.delete", || self.repo.delete_cas(id, read.version)).await
        })
        .await?;
        self.audit
            .record(actor, "alert.delete", "alert", id, json!({}));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryAlertRepo;
    use crate::retry::DEFAULT_OP_TIMEOUT;

    fn service() -> AlertService {
        AlertService::new(
            Arc::new(MemoryAlertRepo::new()),
            Arc::new(AuditTrail::new()),
            "alerts@hive.test".into(),
            DEFAULT_OP_TIMEOUT,
        )
    }

    fn draft() -> AlertDraft {
        AlertDraft {
            report_id: None,
            event: "Pickpocket group at festival entrance".into(),
            urgency: Urgency::Immediate,
            severity: CapSeverity::Moderate,
            certainty: Certainty::Observed,
            area: "Festival grounds, north entrance".into(),
            instruction: "Keep valuables in front pockets".into(),
            public_message: None,
            channels: vec!["web".into(), "sms".into()],
        }
    }

    fn status_patch(status: AlertStatus) -> AlertPatch {
        AlertPatch { status: Some(status), ..Default::default() }
    }

    #[tokio::test]
    async fn full_lifecycle_retains_publish_facts() {
        let svc = service();
        let approver = Uuid::new_v4();
        let alert = svc.create(draft(), None).await.unwrap();

        let approved = svc
            .update(alert.id, status_patch(AlertStatus::Approved), Some(approver))
            .await
            .unwrap();
        assert_eq!(approved.approved_by, Some(approver));

        let published = svc
            .update(alert.id, status_patch(AlertStatus::Published), Some(approver))
            .await
            .unwrap();
        let published_at = published.published_at.unwrap();
        assert!(published.cap_xml.is_some());

        let withdrawn = svc
            .update(alert.id, status_patch(AlertStatus::Withdrawn), Some(approver))
            .await
            .unwrap();
        assert_eq!(withdrawn.status, AlertStatus::Withdrawn);
        assert_eq!(withdrawn.published_at, Some(published_at));
        assert_eq!(withdrawn.approved_by, Some(approver));
    }

    #[tokio::test]
    async fn publish_twice_conflicts() {
        let svc = service();
        let actor = Uuid::new_v4();
        let alert = svc.create(draft(), None).await.unwrap();
        svc.update(alert.id, status_patch(AlertStatus::Approved), Some(actor))
            .await
            .unwrap();
        svc.update(alert.id, status_patch(AlertStatus::Published), Some(actor))
            .await
            .unwrap();

        let err = svc
            .update(alert.id, status_patch(AlertStatus::Published), Some(actor))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn field_edits_rejected_after_approval() {
        let svc = service();
        let actor = Uuid::new_v4();
        let alert = svc.create(draft(), None).await.unwrap();
        svc.update(alert.id, status_patch(AlertStatus::Approved), Some(actor))
            .await
            .unwrap();

        let err = svc
            .update(
                alert.id,
                AlertPatch { event: Some("Edited".into()), ..Default::default() },
                Some(actor),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn draft_edits_apply() {
        let svc = service();
        let alert = svc.create(draft(), None).await.unwrap();
        let updated = svc
            .update(
                alert.id,
                AlertPatch {
                    instruction: Some("Report sightings to stewards".into()),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.instruction, "Report sightings to stewards");
        assert_eq!(updated.status, AlertStatus::Draft);
    }

    #[tokio::test]
    async fn delete_is_draft_only() {
        let svc = service();
        let actor = Uuid::new_v4();
        let alert = svc.create(draft(), None).await.unwrap();
        svc.update(alert.id, status_patch(AlertStatus::Approved), Some(actor))
            .await
            .unwrap();
        assert!(matches!(
            svc.delete_draft(alert.id, Some(actor)).await,
            Err(CoreError::Conflict(_))
        ));

        let second = svc.create(draft(), None).await.unwrap();
        svc.delete_draft(second.id, None).await.unwrap();
        assert!(matches!(
            svc.get(second.id).await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn empty_patch_is_validation_error() {
        let svc = service();
        let alert = svc.create(draft(), None).await.unwrap();
        assert!(matches!(
            svc.update(alert.id, AlertPatch::default(), None).await,
            Err(CoreError::Validation(_))
        ));
    }
}

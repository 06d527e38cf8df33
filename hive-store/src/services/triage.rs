//! Triage engine: the only writer of report status after intake.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hive_core::types::{Report, ReportStatus, TriageDecision, TriageDraft};
use hive_core::{validate, CoreError, CoreResult};
use serde_json::json;
use uuid::Uuid;

use crate::audit::AuditTrail;
use crate::repos::{PageOf, PageRequest, ReportRepo, TriageRepo, Versioned};
use crate::retry::{bounded, with_retry};

pub struct TriageService {
    reports: Arc<dyn ReportRepo>,
    decisions: Arc<dyn TriageRepo>,
    audit: Arc<AuditTrail>,
    op_timeout: Duration,
}

impl TriageService {
    pub fn new(
        reports: Arc<dyn ReportRepo>,
        decisions: Arc<dyn TriageRepo>,
        audit: Arc<AuditTrail>,
        op_timeout: Duration,
    ) -> Self {
        Self { reports, decisions, audit, op_timeout }
    }

    /// Explicit start-review action: submitted → under_review.
    pub async fn start_review(&self, report_id: Uuid, actor: Option<Uuid>) -> CoreResult<Report> {
        let report = bounded("triage.start_review", self.op_timeout, async {
            let read = self.reports.get_required(report_id).await?;
            Ok(self
                .transition_cas(read, ReportStatus::UnderReview)
                .await?
                .value)
        })
        .await?;
        self.audit.record(
            actor,
            "report.review",
            "report",
            report_id,
            json!({ "to": "under_review" }),
        );
        Ok(report)
    }

    /// Explicit reopen: under_review → submitted. Terminal reports conflict.
    pub async fn reopen(&self, report_id: Uuid, actor: Option<Uuid>) -> CoreResult<Report> {
        let report = bounded("triage.reopen", self.op_timeout, async {
            let read = self.reports.get_required(report_id).await?;
            Ok(self
                .transition_cas(read, ReportStatus::Submitted)
                .await?
                .value)
        })
        .await?;
        self.audit.record(
            actor,
            "report.reopen",
            "report",
            report_id,
            json!({ "to": "submitted" }),
        );
        Ok(report)
    }

    /// Record a decision against a report and drive its status.
    ///
    /// A still-submitted report is first claimed with a CAS transition to
    /// under_review; when two triagers race, exactly one claim succeeds and
    /// the loser gets Conflict. The draft is validated before anything
    /// moves, so a rejected draft leaves the report exactly as it was.
    pub async fn record_decision(
        &self,
        report_id: Uuid,
        draft: TriageDraft,
        decided_by: Option<Uuid>,
    ) -> CoreResult<(TriageDecision, Report)> {
        draft.validate()?;

        let (decision, report) = bounded("triage.record_decision", self.op_timeout, async {
            let mut read = self.reports.get_required(report_id).await?;

            // A still-submitted report is claimed first; the CAS result is
            // carried forward so no other writer can slip in between.
            if read.value.status == ReportStatus::Submitted {
                read = self.transition_cas(read, ReportStatus::UnderReview).await?;
            }

            if read.value.status.is_terminal() {
                return Err(CoreError::Conflict(format!(
                    "report {report_id} is {}, reopen is not possible and no further decisions are accepted",
                    read.value.status.as_str()
                )));
            }

            let decision = TriageDecision::new(report_id, draft, decided_by, Utc::now())?;
            let target = decision.decision.target_status(read.value.status);

            let report = if target != read.value.status {
                self.transition_cas(read, target).await?.value
            } else {
                read.value
            };

            with_retry("triage.record_decision", || {
                self.decisions.insert(decision.clone())
            })
            .await?;
            Ok((decision, report))
        })
        .await?;

        tracing::info!(
            report_id = %report_id,
            decision = decision.decision.as_str(),
            status = report.status.as_str(),
            "triage decision recorded"
        );
        self.audit.record(
            decided_by,
            "triage.decision",
            "report",
            report_id,
            json!({
                "decision": decision.decision.as_str(),
                "severityFinal": decision.severity_final.as_str(),
                "status": report.status.as_str(),
            }),
        );
        Ok((decision, report))
    }

    pub async fn list_decisions(
        &self,
        report_id: Option<Uuid>,
        page: u32,
        page_size: u32,
    ) -> CoreResult<PageOf<TriageDecision>> {
        validate::validate_page(page, page_size)?;
        bounded(
            "triage.list",
            self.op_timeout,
            self.decisions.list(report_id, PageRequest { page, page_size }),
        )
        .await
    }

    async fn transition_cas(
        &self,
        read: Versioned<Report>,
        target: ReportStatus,
    ) -> CoreResult<Versioned<Report>> {
        let mut report = read.value;
        report.transition(target, Utc::now())?;
        with_retry("report.transition", || {
            self.reports.put_cas(read.version, report.clone())
        })
        .await
    }
}

//! Report intake and read surface. Status mutation after intake belongs
//! exclusively to the triage service.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hive_core::types::{Report, ReportDraft};
use hive_core::{validate, CoreResult};
use serde_json::json;
use uuid::Uuid;

use crate::audit::AuditTrail;
use crate::repos::{PageOf, PageRequest, ReportFilter, ReportRepo};
use crate::retry::{bounded, with_retry};

pub struct ReportService {
    repo: Arc<dyn ReportRepo>,
    audit: Arc<AuditTrail>,
    op_timeout: Duration,
}

impl ReportService {
    pub fn new(repo: Arc<dyn ReportRepo>, audit: Arc<AuditTrail>, op_timeout: Duration) -> Self {
        Self { repo, audit, op_timeout }
    }

    pub async fn intake(&self, draft: ReportDraft) -> CoreResult<Report> {
        let report = Report::intake(draft, Utc::now())?;
        bounded("report.intake", self.op_timeout, async {
            with_retry("report.intake", || self.repo.insert(report.clone())).await
        })
        .await?;
        tracing::info!(report_id = %report.id, category = report.category.as_str(), "report intake");
        self.audit.record(
            None,
            "report.intake",
            "report",
            report.id,
            json!({ "category": report.category.as_str() }),
        );
        Ok(report)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Report> {
        let versioned = bounded("report.get", self.op_timeout, self.repo.get_required(id)).await?;
        Ok(versioned.value)
    }

    pub async fn list(
        &self,
        filter: ReportFilter,
        page: u32,
        page_size: u32,
    ) -> CoreResult<PageOf<Report>> {
        validate::validate_page(page, page_size)?;
        bounded(
            "report.list",
            self.op_timeout,
            self.repo.list(filter, PageRequest { page, page_size }),
        )
        .await
    }
}

//! KPI aggregation and dashboard stats. Read-only: derived views over
//! current store contents, recomputed per query, window all-time.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use hive_core::constants::DASHBOARD_WEEK_DAYS;
use hive_core::kpi::{self, KpiCurrents, KpiReport, KpiTargets};
use hive_core::types::{Alert, AlertStatus, Report, ReportCategory, ReportStatus, Role};
use hive_core::CoreResult;
use uuid::Uuid;

use crate::repos::{AlertRepo, ReportRepo, TrainingRepo, TriageRepo, UserRepo};
use crate::retry::bounded;

/// Adoption counts tracked outside the pipeline, carried in
/// configuration. Certified triagers are not here: they are counted
/// from the seeded user table.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExternalCounts {
    pub partner_orgs: u32,
    pub external_adoption: u32,
}

#[derive(Debug, Clone)]
pub struct CategoryCount {
    pub category: ReportCategory,
    pub count: u64,
}

#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub total_reports: u64,
    /// Reports created in the last 7 days, spam excluded.
    pub recent_reports: u64,
    pub published_alerts: u64,
    /// Five most recently published alerts. The dashboard is public, so
    /// drafts and approved-but-unpublished alerts never appear here.
    pub recent_alerts: Vec<Alert>,
    pub category_breakdown: Vec<CategoryCount>,
}

pub struct MetricsService {
    reports: Arc<dyn ReportRepo>,
    decisions: Arc<dyn TriageRepo>,
    alerts: Arc<dyn AlertRepo>,
    training: Arc<dyn TrainingRepo>,
    users: Arc<dyn UserRepo>,
    targets: KpiTargets,
    external: ExternalCounts,
    op_timeout: Duration,
}

impl MetricsService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        reports: Arc<dyn ReportRepo>,
        decisions: Arc<dyn TriageRepo>,
        alerts: Arc<dyn AlertRepo>,
        training: Arc<dyn TrainingRepo>,
        users: Arc<dyn UserRepo>,
        targets: KpiTargets,
        external: ExternalCounts,
        op_timeout: Duration,
    ) -> Self {
        Self { reports, decisions, alerts, training, users, targets, external, op_timeout }
    }

    pub async fn kpi(&self) -> CoreResult<KpiReport> {
        let currents = bounded("metrics.kpi", self.op_timeout, self.gather()).await?;
        Ok(kpi::compute(&currents, &self.targets))
    }

    async fn gather(&self) -> CoreResult<KpiCurrents> {
        let reports = self.reports.all().await?;
        let decisions = self.decisions.all().await?;
        let alerts = self.alerts.all().await?;
        let events = self.training.all_events().await?;

        let improvements: Vec<f64> = events.iter().filter_map(|e| e.improvement()).collect();

        let decided: Vec<&Report> = reports.iter().filter(|r| r.status.is_decided()).collect();
        let verified = decided
            .iter()
            .filter(|r| matches!(r.status, ReportStatus::Triaged | ReportStatus::Escalated))
            .count();
        let abusive = decided
            .iter()
            .filter(|r| matches!(r.status, ReportStatus::Closed | ReportStatus::Spam))
            .count();
        let ratio = |part: usize| {
            if decided.is_empty() {
                None
            } else {
                Some(part as f64 / decided.len() as f64 * 100.0)
            }
        };

        let triage_latencies: Vec<f64> = reports
            .iter()
            .filter_map(|r| {
                first_decision_at(&decisions, r.id).map(|at| minutes_between(r.created_at, at))
            })
            .collect();

        let publish_latencies: Vec<f64> = alerts
            .iter()
            .filter_map(|a| {
                a.published_at
                    .map(|published| minutes_between(a.created_at, published))
            })
            .collect();

        let certified_triagers = self.users.count_by_role(Role::Triager).await? as f64;

        Ok(KpiCurrents {
            workshops: events.len() as f64,
            participants: events.iter().map(|e| e.attendance_count as f64).sum(),
            quiz_improvement: mean(&improvements),
            triage_median_minutes: kpi::median(&triage_latencies),
            verified_ratio: ratio(verified),
            abuse_rate: ratio(abusive),
            publish_latency_minutes: kpi::median(&publish_latencies),
            certified_triagers,
            partner_orgs: self.external.partner_orgs as f64,
            external_adoption: self.external.external_adoption as f64,
        })
    }

    pub async fn dashboard(&self) -> CoreResult<DashboardStats> {
        bounded("metrics.dashboard", self.op_timeout, async {
            let reports = self.reports.all().await?;
            let alerts = self.alerts.all().await?;

            let week_ago = Utc::now() - ChronoDuration::days(DASHBOARD_WEEK_DAYS);
            let recent_reports = reports
                .iter()
                .filter(|r| r.created_at >= week_ago && r.status != ReportStatus::Spam)
                .count() as u64;

            let mut published: Vec<Alert> = alerts
                .into_iter()
                .filter(|a| a.status == AlertStatus::Published)
                .collect();
            let published_alerts = published.len() as u64;
            published.sort_by(|a, b| b.published_at.cmp(&a.published_at));
            published.truncate(5);

            let category_breakdown = ReportCategory::all()
                .into_iter()
                .map(|category| CategoryCount {
                    category,
                    count: reports.iter().filter(|r| r.category == category).count() as u64,
                })
                .collect();

            Ok(DashboardStats {
                total_reports: reports.len() as u64,
                recent_reports,
                published_alerts,
                recent_alerts: published,
                category_breakdown,
            })
        })
        .await
    }
}

fn first_decision_at(
    decisions: &[hive_core::types::TriageDecision],
    report_id: Uuid,
) -> Option<DateTime<Utc>> {
    decisions
        .iter()
        .filter(|d| d.report_id == report_id)
        .map(|d| d.decided_at)
        .min()
}

fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_seconds() as f64 / 60.0
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditTrail;
    use crate::memory::{
        MemoryAlertRepo, MemoryReportRepo, MemoryTrainingRepo, MemoryTriageRepo, MemoryUserRepo,
    };
    use crate::retry::DEFAULT_OP_TIMEOUT;
    use crate::services::{AlertPatch, AlertService, ReportService, TriageService};
    use hive_core::types::{
        AlertDraft, AlertStatus, CapSeverity, Certainty, ReportDraft, SeverityLevel, TriageDraft,
        TriageOutcome, Urgency, User,
    };

    struct Fixture {
        reports: ReportService,
        triage: TriageService,
        alerts: AlertService,
        users: Arc<MemoryUserRepo>,
        metrics: MetricsService,
    }

    fn fixture() -> Fixture {
        let report_repo = Arc::new(MemoryReportRepo::new());
        let triage_repo = Arc::new(MemoryTriageRepo::new());
        let alert_repo = Arc::new(MemoryAlertRepo::new());
        let training_repo = Arc::new(MemoryTrainingRepo::new());
        let user_repo = Arc::new(MemoryUserRepo::new());
        let audit = Arc::new(AuditTrail::new());

        Fixture {
            reports: ReportService::new(report_repo.clone(), audit.clone(), DEFAULT_OP_TIMEOUT),
            triage: TriageService::new(
                report_repo.clone(),
                triage_repo.clone(),
                audit.clone(),
                DEFAULT_OP_TIMEOUT,
            ),
            alerts: AlertService::new(
                alert_repo.clone(),
                audit,
                "alerts@hive.test".into(),
                DEFAULT_OP_TIMEOUT,
            ),
            users: user_repo.clone(),
            metrics: MetricsService::new(
                report_repo,
                triage_repo,
                alert_repo,
                training_repo,
                user_repo,
                KpiTargets::default(),
                ExternalCounts { partner_orgs: 2, external_adoption: 0 },
                DEFAULT_OP_TIMEOUT,
            ),
        }
    }

    fn account(role: Role, is_active: bool) -> User {
        let id = Uuid::new_v4();
        User {
            id,
            email: format!("{id}@hive.test"),
            password_hash: "$2b$04$placeholderplaceholderpl".into(),
            role,
            display_name: "Staff".into(),
            is_active,
            created_at: Utc::now(),
        }
    }

    fn report_draft(category: ReportCategory) -> ReportDraft {
        ReportDraft {
            category,
            severity_suggested: None,
            area_hint: "plaza".into(),
            time_window: None,
            description: "incident".into(),
            evidence: vec![],
            reporter_contact: None,
        }
    }

    fn triage_draft(outcome: TriageOutcome, rationale: Option<&str>) -> TriageDraft {
        TriageDraft {
            decision: outcome,
            severity_final: SeverityLevel::S1,
            evidence_level: None,
            rationale: rationale.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn verified_and_abuse_ratios_over_decided_reports() {
        let f = fixture();

        // Two verified, one rejected, one still submitted.
        for outcome in [TriageOutcome::Accept, TriageOutcome::Escalate] {
            let r = f
                .reports
                .intake(report_draft(ReportCategory::ScamPhishing))
                .await
                .unwrap();
            f.triage
                .record_decision(r.id, triage_draft(outcome, None), None)
                .await
                .unwrap();
        }
        let rejected = f
            .reports
            .intake(report_draft(ReportCategory::Other))
            .await
            .unwrap();
        f.triage
            .record_decision(
                rejected.id,
                triage_draft(TriageOutcome::Reject, Some("no evidence")),
                None,
            )
            .await
            .unwrap();
        f.reports
            .intake(report_draft(ReportCategory::CrowdDisorder))
            .await
            .unwrap();

        let kpi = f.metrics.kpi().await.unwrap();
        let verified = kpi.pipeline.verified_ratio;
        let abuse = kpi.pipeline.abuse_rate;
        assert!((verified.current - 200.0 / 3.0).abs() < 1e-9);
        assert!((abuse.current - 100.0 / 3.0).abs() < 1e-9);
        assert!(verified.met());
        assert!(!abuse.met());
    }

    #[tokio::test]
    async fn certified_triagers_counted_from_user_table() {
        let f = fixture();
        f.users.insert(account(Role::Triager, true)).await.unwrap();
        f.users.insert(account(Role::Triager, true)).await.unwrap();
        // Deactivated triagers and other roles do not count.
        f.users.insert(account(Role::Triager, false)).await.unwrap();
        f.users.insert(account(Role::Admin, true)).await.unwrap();

        let kpi = f.metrics.kpi().await.unwrap();
        assert_eq!(kpi.adoption.certified_triagers.current, 2.0);
        assert!(!kpi.adoption.certified_triagers.met());
    }

    #[tokio::test]
    async fn partner_counts_come_from_config() {
        let f = fixture();
        let kpi = f.metrics.kpi().await.unwrap();
        assert_eq!(kpi.adoption.partner_orgs.current, 2.0);
        assert!(!kpi.adoption.partner_orgs.met());
        assert_eq!(kpi.adoption.external_adoption.current, 0.0);
    }

    #[tokio::test]
    async fn empty_store_yields_zeroed_pipeline() {
        let f = fixture();
        let kpi = f.metrics.kpi().await.unwrap();
        assert_eq!(kpi.pipeline.verified_ratio.current, 0.0);
        assert_eq!(kpi.pipeline.triage_median_minutes.current, 0.0);
        assert_eq!(kpi.education.workshops.current, 0.0);
    }

    #[tokio::test]
    async fn dashboard_counts_and_recent_alerts() {
        let f = fixture();
        for _ in 0..3 {
            f.reports
                .intake(report_draft(ReportCategory::SuspiciousItem))
                .await
                .unwrap();
        }

        let actor = Uuid::new_v4();
        let alert = f
            .alerts
            .create(
                AlertDraft {
                    report_id: None,
                    event: "Unattended items at terminal".into(),
                    urgency: Urgency::Expected,
                    severity: CapSeverity::Minor,
                    certainty: Certainty::Possible,
                    area: "Terminal".into(),
                    instruction: "Report unattended items".into(),
                    public_message: None,
                    channels: vec![],
                },
                None,
            )
            .await
            .unwrap();
        f.alerts
            .update(
                alert.id,
                AlertPatch { status: Some(AlertStatus::Approved), ..Default::default() },
                Some(actor),
            )
            .await
            .unwrap();
        f.alerts
            .update(
                alert.id,
                AlertPatch { status: Some(AlertStatus::Published), ..Default::default() },
                Some(actor),
            )
            .await
            .unwrap();
        // A second alert left in draft stays off the public dashboard.
        f.alerts
            .create(
                AlertDraft {
                    report_id: None,
                    event: "Draft under review".into(),
                    urgency: Urgency::Future,
                    severity: CapSeverity::Minor,
                    certainty: Certainty::Unlikely,
                    area: "Terminal".into(),
                    instruction: "Pending".into(),
                    public_message: None,
                    channels: vec![],
                },
                None,
            )
            .await
            .unwrap();

        let stats = f.metrics.dashboard().await.unwrap();
        assert_eq!(stats.total_reports, 3);
        assert_eq!(stats.recent_reports, 3);
        assert_eq!(stats.published_alerts, 1);
        assert_eq!(stats.recent_alerts.len(), 1);
        assert_eq!(stats.recent_alerts[0].id, alert.id);
        let suspicious = stats
            .category_breakdown
            .iter()
            .find(|c| c.category == ReportCategory::SuspiciousItem)
            .unwrap();
        assert_eq!(suspicious.count, 3);
    }
}

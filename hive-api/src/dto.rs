//! Wire DTOs. The wire contract is camelCase; enum-valued fields travel
//! as strings and are parsed at the handler seam so an unknown value is
//! a VALIDATION_ERROR, never a silent coercion.

use chrono::{DateTime, NaiveDate, Utc};
use hive_core::constants::DEFAULT_PAGE_SIZE;
use hive_core::kpi::{KpiReport, Metric};
use hive_core::types::{
    Alert, QuizResult, Report, TrainingEvent, TrainingStats, TriageDecision, User,
};
use hive_store::{CategoryCount, DashboardStats, PageOf};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---- pagination ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn from_page<S>(page: PageOf<S>, map: impl Fn(S) -> T) -> Self {
        let meta = PaginationMeta {
            page: page.page,
            page_size: page.page_size,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            data: page.items.into_iter().map(map).collect(),
            pagination: meta,
        }
    }
}

// ---- reports ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportRequest {
    pub category: String,
    pub severity_suggested: Option<String>,
    pub area_hint: String,
    pub time_window: Option<String>,
    pub description: String,
    #[serde(default)]
    pub evidence: Vec<String>,
    pub reporter_contact: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListReportsQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResponse {
    pub id: Uuid,
    pub category: String,
    pub severity_suggested: Option<String>,
    pub area_hint: String,
    pub time_window: Option<String>,
    pub description: String,
    pub evidence: Vec<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Report> for ReportResponse {
    fn from(report: Report) -> Self {
        Self {
            id: report.id,
            category: report.category.as_str().to_string(),
            severity_suggested: report.severity_suggested.map(|s| s.as_str().to_string()),
            area_hint: report.area_hint,
            time_window: report.time_window,
            description: report.description,
            evidence: report.evidence,
            status: report.status.as_str().to_string(),
            created_at: report.created_at,
            updated_at: report.updated_at,
        }
    }
}

// ---- triage ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageRequest {
    pub decision: String,
    pub severity_final: String,
    pub evidence_level: Option<String>,
    pub rationale: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListDecisionsQuery {
    pub report_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageDecisionResponse {
    pub id: Uuid,
    pub report_id: Uuid,
    pub decision: String,
    pub severity_final: String,
    pub evidence_level: Option<String>,
    pub rationale: Option<String>,
    pub audit_digest: String,
    pub decided_at: DateTime<Utc>,
    pub decided_by: Option<Uuid>,
}

impl From<TriageDecision> for TriageDecisionResponse {
    fn from(d: TriageDecision) -> Self {
        Self {
            id: d.id,
            report_id: d.report_id,
            decision: d.decision.as_str().to_string(),
            severity_final: d.severity_final.as_str().to_string(),
            evidence_level: d.evidence_level.map(|e| e.as_str().to_string()),
            rationale: d.rationale,
            audit_digest: d.audit_digest,
            decided_at: d.decided_at,
            decided_by: d.decided_by,
        }
    }
}

/// Result of a triage action: the report's new state, plus the recorded
/// decision when the action produced one.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriageOutcomeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<TriageDecisionResponse>,
    pub report: ReportResponse,
}

// ---- alerts ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertRequest {
    pub report_id: Option<Uuid>,
    pub event: String,
    pub urgency: String,
    pub severity: String,
    pub certainty: String,
    pub area: String,
    pub instruction: String,
    pub public_message: Option<String>,
    #[serde(default)]
    pub channels: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatchAlertRequest {
    pub event: Option<String>,
    pub urgency: Option<String>,
    pub severity: Option<String>,
    pub certainty: Option<String>,
    pub area: Option<String>,
    pub instruction: Option<String>,
    /// Double option: absent = untouched, null = cleared.
    #[serde(default, with = "double_option")]
    pub public_message: Option<Option<String>>,
    pub channels: Option<Vec<String>>,
    pub status: Option<String>,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(de: D) -> Result<Option<Option<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(de).map(Some)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAlertsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub id: Uuid,
    pub report_id: Option<Uuid>,
    pub status: String,
    pub event: String,
    pub urgency: String,
    pub severity: String,
    pub certainty: String,
    pub area: String,
    pub instruction: String,
    pub public_message: Option<String>,
    pub channels: Vec<String>,
    pub cap_xml: Option<String>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<Alert> for AlertResponse {
    fn from(alert: Alert) -> Self {
        Self {
            id: alert.id,
            report_id: alert.report_id,
            status: alert.status.as_str().to_string(),
            event: alert.event,
            urgency: alert.urgency.as_str().to_string(),
            severity: alert.severity.as_str().to_string(),
            certainty: alert.certainty.as_str().to_string(),
            area: alert.area,
            instruction: alert.instruction,
            public_message: alert.public_message,
            channels: alert.channels,
            cap_xml: alert.cap_xml,
            approved_by: alert.approved_by,
            created_at: alert.created_at,
            published_at: alert.published_at,
            updated_at: alert.updated_at,
        }
    }
}

// ---- training ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTrainingEventRequest {
    pub title: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub audience: Option<String>,
    #[serde(default)]
    pub attendance_count: u32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultRequest {
    pub participant_ref: String,
    pub quiz_type: String,
    pub score: f64,
    pub max_score: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingEventResponse {
    pub id: Uuid,
    pub title: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub audience: Option<String>,
    pub attendance_count: u32,
    pub pre_avg: Option<f64>,
    pub post_avg: Option<f64>,
    pub improvement: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TrainingEvent> for TrainingEventResponse {
    fn from(event: TrainingEvent) -> Self {
        let improvement = event.improvement();
        Self {
            id: event.id,
            title: event.title,
            event_date: event.event_date,
            location: event.location,
            audience: event.audience,
            attendance_count: event.attendance_count,
            pre_avg: event.pre_avg,
            post_avg: event.post_avg,
            improvement,
            notes: event.notes,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultResponse {
    pub id: Uuid,
    pub event_id: Uuid,
    pub participant_ref: String,
    pub quiz_type: String,
    pub score: f64,
    pub max_score: f64,
    pub created_at: DateTime<Utc>,
}

impl From<QuizResult> for QuizResultResponse {
    fn from(r: QuizResult) -> Self {
        Self {
            id: r.id,
            event_id: r.event_id,
            participant_ref: r.participant_ref,
            quiz_type: r.quiz_type.as_str().to_string(),
            score: r.score,
            max_score: r.max_score,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingStatsResponse {
    pub total_events: u64,
    pub total_participants: u64,
    pub avg_pre_score: Option<f64>,
    pub avg_post_score: Option<f64>,
    pub avg_improvement: Option<f64>,
}

impl From<TrainingStats> for TrainingStatsResponse {
    fn from(s: TrainingStats) -> Self {
        Self {
            total_events: s.total_events,
            total_participants: s.total_participants,
            avg_pre_score: s.avg_pre_score,
            avg_post_score: s.avg_post_score,
            avg_improvement: s.avg_improvement,
        }
    }
}

// ---- metrics ----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricResponse {
    pub current: f64,
    pub target: f64,
    pub inverse: bool,
    pub met: bool,
    pub progress: f64,
}

impl From<Metric> for MetricResponse {
    fn from(m: Metric) -> Self {
        Self {
            current: m.current,
            target: m.target,
            inverse: m.inverse,
            met: m.met(),
            progress: m.progress(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiResponse {
    pub education: EducationKpisResponse,
    pub pipeline: PipelineKpisResponse,
    pub adoption: AdoptionKpisResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationKpisResponse {
    pub workshops: MetricResponse,
    pub participants: MetricResponse,
    pub quiz_improvement: MetricResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineKpisResponse {
    pub triage_median_minutes: MetricResponse,
    pub verified_ratio: MetricResponse,
    pub abuse_rate: MetricResponse,
    pub publish_latency_minutes: MetricResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionKpisResponse {
    pub certified_triagers: MetricResponse,
    pub partner_orgs: MetricResponse,
    pub external_adoption: MetricResponse,
}

impl From<KpiReport> for KpiResponse {
    fn from(r: KpiReport) -> Self {
        Self {
            education: EducationKpisResponse {
                workshops: r.education.workshops.into(),
                participants: r.education.participants.into(),
                quiz_improvement: r.education.quiz_improvement.into(),
            },
            pipeline: PipelineKpisResponse {
                triage_median_minutes: r.pipeline.triage_median_minutes.into(),
                verified_ratio: r.pipeline.verified_ratio.into(),
                abuse_rate: r.pipeline.abuse_rate.into(),
                publish_latency_minutes: r.pipeline.publish_latency_minutes.into(),
            },
            adoption: AdoptionKpisResponse {
                certified_triagers: r.adoption.certified_triagers.into(),
                partner_orgs: r.adoption.partner_orgs.into(),
                external_adoption: r.adoption.external_adoption.into(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCountResponse {
    pub category: String,
    pub count: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_reports: u64,
    pub recent_reports: u64,
    pub published_alerts: u64,
    pub recent_alerts: Vec<AlertResponse>,
    pub category_breakdown: Vec<CategoryCountResponse>,
}

impl From<DashboardStats> for DashboardResponse {
    fn from(s: DashboardStats) -> Self {
        Self {
            total_reports: s.total_reports,
            recent_reports: s.recent_reports,
            published_alerts: s.published_alerts,
            recent_alerts: s.recent_alerts.into_iter().map(Into::into).collect(),
            category_breakdown: s
                .category_breakdown
                .into_iter()
                .map(|CategoryCount { category, count }| CategoryCountResponse {
                    category: category.as_str().to_string(),
                    count,
                })
                .collect(),
        }
    }
}

// ---- auth ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub role: String,
    pub display_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role.as_str().to_string(),
            display_name: user.display_name,
        }
    }
}

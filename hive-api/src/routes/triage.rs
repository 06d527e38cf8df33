//! Triage endpoints. All require the admin or triager role.

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use hive_core::types::{EvidenceLevel, Role, TriageDraft, TriageOutcome};
use uuid::Uuid;

use crate::dto::{
    ListDecisionsQuery, PageQuery, Paginated, TriageDecisionResponse, TriageOutcomeResponse,
    TriageRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{authorize, AuthClaims};
use crate::routes::report::parse_severity;
use crate::state::AppState;

const TRIAGE_ROLES: &[Role] = &[Role::Admin, Role::Triager];

/// Explicit start-review action: submitted → under_review.
pub async fn start_review(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TriageOutcomeResponse>> {
    let actor = authorize(&claims, TRIAGE_ROLES)?;
    let report = state.triage.start_review(id, Some(actor)).await?;
    Ok(Json(TriageOutcomeResponse {
        decision: None,
        report: report.into(),
    }))
}

/// Explicit reopen: under_review → submitted.
pub async fn reopen(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TriageOutcomeResponse>> {
    let actor = authorize(&claims, TRIAGE_ROLES)?;
    let report = state.triage.reopen(id, Some(actor)).await?;
    Ok(Json(TriageOutcomeResponse {
        decision: None,
        report: report.into(),
    }))
}

/// Record a decision and drive the report's status.
pub async fn record_decision(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<TriageRequest>,
) -> ApiResult<Json<TriageOutcomeResponse>> {
    let actor = authorize(&claims, TRIAGE_ROLES)?;
    let draft = TriageDraft {
        decision: parse_outcome(&req.decision)?,
        severity_final: parse_severity(&req.severity_final)?,
        evidence_level: req
            .evidence_level
            .as_deref()
            .map(parse_evidence_level)
            .transpose()?,
        rationale: req.rationale,
    };

    let (decision, report) = state.triage.record_decision(id, draft, Some(actor)).await?;
    Ok(Json(TriageOutcomeResponse {
        decision: Some(decision.into()),
        report: report.into(),
    }))
}

pub async fn list_decisions(
    State(state): State<AppState>,
    Query(filter): Query<ListDecisionsQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<TriageDecisionResponse>>> {
    let result = state
        .triage
        .list_decisions(filter.report_id, page.page(), page.page_size())
        .await?;
    Ok(Json(Paginated::from_page(
        result,
        TriageDecisionResponse::from,
    )))
}

// Helper functions

fn parse_outcome(s: &str) -> ApiResult<TriageOutcome> {
    TriageOutcome::parse(s)
        .ok_or_else(|| ApiError::Validation(format!("Invalid triage decision: {s}")))
}

fn parse_evidence_level(s: &str) -> ApiResult<EvidenceLevel> {
    EvidenceLevel::parse(s)
        .ok_or_else(|| ApiError::Validation(format!("Invalid evidence level: {s}")))
}

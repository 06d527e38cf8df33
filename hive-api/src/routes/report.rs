//! Report intake and read endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use hive_core::types::{ReportCategory, ReportDraft, ReportStatus, SeverityLevel};
use hive_store::ReportFilter;
use uuid::Uuid;

use crate::dto::{CreateReportRequest, ListReportsQuery, PageQuery, Paginated, ReportResponse};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Citizen intake. Public.
pub async fn intake(
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> ApiResult<(StatusCode, Json<ReportResponse>)> {
    let draft = ReportDraft {
        category: parse_category(&req.category)?,
        severity_suggested: req
            .severity_suggested
            .as_deref()
            .map(parse_severity)
            .transpose()?,
        area_hint: req.area_hint,
        time_window: req.time_window,
        description: req.description,
        evidence: req.evidence,
        reporter_contact: req.reporter_contact,
    };

    let report = state.reports.intake(draft).await?;
    Ok((StatusCode::CREATED, Json(report.into())))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReportResponse>> {
    let report = state.reports.get(id).await?;
    Ok(Json(report.into()))
}

pub async fn list_reports(
    State(state): State<AppState>,
    Query(filter): Query<ListReportsQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<ReportResponse>>> {
    let filter = ReportFilter {
        status: filter.status.as_deref().map(parse_status).transpose()?,
        category: filter.category.as_deref().map(parse_category).transpose()?,
    };
    let result = state
        .reports
        .list(filter, page.page(), page.page_size())
        .await?;
    Ok(Json(Paginated::from_page(result, ReportResponse::from)))
}

// Helper functions

pub(crate) fn parse_category(s: &str) -> ApiResult<ReportCategory> {
    ReportCategory::parse(s)
        .ok_or_else(|| ApiError::Validation(format!("Invalid report category: {s}")))
}

pub(crate) fn parse_status(s: &str) -> ApiResult<ReportStatus> {
    ReportStatus::parse(s)
        .ok_or_else(|| ApiError::Validation(format!("Invalid report status: {s}")))
}

pub(crate) fn parse_severity(s: &str) -> ApiResult<SeverityLevel> {
    SeverityLevel::parse(s)
        .ok_or_else(|| ApiError::Validation(format!("Invalid severity level: {s}")))
}

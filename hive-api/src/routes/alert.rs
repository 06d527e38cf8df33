//! Alert endpoints. All require a bearer token (drafts under review must
//! not leak); creation needs admin or triager, patch and delete need
//! admin. The public see published notices through the dashboard.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use hive_core::types::{AlertDraft, AlertStatus, CapSeverity, Certainty, Role, Urgency};
use hive_store::{AlertFilter, AlertPatch};
use uuid::Uuid;

use crate::dto::{
    AlertResponse, CreateAlertRequest, ListAlertsQuery, PageQuery, Paginated, PatchAlertRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{authorize, AuthClaims};
use crate::state::AppState;

pub async fn create_alert(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(req): Json<CreateAlertRequest>,
) -> ApiResult<(StatusCode, Json<AlertResponse>)> {
    let actor = authorize(&claims, &[Role::Admin, Role::Triager])?;
    let draft = AlertDraft {
        report_id: req.report_id,
        event: req.event,
        urgency: parse_urgency(&req.urgency)?,
        severity: parse_cap_severity(&req.severity)?,
        certainty: parse_certainty(&req.certainty)?,
        area: req.area,
        instruction: req.instruction,
        public_message: req.public_message,
        channels: req.channels,
    };

    let alert = state.alerts.create(draft, Some(actor)).await?;
    Ok((StatusCode::CREATED, Json(alert.into())))
}

pub async fn get_alert(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AlertResponse>> {
    let alert = state.alerts.get(id).await?;
    Ok(Json(alert.into()))
}

pub async fn list_alerts(
    State(state): State<AppState>,
    Query(filter): Query<ListAlertsQuery>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<AlertResponse>>> {
    let filter = AlertFilter {
        status: filter.status.as_deref().map(parse_status).transpose()?,
    };
    let result = state
        .alerts
        .list(filter, page.page(), page.page_size())
        .await?;
    Ok(Json(Paginated::from_page(result, AlertResponse::from)))
}

/// Field edits (draft only) and/or one status step.
pub async fn patch_alert(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<PatchAlertRequest>,
) -> ApiResult<Json<AlertResponse>> {
    let actor = authorize(&claims, &[Role::Admin])?;
    let patch = AlertPatch {
        event: req.event,
        urgency: req.urgency.as_deref().map(parse_urgency).transpose()?,
        severity: req
            .severity
            .as_deref()
            .map(parse_cap_severity)
            .transpose()?,
        certainty: req.certainty.as_deref().map(parse_certainty).transpose()?,
        area: req.area,
        instruction: req.instruction,
        public_message: req.public_message,
        channels: req.channels,
        status: req.status.as_deref().map(parse_status).transpose()?,
    };

    let alert = state.alerts.update(id, patch, Some(actor)).await?;
    Ok(Json(alert.into()))
}

/// Delete a draft (withdrawing a draft is modeled as deletion).
pub async fn delete_alert(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let actor = authorize(&claims, &[Role::Admin])?;
    state.alerts.delete_draft(id, Some(actor)).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Helper functions

fn parse_status(s: &str) -> ApiResult<AlertStatus> {
    AlertStatus::parse(s)
        .ok_or_else(|| ApiError::Validation(format!("Invalid alert status: {s}")))
}

fn parse_urgency(s: &str) -> ApiResult<Urgency> {
    Urgency::parse(s).ok_or_else(|| ApiError::Validation(format!("Invalid urgency: {s}")))
}

fn parse_cap_severity(s: &str) -> ApiResult<CapSeverity> {
    CapSeverity::parse(s).ok_or_else(|| ApiError::Validation(format!("Invalid severity: {s}")))
}

fn parse_certainty(s: &str) -> ApiResult<Certainty> {
    Certainty::parse(s).ok_or_else(|| ApiError::Validation(format!("Invalid certainty: {s}")))
}

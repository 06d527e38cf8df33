//! KPI and dashboard endpoints.

use axum::{extract::State, Extension, Json};
use hive_core::types::Role;

use crate::dto::{DashboardResponse, KpiResponse};
use crate::error::ApiResult;
use crate::middleware::auth::{authorize, AuthClaims};
use crate::state::AppState;

/// Full KPI report. Admin or auditor only.
pub async fn kpi(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> ApiResult<Json<KpiResponse>> {
    authorize(&claims, &[Role::Admin, Role::Auditor])?;
    let report = state.metrics.kpi().await?;
    Ok(Json(report.into()))
}

/// Public dashboard stats.
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<Json<DashboardResponse>> {
    let stats = state.metrics.dashboard().await?;
    Ok(Json(stats.into()))
}

//! Liveness endpoint.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

/// Liveness plus a cheap store readiness probe.
pub async fn healthz(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let reports = state
        .reports
        .list(Default::default(), 1, 1)
        .await
        .map(|page| page.total)?;

    Ok(Json(json!({
        "status": "ok",
        "reports": reports,
    })))
}

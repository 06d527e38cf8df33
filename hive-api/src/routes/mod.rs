//! Route definitions.

pub mod alert;
pub mod auth;
pub mod health;
pub mod metrics;
pub mod report;
pub mod training;
pub mod triage;

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::middleware::auth::require_auth;
use crate::state::AppState;

/// Create the API router. Citizen-facing surfaces (intake, stats,
/// dashboard) are public; staff surfaces, alerts included, require a
/// bearer token, with role checks at the handlers. Published notices
/// reach the public through the dashboard, never the alert reads
/// (drafts under review must not be enumerable).
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/v1/auth/login", post(auth::login))
        .route("/v1/reports", post(report::intake))
        .route("/v1/training-events/stats", get(training::stats))
        .route("/v1/metrics/dashboard", get(metrics::dashboard));

    let protected = Router::new()
        .route("/v1/auth/me", get(auth::me))
        .route("/v1/reports", get(report::list_reports))
        .route("/v1/reports/:id", get(report::get_report))
        .route("/v1/reports/:id/review", post(triage::start_review))
        .route("/v1/reports/:id/reopen", post(triage::reopen))
        .route("/v1/reports/:id/triage", post(triage::record_decision))
        .route("/v1/triage-decisions", get(triage::list_decisions))
        .route(
            "/v1/alerts",
            get(alert::list_alerts).post(alert::create_alert),
        )
        .route(
            "/v1/alerts/:id",
            get(alert::get_alert)
                .patch(alert::patch_alert)
                .delete(alert::delete_alert),
        )
        .route(
            "/v1/training-events",
            get(training::list_events).post(training::create_event),
        )
        .route("/v1/training-events/:id", get(training::get_event))
        .route(
            "/v1/training-events/:id/results",
            post(training::add_result),
        )
        .route("/v1/metrics/kpi", get(metrics::kpi))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).with_state(state)
}

//! Shared application state.

use std::sync::Arc;

use hive_core::CoreResult;
use hive_store::memory::{
    MemoryAlertRepo, MemoryReportRepo, MemoryTrainingRepo, MemoryTriageRepo, MemoryUserRepo,
};
use hive_store::{
    AlertService, AuditTrail, AuthService, MetricsService, ReportService, TrainingService,
    TriageService,
};

use crate::config::ApiConfig;
use crate::middleware::auth::JwtConfig;

/// Application state shared across all routes.
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<ReportService>,
    pub triage: Arc<TriageService>,
    pub alerts: Arc<AlertService>,
    pub training: Arc<TrainingService>,
    pub metrics: Arc<MetricsService>,
    pub auth: Arc<AuthService>,
    pub audit: Arc<AuditTrail>,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    /// Wire the in-memory stores and services and seed configured users.
    pub async fn new(config: &ApiConfig) -> CoreResult<Self> {
        let report_repo = Arc::new(MemoryReportRepo::new());
        let triage_repo = Arc::new(MemoryTriageRepo::new());
        let alert_repo = Arc::new(MemoryAlertRepo::new());
        let training_repo = Arc::new(MemoryTrainingRepo::new());
        let user_repo = Arc::new(MemoryUserRepo::new());
        let audit = Arc::new(AuditTrail::new());

        let auth = Arc::new(AuthService::new(user_repo.clone(), config.op_timeout));
        auth.seed(config.seed_users.clone()).await?;

        Ok(Self {
            reports: Arc::new(ReportService::new(
                report_repo.clone(),
                audit.clone(),
                config.op_timeout,
            )),
            triage: Arc::new(TriageService::new(
                report_repo.clone(),
                triage_repo.clone(),
                audit.clone(),
                config.op_timeout,
            )),
            alerts: Arc::new(AlertService::new(
                alert_repo.clone(),
                audit.clone(),
                config.cap_sender.clone(),
                config.op_timeout,
            )),
            training: Arc::new(TrainingService::new(
                training_repo.clone(),
                audit.clone(),
                config.op_timeout,
            )),
            metrics: Arc::new(MetricsService::new(
                report_repo,
                triage_repo,
                alert_repo,
                training_repo,
                user_repo,
                config.kpi_targets.clone(),
                config.external_counts,
                config.op_timeout,
            )),
            auth,
            audit,
            jwt: Arc::new(JwtConfig::new(
                config.jwt_secret.clone(),
                config.jwt_expiry_hours,
            )),
        })
    }
}

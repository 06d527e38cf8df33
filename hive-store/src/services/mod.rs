//! Service layer: drives the domain state machines over the repositories,
//! with bounded timeouts, bounded retry on transient failures, and audit
//! recording on every mutation.

mod alert;
mod auth;
mod metrics;
mod report;
mod training;
mod triage;

pub use alert::{AlertPatch, AlertService};
pub use auth::{AuthService, SeedUser};
pub use metrics::{CategoryCount, DashboardStats, ExternalCounts, MetricsService};
pub use report::ReportService;
pub use training::TrainingService;
pub use triage::TriageService;

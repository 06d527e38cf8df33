//! Storage and service layer for the hive safety pipeline.
//!
//! Repositories are async traits over version-stamped records; the
//! bundled implementation is in-process and lock-guarded, with optimistic
//! compare-and-swap on every mutation. Services drive the domain state
//! machines, enforce bounded timeouts, and feed the audit trail.

pub mod audit;
pub mod memory;
pub mod repos;
pub mod retry;
pub mod services;

pub use audit::AuditTrail;
pub use repos::{
    AlertFilter, AlertRepo, PageOf, PageRequest, ReportFilter, ReportRepo, TrainingRepo,
    TriageRepo, UserRepo, Versioned,
};
pub use services::{
    AlertPatch, AlertService, AuthService, CategoryCount, DashboardStats, ExternalCounts,
    MetricsService, ReportService, SeedUser, TrainingService, TriageService,
};

//! Repository traits.
//!
//! Every mutable record is stored with a version stamp; writers read a
//! `Versioned<T>`, apply the domain transition to a copy, and write back
//! with `put_cas`. A concurrent writer that moved the version first wins;
//! the loser gets `CoreError::Conflict` and must re-fetch.

use async_trait::async_trait;
use hive_core::types::{
    Alert, AlertStatus, QuizResult, Report, ReportCategory, ReportStatus, Role, TrainingEvent,
    TriageDecision, User,
};
use hive_core::{CoreError, CoreResult};
use uuid::Uuid;

/// A record plus the version it was read at.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub value: T,
    pub version: u64,
}

/// Validated 1-based page request.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size as usize
    }
}

/// One page of results with the total count across all pages.
#[derive(Debug, Clone)]
pub struct PageOf<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
}

impl<T> PageOf<T> {
    pub fn total_pages(&self) -> u64 {
        if self.page_size == 0 {
            return 0;
        }
        self.total.div_ceil(self.page_size as u64)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub category: Option<ReportCategory>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AlertFilter {
    pub status: Option<AlertStatus>,
}

#[async_trait]
pub trait ReportRepo: Send + Sync {
    async fn insert(&self, report: Report) -> CoreResult<()>;
    async fn get(&self, id: Uuid) -> CoreResult<Option<Versioned<Report>>>;
    /// Replace the record iff its version still equals `expected_version`.
    async fn put_cas(&self, expected_version: u64, report: Report)
        -> CoreResult<Versioned<Report>>;
    /// created_at descending.
    async fn list(&self, filter: ReportFilter, page: PageRequest) -> CoreResult<PageOf<Report>>;
    async fn all(&self) -> CoreResult<Vec<Report>>;

    async fn get_required(&self, id: Uuid) -> CoreResult<Versioned<Report>> {
        self.get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("report", id))
    }
}

#[async_trait]
pub trait TriageRepo: Send + Sync {
    async fn insert(&self, decision: TriageDecision) -> CoreResult<()>;
    /// decided_at ascending for a single report.
    async fn list_by_report(&self, report_id: Uuid) -> CoreResult<Vec<TriageDecision>>;
    async fn list(&self, report_id: Option<Uuid>, page: PageRequest)
        -> CoreResult<PageOf<TriageDecision>>;
    async fn all(&self) -> CoreResult<Vec<TriageDecision>>;
}

#[async_trait]
pub trait AlertRepo: Send + Sync {
    async fn insert(&self, alert: Alert) -> CoreResult<()>;
    async fn get(&self, id: Uuid) -> CoreResult<Option<Versioned<Alert>>>;
    async fn put_cas(&self, expected_version: u64, alert: Alert) -> CoreResult<Versioned<Alert>>;
    /// Remove iff the version still matches. Draft deletion only; the
    /// status check belongs to the service.
    async fn delete_cas(&self, id: Uuid, expected_version: u64) -> CoreResult<()>;
    async fn list(&self, filter: AlertFilter, page: PageRequest) -> CoreResult<PageOf<Alert>>;
    async fn all(&self) -> CoreResult<Vec<Alert>>;

    async fn get_required(&self, id: Uuid) -> CoreResult<Versioned<Alert>> {
        self.get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("alert", id))
    }
}

#[async_trait]
pub trait TrainingRepo: Send + Sync {
    async fn insert_event(&self, event: TrainingEvent) -> CoreResult<()>;
    async fn get_event(&self, id: Uuid) -> CoreResult<Option<Versioned<TrainingEvent>>>;
    async fn put_event_cas(
        &self,
        expected_version: u64,
        event: TrainingEvent,
    ) -> CoreResult<Versioned<TrainingEvent>>;
    /// event_date descending.
    async fn list_events(&self, page: PageRequest) -> CoreResult<PageOf<TrainingEvent>>;
    async fn all_events(&self) -> CoreResult<Vec<TrainingEvent>>;

    async fn insert_result(&self, result: QuizResult) -> CoreResult<()>;
    async fn results_for_event(&self, event_id: Uuid) -> CoreResult<Vec<QuizResult>>;

    async fn get_event_required(&self, id: Uuid) -> CoreResult<Versioned<TrainingEvent>> {
        self.get_event(id)
            .await?
            .ok_or_else(|| CoreError::not_found("training event", id))
    }
}

#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn insert(&self, user: User) -> CoreResult<()>;
    async fn get(&self, id: Uuid) -> CoreResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;
    /// Active accounts holding `role`.
    async fn count_by_role(&self, role: Role) -> CoreResult<u64>;

    async fn get_required(&self, id: Uuid) -> CoreResult<User> {
        self.get(id)
            .await?
            .ok_or_else(|| CoreError::not_found("user", id))
    }
}

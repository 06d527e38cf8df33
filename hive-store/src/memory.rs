//! In-process, lock-guarded repository implementations.
//!
//! Each table is a `parking_lot::RwLock<HashMap<Uuid, Versioned<T>>>`.
//! Mutations go through `put_cas`, which bumps the version iff the caller
//! observed the current one. List reads clone under the read lock, so a
//! snapshot may lag a concurrent writer by one operation.

use std::collections::HashMap;

use async_trait::async_trait;
use hive_core::types::{Alert, QuizResult, Report, Role, TrainingEvent, TriageDecision, User};
use hive_core::{CoreError, CoreResult};
use parking_lot::RwLock;
use uuid::Uuid;

use crate::repos::{
    AlertFilter, AlertRepo, PageOf, PageRequest, ReportFilter, ReportRepo, TrainingRepo,
    TriageRepo, UserRepo, Versioned,
};

struct Table<T> {
    rows: RwLock<HashMap<Uuid, Versioned<T>>>,
}

impl<T: Clone> Table<T> {
    fn new() -> Self {
        Self { rows: RwLock::new(HashMap::new()) }
    }

    fn insert(&self, id: Uuid, value: T) -> CoreResult<()> {
        let mut rows = self.rows.write();
        if rows.contains_key(&id) {
            return Err(CoreError::conflict(format!("record {id} already exists")));
        }
        rows.insert(id, Versioned { value, version: 1 });
        Ok(())
    }

    fn get(&self, id: Uuid) -> Option<Versioned<T>> {
        self.rows.read().get(&id).cloned()
    }

    fn put_cas(&self, id: Uuid, expected_version: u64, value: T) -> CoreResult<Versioned<T>> {
        let mut rows = self.rows.write();
        let row = rows
            .get_mut(&id)
            .ok_or_else(|| CoreError::not_found("record", id))?;
        if row.version != expected_version {
            return Err(CoreError::conflict(format!(
                "record {id} was modified concurrently (version {} != {expected_version})",
                row.version
            )));
        }
        row.value = value;
        row.version += 1;
        Ok(row.clone())
    }

    fn delete_cas(&self, id: Uuid, expected_version: u64) -> CoreResult<()> {
        let mut rows = self.rows.write();
        let row = rows
            .get(&id)
            .ok_or_else(|| CoreError::not_found("record", id))?;
        if row.version != expected_version {
            return Err(CoreError::conflict(format!(
                "record {id} was modified concurrently (version {} != {expected_version})",
                row.version
            )));
        }
        rows.remove(&id);
        Ok(())
    }

    fn values(&self) -> Vec<T> {
        self.rows.read().values().map(|v| v.value.clone()).collect()
    }
}

fn paginate<T>(mut items: Vec<T>, page: PageRequest) -> PageOf<T> {
    let total = items.len() as u64;
    let start = page.offset().min(items.len());
    let end = (start + page.page_size as usize).min(items.len());
    items.drain(..start);
    items.truncate(end - start);
    PageOf { items, page: page.page, page_size: page.page_size, total }
}

/// Report table.
pub struct MemoryReportRepo {
    table: Table<Report>,
}

impl MemoryReportRepo {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

impl Default for MemoryReportRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReportRepo for MemoryReportRepo {
    async fn insert(&self, report: Report) -> CoreResult<()> {
        self.table.insert(report.id, report)
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Versioned<Report>>> {
        Ok(self.table.get(id))
    }

    async fn put_cas(
        &self,
        expected_version: u64,
        report: Report,
    ) -> CoreResult<Versioned<Report>> {
        self.table.put_cas(report.id, expected_version, report)
    }

    async fn list(&self, filter: ReportFilter, page: PageRequest) -> CoreResult<PageOf<Report>> {
        let mut items: Vec<Report> = self
            .table
            .values()
            .into_iter()
            .filter(|r| filter.status.map_or(true, |s| r.status == s))
            .filter(|r| filter.category.map_or(true, |c| r.category == c))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(items, page))
    }

    async fn all(&self) -> CoreResult<Vec<Report>> {
        Ok(self.table.values())
    }
}

/// Triage decision table. Append-only, no versioning needed.
pub struct MemoryTriageRepo {
    rows: RwLock<Vec<TriageDecision>>,
}

impl MemoryTriageRepo {
    pub fn new() -> Self {
        Self { rows: RwLock::new(Vec::new()) }
    }
}

impl Default for MemoryTriageRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TriageRepo for MemoryTriageRepo {
    async fn insert(&self, decision: TriageDecision) -> CoreResult<()> {
        self.rows.write().push(decision);
        Ok(())
    }

    async fn list_by_report(&self, report_id: Uuid) -> CoreResult<Vec<TriageDecision>> {
        let mut items: Vec<TriageDecision> = self
            .rows
            .read()
            .iter()
            .filter(|d| d.report_id == report_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.decided_at.cmp(&b.decided_at));
        Ok(items)
    }

    async fn list(
        &self,
        report_id: Option<Uuid>,
        page: PageRequest,
    ) -> CoreResult<PageOf<TriageDecision>> {
        let mut items: Vec<TriageDecision> = self
            .rows
            .read()
            .iter()
            .filter(|d| report_id.map_or(true, |id| d.report_id == id))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.decided_at.cmp(&a.decided_at));
        Ok(paginate(items, page))
    }

    async fn all(&self) -> CoreResult<Vec<TriageDecision>> {
        Ok(self.rows.read().clone())
    }
}

/// Alert table.
pub struct MemoryAlertRepo {
    table: Table<Alert>,
}

impl MemoryAlertRepo {
    pub fn new() -> Self {
        Self { table: Table::new() }
    }
}

impl Default for MemoryAlertRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AlertRepo for MemoryAlertRepo {
    async fn insert(&self, alert: Alert) -> CoreResult<()> {
        self.table.insert(alert.id, alert)
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<Versioned<Alert>>> {
        Ok(self.table.get(id))
    }

    async fn put_cas(&self, expected_version: u64, alert: Alert) -> CoreResult<Versioned<Alert>> {
        self.table.put_cas(alert.id, expected_version, alert)
    }

    async fn delete_cas(&self, id: Uuid, expected_version: u64) -> CoreResult<()> {
        self.table.delete_cas(id, expected_version)
    }

    async fn list(&self, filter: AlertFilter, page: PageRequest) -> CoreResult<PageOf<Alert>> {
        let mut items: Vec<Alert> = self
            .table
            .values()
            .into_iter()
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(paginate(items, page))
    }

    async fn all(&self) -> CoreResult<Vec<Alert>> {
        Ok(self.table.values())
    }
}

/// Training events plus their quiz results.
pub struct MemoryTrainingRepo {
    events: Table<TrainingEvent>,
    results: RwLock<Vec<QuizResult>>,
}

impl MemoryTrainingRepo {
    pub fn new() -> Self {
        Self {
            events: Table::new(),
            results: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryTrainingRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TrainingRepo for MemoryTrainingRepo {
    async fn insert_event(&self, event: TrainingEvent) -> CoreResult<()> {
        self.events.insert(event.id, event)
    }

    async fn get_event(&self, id: Uuid) -> CoreResult<Option<Versioned<TrainingEvent>>> {
        Ok(self.events.get(id))
    }

    async fn put_event_cas(
        &self,
        expected_version: u64,
        event: TrainingEvent,
    ) -> CoreResult<Versioned<TrainingEvent>> {
        self.events.put_cas(event.id, expected_version, event)
    }

    async fn list_events(&self, page: PageRequest) -> CoreResult<PageOf<TrainingEvent>> {
        let mut items = self.events.values();
        items.sort_by(|a, b| b.event_date.cmp(&a.event_date));
        Ok(paginate(items, page))
    }

    async fn all_events(&self) -> CoreResult<Vec<TrainingEvent>> {
        Ok(self.events.values())
    }

    async fn insert_result(&self, result: QuizResult) -> CoreResult<()> {
        self.results.write().push(result);
        Ok(())
    }

    async fn results_for_event(&self, event_id: Uuid) -> CoreResult<Vec<QuizResult>> {
        Ok(self
            .results
            .read()
            .iter()
            .filter(|r| r.event_id == event_id)
            .cloned()
            .collect())
    }
}

/// User table, keyed by id with an email lookup.
pub struct MemoryUserRepo {
    rows: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepo {
    pub fn new() -> Self {
        Self { rows: RwLock::new(HashMap::new()) }
    }
}

impl Default for MemoryUserRepo {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepo for MemoryUserRepo {
    async fn insert(&self, user: User) -> CoreResult<()> {
        let mut rows = self.rows.write();
        if rows.values().any(|u| u.email == user.email) {
            return Err(CoreError::conflict(format!(
                "email {} already registered",
                user.email
            )));
        }
        rows.insert(user.id, user);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.rows.read().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        Ok(self.rows.read().values().find(|u| u.email == email).cloned())
    }

    async fn count_by_role(&self, role: Role) -> CoreResult<u64> {
        Ok(self
            .rows
            .read()
            .values()
            .filter(|u| u.role == role && u.is_active)
            .count() as u64)
    }
}

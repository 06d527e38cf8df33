//! Append-only audit trail of mutating operations.
//!
//! Internal ledger only; there is no read surface beyond tests and
//! operator inspection. Entries are never updated or removed.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct AuditEntry {
    pub id: Uuid,
    pub actor: Option<Uuid>,
    pub action: String,
    pub object_type: String,
    pub object_id: Uuid,
    pub detail: Value,
    pub at: DateTime<Utc>,
}

pub struct AuditTrail {
    entries: RwLock<Vec<AuditEntry>>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self { entries: RwLock::new(Vec::new()) }
    }

    pub fn record(
        &self,
        actor: Option<Uuid>,
        action: &str,
        object_type: &str,
        object_id: Uuid,
        detail: Value,
    ) {
        let entry = AuditEntry {
            id: Uuid::new_v4(),
            actor,
            action: action.to_string(),
            object_type: object_type.to_string(),
            object_id,
            detail,
            at: Utc::now(),
        };
        tracing::debug!(
            action = entry.action,
            object_type = entry.object_type,
            object_id = %entry.object_id,
            "audit"
        );
        self.entries.write().push(entry);
    }

    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

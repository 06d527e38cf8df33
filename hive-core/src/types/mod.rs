//! Domain entity types and their state machines.

pub mod alert;
pub mod common;
pub mod report;
pub mod training;
pub mod triage;
pub mod user;

pub use alert::{Alert, AlertDraft, AlertStatus, CapSeverity, Certainty, Urgency};
pub use common::{EvidenceLevel, SeverityLevel};
pub use report::{Report, ReportCategory, ReportDraft, ReportStatus};
pub use training::{QuizResult, QuizType, TrainingDraft, TrainingEvent, TrainingStats};
pub use triage::{TriageDecision, TriageDraft, TriageOutcome};
pub use user::{Role, User};

//! Append-only training workshop ledger feeding KPI computation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::validate::require_non_empty;

/// Pre-workshop or post-workshop quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizType {
    Pre,
    Post,
}

impl QuizType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Post => "post",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre" => Some(Self::Pre),
            "post" => Some(Self::Post),
            _ => None,
        }
    }
}

/// Validated input for recording a workshop.
#[derive(Debug, Clone)]
pub struct TrainingDraft {
    pub title: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub audience: Option<String>,
    pub attendance_count: u32,
    pub notes: Option<String>,
}

impl TrainingDraft {
    pub fn validate(&self) -> CoreResult<()> {
        require_non_empty("title", &self.title)?;
        Ok(())
    }
}

/// A delivered safety workshop. Records are append-only: create and read,
/// no update or delete surface. Quiz averages are denormalized onto the
/// event as results arrive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingEvent {
    pub id: Uuid,
    pub title: String,
    pub event_date: NaiveDate,
    pub location: Option<String>,
    pub audience: Option<String>,
    pub attendance_count: u32,
    pub pre_avg: Option<f64>,
    pub post_avg: Option<f64>,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainingEvent {
    pub fn create(
        draft: TrainingDraft,
        created_by: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        draft.validate()?;
        Ok(Self {
            id: Uuid::new_v4(),
            title: draft.title,
            event_date: draft.event_date,
            location: draft.location,
            audience: draft.audience,
            attendance_count: draft.attendance_count,
            pre_avg: None,
            post_avg: None,
            notes: draft.notes,
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    /// Mean post score minus mean pre score, when both are known.
    pub fn improvement(&self) -> Option<f64> {
        match (self.pre_avg, self.post_avg) {
            (Some(pre), Some(post)) => Some(post - pre),
            _ => None,
        }
    }
}

/// One participant's quiz score for an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: Uuid,
    pub event_id: Uuid,
    /// Opaque participant reference (hash or pseudonym), never a name.
    pub participant_ref: String,
    pub quiz_type: QuizType,
    pub score: f64,
    pub max_score: f64,
    pub created_at: DateTime<Utc>,
}

impl QuizResult {
    pub fn new(
        event_id: Uuid,
        participant_ref: String,
        quiz_type: QuizType,
        score: f64,
        max_score: Option<f64>,
        now: DateTime<Utc>,
    ) -> CoreResult<Self> {
        require_non_empty("participantRef", &participant_ref)?;
        let max_score = max_score.unwrap_or(100.0);
        if max_score <= 0.0 {
            return Err(CoreError::Validation(
                "maxScore must be positive".to_string(),
            ));
        }
        if score < 0.0 || score > max_score {
            return Err(CoreError::Validation(format!(
                "score must be within 0..={max_score}"
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            event_id,
            participant_ref,
            quiz_type,
            score,
            max_score,
            created_at: now,
        })
    }
}

/// Aggregate view over the whole training ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingStats {
    pub total_events: u64,
    pub total_participants: u64,
    pub avg_pre_score: Option<f64>,
    pub avg_post_score: Option<f64>,
    /// Mean per-event improvement over events with both averages recorded.
    pub avg_improvement: Option<f64>,
}

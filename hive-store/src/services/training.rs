//! Training ledger: workshop records and quiz results.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use hive_core::types::{QuizResult, QuizType, TrainingDraft, TrainingEvent, TrainingStats};
use hive_core::{validate, CoreResult};
use serde_json::json;
use uuid::Uuid;

use crate::audit::AuditTrail;
use crate::repos::{PageOf, PageRequest, TrainingRepo};
use crate::retry::{bounded, with_retry};

pub struct TrainingService {
    repo: Arc<dyn TrainingRepo>,
    audit: Arc<AuditTrail>,
    op_timeout: Duration,
}

impl TrainingService {
    pub fn new(repo: Arc<dyn TrainingRepo>, audit: Arc<AuditTrail>, op_timeout: Duration) -> Self {
        Self { repo, audit, op_timeout }
    }

    pub async fn create_event(
        &self,
        draft: TrainingDraft,
        created_by: Option<Uuid>,
    ) -> CoreResult<TrainingEvent> {
        let event = TrainingEvent::create(draft, created_by, Utc::now())?;
        bounded("training.create", self.op_timeout, async {
            with_retry("training.create", || self.repo.insert_event(event.clone())).await
        })
        .await?;
        tracing::info!(event_id = %event.id, title = event.title, "training event recorded");
        self.audit.record(
            created_by,
            "training.create",
            "training_event",
            event.id,
            json!({ "title": event.title }),
        );
        Ok(event)
    }

    pub async fn get_event(&self, id: Uuid) -> CoreResult<TrainingEvent> {
        let versioned = bounded(
            "training.get",
            self.op_timeout,
            self.repo.get_event_required(id),
        )
        .await?;
        Ok(versioned.value)
    }

    pub async fn list_events(&self, page: u32, page_size: u32) -> CoreResult<PageOf<TrainingEvent>> {
        validate::validate_page(page, page_size)?;
        bounded(
            "training.list",
            self.op_timeout,
            self.repo.list_events(PageRequest { page, page_size }),
        )
        .await
    }

    /// Record a quiz result and refresh the event's denormalized pre/post
    /// averages from the full result set.
    pub async fn add_result(
        &self,
        event_id: Uuid,
        participant_ref: String,
        quiz_type: QuizType,
        score: f64,
        max_score: Option<f64>,
    ) -> CoreResult<QuizResult> {
        let result = QuizResult::new(
            event_id,
            participant_ref,
            quiz_type,
            score,
            max_score,
            Utc::now(),
        )?;

        let result = bounded("training.add_result", self.op_timeout, async {
            let read = self.repo.get_event_required(event_id).await?;
            with_retry("training.add_result", || {
                self.repo.insert_result(result.clone())
            })
            .await?;

            let results = self.repo.results_for_event(event_id).await?;
            let mut event = read.value;
            event.pre_avg = average(&results, QuizType::Pre);
            event.post_avg = average(&results, QuizType::Post);
            event.updated_at = Utc::now();
            self.repo.put_event_cas(read.version, event).await?;
            Ok(result)
        })
        .await?;

        self.audit.record(
            None,
            "training.result",
            "training_event",
            event_id,
            json!({ "quizType": result.quiz_type.as_str(), "score": result.score }),
        );
        Ok(result)
    }

    /// Aggregate view over the whole ledger. Public read.
    pub async fn stats(&self) -> CoreResult<TrainingStats> {
        let events = bounded("training.stats", self.op_timeout, self.repo.all_events()).await?;

        let total_events = events.len() as u64;
        let total_participants = events.iter().map(|e| e.attendance_count as u64).sum();

        let pre: Vec<f64> = events.iter().filter_map(|e| e.pre_avg).collect();
        let post: Vec<f64> = events.iter().filter_map(|e| e.post_avg).collect();
        let improvements: Vec<f64> = events.iter().filter_map(|e| e.improvement()).collect();

        Ok(TrainingStats {
            total_events,
            total_participants,
            avg_pre_score: mean(&pre),
            avg_post_score: mean(&post),
            avg_improvement: mean(&improvements),
        })
    }
}

fn average(results: &[QuizResult], quiz_type: QuizType) -> Option<f64> {
    let scores: Vec<f64> = results
        .iter()
        .filter(|r| r.quiz_type == quiz_type)
        .map(|r| r.score / r.max_score * 100.0)
        .collect();
    mean(&scores)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTrainingRepo;
    use crate::retry::DEFAULT_OP_TIMEOUT;
    use chrono::NaiveDate;
    use hive_core::CoreError;

    fn service() -> TrainingService {
        TrainingService::new(
            Arc::new(MemoryTrainingRepo::new()),
            Arc::new(AuditTrail::new()),
            DEFAULT_OP_TIMEOUT,
        )
    }

    fn draft(title: &str, attendance: u32) -> TrainingDraft {
        TrainingDraft {
            title: title.into(),
            event_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
            location: None,
            audience: Some("market vendors".into()),
            attendance_count: attendance,
            notes: None,
        }
    }

    #[tokio::test]
    async fn results_refresh_event_averages() {
        let svc = service();
        let event = svc.create_event(draft("QR scam basics", 20), None).await.unwrap();

        svc.add_result(event.id, "p1".into(), QuizType::Pre, 40.0, None)
            .await
            .unwrap();
        svc.add_result(event.id, "p2".into(), QuizType::Pre, 60.0, None)
            .await
            .unwrap();
        svc.add_result(event.id, "p1".into(), QuizType::Post, 80.0, None)
            .await
            .unwrap();

        let fetched = svc.get_event(event.id).await.unwrap();
        assert_eq!(fetched.pre_avg, Some(50.0));
        assert_eq!(fetched.post_avg, Some(80.0));
        assert_eq!(fetched.improvement(), Some(30.0));
    }

    #[tokio::test]
    async fn results_normalize_to_percentage() {
        let svc = service();
        let event = svc.create_event(draft("Scale check", 5), None).await.unwrap();
        svc.add_result(event.id, "p1".into(), QuizType::Pre, 12.0, Some(20.0))
            .await
            .unwrap();
        let fetched = svc.get_event(event.id).await.unwrap();
        assert_eq!(fetched.pre_avg, Some(60.0));
    }

    #[tokio::test]
    async fn result_for_unknown_event_is_not_found() {
        let svc = service();
        assert!(matches!(
            svc.add_result(Uuid::new_v4(), "p1".into(), QuizType::Pre, 50.0, None)
                .await,
            Err(CoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn stats_aggregate_across_events() {
        let svc = service();
        let a = svc.create_event(draft("Session A", 30), None).await.unwrap();
        let b = svc.create_event(draft("Session B", 45), None).await.unwrap();

        svc.add_result(a.id, "p1".into(), QuizType::Pre, 50.0, None)
            .await
            .unwrap();
        svc.add_result(a.id, "p1".into(), QuizType::Post, 70.0, None)
            .await
            .unwrap();
        svc.add_result(b.id, "p2".into(), QuizType::Pre, 60.0, None)
            .await
            .unwrap();
        svc.add_result(b.id, "p2".into(), QuizType::Post, 90.0, None)
            .await
            .unwrap();

        let stats = svc.stats().await.unwrap();
        assert_eq!(stats.total_events, 2);
        assert_eq!(stats.total_participants, 75);
        assert_eq!(stats.avg_pre_score, Some(55.0));
        assert_eq!(stats.avg_post_score, Some(80.0));
        assert_eq!(stats.avg_improvement, Some(25.0));
    }
}

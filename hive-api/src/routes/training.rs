//! Training ledger endpoints. Creation needs admin or educator; the
//! aggregate stats read is public.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use hive_core::types::{QuizType, Role, TrainingDraft};
use uuid::Uuid;

use crate::dto::{
    CreateTrainingEventRequest, PageQuery, Paginated, QuizResultRequest, QuizResultResponse,
    TrainingEventResponse, TrainingStatsResponse,
};
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::{authorize, AuthClaims};
use crate::state::AppState;

const EDUCATOR_ROLES: &[Role] = &[Role::Admin, Role::Educator];

pub async fn create_event(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Json(req): Json<CreateTrainingEventRequest>,
) -> ApiResult<(StatusCode, Json<TrainingEventResponse>)> {
    let actor = authorize(&claims, EDUCATOR_ROLES)?;
    let draft = TrainingDraft {
        title: req.title,
        event_date: req.event_date,
        location: req.location,
        audience: req.audience,
        attendance_count: req.attendance_count,
        notes: req.notes,
    };

    let event = state.training.create_event(draft, Some(actor)).await?;
    Ok((StatusCode::CREATED, Json(event.into())))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TrainingEventResponse>> {
    let event = state.training.get_event(id).await?;
    Ok(Json(event.into()))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Paginated<TrainingEventResponse>>> {
    let result = state
        .training
        .list_events(page.page(), page.page_size())
        .await?;
    Ok(Json(Paginated::from_page(result, TrainingEventResponse::from)))
}

pub async fn add_result(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
    Path(id): Path<Uuid>,
    Json(req): Json<QuizResultRequest>,
) -> ApiResult<(StatusCode, Json<QuizResultResponse>)> {
    authorize(&claims, EDUCATOR_ROLES)?;
    let quiz_type = parse_quiz_type(&req.quiz_type)?;
    let result = state
        .training
        .add_result(id, req.participant_ref, quiz_type, req.score, req.max_score)
        .await?;
    Ok((StatusCode::CREATED, Json(result.into())))
}

/// Aggregate view over the whole ledger. Public.
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<TrainingStatsResponse>> {
    let stats = state.training.stats().await?;
    Ok(Json(stats.into()))
}

fn parse_quiz_type(s: &str) -> ApiResult<QuizType> {
    QuizType::parse(s).ok_or_else(|| ApiError::Validation(format!("Invalid quiz type: {s}")))
}

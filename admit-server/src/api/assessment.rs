//! Final assessment: questions, grading, and stored attempts

use admit_common::content::{QuestionResult, PASSING_SCORE};
use admit_common::db::{assessments, trainees};
use admit_common::models::{AssessmentAnswers, AssessmentAttempt};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptsQuery {
    pub trainee_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AttemptsResponse {
    pub attempts: Vec<AssessmentAttempt>,
}

/// GET /api/assessment?traineeId=
///
/// Newest first. A store error yields an empty list.
pub async fn list_attempts(
    State(state): State<AppState>,
    Query(query): Query<AttemptsQuery>,
) -> ApiResult<Json<AttemptsResponse>> {
    let trainee_id = query
        .trainee_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing traineeId"))?;

    let attempts = assessments::list_attempts_for_trainee(&state.db, &trainee_id)
        .await
        .unwrap_or_else(|e| {
            error!(%trainee_id, "Failed to fetch attempts: {}", e);
            Vec::new()
        });

    Ok(Json(AttemptsResponse { attempts }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveAttemptRequest {
    pub trainee_id: Option<String>,
    pub score: Option<i64>,
    pub total: Option<i64>,
    #[serde(default)]
    pub answers: AssessmentAnswers,
}

#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub attempt: AssessmentAttempt,
}

async fn store_attempt(
    state: &AppState,
    trainee_id: &str,
    score: i64,
    total: i64,
    answers: AssessmentAnswers,
) -> ApiResult<AssessmentAttempt> {
    let attempt = assessments::insert_attempt(&state.db, trainee_id, score, total, answers)
        .await
        .map_err(|e| {
            error!(%trainee_id, "Failed to save attempt: {}", e);
            ApiError::internal("Failed to save attempt")
        })?;

    if let Err(e) = trainees::touch_last_active(&state.db, trainee_id).await {
        warn!(%trainee_id, "Failed to update last_active_at: {}", e);
    }

    info!(%trainee_id, score, total, "Assessment attempt saved");
    Ok(attempt)
}

/// POST /api/assessment
///
/// Stores a score computed by the browser.
pub async fn save_attempt(
    State(state): State<AppState>,
    Json(request): Json<SaveAttemptRequest>,
) -> ApiResult<Json<AttemptResponse>> {
    let (Some(trainee_id), Some(score), Some(total)) =
        (request.trainee_id, request.score, request.total.filter(|t| *t != 0))
    else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let attempt = store_attempt(&state, &trainee_id, score, total, request.answers).await?;
    Ok(Json(AttemptResponse { attempt }))
}

/// Assessment question without its answer
#[derive(Debug, Serialize)]
pub struct PublicQuestion {
    pub id: String,
    pub module: String,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionsResponse {
    pub questions: Vec<PublicQuestion>,
    pub passing_score: i64,
    pub total_questions: i64,
}

/// GET /api/assessment/questions
pub async fn assessment_questions(State(state): State<AppState>) -> Json<QuestionsResponse> {
    let questions = state
        .catalog
        .assessment_questions()
        .iter()
        .map(|q| PublicQuestion {
            id: q.id.clone(),
            module: q.module.clone(),
            question: q.question.clone(),
            options: q.options.clone(),
        })
        .collect();

    Json(QuestionsResponse {
        questions,
        passing_score: PASSING_SCORE,
        total_questions: state.catalog.total_questions(),
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAssessmentRequest {
    pub trainee_id: Option<String>,
    #[serde(default)]
    pub answers: AssessmentAnswers,
}

#[derive(Debug, Serialize)]
pub struct SubmitAssessmentResponse {
    pub attempt: AssessmentAttempt,
    pub passed: bool,
    pub details: Vec<QuestionResult>,
}

/// POST /api/assessment/submit
///
/// Grades the answers against the catalog and stores the attempt.
pub async fn submit_assessment(
    State(state): State<AppState>,
    Json(request): Json<SubmitAssessmentRequest>,
) -> ApiResult<Json<SubmitAssessmentResponse>> {
    let trainee_id = request
        .trainee_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request("Missing required fields"))?;

    if trainees::get_trainee_by_id(&state.db, &trainee_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Trainee not found".to_string()));
    }

    let grade = state.catalog.grade_assessment(&request.answers);
    let attempt =
        store_attempt(&state, &trainee_id, grade.score, grade.total, request.answers).await?;

    Ok(Json(SubmitAssessmentResponse {
        attempt,
        passed: grade.passed,
        details: grade.details,
    }))
}

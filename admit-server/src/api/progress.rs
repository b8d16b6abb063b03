//! Section status updates and knowledge-check responses

use admit_common::db::{progress, responses, trainees};
use admit_common::models::{ExerciseType, NewResponse, ProgressStatus};
use admit_common::scoring;
use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressRequest {
    pub trainee_id: Option<String>,
    pub section_id: Option<String>,
    pub status: Option<String>,
}

/// POST /api/progress
pub async fn update_progress(
    State(state): State<AppState>,
    Json(request): Json<UpdateProgressRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(trainee_id), Some(section_id), Some(status)) =
        (request.trainee_id, request.section_id, request.status)
    else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    let status: ProgressStatus = status
        .parse()
        .map_err(|_| ApiError::bad_request(format!("Invalid status: {}", status)))?;

    if state.catalog.section(&section_id).is_none() {
        return Err(ApiError::bad_request(format!("Unknown section: {}", section_id)));
    }

    progress::upsert_status(&state.db, &trainee_id, &section_id, status)
        .await
        .map_err(|e| {
            error!(%trainee_id, %section_id, "Failed to update progress: {}", e);
            ApiError::internal("Failed to update progress")
        })?;

    if let Err(e) = trainees::touch_last_active(&state.db, &trainee_id).await {
        warn!(%trainee_id, "Failed to update last_active_at: {}", e);
    }

    debug!(%trainee_id, %section_id, status = %status, "Progress updated");

    Ok(Json(json!({ "success": true })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponseRequest {
    pub trainee_id: Option<String>,
    pub section_id: Option<String>,
    pub exercise_id: Option<String>,
    pub exercise_type: Option<String>,
    pub response_text: Option<String>,
    pub correct: Option<bool>,
}

/// PUT /api/progress
///
/// Stores a knowledge-check answer, scored 5 when correct and 0 otherwise.
/// `correct` is kept only when the client sends it.
pub async fn store_response(
    State(state): State<AppState>,
    Json(request): Json<StoreResponseRequest>,
) -> ApiResult<Json<Value>> {
    let (Some(trainee_id), Some(section_id), Some(exercise_id)) =
        (request.trainee_id, request.section_id, request.exercise_id)
    else {
        return Err(ApiError::bad_request("Missing required fields"));
    };

    // An explicit type wins; otherwise take it from the catalog
    let exercise_type = match request.exercise_type.as_deref() {
        Some(t) => t
            .parse::<ExerciseType>()
            .map_err(|_| ApiError::bad_request(format!("Invalid exercise type: {}", t)))?,
        None => state
            .catalog
            .exercise(&section_id, &exercise_id)
            .map(|e| e.exercise_type())
            .ok_or_else(|| ApiError::bad_request("Missing required fields"))?,
    };

    let new_response = NewResponse {
        trainee_id,
        section_id,
        exercise_id,
        exercise_type,
        response_text: request.response_text,
        audio_url: None,
        ai_feedback: None,
        ai_score: Some(scoring::knowledge_check_score(request.correct.unwrap_or(false))),
        correct: request.correct,
    };

    let stored = responses::insert_response(&state.db, new_response)
        .await
        .map_err(|e| {
            error!("Failed to store response: {}", e);
            ApiError::internal("Failed to store response")
        })?;

    debug!(
        trainee_id = %stored.trainee_id,
        exercise_id = %stored.exercise_id,
        correct = ?stored.correct,
        "Knowledge check stored"
    );

    Ok(Json(json!({ "success": true })))
}

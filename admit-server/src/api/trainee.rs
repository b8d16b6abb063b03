//! Trainee lookup and registration

use admit_common::db::{progress, responses, trainees};
use admit_common::models::{ExerciseResponse, Progress, Trainee};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TraineeQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TraineeResponse {
    pub trainee: Trainee,
    pub progress: Vec<Progress>,
    pub responses: Vec<ExerciseResponse>,
}

/// GET /api/trainee?token=
///
/// Resolves an access token to the trainee with their progress and
/// responses, and records the visit.
pub async fn get_trainee(
    State(state): State<AppState>,
    Query(query): Query<TraineeQuery>,
) -> ApiResult<Json<TraineeResponse>> {
    let token = query
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request("Token required"))?;

    let trainee = trainees::get_trainee_by_token(&state.db, &token)
        .await
        .map_err(|e| {
            error!("Trainee lookup failed: {}", e);
            ApiError::NotFound("Trainee not found".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Trainee not found".to_string()))?;

    if let Err(e) = trainees::touch_last_active(&state.db, &trainee.id).await {
        warn!(trainee_id = %trainee.id, "Failed to update last_active_at: {}", e);
    }

    let progress = progress::list_progress_for_trainee(&state.db, &trainee.id).await?;
    let responses = responses::list_responses_for_trainee(&state.db, &trainee.id).await?;

    Ok(Json(TraineeResponse {
        trainee,
        progress,
        responses,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateTraineeRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTraineeResponse {
    pub trainee: Trainee,
    pub access_url: String,
}

/// POST /api/trainee (manager session)
///
/// Registers a trainee and seeds one `not_started` progress row per section.
pub async fn create_trainee(
    State(state): State<AppState>,
    Json(request): Json<CreateTraineeRequest>,
) -> ApiResult<Json<CreateTraineeResponse>> {
    let name = request
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Name required"))?;

    let email = request
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let trainee = trainees::insert_trainee(&state.db, name, email)
        .await
        .map_err(|e| {
            error!("Failed to create trainee: {}", e);
            ApiError::internal("Failed to create trainee")
        })?;

    progress::seed_progress(&state.db, &trainee.id, &state.catalog.section_ids())
        .await
        .map_err(|e| {
            error!(trainee_id = %trainee.id, "Failed to seed progress: {}", e);
            ApiError::internal("Failed to create trainee")
        })?;

    info!(trainee_id = %trainee.id, "Registered trainee {}", trainee.name);

    let access_url = format!("/train/{}", trainee.access_token);
    Ok(Json(CreateTraineeResponse {
        trainee,
        access_url,
    }))
}

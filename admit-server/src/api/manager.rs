//! Manager dashboard data (session required)

use admit_common::db::{assessments, progress, responses, trainees};
use admit_common::reporting::{self, TraineeDetail, TraineeSummary};
use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::error;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TraineeListResponse {
    pub trainees: Vec<TraineeSummary>,
}

/// GET /api/manager
///
/// Every trainee with completion and score summary, newest first.
pub async fn list_trainees(State(state): State<AppState>) -> ApiResult<Json<TraineeListResponse>> {
    let fetch = async {
        let all_trainees = trainees::list_trainees(&state.db).await?;
        let all_progress = progress::list_all_progress(&state.db).await?;
        let all_responses = responses::list_all_responses(&state.db).await?;
        Ok::<_, admit_common::Error>((all_trainees, all_progress, all_responses))
    };

    let (all_trainees, all_progress, all_responses) = fetch.await.map_err(|e| {
        error!("Failed to fetch trainees: {}", e);
        ApiError::internal("Failed to fetch trainees")
    })?;

    let trainees = reporting::build_summaries(
        all_trainees,
        &all_progress,
        &all_responses,
        state.catalog.total_sections(),
    );

    Ok(Json(TraineeListResponse { trainees }))
}

/// GET /api/manager/trainee/:id
pub async fn get_trainee_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<TraineeDetail>> {
    let trainee = trainees::get_trainee_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Trainee not found".to_string()))?;

    let progress = progress::list_progress_for_trainee(&state.db, &id).await?;
    let responses = responses::list_responses_for_trainee(&state.db, &id).await?;
    let attempts = assessments::list_attempts_for_trainee(&state.db, &id).await?;

    Ok(Json(reporting::build_detail(
        &state.catalog,
        trainee,
        &progress,
        &responses,
        attempts,
    )))
}

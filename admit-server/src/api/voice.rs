//! Voice exercise endpoints: transcription, feedback, and the combined pipeline

use admit_common::content::Catalog;
use admit_common::db::{responses, trainees};
use admit_common::models::{ExerciseType, NewResponse};
use admit_common::recorder::{RecorderEvent, RecordingState};
use admit_common::scoring;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::services::FeedbackPrompt;
use crate::AppState;

/// Fields accepted in a voice upload form
#[derive(Debug, Default)]
struct VoiceForm {
    audio: Option<Vec<u8>>,
    trainee_id: Option<String>,
    section_id: Option<String>,
    exercise_id: Option<String>,
}

async fn read_voice_form(mut multipart: Multipart) -> ApiResult<VoiceForm> {
    let mut form = VoiceForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "audio" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid audio field: {}", e)))?;
                form.audio = Some(bytes.to_vec());
            }
            "traineeId" | "sectionId" | "exerciseId" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid {} field: {}", name, e)))?;
                let value = Some(value).filter(|v| !v.is_empty());
                match name.as_str() {
                    "traineeId" => form.trainee_id = value,
                    "sectionId" => form.section_id = value,
                    _ => form.exercise_id = value,
                }
            }
            other => debug!("Ignoring multipart field {}", other),
        }
    }

    Ok(form)
}

/// Store the upload, logging rather than failing when the disk write fails
async fn store_audio(state: &AppState, audio: &[u8]) -> Option<String> {
    match state.audio.save_recording(audio).await {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Failed to store recording (continuing without audioUrl): {}", e);
            None
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscribeResponse {
    pub transcription: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// POST /api/transcribe (multipart `audio`)
pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<TranscribeResponse>> {
    let form = read_voice_form(multipart).await?;
    let audio = form
        .audio
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::bad_request("No audio file provided"))?;

    let audio_url = store_audio(&state, &audio).await;

    let transcription = state.transcriber.transcribe(audio).await.map_err(|e| {
        error!("Transcription failed: {}", e);
        ApiError::internal("Failed to transcribe audio")
    })?;

    Ok(Json(TranscribeResponse {
        transcription,
        audio_url,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRequest {
    pub trainee_id: Option<String>,
    pub section_id: Option<String>,
    pub exercise_id: Option<String>,
    pub scenario: Option<String>,
    pub guidance: Option<String>,
    pub ai_prompt: Option<String>,
    pub transcription: Option<String>,
    pub audio_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub feedback: String,
    pub score: i64,
}

/// Voice exercise located in the catalog, with the section it belongs to
struct ResolvedExercise {
    section_id: String,
    prompt: FeedbackPrompt,
}

fn resolve_voice_exercise(
    catalog: &Catalog,
    section_id: Option<&str>,
    exercise_id: &str,
) -> Option<ResolvedExercise> {
    let (section_id, exercise) = match section_id {
        Some(section_id) => (section_id, catalog.exercise(section_id, exercise_id)?),
        None => catalog.find_exercise(exercise_id)?,
    };
    let voice = exercise.as_voice()?;

    Some(ResolvedExercise {
        section_id: section_id.to_string(),
        prompt: FeedbackPrompt {
            scenario: voice.scenario.clone(),
            guidance: voice.guidance.clone(),
            ai_prompt: voice.ai_prompt.clone(),
            transcription: String::new(),
        },
    })
}

struct VoiceAttempt {
    trainee_id: String,
    section_id: String,
    exercise_id: String,
    transcription: String,
    audio_url: Option<String>,
    feedback: String,
    score: i64,
}

/// Persist a scored voice response and mark the trainee active
///
/// Failures are logged; the trainee still sees their feedback.
async fn record_voice_attempt(state: &AppState, attempt: VoiceAttempt) {
    let trainee_id = attempt.trainee_id.clone();
    let new_response = NewResponse {
        trainee_id: attempt.trainee_id,
        section_id: attempt.section_id,
        exercise_id: attempt.exercise_id,
        exercise_type: ExerciseType::Voice,
        response_text: Some(attempt.transcription),
        audio_url: attempt.audio_url,
        ai_feedback: Some(attempt.feedback),
        ai_score: Some(attempt.score),
        correct: None,
    };

    if let Err(e) = responses::insert_response(&state.db, new_response).await {
        error!(%trainee_id, "Failed to store voice response: {}", e);
    }

    if let Err(e) = trainees::touch_last_active(&state.db, &trainee_id).await {
        warn!(%trainee_id, "Failed to update last_active_at: {}", e);
    }
}

/// POST /api/feedback
///
/// Evaluates a transcription against the exercise rubric and stores the
/// scored response.
pub async fn feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> ApiResult<Json<FeedbackResponse>> {
    let transcription = request
        .transcription
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("No transcription provided"))?;

    let resolved = request.exercise_id.as_deref().and_then(|exercise_id| {
        resolve_voice_exercise(&state.catalog, request.section_id.as_deref(), exercise_id)
    });

    let (section_id, mut prompt) = match resolved {
        Some(resolved) => (Some(resolved.section_id), resolved.prompt),
        None => (
            request.section_id,
            FeedbackPrompt {
                scenario: request.scenario.unwrap_or_default(),
                guidance: request.guidance.unwrap_or_default(),
                ai_prompt: request.ai_prompt.unwrap_or_default(),
                transcription: String::new(),
            },
        ),
    };
    prompt.transcription = transcription.clone();

    let feedback = state.feedback.generate(&prompt).await.map_err(|e| {
        error!("Feedback generation failed: {}", e);
        ApiError::internal("Failed to get feedback")
    })?;

    let score = scoring::extract_score(&feedback);

    match (request.trainee_id, section_id, request.exercise_id) {
        (Some(trainee_id), Some(section_id), Some(exercise_id)) => {
            record_voice_attempt(
                &state,
                VoiceAttempt {
                    trainee_id,
                    section_id,
                    exercise_id,
                    transcription,
                    audio_url: request.audio_url,
                    feedback: feedback.clone(),
                    score,
                },
            )
            .await;
        }
        _ => debug!("Feedback request without trainee/exercise ids, not stored"),
    }

    Ok(Json(FeedbackResponse { feedback, score }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicePipelineResponse {
    pub state: RecordingState,
    pub transcription: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub feedback: String,
    pub score: i64,
}

fn advance(state: RecordingState, event: RecorderEvent) -> Result<RecordingState, Response> {
    state.apply(event).map_err(|e| {
        error!("{}", e);
        ApiError::internal("Invalid recorder state").into_response()
    })
}

/// 500 carrying the state the recorder fell back to
fn pipeline_failure(state: RecordingState, message: &str) -> Response {
    let fallback = state.apply(RecorderEvent::Failed).unwrap_or(state);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message, "state": fallback })),
    )
        .into_response()
}

/// POST /api/voice (multipart `audio`, `traineeId`, `sectionId`, `exerciseId`)
///
/// Upload, transcription, and feedback in one request. Starts from
/// `recorded` and walks the recorder states to `complete`.
pub async fn voice_pipeline(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<VoicePipelineResponse>, Response> {
    let form = read_voice_form(multipart)
        .await
        .map_err(IntoResponse::into_response)?;

    let audio = form
        .audio
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::bad_request("No audio file provided").into_response())?;

    let (Some(trainee_id), Some(exercise_id)) = (form.trainee_id, form.exercise_id) else {
        return Err(ApiError::bad_request("Missing required fields").into_response());
    };

    let resolved = resolve_voice_exercise(&state.catalog, form.section_id.as_deref(), &exercise_id)
        .ok_or_else(|| {
            ApiError::bad_request(format!("Unknown voice exercise: {}", exercise_id))
                .into_response()
        })?;

    let mut recorder = advance(RecordingState::Recorded, RecorderEvent::Submit)?;

    let audio_url = store_audio(&state, &audio).await;

    let transcription = match state.transcriber.transcribe(audio).await {
        Ok(text) => text,
        Err(e) => {
            error!(%trainee_id, %exercise_id, "Transcription failed: {}", e);
            return Err(pipeline_failure(recorder, "Failed to transcribe audio"));
        }
    };
    recorder = advance(recorder, RecorderEvent::Transcribed)?;

    let mut prompt = resolved.prompt;
    prompt.transcription = transcription.clone();

    let feedback = match state.feedback.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            error!(%trainee_id, %exercise_id, "Feedback generation failed: {}", e);
            return Err(pipeline_failure(recorder, "Failed to get feedback"));
        }
    };
    recorder = advance(recorder, RecorderEvent::FeedbackReady)?;

    let score = scoring::extract_score(&feedback);

    record_voice_attempt(
        &state,
        VoiceAttempt {
            trainee_id: trainee_id.clone(),
            section_id: resolved.section_id,
            exercise_id: exercise_id.clone(),
            transcription: transcription.clone(),
            audio_url: audio_url.clone(),
            feedback: feedback.clone(),
            score,
        },
    )
    .await;

    info!(%trainee_id, %exercise_id, score, "Voice exercise evaluated");

    Ok(Json(VoicePipelineResponse {
        state: recorder,
        transcription,
        audio_url,
        feedback,
        score,
    }))
}

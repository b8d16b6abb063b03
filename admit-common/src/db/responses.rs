//! Exercise response persistence

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::parse_timestamp;
use crate::models::{ExerciseResponse, NewResponse};
use crate::{time, Result};

const RESPONSE_COLUMNS: &str = "id, trainee_id, section_id, exercise_id, exercise_type, \
     response_text, audio_url, ai_feedback, ai_score, correct, created_at";

pub async fn insert_response(pool: &SqlitePool, new: NewResponse) -> Result<ExerciseResponse> {
    let response = ExerciseResponse {
        id: Uuid::new_v4().to_string(),
        trainee_id: new.trainee_id,
        section_id: new.section_id,
        exercise_id: new.exercise_id,
        exercise_type: new.exercise_type,
        response_text: new.response_text,
        audio_url: new.audio_url,
        ai_feedback: new.ai_feedback,
        ai_score: new.ai_score,
        correct: new.correct,
        created_at: time::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO responses (
            id, trainee_id, section_id, exercise_id, exercise_type,
            response_text, audio_url, ai_feedback, ai_score, correct, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&response.id)
    .bind(&response.trainee_id)
    .bind(&response.section_id)
    .bind(&response.exercise_id)
    .bind(response.exercise_type.as_str())
    .bind(&response.response_text)
    .bind(&response.audio_url)
    .bind(&response.ai_feedback)
    .bind(response.ai_score)
    .bind(response.correct)
    .bind(response.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(response)
}

/// A trainee's responses, oldest first
pub async fn list_responses_for_trainee(
    pool: &SqlitePool,
    trainee_id: &str,
) -> Result<Vec<ExerciseResponse>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM responses WHERE trainee_id = ? ORDER BY created_at ASC",
        RESPONSE_COLUMNS
    ))
    .bind(trainee_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(response_from_row).collect()
}

pub async fn list_all_responses(pool: &SqlitePool) -> Result<Vec<ExerciseResponse>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM responses ORDER BY created_at ASC",
        RESPONSE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(response_from_row).collect()
}

fn response_from_row(row: &SqliteRow) -> Result<ExerciseResponse> {
    let exercise_type: String = row.get("exercise_type");
    let created_at: String = row.get("created_at");

    Ok(ExerciseResponse {
        id: row.get("id"),
        trainee_id: row.get("trainee_id"),
        section_id: row.get("section_id"),
        exercise_id: row.get("exercise_id"),
        exercise_type: exercise_type.parse()?,
        response_text: row.get("response_text"),
        audio_url: row.get("audio_url"),
        ai_feedback: row.get("ai_feedback"),
        ai_score: row.get("ai_score"),
        correct: row.get("correct"),
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

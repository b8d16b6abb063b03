//! Final assessment attempts

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::parse_timestamp;
use crate::models::{AssessmentAnswers, AssessmentAttempt};
use crate::{time, Error, Result};

pub async fn insert_attempt(
    pool: &SqlitePool,
    trainee_id: &str,
    score: i64,
    total: i64,
    answers: AssessmentAnswers,
) -> Result<AssessmentAttempt> {
    let attempt = AssessmentAttempt {
        id: Uuid::new_v4().to_string(),
        trainee_id: trainee_id.to_string(),
        score,
        total,
        answers,
        created_at: time::now(),
    };

    let answers_json = serde_json::to_string(&attempt.answers)
        .map_err(|e| Error::Internal(format!("Failed to serialize answers: {}", e)))?;

    sqlx::query(
        r#"
        INSERT INTO assessment_attempts (id, trainee_id, score, total, answers, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&attempt.id)
    .bind(&attempt.trainee_id)
    .bind(attempt.score)
    .bind(attempt.total)
    .bind(answers_json)
    .bind(attempt.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(attempt)
}

/// A trainee's attempts, newest first
pub async fn list_attempts_for_trainee(
    pool: &SqlitePool,
    trainee_id: &str,
) -> Result<Vec<AssessmentAttempt>> {
    let rows = sqlx::query(
        r#"
        SELECT id, trainee_id, score, total, answers, created_at
        FROM assessment_attempts
        WHERE trainee_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(trainee_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(attempt_from_row).collect()
}

fn attempt_from_row(row: &SqliteRow) -> Result<AssessmentAttempt> {
    let answers: String = row.get("answers");
    let answers: AssessmentAnswers = serde_json::from_str(&answers)
        .map_err(|e| Error::Internal(format!("Failed to deserialize answers: {}", e)))?;
    let created_at: String = row.get("created_at");

    Ok(AssessmentAttempt {
        id: row.get("id"),
        trainee_id: row.get("trainee_id"),
        score: row.get("score"),
        total: row.get("total"),
        answers,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}

//! Trainee persistence

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::{parse_optional_timestamp, parse_timestamp};
use crate::models::Trainee;
use crate::{time, Result};

const TRAINEE_COLUMNS: &str = "id, name, email, access_token, created_at, last_active_at";

/// Generate a fresh, unguessable access token
pub fn generate_access_token() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Insert a new trainee with a generated id and access token
pub async fn insert_trainee(
    pool: &SqlitePool,
    name: &str,
    email: Option<&str>,
) -> Result<Trainee> {
    let trainee = Trainee {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: email.map(str::to_string),
        access_token: generate_access_token(),
        created_at: time::now(),
        last_active_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO trainees (id, name, email, access_token, created_at, last_active_at)
        VALUES (?, ?, ?, ?, ?, NULL)
        "#,
    )
    .bind(&trainee.id)
    .bind(&trainee.name)
    .bind(&trainee.email)
    .bind(&trainee.access_token)
    .bind(trainee.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(trainee)
}

pub async fn get_trainee_by_id(pool: &SqlitePool, id: &str) -> Result<Option<Trainee>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM trainees WHERE id = ?",
        TRAINEE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.map(|r| trainee_from_row(&r)).transpose()
}

pub async fn get_trainee_by_token(pool: &SqlitePool, token: &str) -> Result<Option<Trainee>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM trainees WHERE access_token = ?",
        TRAINEE_COLUMNS
    ))
    .bind(token)
    .fetch_optional(pool)
    .await?;

    row.map(|r| trainee_from_row(&r)).transpose()
}

/// All trainees, newest first
pub async fn list_trainees(pool: &SqlitePool) -> Result<Vec<Trainee>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM trainees ORDER BY created_at DESC",
        TRAINEE_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(trainee_from_row).collect()
}

/// Stamp `last_active_at` with the current time
///
/// Returns false when no trainee has the given id.
pub async fn touch_last_active(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE trainees SET last_active_at = ? WHERE id = ?")
        .bind(time::now().to_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn trainee_from_row(row: &SqliteRow) -> Result<Trainee> {
    let created_at: String = row.get("created_at");
    let last_active_at: Option<String> = row.get("last_active_at");

    Ok(Trainee {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        access_token: row.get("access_token"),
        created_at: parse_timestamp("created_at", &created_at)?,
        last_active_at: parse_optional_timestamp("last_active_at", last_active_at)?,
    })
}

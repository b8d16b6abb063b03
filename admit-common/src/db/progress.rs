//! Section progress persistence

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use super::parse_optional_timestamp;
use crate::models::{Progress, ProgressStatus};
use crate::{time, Result};

const PROGRESS_COLUMNS: &str = "id, trainee_id, section_id, status, started_at, completed_at";

/// Create a `not_started` row for every section the trainee lacks
pub async fn seed_progress<S: AsRef<str>>(
    pool: &SqlitePool,
    trainee_id: &str,
    section_ids: &[S],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    for section_id in section_ids {
        sqlx::query(
            r#"
            INSERT INTO progress (id, trainee_id, section_id, status)
            VALUES (?, ?, ?, 'not_started')
            ON CONFLICT(trainee_id, section_id) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(trainee_id)
        .bind(section_id.as_ref())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Set a section's status, creating the row if missing
///
/// `started_at` is stamped on the first move to `in_progress`;
/// `completed_at` is stamped on every move to `completed`.
pub async fn upsert_status(
    pool: &SqlitePool,
    trainee_id: &str,
    section_id: &str,
    status: ProgressStatus,
) -> Result<Progress> {
    let now = time::now().to_rfc3339();
    let started_at = (status == ProgressStatus::InProgress).then(|| now.clone());
    let completed_at = (status == ProgressStatus::Completed).then(|| now.clone());

    sqlx::query(
        r#"
        INSERT INTO progress (id, trainee_id, section_id, status, started_at, completed_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(trainee_id, section_id) DO UPDATE SET
            status = excluded.status,
            started_at = COALESCE(progress.started_at, excluded.started_at),
            completed_at = COALESCE(excluded.completed_at, progress.completed_at)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(trainee_id)
    .bind(section_id)
    .bind(status.as_str())
    .bind(&started_at)
    .bind(&completed_at)
    .execute(pool)
    .await?;

    let row = sqlx::query(&format!(
        "SELECT {} FROM progress WHERE trainee_id = ? AND section_id = ?",
        PROGRESS_COLUMNS
    ))
    .bind(trainee_id)
    .bind(section_id)
    .fetch_one(pool)
    .await?;

    progress_from_row(&row)
}

pub async fn list_progress_for_trainee(
    pool: &SqlitePool,
    trainee_id: &str,
) -> Result<Vec<Progress>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM progress WHERE trainee_id = ? ORDER BY section_id",
        PROGRESS_COLUMNS
    ))
    .bind(trainee_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(progress_from_row).collect()
}

pub async fn list_all_progress(pool: &SqlitePool) -> Result<Vec<Progress>> {
    let rows = sqlx::query(&format!("SELECT {} FROM progress", PROGRESS_COLUMNS))
        .fetch_all(pool)
        .await?;

    rows.iter().map(progress_from_row).collect()
}

fn progress_from_row(row: &SqliteRow) -> Result<Progress> {
    let status: String = row.get("status");
    let started_at: Option<String> = row.get("started_at");
    let completed_at: Option<String> = row.get("completed_at");

    Ok(Progress {
        id: row.get("id"),
        trainee_id: row.get("trainee_id"),
        section_id: row.get("section_id"),
        status: status.parse()?,
        started_at: parse_optional_timestamp("started_at", started_at)?,
        completed_at: parse_optional_timestamp("completed_at", completed_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;
    use crate::db::trainees::insert_trainee;

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let pool = memory_pool().await;
        let trainee = insert_trainee(&pool, "Ada", None).await.unwrap();

        seed_progress(&pool, &trainee.id, &["welcome", "belief-system"])
            .await
            .unwrap();
        seed_progress(&pool, &trainee.id, &["welcome", "belief-system"])
            .await
            .unwrap();

        let rows = list_progress_for_trainee(&pool, &trainee.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|p| p.status == ProgressStatus::NotStarted));
    }

    #[tokio::test]
    async fn test_status_timestamps() {
        let pool = memory_pool().await;
        let trainee = insert_trainee(&pool, "Ada", None).await.unwrap();
        seed_progress(&pool, &trainee.id, &["welcome"]).await.unwrap();

        let started = upsert_status(&pool, &trainee.id, "welcome", ProgressStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(started.status, ProgressStatus::InProgress);
        assert!(started.started_at.is_some());
        assert!(started.completed_at.is_none());

        let done = upsert_status(&pool, &trainee.id, "welcome", ProgressStatus::Completed)
            .await
            .unwrap();
        assert_eq!(done.status, ProgressStatus::Completed);
        assert_eq!(done.started_at, started.started_at);
        assert!(done.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_reopening_keeps_first_start_time() {
        let pool = memory_pool().await;
        let trainee = insert_trainee(&pool, "Ada", None).await.unwrap();

        let first = upsert_status(&pool, &trainee.id, "welcome", ProgressStatus::InProgress)
            .await
            .unwrap();
        upsert_status(&pool, &trainee.id, "welcome", ProgressStatus::Completed)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;

        let reopened = upsert_status(&pool, &trainee.id, "welcome", ProgressStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(reopened.status, ProgressStatus::InProgress);
        assert_eq!(reopened.started_at, first.started_at);
    }

    #[tokio::test]
    async fn test_upsert_creates_missing_row() {
        let pool = memory_pool().await;
        let trainee = insert_trainee(&pool, "Ada", None).await.unwrap();

        upsert_status(&pool, &trainee.id, "welcome", ProgressStatus::Completed)
            .await
            .unwrap();

        let rows = list_all_progress(&pool).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, ProgressStatus::Completed);
    }
}

//! Key/value settings table access

use rand::RngCore;
use sqlx::SqlitePool;

use crate::{Error, Result};

const SESSION_SECRET_KEY: &str = "manager_session_secret";

/// Read and parse a setting
pub async fn get_setting<T>(db: &SqlitePool, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(db)
            .await?;

    match row {
        Some((Some(value),)) => {
            let parsed = value
                .parse::<T>()
                .map_err(|e| Error::Config(format!("Parse setting {} failed: {}", key, e)))?;
            Ok(Some(parsed))
        }
        _ => Ok(None),
    }
}

/// Write a setting, replacing any existing value
pub async fn set_setting<T>(db: &SqlitePool, key: &str, value: T) -> Result<()>
where
    T: std::fmt::Display,
{
    sqlx::query(
        "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

/// Load the secret that signs manager sessions, generating one on first use
///
/// The secret persists across restarts so issued cookies stay valid.
pub async fn load_or_init_session_secret(db: &SqlitePool) -> Result<String> {
    if let Some(secret) = get_setting::<String>(db, SESSION_SECRET_KEY).await? {
        if !secret.is_empty() {
            return Ok(secret);
        }
    }

    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();

    set_setting(db, SESSION_SECRET_KEY, &secret).await?;
    tracing::info!("Generated new manager session secret");

    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::memory_pool;

    #[tokio::test]
    async fn test_get_missing_setting() {
        let pool = memory_pool().await;
        let value: Option<i64> = get_setting(&pool, "nothing").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let pool = memory_pool().await;
        set_setting(&pool, "answer", 42).await.unwrap();
        set_setting(&pool, "answer", 43).await.unwrap();
        let value: Option<i64> = get_setting(&pool, "answer").await.unwrap();
        assert_eq!(value, Some(43));
    }

    #[tokio::test]
    async fn test_parse_failure_is_config_error() {
        let pool = memory_pool().await;
        set_setting(&pool, "answer", "forty-two").await.unwrap();
        let result: Result<Option<i64>> = get_setting(&pool, "answer").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_session_secret_is_stable() {
        let pool = memory_pool().await;
        let first = load_or_init_session_secret(&pool).await.unwrap();
        let second = load_or_init_session_secret(&pool).await.unwrap();
        assert_eq!(first.len(), 64);
        assert_eq!(first, second);
    }
}

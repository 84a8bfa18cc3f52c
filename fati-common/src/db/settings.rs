//! Typed access to the `settings` key-value table

use crate::{Error, Result};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;

/// Generic setting getter
///
/// Returns None if the key doesn't exist or holds NULL.
pub async fn get_setting<T: FromStr>(db: &Pool<Sqlite>, key: &str) -> Result<Option<T>> {
    let value: Option<Option<String>> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value.flatten() {
        Some(s) => s.trim().parse::<T>().map(Some).map_err(|_| {
            Error::Config(format!("Failed to parse setting '{}' value: {}", key, s))
        }),
        None => Ok(None),
    }
}

/// Setting getter with fallback for missing keys
pub async fn get_setting_or<T: FromStr>(db: &Pool<Sqlite>, key: &str, default: T) -> Result<T> {
    Ok(get_setting(db, key).await?.unwrap_or(default))
}

/// Generic setting setter
pub async fn set_setting<T: ToString>(db: &Pool<Sqlite>, key: &str, value: T) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value.to_string())
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    #[tokio::test]
    async fn test_defaults_are_readable() {
        let pool = init_memory_database().await.unwrap();
        let seed: Option<u64> = get_setting(&pool, "populate_seed").await.unwrap();
        assert_eq!(seed, Some(42));
        let alerts: u32 = get_setting_or(&pool, "populate_min_alerts", 0).await.unwrap();
        assert_eq!(alerts, 20);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let pool = init_memory_database().await.unwrap();
        set_setting(&pool, "populate_min_alerts", 5).await.unwrap();
        let alerts: Option<u32> = get_setting(&pool, "populate_min_alerts").await.unwrap();
        assert_eq!(alerts, Some(5));
    }

    #[tokio::test]
    async fn test_missing_key_uses_fallback() {
        let pool = init_memory_database().await.unwrap();
        let value: i64 = get_setting_or(&pool, "no_such_key", 7).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_unparseable_value_is_config_error() {
        let pool = init_memory_database().await.unwrap();
        set_setting(&pool, "populate_seed", "abc").await.unwrap();
        let result: Result<Option<u64>> = get_setting(&pool, "populate_seed").await;
        assert!(matches!(result, Err(Error::Config(_))));
    }
}

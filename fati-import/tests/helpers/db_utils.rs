//! Database test utilities

use anyhow::Result;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// On-disk database with the full schema
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_fati.db");
    let pool = fati_import::db::init_database_pool(&db_path).await?;
    Ok((temp_dir, pool))
}

/// One indicator value with its territory named by code
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct StoredValue {
    pub indicator_code: String,
    /// Region or department code, `None` for national values
    pub territory: Option<String>,
    pub year: i64,
    pub value: f64,
    pub source: String,
}

/// Every indicator value, in a database-independent order
pub async fn stored_values(pool: &SqlitePool) -> Result<Vec<StoredValue>> {
    let rows = sqlx::query_as::<_, StoredValue>(
        r#"
        SELECT i.code AS indicator_code,
               COALESCE(d.code, r.code) AS territory,
               v.year AS year,
               v.value AS value,
               v.source AS source
        FROM indicator_values v
        JOIN indicators i ON i.guid = v.indicator_id
        LEFT JOIN regions r ON r.guid = v.region_id
        LEFT JOIN departments d ON d.guid = v.department_id
        ORDER BY i.code, territory, v.year
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

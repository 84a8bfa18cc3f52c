//! Database schema migrations
//!
//! Versioned, idempotent upgrades applied after the `CREATE TABLE IF NOT
//! EXISTS` pass. The applied version is tracked in `schema_version`.
//!
//! Never modify an existing migration; add a new `migrate_vN` and bump
//! [`CURRENT_SCHEMA_VERSION`].

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Get current schema version from database
///
/// Returns 0 if schema_version table doesn't exist or has no rows
pub async fn get_schema_version(pool: &SqlitePool) -> Result<i32> {
    let table_exists: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM sqlite_master
            WHERE type='table' AND name='schema_version'
        )
        "#,
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        return Ok(0);
    }

    let version: Option<i32> =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?;

    Ok(version.unwrap_or(0))
}

async fn set_schema_version(pool: &SqlitePool, version: i32) -> Result<()> {
    sqlx::query("INSERT OR IGNORE INTO schema_version (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await?;

    Ok(())
}

/// Run all pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    let current_version = get_schema_version(pool).await?;

    if current_version == CURRENT_SCHEMA_VERSION {
        info!("Database schema is up to date (v{})", current_version);
        return Ok(());
    }

    if current_version > CURRENT_SCHEMA_VERSION {
        warn!(
            "Database schema version ({}) is newer than code version ({})",
            current_version, CURRENT_SCHEMA_VERSION
        );
        return Ok(());
    }

    info!(
        "Running database migrations: v{} -> v{}",
        current_version, CURRENT_SCHEMA_VERSION
    );

    if current_version < 1 {
        migrate_v1(pool).await?;
        set_schema_version(pool, 1).await?;
        info!("Migration v1 completed");
    }

    if current_version < 2 {
        migrate_v2(pool).await?;
        set_schema_version(pool, 2).await?;
        info!("Migration v2 completed");
    }

    Ok(())
}

/// Migration v1: lookup indexes and the indicator value natural key
///
/// Absent territories are folded to `''` so that two national rows for the
/// same indicator and year collide.
async fn migrate_v1(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v1: lookup indexes");

    let statements = [
        "CREATE INDEX IF NOT EXISTS idx_regions_name_key ON regions(name_key)",
        "CREATE INDEX IF NOT EXISTS idx_departments_region_name ON departments(region_id, name_key)",
        "CREATE INDEX IF NOT EXISTS idx_communes_department_name ON communes(department_id, name_key)",
        "CREATE INDEX IF NOT EXISTS idx_indicators_sector_name ON indicators(sector, name_key)",
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_indicator_values_natural_key ON indicator_values(
            indicator_id,
            IFNULL(region_id, ''),
            IFNULL(department_id, ''),
            IFNULL(commune_id, ''),
            year,
            period
        )
        "#,
        "CREATE INDEX IF NOT EXISTS idx_indicator_values_year ON indicator_values(year)",
    ];

    for sql in statements {
        sqlx::query(sql).execute(pool).await?;
    }

    Ok(())
}

/// Migration v2: store the formatted value next to the raw value
async fn migrate_v2(pool: &SqlitePool) -> Result<()> {
    info!("Running migration v2: add value_formatted to indicator_values");

    let has_column: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM pragma_table_info('indicator_values') WHERE name = 'value_formatted'",
    )
    .fetch_one(pool)
    .await?;

    if has_column > 0 {
        info!("  value_formatted column already exists - skipping");
        return Ok(());
    }

    sqlx::query("ALTER TABLE indicator_values ADD COLUMN value_formatted TEXT NOT NULL DEFAULT ''")
        .execute(pool)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::{create_indicator_values_table, create_indicators_table};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_get_schema_version_no_table() {
        let pool = setup_test_db().await;
        assert_eq!(get_schema_version(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = crate::db::init_memory_database().await.unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);

        // Re-running the individual steps must not fail
        migrate_v1(&pool).await.unwrap();
        migrate_v2(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
        assert_eq!(get_schema_version(&pool).await.unwrap(), CURRENT_SCHEMA_VERSION);
    }

    #[tokio::test]
    async fn test_v2_adds_value_formatted_column() {
        let pool = setup_test_db().await;
        create_indicators_table(&pool).await.unwrap();
        create_indicator_values_table(&pool).await.unwrap();

        migrate_v2(&pool).await.unwrap();

        let has_column: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM pragma_table_info('indicator_values') WHERE name = 'value_formatted'",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(has_column, 1);
    }

    #[tokio::test]
    async fn test_natural_key_treats_null_territories_as_equal() {
        let pool = crate::db::init_memory_database().await.unwrap();

        sqlx::query(
            "INSERT INTO indicators (guid, code, name, name_key, sector, category) \
             VALUES ('i1', 'HEA_IND', 'Ind', 'ind', 'health', 'access')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let insert = "INSERT INTO indicator_values (guid, indicator_id, year, value) VALUES (?, 'i1', 2020, 1.0)";
        sqlx::query(insert).bind("v1").execute(&pool).await.unwrap();
        let duplicate = sqlx::query(insert).bind("v2").execute(&pool).await;
        assert!(duplicate.is_err());
    }
}

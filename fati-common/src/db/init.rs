//! Database initialization
//!
//! Opens (or creates) the SQLite database, creates every FATI table if it
//! does not exist, runs pending migrations and fills in default settings.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Populate defaults stored in the `settings` table on first run
pub const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("populate_min_health_values", "250"),
    ("populate_min_education_values", "250"),
    ("populate_min_health_facilities", "60"),
    ("populate_min_education_facilities", "80"),
    ("populate_min_alerts", "20"),
    ("populate_seed", "42"),
];

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Pragmas go on the connect options so every pooled connection gets them
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(
            SqliteConnectOptions::new()
                .filename(db_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_millis(5000))
                .foreign_keys(true),
        )
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    prepare_schema(&pool).await?;
    Ok(pool)
}

/// In-memory database with the full schema
///
/// Uses a single connection: every `sqlite::memory:` connection is its own
/// database, so a larger pool would see empty schemas.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    prepare_schema(&pool).await?;
    Ok(pool)
}

async fn prepare_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;

    create_schema_version_table(pool).await?;
    create_settings_table(pool).await?;

    // Territorial hierarchy
    create_regions_table(pool).await?;
    create_departments_table(pool).await?;
    create_communes_table(pool).await?;

    // Indicators
    create_indicators_table(pool).await?;
    create_indicator_values_table(pool).await?;

    // Facilities
    create_health_facilities_table(pool).await?;
    create_education_facilities_table(pool).await?;
    create_staff_table(pool).await?;

    // Accounts and alerts
    create_users_table(pool).await?;
    create_alerts_table(pool).await?;
    create_alert_recipients_table(pool).await?;

    crate::db::migrations::run_migrations(pool).await?;

    init_default_settings(pool).await?;
    Ok(())
}

async fn create_schema_version_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores populate defaults as key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    for (key, value) in DEFAULT_SETTINGS {
        ensure_setting(pool, key, value).await?;
    }
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// Missing settings are created; settings holding NULL are reset.
async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match value {
        None => {
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;

            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
        Some(None) => {
            sqlx::query(
                "UPDATE settings SET value = ?, updated_at = CURRENT_TIMESTAMP WHERE key = ?",
            )
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;

            warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
        }
        Some(Some(_)) => {}
    }

    Ok(())
}

pub async fn create_regions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS regions (
            guid TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL,
            population INTEGER,
            area_km2 REAL,
            centroid_lon REAL,
            centroid_lat REAL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_departments_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS departments (
            guid TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL,
            region_id TEXT NOT NULL REFERENCES regions(guid) ON DELETE CASCADE,
            population INTEGER,
            area_km2 REAL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_communes_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS communes (
            guid TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            name_key TEXT NOT NULL,
            department_id TEXT NOT NULL REFERENCES departments(guid) ON DELETE CASCADE,
            population INTEGER,
            area_km2 REAL,
            metadata TEXT NOT NULL DEFAULT '{}',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_indicators_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS indicators (
            guid TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE CHECK (length(code) BETWEEN 1 AND 50),
            name TEXT NOT NULL,
            name_key TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            sector TEXT NOT NULL CHECK (sector IN ('health', 'education')),
            category TEXT NOT NULL CHECK (category IN (
                'access', 'quality', 'resources', 'outcomes',
                'infrastructure', 'personnel', 'finance'
            )),
            indicator_type TEXT NOT NULL DEFAULT 'number' CHECK (indicator_type IN (
                'number', 'percentage', 'ratio', 'currency', 'count'
            )),
            unit TEXT NOT NULL DEFAULT '',
            formula TEXT NOT NULL DEFAULT '',
            denominator TEXT NOT NULL DEFAULT '',
            target_value REAL,
            alert_threshold REAL,
            is_active INTEGER NOT NULL DEFAULT 1,
            display_order INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_indicator_values_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS indicator_values (
            guid TEXT PRIMARY KEY,
            indicator_id TEXT NOT NULL REFERENCES indicators(guid) ON DELETE CASCADE,
            region_id TEXT REFERENCES regions(guid) ON DELETE CASCADE,
            department_id TEXT REFERENCES departments(guid) ON DELETE CASCADE,
            commune_id TEXT REFERENCES communes(guid) ON DELETE CASCADE,
            year INTEGER NOT NULL,
            period TEXT NOT NULL DEFAULT '',
            value REAL NOT NULL,
            previous_value REAL,
            target_value REAL,
            variation REAL,
            achievement_rate REAL,
            status TEXT NOT NULL DEFAULT 'draft' CHECK (status IN (
                'draft', 'pending', 'validated', 'rejected'
            )),
            source TEXT NOT NULL DEFAULT '',
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_health_facilities_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS health_facilities (
            guid TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            facility_type TEXT NOT NULL CHECK (facility_type IN (
                'hospital', 'health_center', 'health_post', 'clinic', 'other'
            )),
            category TEXT NOT NULL DEFAULT '',
            commune_id TEXT NOT NULL REFERENCES communes(guid) ON DELETE CASCADE,
            address TEXT NOT NULL DEFAULT '',
            bed_capacity INTEGER,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_education_facilities_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS education_facilities (
            guid TEXT PRIMARY KEY,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            facility_type TEXT NOT NULL CHECK (facility_type IN (
                'preschool', 'primary', 'secondary', 'high_school', 'university', 'vocational'
            )),
            level TEXT NOT NULL CHECK (level IN ('basic', 'secondary', 'superior')),
            commune_id TEXT NOT NULL REFERENCES communes(guid) ON DELETE CASCADE,
            address TEXT NOT NULL DEFAULT '',
            student_capacity INTEGER,
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Staff rows belong to exactly one health or education facility
pub async fn create_staff_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS staff (
            guid TEXT PRIMARY KEY,
            health_facility_id TEXT REFERENCES health_facilities(guid) ON DELETE CASCADE,
            education_facility_id TEXT REFERENCES education_facilities(guid) ON DELETE CASCADE,
            category TEXT NOT NULL CHECK (category IN (
                'doctor', 'nurse', 'midwife', 'technician', 'admin', 'other'
            )),
            total_count INTEGER NOT NULL DEFAULT 0 CHECK (total_count >= 0),
            filled_count INTEGER NOT NULL DEFAULT 0 CHECK (filled_count >= 0),
            vacant_count INTEGER NOT NULL DEFAULT 0 CHECK (vacant_count >= 0),
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            CHECK ((health_facility_id IS NULL) <> (education_facility_id IS NULL))
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL DEFAULT '',
            last_name TEXT NOT NULL DEFAULT '',
            role TEXT NOT NULL DEFAULT 'viewer' CHECK (role IN (
                'admin', 'institution', 'sector_health', 'sector_education',
                'local_manager', 'contributor', 'viewer'
            )),
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN (
                'active', 'inactive', 'pending', 'suspended'
            )),
            password_hash TEXT NOT NULL,
            region_id TEXT REFERENCES regions(guid) ON DELETE SET NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_staff INTEGER NOT NULL DEFAULT 0,
            is_superuser INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_alerts_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            guid TEXT PRIMARY KEY,
            alert_type TEXT NOT NULL CHECK (alert_type IN (
                'threshold', 'trend', 'anomaly', 'delay', 'validation'
            )),
            severity TEXT NOT NULL DEFAULT 'medium' CHECK (severity IN (
                'critical', 'high', 'medium', 'low', 'info'
            )),
            title TEXT NOT NULL,
            message TEXT NOT NULL,
            sector TEXT NOT NULL DEFAULT '',
            indicator_id TEXT REFERENCES indicators(guid) ON DELETE CASCADE,
            region_id TEXT REFERENCES regions(guid) ON DELETE CASCADE,
            value REAL,
            threshold REAL,
            is_read INTEGER NOT NULL DEFAULT 0,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn create_alert_recipients_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS alert_recipients (
            alert_id TEXT NOT NULL REFERENCES alerts(guid) ON DELETE CASCADE,
            user_id TEXT NOT NULL REFERENCES users(guid) ON DELETE CASCADE,
            PRIMARY KEY (alert_id, user_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

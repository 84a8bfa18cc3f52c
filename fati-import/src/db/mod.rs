//! Repositories over the shared FATI database
//!
//! Schema creation lives in `fati_common::db`; these modules only read and
//! write rows.

pub mod alerts;
pub mod facilities;
pub mod geography;
pub mod indicators;
pub mod summary;
pub mod users;

use fati_common::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Open (or create) the database file with the full schema
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    tracing::debug!("Connecting to database: {}", db_path.display());
    fati_common::db::init_database(db_path).await
}

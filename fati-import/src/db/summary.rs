//! Row counts per table

use fati_common::Result;
use serde::Serialize;
use sqlx::SqlitePool;

/// Volume of every table the loader fills
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolumeSummary {
    pub regions: i64,
    pub departments: i64,
    pub communes: i64,
    pub indicators: i64,
    pub indicator_values: i64,
    pub health_facilities: i64,
    pub education_facilities: i64,
    pub users: i64,
    pub alerts: i64,
}

impl VolumeSummary {
    /// Labelled lines, one per table
    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("Regions: {}", self.regions),
            format!("Departments: {}", self.departments),
            format!("Communes: {}", self.communes),
            format!("Indicators: {}", self.indicators),
            format!("Indicator values: {}", self.indicator_values),
            format!("Health facilities: {}", self.health_facilities),
            format!("Education facilities: {}", self.education_facilities),
            format!("Users: {}", self.users),
            format!("Alerts: {}", self.alerts),
        ]
    }
}

async fn count(pool: &SqlitePool, table: &str) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table);
    let n: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(n)
}

pub async fn load_summary(pool: &SqlitePool) -> Result<VolumeSummary> {
    Ok(VolumeSummary {
        regions: count(pool, "regions").await?,
        departments: count(pool, "departments").await?,
        communes: count(pool, "communes").await?,
        indicators: count(pool, "indicators").await?,
        indicator_values: count(pool, "indicator_values").await?,
        health_facilities: count(pool, "health_facilities").await?,
        education_facilities: count(pool, "education_facilities").await?,
        users: count(pool, "users").await?,
        alerts: count(pool, "alerts").await?,
    })
}

//! Region, department and commune persistence

use crate::parsing::fold_name;
use fati_common::models::{geographic_level, GeoLevel};
use fati_common::{uuid_utils, Result};
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;
use uuid::Uuid;

/// Region record
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub guid: Uuid,
    pub code: String,
    pub name: String,
    pub population: Option<i64>,
    pub centroid: Option<(f64, f64)>,
}

impl Region {
    pub fn new(code: impl Into<String>, name: impl Into<String>, population: Option<i64>) -> Self {
        Self {
            guid: uuid_utils::generate(),
            code: code.into(),
            name: name.into(),
            population,
            centroid: None,
        }
    }
}

/// Department record
#[derive(Debug, Clone, PartialEq)]
pub struct Department {
    pub guid: Uuid,
    pub code: String,
    pub name: String,
    pub region_id: Uuid,
    pub population: Option<i64>,
}

impl Department {
    pub fn new(code: impl Into<String>, name: impl Into<String>, region_id: Uuid) -> Self {
        Self {
            guid: uuid_utils::generate(),
            code: code.into(),
            name: name.into(),
            region_id,
            population: None,
        }
    }
}

/// Commune record
#[derive(Debug, Clone, PartialEq)]
pub struct Commune {
    pub guid: Uuid,
    pub code: String,
    pub name: String,
    pub department_id: Uuid,
}

impl Commune {
    pub fn new(code: impl Into<String>, name: impl Into<String>, department_id: Uuid) -> Self {
        Self {
            guid: uuid_utils::generate(),
            code: code.into(),
            name: name.into(),
            department_id,
        }
    }
}

/// Territory an indicator value or alert is attached to
///
/// At most one level is set by the importers; all unset means national.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerritoryRef {
    pub region_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub commune_id: Option<Uuid>,
}

impl TerritoryRef {
    pub fn national() -> Self {
        Self::default()
    }

    pub fn region(id: Uuid) -> Self {
        Self {
            region_id: Some(id),
            ..Self::default()
        }
    }

    pub fn department(id: Uuid) -> Self {
        Self {
            department_id: Some(id),
            ..Self::default()
        }
    }

    /// Most specific level that is set
    pub fn level(&self) -> GeoLevel {
        geographic_level(
            self.region_id.is_some(),
            self.department_id.is_some(),
            self.commune_id.is_some(),
        )
    }

    pub fn is_national(&self) -> bool {
        self.level() == GeoLevel::National
    }
}

fn region_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Region> {
    let guid: String = row.get("guid");
    let lon: Option<f64> = row.get("centroid_lon");
    let lat: Option<f64> = row.get("centroid_lat");
    Ok(Region {
        guid: uuid_utils::parse(&guid)?,
        code: row.get("code"),
        name: row.get("name"),
        population: row.get("population"),
        centroid: lon.zip(lat),
    })
}

fn department_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Department> {
    let guid: String = row.get("guid");
    let region_id: String = row.get("region_id");
    Ok(Department {
        guid: uuid_utils::parse(&guid)?,
        code: row.get("code"),
        name: row.get("name"),
        region_id: uuid_utils::parse(&region_id)?,
        population: row.get("population"),
    })
}

fn commune_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Commune> {
    let guid: String = row.get("guid");
    let department_id: String = row.get("department_id");
    Ok(Commune {
        guid: uuid_utils::parse(&guid)?,
        code: row.get("code"),
        name: row.get("name"),
        department_id: uuid_utils::parse(&department_id)?,
    })
}

/// Insert a region
pub async fn save_region(pool: &SqlitePool, region: &Region) -> Result<()> {
    let (lon, lat) = region.centroid.unzip();
    sqlx::query(
        r#"
        INSERT INTO regions (guid, code, name, name_key, population, centroid_lon, centroid_lat)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(region.guid.to_string())
    .bind(&region.code)
    .bind(&region.name)
    .bind(fold_name(&region.name))
    .bind(region.population)
    .bind(lon)
    .bind(lat)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn update_region_population(pool: &SqlitePool, guid: Uuid, population: i64) -> Result<()> {
    sqlx::query("UPDATE regions SET population = ?, updated_at = CURRENT_TIMESTAMP WHERE guid = ?")
        .bind(population)
        .bind(guid.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// First region whose name matches case-insensitively
pub async fn find_region_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Region>> {
    let row = sqlx::query(
        r#"
        SELECT guid, code, name, population, centroid_lon, centroid_lat
        FROM regions WHERE name_key = ? ORDER BY name, code LIMIT 1
        "#,
    )
    .bind(fold_name(name))
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(region_from_row).transpose()
}

pub async fn find_region_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Region>> {
    let row = sqlx::query(
        "SELECT guid, code, name, population, centroid_lon, centroid_lat FROM regions WHERE code = ?",
    )
    .bind(code)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(region_from_row).transpose()
}

/// All regions in name order
pub async fn list_regions(pool: &SqlitePool) -> Result<Vec<Region>> {
    let rows = sqlx::query(
        "SELECT guid, code, name, population, centroid_lon, centroid_lat FROM regions ORDER BY name, code",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(region_from_row).collect()
}

pub async fn save_department(pool: &SqlitePool, department: &Department) -> Result<()> {
    sqlx::query(
        "INSERT INTO departments (guid, code, name, name_key, region_id, population) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(department.guid.to_string())
    .bind(&department.code)
    .bind(&department.name)
    .bind(fold_name(&department.name))
    .bind(department.region_id.to_string())
    .bind(department.population)
    .execute(pool)
    .await?;

    Ok(())
}

/// Department by case-insensitive name, optionally restricted to one region
///
/// Without a region the first match in name order is returned.
pub async fn find_department_by_name(
    pool: &SqlitePool,
    name: &str,
    region_id: Option<Uuid>,
) -> Result<Option<Department>> {
    let row = sqlx::query(
        r#"
        SELECT guid, code, name, region_id, population FROM departments
        WHERE name_key = ? AND (? IS NULL OR region_id = ?)
        ORDER BY name, code LIMIT 1
        "#,
    )
    .bind(fold_name(name))
    .bind(region_id.map(|id| id.to_string()))
    .bind(region_id.map(|id| id.to_string()))
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(department_from_row).transpose()
}

pub async fn find_department_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Department>> {
    let row = sqlx::query("SELECT guid, code, name, region_id, population FROM departments WHERE code = ?")
        .bind(code)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(department_from_row).transpose()
}

/// All departments in name order
pub async fn list_departments(pool: &SqlitePool) -> Result<Vec<Department>> {
    let rows = sqlx::query("SELECT guid, code, name, region_id, population FROM departments ORDER BY name, code")
        .fetch_all(pool)
        .await?;

    rows.iter().map(department_from_row).collect()
}

pub async fn save_commune(pool: &SqlitePool, commune: &Commune) -> Result<()> {
    sqlx::query(
        "INSERT INTO communes (guid, code, name, name_key, department_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(commune.guid.to_string())
    .bind(&commune.code)
    .bind(&commune.name)
    .bind(fold_name(&commune.name))
    .bind(commune.department_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn commune_exists(pool: &SqlitePool, name: &str, department_id: Uuid) -> Result<bool> {
    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM communes WHERE name_key = ? AND department_id = ?)",
    )
    .bind(fold_name(name))
    .bind(department_id.to_string())
    .fetch_one(pool)
    .await?;

    Ok(exists)
}

/// All communes in name order
pub async fn list_communes(pool: &SqlitePool) -> Result<Vec<Commune>> {
    let rows = sqlx::query("SELECT guid, code, name, department_id FROM communes ORDER BY name, code")
        .fetch_all(pool)
        .await?;

    rows.iter().map(commune_from_row).collect()
}

/// Codes already used in one of the territory tables
pub async fn taken_codes(pool: &SqlitePool, table: GeoTable) -> Result<HashSet<String>> {
    let sql = format!("SELECT code FROM {}", table.as_str());
    let codes: Vec<String> = sqlx::query_scalar(&sql).fetch_all(pool).await?;
    Ok(codes.into_iter().collect())
}

/// Territory tables with a unique `code` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeoTable {
    Regions,
    Departments,
    Communes,
}

impl GeoTable {
    fn as_str(&self) -> &'static str {
        match self {
            GeoTable::Regions => "regions",
            GeoTable::Departments => "departments",
            GeoTable::Communes => "communes",
        }
    }
}

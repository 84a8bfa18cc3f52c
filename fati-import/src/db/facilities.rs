//! Health and education facilities with their staff rows

use fati_common::models::{
    staff_vacancies, EducationFacilityType, EducationLevel, HealthFacilityType, StaffCategory,
};
use fati_common::{uuid_utils, Result};
use sqlx::SqlitePool;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct HealthFacility {
    pub guid: Uuid,
    pub code: String,
    pub name: String,
    pub facility_type: HealthFacilityType,
    pub commune_id: Uuid,
    pub address: String,
    pub bed_capacity: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct EducationFacility {
    pub guid: Uuid,
    pub code: String,
    pub name: String,
    pub facility_type: EducationFacilityType,
    pub level: EducationLevel,
    pub commune_id: Uuid,
    pub address: String,
    pub student_capacity: Option<i64>,
}

/// Facility a staff row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaffOwner {
    Health(Uuid),
    Education(Uuid),
}

#[derive(Debug, Clone)]
pub struct Staff {
    pub guid: Uuid,
    pub owner: StaffOwner,
    pub category: StaffCategory,
    pub total: u32,
    pub filled: u32,
}

impl Staff {
    pub fn new(owner: StaffOwner, category: StaffCategory, total: u32, filled: u32) -> Self {
        Self {
            guid: uuid_utils::generate(),
            owner,
            category,
            total,
            filled,
        }
    }

    pub fn vacant(&self) -> u32 {
        staff_vacancies(self.total, self.filled)
    }
}

pub async fn save_health_facility(pool: &SqlitePool, facility: &HealthFacility) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO health_facilities (guid, code, name, facility_type, commune_id, address, bed_capacity, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(facility.guid.to_string())
    .bind(&facility.code)
    .bind(&facility.name)
    .bind(facility.facility_type.as_str())
    .bind(facility.commune_id.to_string())
    .bind(&facility.address)
    .bind(facility.bed_capacity)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn save_education_facility(pool: &SqlitePool, facility: &EducationFacility) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO education_facilities (
            guid, code, name, facility_type, level, commune_id, address, student_capacity, is_active
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(facility.guid.to_string())
    .bind(&facility.code)
    .bind(&facility.name)
    .bind(facility.facility_type.as_str())
    .bind(facility.level.as_str())
    .bind(facility.commune_id.to_string())
    .bind(&facility.address)
    .bind(facility.student_capacity)
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert a staff row; the vacant count is derived from total and filled
pub async fn save_staff(pool: &SqlitePool, staff: &Staff) -> Result<()> {
    let (health_id, education_id) = match staff.owner {
        StaffOwner::Health(id) => (Some(id.to_string()), None),
        StaffOwner::Education(id) => (None, Some(id.to_string())),
    };

    sqlx::query(
        r#"
        INSERT INTO staff (
            guid, health_facility_id, education_facility_id, category,
            total_count, filled_count, vacant_count
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(staff.guid.to_string())
    .bind(health_id)
    .bind(education_id)
    .bind(staff.category.as_str())
    .bind(staff.total)
    .bind(staff.filled)
    .bind(staff.vacant())
    .execute(pool)
    .await?;

    Ok(())
}

/// Facility tables with a unique `code` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacilityTable {
    Health,
    Education,
}

impl FacilityTable {
    fn as_str(&self) -> &'static str {
        match self {
            FacilityTable::Health => "health_facilities",
            FacilityTable::Education => "education_facilities",
        }
    }
}

pub async fn count_facilities(pool: &SqlitePool, table: FacilityTable) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM {}", table.as_str());
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}

pub async fn facility_codes(pool: &SqlitePool, table: FacilityTable) -> Result<HashSet<String>> {
    let sql = format!("SELECT code FROM {}", table.as_str());
    let codes: Vec<String> = sqlx::query_scalar(&sql).fetch_all(pool).await?;
    Ok(codes.into_iter().collect())
}

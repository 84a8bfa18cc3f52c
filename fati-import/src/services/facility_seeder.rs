//! Top-up of health and education facilities
//!
//! Creates just enough facilities to reach the configured minimums, each
//! on a random commune with one staff row.

use super::statistics::FacilitySeedStats;
use crate::codes::next_sequential_code;
use crate::db::facilities::{
    count_facilities, facility_codes, save_education_facility, save_health_facility, save_staff,
    EducationFacility, FacilityTable, HealthFacility, Staff, StaffOwner,
};
use crate::db::geography::list_communes;
use fati_common::models::{EducationFacilityType, EducationLevel, HealthFacilityType, StaffCategory};
use fati_common::{uuid_utils, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::{Pool, Sqlite};

/// How many rows are still needed to reach `minimum`
pub fn missing_count(minimum: u32, existing: i64) -> usize {
    (i64::from(minimum) - existing).max(0) as usize
}

/// Numeric part of a `PREFIX-0001` code
fn code_number(code: &str) -> &str {
    code.rsplit('-').next().unwrap_or(code)
}

pub struct FacilitySeeder {
    db: Pool<Sqlite>,
}

impl FacilitySeeder {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn ensure(&self, min_health: u32, min_education: u32, rng: &mut StdRng) -> Result<FacilitySeedStats> {
        let communes = list_communes(&self.db).await?;
        if communes.is_empty() {
            tracing::warn!("No communes, facility generation skipped");
            return Ok(FacilitySeedStats {
                skipped: true,
                ..Default::default()
            });
        }

        let health_missing = missing_count(min_health, count_facilities(&self.db, FacilityTable::Health).await?);
        let education_missing =
            missing_count(min_education, count_facilities(&self.db, FacilityTable::Education).await?);

        let mut stats = FacilitySeedStats::default();

        let mut taken = facility_codes(&self.db, FacilityTable::Health).await?;
        for _ in 0..health_missing {
            let commune = pick(&communes, rng)?;
            let code = next_sequential_code("HS", |c| taken.contains(c));
            let facility = HealthFacility {
                guid: uuid_utils::generate(),
                name: format!("Structure Sante {} {}", commune.name, code_number(&code)),
                code: code.clone(),
                facility_type: *pick(HealthFacilityType::ALL, rng)?,
                commune_id: commune.guid,
                address: commune.name.clone(),
                bed_capacity: Some(rng.gen_range(20..=220)),
            };
            save_health_facility(&self.db, &facility).await?;

            let total = rng.gen_range(2..=20);
            let filled = rng.gen_range(1..=total);
            save_staff(
                &self.db,
                &Staff::new(StaffOwner::Health(facility.guid), StaffCategory::Doctor, total, filled),
            )
            .await?;

            taken.insert(code);
            stats.health_created += 1;
        }

        let mut taken = facility_codes(&self.db, FacilityTable::Education).await?;
        for _ in 0..education_missing {
            let commune = pick(&communes, rng)?;
            let code = next_sequential_code("ED", |c| taken.contains(c));
            let facility = EducationFacility {
                guid: uuid_utils::generate(),
                name: format!("Etablissement {} {}", commune.name, code_number(&code)),
                code: code.clone(),
                facility_type: *pick(EducationFacilityType::ALL, rng)?,
                level: *pick(EducationLevel::ALL, rng)?,
                commune_id: commune.guid,
                address: commune.name.clone(),
                student_capacity: Some(rng.gen_range(120..=1800)),
            };
            save_education_facility(&self.db, &facility).await?;

            let total: u32 = rng.gen_range(8..=120);
            let filled = total.saturating_sub(rng.gen_range(0..=12)).max(1);
            save_staff(
                &self.db,
                &Staff::new(StaffOwner::Education(facility.guid), StaffCategory::Other, total, filled),
            )
            .await?;

            taken.insert(code);
            stats.education_created += 1;
        }

        if stats.health_created > 0 || stats.education_created > 0 {
            tracing::info!(
                health = stats.health_created,
                education = stats.education_created,
                "Facilities topped up"
            );
        }
        Ok(stats)
    }
}

fn pick<'a, T>(items: &'a [T], rng: &mut StdRng) -> Result<&'a T> {
    items
        .choose(rng)
        .ok_or_else(|| fati_common::Error::Internal("random choice from an empty list".to_string()))
}

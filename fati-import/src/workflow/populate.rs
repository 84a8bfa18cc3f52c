//! Full populate run
//!
//! Phases run strictly in order, each one reading what the previous ones
//! wrote:
//! 1. geography sync from the boundary CSVs
//! 2. territory lookup built from the synced regions and departments
//! 3. health and education JSON import (skipped with `only_generate`)
//! 4. synthetic fallback per sector below its minimum (skipped with `only_json`)
//! 5. facility, user and alert top-ups
//! 6. volume summary

use crate::config::PopulateOptions;
use crate::db::geography::{list_departments, list_regions};
use crate::db::summary::load_summary;
use crate::error::ImportResult;
use crate::geo_lookup::GeoLookup;
use crate::services::{
    AlertSeeder, EducationImporter, FacilitySeeder, GeographySync, HealthImporter, JsonImportStats,
    PopulateStatistics, SyntheticGenerator, SyntheticStats, UserSeeder,
};
use fati_common::models::Sector;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sqlx::{Pool, Sqlite};

/// Run every phase against `db`
///
/// Conflicting options fail before anything is written. One RNG seeded from
/// `options.seed` drives all random draws, so two runs on identical
/// databases produce identical rows.
pub async fn run_populate(db: &Pool<Sqlite>, options: &PopulateOptions) -> ImportResult<PopulateStatistics> {
    options.validate()?;
    let mut rng = StdRng::seed_from_u64(options.seed);
    let reference_year = options.effective_year();

    tracing::info!(
        seed = options.seed,
        reference_year,
        only_json = options.only_json,
        only_generate = options.only_generate,
        "Populate started"
    );

    let mut stats = PopulateStatistics {
        geography: GeographySync::new(db.clone()).sync(&options.geo_dir).await?,
        ..Default::default()
    };

    let regions = list_regions(db).await?;
    let departments = list_departments(db).await?;
    let lookup = GeoLookup::new(&regions, &departments);
    if lookup.is_empty() {
        tracing::warn!("No regions or departments, every imported value will be national");
    }

    if !options.only_generate {
        stats.health_import = Some(HealthImporter::new(db.clone()).import(&options.health_json, &lookup).await?);
        stats.education_import = Some(
            EducationImporter::new(db.clone())
                .import(&options.education_json, &lookup)
                .await?,
        );
    }

    if !options.only_json {
        let generator = SyntheticGenerator::new(db.clone());
        stats.health_generated = generate_if_short(
            &generator,
            Sector::Health,
            stats.health_import,
            options.min_health_values,
            reference_year,
            &mut rng,
        )
        .await?;
        stats.education_generated = generate_if_short(
            &generator,
            Sector::Education,
            stats.education_import,
            options.min_education_values,
            reference_year,
            &mut rng,
        )
        .await?;
    }

    stats.facilities = FacilitySeeder::new(db.clone())
        .ensure(options.min_health_facilities, options.min_education_facilities, &mut rng)
        .await?;
    stats.users = UserSeeder::new(db.clone()).ensure().await?;
    stats.alerts_created = AlertSeeder::new(db.clone()).ensure(options.min_alerts, &mut rng).await?;

    stats.summary = load_summary(db).await?;
    for line in stats.display_lines() {
        tracing::info!("{}", line);
    }

    Ok(stats)
}

/// Fallback generation when `imported` wrote fewer than `minimum` values
async fn generate_if_short(
    generator: &SyntheticGenerator,
    sector: Sector,
    imported: Option<JsonImportStats>,
    minimum: u32,
    reference_year: i32,
    rng: &mut StdRng,
) -> ImportResult<Option<SyntheticStats>> {
    let written = imported.map(|s| s.values_written).unwrap_or(0);
    if written >= minimum as usize {
        return Ok(None);
    }

    tracing::warn!(
        sector = %sector,
        imported = written,
        minimum,
        "Too few imported values, generating fallback series"
    );
    Ok(Some(generator.generate(sector, reference_year, rng).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ImportError;
    use fati_common::db::init_memory_database;
    use std::path::PathBuf;

    fn missing_inputs() -> PopulateOptions {
        PopulateOptions {
            health_json: PathBuf::from("/nonexistent/sante.json"),
            education_json: PathBuf::from("/nonexistent/education.json"),
            geo_dir: PathBuf::from("/nonexistent/SEN_adm"),
            min_health_facilities: 5,
            min_education_facilities: 5,
            min_alerts: 3,
            reference_year: Some(2024),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_conflicting_flags_write_nothing() {
        let pool = init_memory_database().await.unwrap();
        let options = PopulateOptions {
            only_json: true,
            only_generate: true,
            ..missing_inputs()
        };

        let result = run_populate(&pool, &options).await;
        assert!(matches!(result, Err(ImportError::InvalidOptions(_))));
        assert_eq!(load_summary(&pool).await.unwrap().users, 0);
    }

    #[tokio::test]
    async fn test_empty_inputs_fall_back_to_national_series() {
        let pool = init_memory_database().await.unwrap();
        let stats = run_populate(&pool, &missing_inputs()).await.unwrap();

        assert!(stats.geography.skipped);
        assert_eq!(stats.health_import, Some(JsonImportStats::default()));
        // 4 templates x 1 national territory x 2018..=2024
        assert_eq!(stats.health_generated.unwrap().values_written, 4 * 7);
        assert_eq!(stats.education_generated.unwrap().values_written, 4 * 7);
        // no communes, so no facilities
        assert!(stats.facilities.skipped);
        assert_eq!(stats.users.created, 5);
        assert_eq!(stats.alerts_created, 3);
        assert_eq!(stats.summary.indicators, 8);
    }

    #[tokio::test]
    async fn test_only_json_never_generates() {
        let pool = init_memory_database().await.unwrap();
        let options = PopulateOptions {
            only_json: true,
            ..missing_inputs()
        };

        let stats = run_populate(&pool, &options).await.unwrap();
        assert_eq!(stats.health_generated, None);
        assert_eq!(stats.education_generated, None);
        assert_eq!(stats.summary.indicator_values, 0);
    }

    #[tokio::test]
    async fn test_only_generate_skips_import() {
        let pool = init_memory_database().await.unwrap();
        let options = PopulateOptions {
            only_generate: true,
            ..missing_inputs()
        };

        let stats = run_populate(&pool, &options).await.unwrap();
        assert_eq!(stats.health_import, None);
        assert!(stats.health_generated.is_some());
    }
}

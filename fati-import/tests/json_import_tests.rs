//! Health and education JSON imports against a synced geography

mod helpers;

use fati_common::models::Sector;
use fati_import::db::geography::{list_departments, list_regions};
use fati_import::db::indicators::{count_values_for_sector, find_indicator_by_name};
use fati_import::geo_lookup::GeoLookup;
use fati_import::services::{EducationImporter, GeographySync, HealthImporter};
use helpers::{create_test_db, stored_values, write_education_json, write_geography, write_health_json, write_text};
use sqlx::SqlitePool;

async fn synced_lookup(pool: &SqlitePool, dir: &std::path::Path) -> GeoLookup {
    write_geography(dir);
    GeographySync::new(pool.clone()).sync(dir).await.unwrap();
    let regions = list_regions(pool).await.unwrap();
    let departments = list_departments(pool).await.unwrap();
    GeoLookup::new(&regions, &departments)
}

#[tokio::test]
async fn test_health_import_resolves_territories() {
    let (dir, pool) = create_test_db().await.unwrap();
    let lookup = synced_lookup(&pool, dir.path()).await;
    let path = write_health_json(&dir.path().join("sante.json"));

    let stats = HealthImporter::new(pool.clone()).import(&path, &lookup).await.unwrap();
    assert!(stats.loaded);
    assert_eq!(stats.indicators_created, 2);
    assert_eq!(stats.values_written, 5);

    let beds = find_indicator_by_name(&pool, Sector::Health, "Nombre de lits d'hospitalisation")
        .await
        .unwrap()
        .unwrap();
    let values: Vec<_> = stored_values(&pool)
        .await
        .unwrap()
        .into_iter()
        .filter(|v| v.indicator_code == beds.code)
        .map(|v| (v.territory, v.year, v.value))
        .collect();

    // national first: NULL sorts before any code
    assert_eq!(
        values,
        vec![
            (None, 2019, 9000.0),
            (Some("D001".to_string()), 2019, 400.0),
            (Some("R02".to_string()), 2019, 1250.0),
            (Some("R02".to_string()), 2020, 1300.0),
        ]
    );
}

#[tokio::test]
async fn test_health_reimport_updates_in_place() {
    let (dir, pool) = create_test_db().await.unwrap();
    let lookup = synced_lookup(&pool, dir.path()).await;
    let path = write_health_json(&dir.path().join("sante.json"));
    let importer = HealthImporter::new(pool.clone());

    importer.import(&path, &lookup).await.unwrap();
    let again = importer.import(&path, &lookup).await.unwrap();

    assert_eq!(again.indicators_created, 0);
    assert_eq!(again.values_written, 5);
    assert_eq!(count_values_for_sector(&pool, Sector::Health).await.unwrap(), 5);

    let values = stored_values(&pool).await.unwrap();
    assert!(values.iter().all(|v| v.source == "json:sante.json"));
}

#[tokio::test]
async fn test_education_import_uses_period_columns() {
    let (dir, pool) = create_test_db().await.unwrap();
    let lookup = synced_lookup(&pool, dir.path()).await;
    let path = write_education_json(&dir.path().join("education.json"));

    let stats = EducationImporter::new(pool.clone()).import(&path, &lookup).await.unwrap();
    assert_eq!(stats.indicators_created, 1);
    assert_eq!(stats.values_written, 3);

    let indicator = find_indicator_by_name(&pool, Sector::Education, "Taux brut de scolarisation")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(indicator.unit, "%");

    let values: Vec<_> = stored_values(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|v| (v.territory, v.year, v.value))
        .collect();
    assert_eq!(
        values,
        vec![
            (Some("D002".to_string()), 2020, 95.0),
            (Some("R02".to_string()), 2019, 88.4),
            (Some("R02".to_string()), 2020, 90.1),
        ]
    );
}

#[tokio::test]
async fn test_unusable_files_import_nothing() {
    let (dir, pool) = create_test_db().await.unwrap();
    let lookup = synced_lookup(&pool, dir.path()).await;

    let missing = HealthImporter::new(pool.clone())
        .import(&dir.path().join("absent.json"), &lookup)
        .await
        .unwrap();
    assert!(!missing.loaded);

    let broken = write_text(&dir.path().join("education.json"), "{\"Education\": [");
    let stats = EducationImporter::new(pool.clone()).import(&broken, &lookup).await.unwrap();
    assert!(!stats.loaded);
    assert_eq!(stats.values_written, 0);
    assert!(stored_values(&pool).await.unwrap().is_empty());
}

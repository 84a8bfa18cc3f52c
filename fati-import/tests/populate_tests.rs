//! End-to-end populate runs on on-disk databases

mod helpers;

use fati_import::config::PopulateOptions;
use fati_import::db::summary::load_summary;
use fati_import::workflow::run_populate;
use fati_import::ImportError;
use helpers::{create_test_db, stored_values, write_education_json, write_geography, write_health_json};
use sqlx::SqlitePool;
use std::path::Path;

/// Fixture inputs in `dir` with small minimums
fn options_for(dir: &Path, seed: u64) -> PopulateOptions {
    write_geography(dir);
    PopulateOptions {
        health_json: write_health_json(&dir.join("sante.json")),
        education_json: write_education_json(&dir.join("education.json")),
        geo_dir: dir.to_path_buf(),
        min_health_facilities: 6,
        min_education_facilities: 4,
        min_alerts: 5,
        seed,
        reference_year: Some(2024),
        ..Default::default()
    }
}

async fn facility_rows(pool: &SqlitePool) -> Vec<(String, String, String, Option<i64>)> {
    sqlx::query_as("SELECT code, name, facility_type, bed_capacity FROM health_facilities ORDER BY code")
        .fetch_all(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_populate_full_run() {
    let (dir, pool) = create_test_db().await.unwrap();
    let stats = run_populate(&pool, &options_for(dir.path(), 42)).await.unwrap();

    assert_eq!(stats.geography.communes_created, 4);
    assert_eq!(stats.health_import.unwrap().values_written, 5);
    assert_eq!(stats.education_import.unwrap().values_written, 3);
    // 4 templates x 2 regions x 2018..=2024
    assert_eq!(stats.health_generated.unwrap().values_written, 56);
    assert_eq!(stats.education_generated.unwrap().values_written, 56);
    assert_eq!(stats.facilities.health_created, 6);
    assert_eq!(stats.facilities.education_created, 4);
    assert_eq!(stats.users.created, 5);
    assert_eq!(stats.alerts_created, 5);

    assert_eq!(stats.summary, load_summary(&pool).await.unwrap());
    assert_eq!(stats.summary.indicators, 2 + 1 + 8);
    assert_eq!(stats.summary.indicator_values, 5 + 3 + 56 + 56);

    let codes: Vec<String> = facility_rows(&pool).await.into_iter().map(|r| r.0).collect();
    assert_eq!(codes, vec!["HS-0001", "HS-0002", "HS-0003", "HS-0004", "HS-0005", "HS-0006"]);
}

#[tokio::test]
async fn test_populate_is_idempotent() {
    let (dir, pool) = create_test_db().await.unwrap();
    let options = options_for(dir.path(), 42);
    let first = run_populate(&pool, &options).await.unwrap();

    let second = run_populate(&pool, &options).await.unwrap();
    assert_eq!(second.geography.regions_created, 0);
    assert_eq!(second.health_import.unwrap().indicators_created, 0);
    assert_eq!(second.health_generated.unwrap().indicators_created, 0);
    assert_eq!(second.facilities.health_created, 0);
    assert_eq!(second.facilities.education_created, 0);
    assert_eq!(second.users.created, 0);
    assert_eq!(second.alerts_created, 0);
    assert_eq!(second.summary, first.summary);
}

#[tokio::test]
async fn test_same_seed_same_rows() {
    let (dir_a, pool_a) = create_test_db().await.unwrap();
    let (dir_b, pool_b) = create_test_db().await.unwrap();

    run_populate(&pool_a, &options_for(dir_a.path(), 7)).await.unwrap();
    run_populate(&pool_b, &options_for(dir_b.path(), 7)).await.unwrap();

    assert_eq!(stored_values(&pool_a).await.unwrap(), stored_values(&pool_b).await.unwrap());
    assert_eq!(facility_rows(&pool_a).await, facility_rows(&pool_b).await);
}

#[tokio::test]
async fn test_different_seed_different_series() {
    let (dir_a, pool_a) = create_test_db().await.unwrap();
    let (dir_b, pool_b) = create_test_db().await.unwrap();

    run_populate(&pool_a, &options_for(dir_a.path(), 1)).await.unwrap();
    run_populate(&pool_b, &options_for(dir_b.path(), 2)).await.unwrap();

    let generated = |values: Vec<helpers::StoredValue>| -> Vec<f64> {
        values.into_iter().filter(|v| v.source == "generated").map(|v| v.value).collect()
    };
    assert_ne!(
        generated(stored_values(&pool_a).await.unwrap()),
        generated(stored_values(&pool_b).await.unwrap())
    );
}

#[tokio::test]
async fn test_top_ups_only_fill_the_gap() {
    let (dir, pool) = create_test_db().await.unwrap();
    let options = options_for(dir.path(), 42);
    run_populate(&pool, &options).await.unwrap();

    let raised = PopulateOptions {
        min_health_facilities: 9,
        min_alerts: 8,
        ..options
    };
    let stats = run_populate(&pool, &raised).await.unwrap();
    assert_eq!(stats.facilities.health_created, 3);
    assert_eq!(stats.facilities.education_created, 0);
    assert_eq!(stats.alerts_created, 3);
    assert_eq!(stats.summary.health_facilities, 9);
    assert_eq!(stats.summary.alerts, 8);

    let codes: Vec<String> = facility_rows(&pool).await.into_iter().map(|r| r.0).collect();
    assert_eq!(codes.last().map(String::as_str), Some("HS-0009"));
}

#[tokio::test]
async fn test_imported_minimum_reached_skips_generation() {
    let (dir, pool) = create_test_db().await.unwrap();
    let options = PopulateOptions {
        min_health_values: 5,
        min_education_values: 3,
        ..options_for(dir.path(), 42)
    };

    let stats = run_populate(&pool, &options).await.unwrap();
    assert_eq!(stats.health_generated, None);
    assert_eq!(stats.education_generated, None);
    assert_eq!(stats.summary.indicator_values, 8);
}

#[tokio::test]
async fn test_conflicting_only_flags_rejected() {
    let (dir, pool) = create_test_db().await.unwrap();
    let options = PopulateOptions {
        only_json: true,
        only_generate: true,
        ..options_for(dir.path(), 42)
    };

    let err = run_populate(&pool, &options).await.unwrap_err();
    assert!(matches!(err, ImportError::InvalidOptions(_)));
    assert_eq!(load_summary(&pool).await.unwrap().regions, 0);
}

//! Indicator and indicator value persistence
//!
//! Indicators are matched by sector and case-insensitive name, so the same
//! metric found in several sheets maps to one row. Values are upserted on
//! their natural key (indicator, territory, year, period).

use crate::codes::{build_indicator_code, collision_code};
use crate::db::geography::TerritoryRef;
use crate::parsing::{collapse_whitespace, fold_name};
use fati_common::models::{format_value, DerivedMetrics, IndicatorCategory, IndicatorType, Sector, ValueStatus};
use fati_common::{uuid_utils, Error, Result};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Upper bound on collision suffix attempts for one name
const MAX_COLLISION_ATTEMPTS: u32 = 1000;

/// Indicator record
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub guid: Uuid,
    pub code: String,
    pub name: String,
    pub description: String,
    pub sector: Sector,
    pub category: IndicatorCategory,
    pub indicator_type: IndicatorType,
    pub unit: String,
    pub target_value: Option<f64>,
    pub alert_threshold: Option<f64>,
}

/// What an importer knows about an indicator it is about to write values for
#[derive(Debug, Clone)]
pub struct IndicatorSpec {
    pub sector: Sector,
    pub category: IndicatorCategory,
    pub indicator_type: IndicatorType,
    pub name: String,
    pub group_key: String,
    pub sheet_name: String,
    pub unit: String,
    pub description: String,
    pub target_value: Option<f64>,
    pub alert_threshold: Option<f64>,
}

/// Whether an upsert inserted a new row or refreshed an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

const INDICATOR_COLUMNS: &str = "guid, code, name, description, sector, category, indicator_type, \
                                 unit, target_value, alert_threshold";

fn indicator_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Indicator> {
    let guid: String = row.get("guid");
    let sector: String = row.get("sector");
    let category: String = row.get("category");
    let indicator_type: String = row.get("indicator_type");
    Ok(Indicator {
        guid: uuid_utils::parse(&guid)?,
        code: row.get("code"),
        name: row.get("name"),
        description: row.get("description"),
        sector: sector.parse()?,
        category: category.parse()?,
        indicator_type: indicator_type.parse()?,
        unit: row.get("unit"),
        target_value: row.get("target_value"),
        alert_threshold: row.get("alert_threshold"),
    })
}

pub async fn find_indicator_by_name(pool: &SqlitePool, sector: Sector, name: &str) -> Result<Option<Indicator>> {
    let sql = format!(
        "SELECT {} FROM indicators WHERE sector = ? AND name_key = ? ORDER BY created_at, code LIMIT 1",
        INDICATOR_COLUMNS
    );
    let row = sqlx::query(&sql)
        .bind(sector.as_str())
        .bind(fold_name(name))
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(indicator_from_row).transpose()
}

pub async fn find_indicator_by_code(pool: &SqlitePool, code: &str) -> Result<Option<Indicator>> {
    let sql = format!("SELECT {} FROM indicators WHERE code = ?", INDICATOR_COLUMNS);
    let row = sqlx::query(&sql).bind(code).fetch_optional(pool).await?;

    row.as_ref().map(indicator_from_row).transpose()
}

/// All indicators in code order
pub async fn list_indicators(pool: &SqlitePool) -> Result<Vec<Indicator>> {
    let sql = format!("SELECT {} FROM indicators ORDER BY code", INDICATOR_COLUMNS);
    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    rows.iter().map(indicator_from_row).collect()
}

async fn insert_indicator(pool: &SqlitePool, indicator: &Indicator) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO indicators (
            guid, code, name, name_key, description, sector, category, indicator_type,
            unit, target_value, alert_threshold, is_active
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1)
        "#,
    )
    .bind(indicator.guid.to_string())
    .bind(&indicator.code)
    .bind(&indicator.name)
    .bind(fold_name(&indicator.name))
    .bind(&indicator.description)
    .bind(indicator.sector.as_str())
    .bind(indicator.category.as_str())
    .bind(indicator.indicator_type.as_str())
    .bind(&indicator.unit)
    .bind(indicator.target_value)
    .bind(indicator.alert_threshold)
    .execute(pool)
    .await?;

    Ok(())
}

/// Fill unit, target and alert threshold where the stored indicator has none
async fn fill_missing_fields(pool: &SqlitePool, indicator: &mut Indicator, spec: &IndicatorSpec) -> Result<()> {
    let mut changed = false;
    if !spec.unit.is_empty() && indicator.unit.is_empty() {
        indicator.unit = spec.unit.clone();
        changed = true;
    }
    if spec.target_value.is_some() && indicator.target_value.is_none() {
        indicator.target_value = spec.target_value;
        changed = true;
    }
    if spec.alert_threshold.is_some() && indicator.alert_threshold.is_none() {
        indicator.alert_threshold = spec.alert_threshold;
        changed = true;
    }

    if changed {
        sqlx::query(
            r#"
            UPDATE indicators
            SET unit = ?, target_value = ?, alert_threshold = ?, updated_at = CURRENT_TIMESTAMP
            WHERE guid = ?
            "#,
        )
        .bind(&indicator.unit)
        .bind(indicator.target_value)
        .bind(indicator.alert_threshold)
        .bind(indicator.guid.to_string())
        .execute(pool)
        .await?;

        tracing::debug!(code = %indicator.code, "Filled missing indicator fields");
    }

    Ok(())
}

fn same_indicator(existing: &Indicator, sector: Sector, name: &str) -> bool {
    existing.sector == sector && fold_name(&existing.name) == fold_name(name)
}

/// Find the indicator for `spec` or create it
///
/// Returns the indicator and whether it was created. When the natural code
/// belongs to a different indicator, deterministic collision codes are tried
/// until a free one (or one already holding this indicator) is found.
pub async fn get_or_create_indicator(pool: &SqlitePool, spec: &IndicatorSpec) -> Result<(Indicator, bool)> {
    let name = collapse_whitespace(&spec.name);
    if name.is_empty() {
        return Err(Error::InvalidInput("indicator name is empty".to_string()));
    }

    if let Some(mut existing) = find_indicator_by_name(pool, spec.sector, &name).await? {
        fill_missing_fields(pool, &mut existing, spec).await?;
        return Ok((existing, false));
    }

    let base_code = build_indicator_code(spec.sector, &spec.group_key, &spec.sheet_name, &name);
    let mut candidate = base_code.clone();

    for attempt in 0..=MAX_COLLISION_ATTEMPTS {
        match find_indicator_by_code(pool, &candidate).await? {
            None => {
                let indicator = Indicator {
                    guid: uuid_utils::generate(),
                    code: candidate,
                    name,
                    description: spec.description.clone(),
                    sector: spec.sector,
                    category: spec.category,
                    indicator_type: spec.indicator_type,
                    unit: spec.unit.clone(),
                    target_value: spec.target_value,
                    alert_threshold: spec.alert_threshold,
                };
                insert_indicator(pool, &indicator).await?;
                tracing::debug!(code = %indicator.code, name = %indicator.name, "Created indicator");
                return Ok((indicator, true));
            }
            Some(existing) if same_indicator(&existing, spec.sector, &name) => {
                return Ok((existing, false));
            }
            Some(existing) => {
                tracing::debug!(
                    code = %candidate,
                    holder = %existing.name,
                    name = %name,
                    "Indicator code collision"
                );
                candidate = collision_code(&base_code, &name, attempt);
            }
        }
    }

    Err(Error::Internal(format!("no free indicator code for '{}'", name)))
}

/// Update-or-create one yearly value
///
/// Sets status to validated, copies the indicator target and recomputes the
/// derived metrics.
pub async fn upsert_indicator_value(
    pool: &SqlitePool,
    indicator: &Indicator,
    territory: &TerritoryRef,
    year: i32,
    value: f64,
    source: &str,
) -> Result<UpsertOutcome> {
    let region_id = territory.region_id.map(|id| id.to_string());
    let department_id = territory.department_id.map(|id| id.to_string());
    let commune_id = territory.commune_id.map(|id| id.to_string());

    let existing: Option<(String, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT guid, previous_value FROM indicator_values
        WHERE indicator_id = ? AND region_id IS ? AND department_id IS ? AND commune_id IS ?
          AND year = ? AND period = ''
        "#,
    )
    .bind(indicator.guid.to_string())
    .bind(&region_id)
    .bind(&department_id)
    .bind(&commune_id)
    .bind(year)
    .fetch_optional(pool)
    .await?;

    let previous_value = existing.as_ref().and_then(|(_, p)| *p);
    let metrics = DerivedMetrics::compute(value, previous_value, indicator.target_value, indicator.target_value);
    let formatted = format_value(indicator.indicator_type, value, &indicator.unit);
    tracing::trace!(
        indicator = %indicator.code,
        level = %territory.level(),
        year,
        value = %formatted,
        "Writing indicator value"
    );

    match existing {
        Some((guid, _)) => {
            sqlx::query(
                r#"
                UPDATE indicator_values
                SET value = ?, status = ?, source = ?, target_value = ?, variation = ?,
                    achievement_rate = ?, value_formatted = ?, updated_at = CURRENT_TIMESTAMP
                WHERE guid = ?
                "#,
            )
            .bind(value)
            .bind(ValueStatus::Validated.as_str())
            .bind(source)
            .bind(indicator.target_value)
            .bind(metrics.variation)
            .bind(metrics.achievement_rate)
            .bind(&formatted)
            .bind(&guid)
            .execute(pool)
            .await?;

            Ok(UpsertOutcome::Updated)
        }
        None => {
            sqlx::query(
                r#"
                INSERT INTO indicator_values (
                    guid, indicator_id, region_id, department_id, commune_id, year, period,
                    value, target_value, variation, achievement_rate, status, source, value_formatted
                ) VALUES (?, ?, ?, ?, ?, ?, '', ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(uuid_utils::generate().to_string())
            .bind(indicator.guid.to_string())
            .bind(&region_id)
            .bind(&department_id)
            .bind(&commune_id)
            .bind(year)
            .bind(value)
            .bind(indicator.target_value)
            .bind(metrics.variation)
            .bind(metrics.achievement_rate)
            .bind(ValueStatus::Validated.as_str())
            .bind(source)
            .bind(&formatted)
            .execute(pool)
            .await?;

            Ok(UpsertOutcome::Created)
        }
    }
}

/// Number of stored values for indicators of one sector
pub async fn count_values_for_sector(pool: &SqlitePool, sector: Sector) -> Result<i64> {
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM indicator_values v
        JOIN indicators i ON i.guid = v.indicator_id
        WHERE i.sector = ?
        "#,
    )
    .bind(sector.as_str())
    .fetch_one(pool)
    .await?;

    Ok(count)
}

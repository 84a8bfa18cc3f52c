//! Health sector JSON import
//!
//! Health sheets carry the territory in the `Période` column of a heading
//! row, and the indicator name in `Unnamed: 1` (or `Unnamed: 2`). Year
//! columns hold the values. The territory stays current until the next
//! heading row of the same sheet.

use super::json_document::{load_document, sheets, source_tag, Row};
use super::statistics::JsonImportStats;
use crate::classify::{guess_category, guess_type, looks_like_header};
use crate::db::indicators::{get_or_create_indicator, upsert_indicator_value, IndicatorSpec};
use crate::error::ImportResult;
use crate::geo_lookup::GeoLookup;
use crate::parsing::{cell_text, clean_indicator_name, extract_year_values, normalize};
use fati_common::models::Sector;
use sqlx::{Pool, Sqlite};
use std::path::Path;

const TERRITORY_COLUMN: &str = "Période";
const NAME_COLUMNS: [&str; 2] = ["Unnamed: 1", "Unnamed: 2"];

/// Normalized `Période` cells that are column titles, not territories
const NOT_TERRITORIES: [&str; 3] = ["", "PERIODE", "DECOUPAGE ADMINISTRATIF"];

/// Territory label carried by a heading row, if any
fn territory_label(row: &Row) -> Option<String> {
    let label = row.get(TERRITORY_COLUMN)?.as_str()?.trim();
    if label.is_empty() || NOT_TERRITORIES.contains(&normalize(label).as_str()) {
        return None;
    }
    Some(label.to_string())
}

/// First non-empty name column, cleaned
fn indicator_name(row: &Row) -> String {
    let raw = NAME_COLUMNS
        .iter()
        .filter_map(|column| row.get(*column))
        .map(cell_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default();
    clean_indicator_name(&raw)
}

pub struct HealthImporter {
    db: Pool<Sqlite>,
}

impl HealthImporter {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Import every year value of `path`; an unusable file imports nothing
    pub async fn import(&self, path: &Path, lookup: &GeoLookup) -> ImportResult<JsonImportStats> {
        let Some(document) = load_document(path, "Health") else {
            return Ok(JsonImportStats::default());
        };

        let source = source_tag(path);
        let mut stats = JsonImportStats {
            loaded: true,
            ..Default::default()
        };

        for sheet in sheets(&document) {
            let mut current_label: Option<String> = None;

            for row in sheet.rows.iter().filter_map(|r| r.as_object()) {
                if let Some(label) = territory_label(row) {
                    current_label = Some(label);
                }

                let name = indicator_name(row);
                if name.is_empty() || looks_like_header(&name) {
                    continue;
                }

                let year_values = extract_year_values(row);
                if year_values.is_empty() {
                    continue;
                }

                let spec = IndicatorSpec {
                    sector: Sector::Health,
                    category: guess_category(Sector::Health, sheet.group, sheet.name, &name),
                    indicator_type: guess_type("", &name),
                    name,
                    group_key: sheet.group.to_string(),
                    sheet_name: sheet.name.to_string(),
                    unit: String::new(),
                    description: format!("Import JSON sante / {} / {}", sheet.group, sheet.name),
                    target_value: None,
                    alert_threshold: None,
                };
                let (indicator, created) = get_or_create_indicator(&self.db, &spec).await?;
                if created {
                    stats.indicators_created += 1;
                }

                let territory = lookup.resolve_or_national(current_label.as_deref());
                tracing::debug!(
                    indicator = %indicator.code,
                    label = ?current_label,
                    national = territory.is_national(),
                    years = year_values.len(),
                    "Health row"
                );

                for (year, value) in year_values {
                    upsert_indicator_value(&self.db, &indicator, &territory, year, value, &source).await?;
                    stats.values_written += 1;
                }
            }
        }

        tracing::info!(
            values = stats.values_written,
            indicators = stats.indicators_created,
            "Health JSON imported from {}",
            path.display()
        );
        Ok(stats)
    }
}

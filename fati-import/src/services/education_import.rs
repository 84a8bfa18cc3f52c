//! Education sector JSON import
//!
//! Education sheets are a sequence of blocks. The first column of each row
//! says what the row is:
//! - a "Période" row maps value columns to years;
//! - a "Fréquence ... Indicateur : name, Unité : unit" row opens a new
//!   indicator;
//! - breakdown rows (statut, cycle, sexe, ...) are skipped;
//! - anything else names a territory whose cells are the values.

use super::json_document::{load_document, sheets, source_tag, Row};
use super::statistics::JsonImportStats;
use crate::classify::{guess_category, guess_type, is_education_meta_row};
use crate::db::indicators::{get_or_create_indicator, upsert_indicator_value, Indicator, IndicatorSpec};
use crate::error::ImportResult;
use crate::geo_lookup::GeoLookup;
use crate::parsing::{
    cell_text, clean_indicator_name, extract_year_map, normalize, parse_education_indicator_line,
    parse_number,
};
use fati_common::models::Sector;
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// What the first column of a row announces
#[derive(Debug, Clone, PartialEq, Eq)]
enum RowKind {
    Blank,
    Periods,
    IndicatorHeader,
    Meta,
    Territory(String),
}

fn classify_row(row: &Row) -> RowKind {
    let first = row.values().next().map(cell_text).unwrap_or_default();
    let first = first.trim();
    if first.is_empty() {
        return RowKind::Blank;
    }

    let normalized = normalize(first);
    if normalized.contains("PERIODE") {
        RowKind::Periods
    } else if normalized.contains("FREQUENCE") && normalized.contains("INDICATEUR") {
        RowKind::IndicatorHeader
    } else if is_education_meta_row(&normalized) {
        RowKind::Meta
    } else {
        RowKind::Territory(first.to_string())
    }
}

pub struct EducationImporter {
    db: Pool<Sqlite>,
}

impl EducationImporter {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Import every parseable year cell of `path`; an unusable file imports nothing
    pub async fn import(&self, path: &Path, lookup: &GeoLookup) -> ImportResult<JsonImportStats> {
        let Some(document) = load_document(path, "Education") else {
            return Ok(JsonImportStats::default());
        };

        let source = source_tag(path);
        let mut stats = JsonImportStats {
            loaded: true,
            ..Default::default()
        };

        for sheet in sheets(&document) {
            let mut year_map: Vec<(String, i32)> = Vec::new();
            let mut current: Option<Indicator> = None;

            for row in sheet.rows.iter().filter_map(|r| r.as_object()) {
                if row.is_empty() {
                    continue;
                }

                match classify_row(row) {
                    RowKind::Blank => {}
                    RowKind::Periods => {
                        year_map = extract_year_map(row);
                        tracing::debug!(sheet = sheet.name, columns = year_map.len(), "Education year columns");
                    }
                    RowKind::IndicatorHeader => {
                        let header = row.values().next().map(cell_text).unwrap_or_default();
                        let (raw_name, unit) = parse_education_indicator_line(header.trim());
                        let name = clean_indicator_name(&raw_name);
                        if name.is_empty() {
                            continue;
                        }

                        let spec = IndicatorSpec {
                            sector: Sector::Education,
                            category: guess_category(Sector::Education, sheet.group, sheet.name, &name),
                            indicator_type: guess_type(&unit, &name),
                            name,
                            group_key: sheet.group.to_string(),
                            sheet_name: sheet.name.to_string(),
                            unit,
                            description: format!("Import JSON education / {} / {}", sheet.group, sheet.name),
                            target_value: None,
                            alert_threshold: None,
                        };
                        let (indicator, created) = get_or_create_indicator(&self.db, &spec).await?;
                        if created {
                            stats.indicators_created += 1;
                        }
                        current = Some(indicator);
                    }
                    RowKind::Meta => {}
                    RowKind::Territory(label) => {
                        let Some(indicator) = current.as_ref() else {
                            continue;
                        };
                        if year_map.is_empty() {
                            continue;
                        }

                        let territory = lookup.resolve_or_national(Some(&label));
                        for (column, year) in &year_map {
                            let Some(value) = row.get(column).and_then(parse_number) else {
                                continue;
                            };
                            upsert_indicator_value(&self.db, indicator, &territory, *year, value, &source).await?;
                            stats.values_written += 1;
                        }
                    }
                }
            }
        }

        tracing::info!(
            values = stats.values_written,
            indicators = stats.indicators_created,
            "Education JSON imported from {}",
            path.display()
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kind(value: serde_json::Value) -> RowKind {
        classify_row(value.as_object().unwrap())
    }

    #[test]
    fn test_classify_row() {
        assert_eq!(kind(json!({"A": "  "})), RowKind::Blank);
        assert_eq!(kind(json!({"A": null, "B": "Dakar"})), RowKind::Blank);
        assert_eq!(kind(json!({"A": "Période", "B": "2019"})), RowKind::Periods);
        assert_eq!(
            kind(json!({"A": "Fréquence : annuelle, Indicateur : TBS, Unité : %"})),
            RowKind::IndicatorHeader
        );
        assert_eq!(kind(json!({"A": "Sexe"})), RowKind::Meta);
        assert_eq!(kind(json!({"A": " Dakar "})), RowKind::Territory("Dakar".to_string()));
    }

    #[test]
    fn test_header_wins_over_meta_prefix() {
        // Starts like a "niveau" breakdown row
        assert_eq!(
            kind(json!({"A": "Niveau - Fréquence : annuelle, Indicateur : TBS"})),
            RowKind::IndicatorHeader
        );
    }
}

//! Synthetic indicator series
//!
//! Fallback when a sector's JSON import produced too few values. Each
//! template yields one indicator with a noisy linear trend per region over
//! the last years. Values depend only on the RNG state, so a fixed seed
//! reproduces the same series.

use super::statistics::SyntheticStats;
use crate::db::geography::{list_regions, TerritoryRef};
use crate::db::indicators::{get_or_create_indicator, upsert_indicator_value, IndicatorSpec};
use crate::error::ImportResult;
use fati_common::models::{IndicatorCategory, IndicatorType, Sector};
use rand::rngs::StdRng;
use rand::Rng;
use sqlx::{Pool, Sqlite};
use std::ops::RangeInclusive;

/// Source tag of generated values
pub const GENERATED_SOURCE: &str = "generated";

/// Earliest year a generated series starts at
const FIRST_SERIES_YEAR: i32 = 2018;
const SERIES_SPAN: i32 = 6;

/// Shape of one generated indicator
#[derive(Debug, Clone)]
pub struct SyntheticTemplate {
    pub name: &'static str,
    pub category: IndicatorCategory,
    pub indicator_type: IndicatorType,
    pub unit: &'static str,
    pub target: f64,
    pub alert_threshold: f64,
    /// Range of the first-year base value
    pub min: f64,
    pub max: f64,
    /// Range of the yearly increment
    pub trend: (f64, f64),
    /// Half-width of the per-year noise
    pub noise: f64,
}

const HEALTH_TEMPLATES: &[SyntheticTemplate] = &[
    SyntheticTemplate {
        name: "Taux de couverture vaccinale",
        category: IndicatorCategory::Access,
        indicator_type: IndicatorType::Percentage,
        unit: "%",
        target: 95.0,
        alert_threshold: 70.0,
        min: 60.0,
        max: 88.0,
        trend: (0.5, 2.5),
        noise: 2.0,
    },
    SyntheticTemplate {
        name: "Taux de mortalite maternelle",
        category: IndicatorCategory::Outcomes,
        indicator_type: IndicatorType::Number,
        unit: "/100000",
        target: 120.0,
        alert_threshold: 220.0,
        min: 180.0,
        max: 280.0,
        trend: (-8.0, -2.0),
        noise: 6.0,
    },
    SyntheticTemplate {
        name: "Nombre de structures de sante fonctionnelles",
        category: IndicatorCategory::Infrastructure,
        indicator_type: IndicatorType::Count,
        unit: "unites",
        target: 500.0,
        alert_threshold: 250.0,
        min: 140.0,
        max: 220.0,
        trend: (2.0, 8.0),
        noise: 4.0,
    },
    SyntheticTemplate {
        name: "Disponibilite du personnel soignant",
        category: IndicatorCategory::Personnel,
        indicator_type: IndicatorType::Percentage,
        unit: "%",
        target: 90.0,
        alert_threshold: 65.0,
        min: 55.0,
        max: 82.0,
        trend: (0.4, 1.5),
        noise: 2.5,
    },
];

const EDUCATION_TEMPLATES: &[SyntheticTemplate] = &[
    SyntheticTemplate {
        name: "Taux brut de scolarisation",
        category: IndicatorCategory::Access,
        indicator_type: IndicatorType::Percentage,
        unit: "%",
        target: 100.0,
        alert_threshold: 80.0,
        min: 70.0,
        max: 94.0,
        trend: (0.4, 1.8),
        noise: 2.0,
    },
    SyntheticTemplate {
        name: "Taux de reussite aux examens nationaux",
        category: IndicatorCategory::Outcomes,
        indicator_type: IndicatorType::Percentage,
        unit: "%",
        target: 80.0,
        alert_threshold: 55.0,
        min: 45.0,
        max: 74.0,
        trend: (0.5, 2.0),
        noise: 3.0,
    },
    SyntheticTemplate {
        name: "Nombre d'etablissements scolaires",
        category: IndicatorCategory::Infrastructure,
        indicator_type: IndicatorType::Count,
        unit: "unites",
        target: 1500.0,
        alert_threshold: 700.0,
        min: 350.0,
        max: 700.0,
        trend: (5.0, 16.0),
        noise: 8.0,
    },
    SyntheticTemplate {
        name: "Ratio eleves par enseignant",
        category: IndicatorCategory::Quality,
        indicator_type: IndicatorType::Ratio,
        unit: "ratio",
        target: 35.0,
        alert_threshold: 55.0,
        min: 48.0,
        max: 62.0,
        trend: (-1.8, -0.2),
        noise: 1.6,
    },
];

pub fn templates(sector: Sector) -> &'static [SyntheticTemplate] {
    match sector {
        Sector::Health => HEALTH_TEMPLATES,
        Sector::Education => EDUCATION_TEMPLATES,
    }
}

/// Years of a generated series ending at `reference_year`
///
/// Empty when the reference year is before 2018.
pub fn series_years(reference_year: i32) -> RangeInclusive<i32> {
    (reference_year - SERIES_SPAN).max(FIRST_SERIES_YEAR)..=reference_year
}

/// Keep a raw value inside what its indicator type allows
pub fn clamp_value(indicator_type: IndicatorType, value: f64) -> f64 {
    match indicator_type {
        IndicatorType::Percentage => value.clamp(0.0, 100.0),
        IndicatorType::Count => value.round_ties_even().max(0.0),
        _ => value.max(0.0),
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct SyntheticGenerator {
    db: Pool<Sqlite>,
}

impl SyntheticGenerator {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Generate every template of `sector` for every region
    ///
    /// Without regions a single national series is written per template.
    pub async fn generate(&self, sector: Sector, reference_year: i32, rng: &mut StdRng) -> ImportResult<SyntheticStats> {
        let years: Vec<i32> = series_years(reference_year).collect();
        if years.is_empty() {
            tracing::warn!(reference_year, "Reference year before {}, nothing generated", FIRST_SERIES_YEAR);
            return Ok(SyntheticStats::default());
        }

        let mut territories: Vec<TerritoryRef> = list_regions(&self.db)
            .await?
            .iter()
            .map(|r| TerritoryRef::region(r.guid))
            .collect();
        if territories.is_empty() {
            territories.push(TerritoryRef::national());
        }

        let mut stats = SyntheticStats::default();

        for template in templates(sector) {
            let spec = IndicatorSpec {
                sector,
                category: template.category,
                indicator_type: template.indicator_type,
                name: template.name.to_string(),
                group_key: "generated".to_string(),
                sheet_name: sector.as_str().to_string(),
                unit: template.unit.to_string(),
                description: "Donnee synthetique generee automatiquement".to_string(),
                target_value: Some(template.target),
                alert_threshold: Some(template.alert_threshold),
            };
            let (indicator, created) = get_or_create_indicator(&self.db, &spec).await?;
            if created {
                stats.indicators_created += 1;
            }

            for territory in &territories {
                let base = rng.gen_range(template.min..=template.max);
                let trend = rng.gen_range(template.trend.0..=template.trend.1);

                for (idx, year) in years.iter().enumerate() {
                    let noise = rng.gen_range(-template.noise..=template.noise);
                    let raw = base + idx as f64 * trend + noise;
                    let value = round2(clamp_value(template.indicator_type, raw));

                    upsert_indicator_value(&self.db, &indicator, territory, *year, value, GENERATED_SOURCE).await?;
                    stats.values_written += 1;
                }
            }
        }

        tracing::info!(
            sector = %sector,
            values = stats.values_written,
            indicators = stats.indicators_created,
            "Synthetic values generated"
        );
        Ok(stats)
    }
}

//! Populate run configuration
//!
//! Minimums and the seed come from the database `settings` table; CLI flags
//! override them. Input paths come from the CLI, then the TOML `[import]`
//! section, then the working directory.

use crate::error::{ImportError, ImportResult};
use fati_common::config::TomlConfig;
use fati_common::db::get_setting_or;
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;

pub const DEFAULT_HEALTH_JSON: &str = "sante.json";
pub const DEFAULT_EDUCATION_JSON: &str = "education.json";
pub const DEFAULT_GEO_DIR: &str = "SEN_adm";

/// Everything one populate run needs
#[derive(Debug, Clone, PartialEq)]
pub struct PopulateOptions {
    pub health_json: PathBuf,
    pub education_json: PathBuf,
    pub geo_dir: PathBuf,
    /// Import JSON only, never generate fallback data
    pub only_json: bool,
    /// Skip JSON import and only generate data
    pub only_generate: bool,
    pub min_health_values: u32,
    pub min_education_values: u32,
    pub min_health_facilities: u32,
    pub min_education_facilities: u32,
    pub min_alerts: u32,
    pub seed: u64,
    /// Last year of generated series; current year when unset
    pub reference_year: Option<i32>,
}

impl Default for PopulateOptions {
    fn default() -> Self {
        Self {
            health_json: PathBuf::from(DEFAULT_HEALTH_JSON),
            education_json: PathBuf::from(DEFAULT_EDUCATION_JSON),
            geo_dir: PathBuf::from(DEFAULT_GEO_DIR),
            only_json: false,
            only_generate: false,
            min_health_values: 250,
            min_education_values: 250,
            min_health_facilities: 60,
            min_education_facilities: 80,
            min_alerts: 20,
            seed: 42,
            reference_year: None,
        }
    }
}

impl PopulateOptions {
    /// Reject conflicting flags before anything is written
    pub fn validate(&self) -> ImportResult<()> {
        if self.only_json && self.only_generate {
            return Err(ImportError::InvalidOptions(
                "--only-json and --only-generate cannot be used together".to_string(),
            ));
        }
        if let Some(year) = self.reference_year {
            if !(1900..=2099).contains(&year) {
                return Err(ImportError::InvalidOptions(format!(
                    "reference year {} is outside 1900..=2099",
                    year
                )));
            }
        }
        Ok(())
    }

    /// Reference year for generated series
    pub fn effective_year(&self) -> i32 {
        self.reference_year.unwrap_or_else(fati_common::time::current_year)
    }
}

/// Values given on the command line; `None` falls back to settings/TOML
#[derive(Debug, Clone, Default)]
pub struct PopulateOverrides {
    pub health_json: Option<PathBuf>,
    pub education_json: Option<PathBuf>,
    pub geo_dir: Option<PathBuf>,
    pub only_json: bool,
    pub only_generate: bool,
    pub min_health_values: Option<u32>,
    pub min_education_values: Option<u32>,
    pub min_health_facilities: Option<u32>,
    pub min_education_facilities: Option<u32>,
    pub min_alerts: Option<u32>,
    pub seed: Option<u64>,
    pub reference_year: Option<i32>,
}

/// Resolve options: CLI → settings table / TOML → built-in defaults
pub async fn resolve_populate_options(
    db: &Pool<Sqlite>,
    toml: &TomlConfig,
    cli: PopulateOverrides,
) -> ImportResult<PopulateOptions> {
    let defaults = PopulateOptions::default();

    let min_health_values = match cli.min_health_values {
        Some(n) => n,
        None => get_setting_or(db, "populate_min_health_values", defaults.min_health_values).await?,
    };
    let min_education_values = match cli.min_education_values {
        Some(n) => n,
        None => get_setting_or(db, "populate_min_education_values", defaults.min_education_values).await?,
    };
    let min_health_facilities = match cli.min_health_facilities {
        Some(n) => n,
        None => get_setting_or(db, "populate_min_health_facilities", defaults.min_health_facilities).await?,
    };
    let min_education_facilities = match cli.min_education_facilities {
        Some(n) => n,
        None => {
            get_setting_or(db, "populate_min_education_facilities", defaults.min_education_facilities).await?
        }
    };
    let min_alerts = match cli.min_alerts {
        Some(n) => n,
        None => get_setting_or(db, "populate_min_alerts", defaults.min_alerts).await?,
    };
    let seed = match cli.seed {
        Some(n) => n,
        None => get_setting_or(db, "populate_seed", defaults.seed).await?,
    };

    let options = PopulateOptions {
        health_json: cli
            .health_json
            .or_else(|| toml.import.health_json.clone())
            .unwrap_or(defaults.health_json),
        education_json: cli
            .education_json
            .or_else(|| toml.import.education_json.clone())
            .unwrap_or(defaults.education_json),
        geo_dir: cli
            .geo_dir
            .or_else(|| toml.import.geo_dir.clone())
            .unwrap_or(defaults.geo_dir),
        only_json: cli.only_json,
        only_generate: cli.only_generate,
        min_health_values,
        min_education_values,
        min_health_facilities,
        min_education_facilities,
        min_alerts,
        seed,
        reference_year: cli.reference_year,
    };

    options.validate()?;
    tracing::debug!(?options, "Resolved populate options");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fati_common::db::{init_memory_database, set_setting};

    #[test]
    fn test_only_flags_are_exclusive() {
        let options = PopulateOptions {
            only_json: true,
            only_generate: true,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(ImportError::InvalidOptions(_))));

        let options = PopulateOptions {
            only_json: true,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_reference_year_range() {
        let options = PopulateOptions {
            reference_year: Some(1850),
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = PopulateOptions {
            reference_year: Some(2024),
            ..Default::default()
        };
        assert_eq!(options.effective_year(), 2024);
    }

    #[tokio::test]
    async fn test_settings_then_cli_override() {
        let pool = init_memory_database().await.unwrap();
        set_setting(&pool, "populate_min_alerts", 7).await.unwrap();
        set_setting(&pool, "populate_seed", 99).await.unwrap();

        let options = resolve_populate_options(
            &pool,
            &TomlConfig::default(),
            PopulateOverrides {
                seed: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(options.min_alerts, 7);
        assert_eq!(options.seed, 5);
        assert_eq!(options.min_health_values, 250);
        assert_eq!(options.health_json, PathBuf::from(DEFAULT_HEALTH_JSON));
    }

    #[tokio::test]
    async fn test_toml_paths_used_without_cli() {
        let pool = init_memory_database().await.unwrap();
        let mut toml = TomlConfig::default();
        toml.import.geo_dir = Some(PathBuf::from("/srv/geo"));

        let options = resolve_populate_options(&pool, &toml, PopulateOverrides::default())
            .await
            .unwrap();
        assert_eq!(options.geo_dir, PathBuf::from("/srv/geo"));
    }

    #[tokio::test]
    async fn test_conflicting_overrides_rejected() {
        let pool = init_memory_database().await.unwrap();
        let result = resolve_populate_options(
            &pool,
            &TomlConfig::default(),
            PopulateOverrides {
                only_json: true,
                only_generate: true,
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(result, Err(ImportError::InvalidOptions(_))));
    }
}

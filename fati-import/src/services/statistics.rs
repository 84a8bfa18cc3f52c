//! Populate run statistics
//!
//! One record per phase, each with a one-line display string, aggregated
//! into [`PopulateStatistics`] for the end-of-run report.

use crate::db::summary::VolumeSummary;
use serde::Serialize;

/// **Geography sync**
///
/// Display: "N regions (+U updated), N departments, N communes created"
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GeographySyncStats {
    /// At least one CSV was missing and nothing was read
    pub skipped: bool,
    pub regions_created: usize,
    pub regions_updated: usize,
    pub departments_created: usize,
    pub communes_created: usize,
}

impl GeographySyncStats {
    pub fn display_string(&self) -> String {
        if self.skipped {
            "skipped (CSV files missing)".to_string()
        } else {
            format!(
                "{} regions (+{} updated), {} departments, {} communes created",
                self.regions_created, self.regions_updated, self.departments_created, self.communes_created
            )
        }
    }
}

/// **Built-in region seeding**
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RegionSeedStats {
    pub regions_created: usize,
    pub regions_existing: usize,
    pub departments_created: usize,
}

impl RegionSeedStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} regions created, {} already present, {} departments created",
            self.regions_created, self.regions_existing, self.departments_created
        )
    }
}

/// **JSON import** of one sector
///
/// Display: "N values, M indicators created"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct JsonImportStats {
    /// The document was found and parsed
    pub loaded: bool,
    pub values_written: usize,
    pub indicators_created: usize,
}

impl JsonImportStats {
    pub fn display_string(&self) -> String {
        if self.loaded {
            format!("{} values, {} indicators created", self.values_written, self.indicators_created)
        } else {
            "no usable file".to_string()
        }
    }
}

/// **Synthetic fallback** of one sector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyntheticStats {
    pub values_written: usize,
    pub indicators_created: usize,
}

impl SyntheticStats {
    pub fn display_string(&self) -> String {
        format!(
            "{} generated values, {} indicators created",
            self.values_written, self.indicators_created
        )
    }
}

/// **Facility top-up**
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FacilitySeedStats {
    /// No commune exists, nothing could be placed
    pub skipped: bool,
    pub health_created: usize,
    pub education_created: usize,
}

impl FacilitySeedStats {
    pub fn display_string(&self) -> String {
        if self.skipped {
            "skipped (no communes)".to_string()
        } else {
            format!("+{} health, +{} education", self.health_created, self.education_created)
        }
    }
}

/// **User accounts**
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UserSeedStats {
    pub created: usize,
    pub reactivated: usize,
}

impl UserSeedStats {
    pub fn display_string(&self) -> String {
        format!("{} created, {} reactivated", self.created, self.reactivated)
    }
}

/// Every phase of one populate run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PopulateStatistics {
    pub geography: GeographySyncStats,
    /// `None` when JSON import was skipped (`--only-generate`)
    pub health_import: Option<JsonImportStats>,
    pub education_import: Option<JsonImportStats>,
    /// `None` when no fallback was needed or allowed
    pub health_generated: Option<SyntheticStats>,
    pub education_generated: Option<SyntheticStats>,
    pub facilities: FacilitySeedStats,
    pub users: UserSeedStats,
    pub alerts_created: usize,
    pub summary: VolumeSummary,
}

impl PopulateStatistics {
    /// Phase lines followed by the volume summary
    pub fn display_lines(&self) -> Vec<String> {
        fn optional<T>(stats: &Option<T>, show: impl Fn(&T) -> String, absent: &str) -> String {
            stats.as_ref().map(show).unwrap_or_else(|| absent.to_string())
        }

        let mut lines = vec![
            format!("Geography: {}", self.geography.display_string()),
            format!(
                "Health JSON: {}",
                optional(&self.health_import, JsonImportStats::display_string, "skipped")
            ),
            format!(
                "Education JSON: {}",
                optional(&self.education_import, JsonImportStats::display_string, "skipped")
            ),
            format!(
                "Health fallback: {}",
                optional(&self.health_generated, SyntheticStats::display_string, "not needed")
            ),
            format!(
                "Education fallback: {}",
                optional(&self.education_generated, SyntheticStats::display_string, "not needed")
            ),
            format!("Facilities: {}", self.facilities.display_string()),
            format!("Users: {}", self.users.display_string()),
            format!("Alerts: +{}", self.alerts_created),
        ];
        lines.extend(self.summary.lines());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geography_display() {
        let stats = GeographySyncStats {
            skipped: true,
            ..Default::default()
        };
        assert_eq!(stats.display_string(), "skipped (CSV files missing)");

        let stats = GeographySyncStats {
            regions_created: 14,
            regions_updated: 1,
            departments_created: 45,
            communes_created: 552,
            skipped: false,
        };
        assert_eq!(
            stats.display_string(),
            "14 regions (+1 updated), 45 departments, 552 communes created"
        );
    }

    #[test]
    fn test_json_import_display() {
        assert_eq!(JsonImportStats::default().display_string(), "no usable file");
        let stats = JsonImportStats {
            loaded: true,
            values_written: 312,
            indicators_created: 9,
        };
        assert_eq!(stats.display_string(), "312 values, 9 indicators created");
    }

    #[test]
    fn test_populate_display_lines() {
        let stats = PopulateStatistics {
            health_import: Some(JsonImportStats {
                loaded: true,
                values_written: 3,
                indicators_created: 1,
            }),
            health_generated: Some(SyntheticStats {
                values_written: 28,
                indicators_created: 4,
            }),
            alerts_created: 20,
            ..Default::default()
        };
        let lines = stats.display_lines();

        assert_eq!(lines[1], "Health JSON: 3 values, 1 indicators created");
        assert_eq!(lines[2], "Education JSON: skipped");
        assert_eq!(lines[3], "Health fallback: 28 generated values, 4 indicators created");
        assert_eq!(lines[4], "Education fallback: not needed");
        assert_eq!(lines[7], "Alerts: +20");
        assert_eq!(lines.len(), 8 + 9);
    }
}

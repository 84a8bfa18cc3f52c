//! Domain vocabulary and pure domain rules
//!
//! Each enum is stored in the database as its lowercase snake_case label.
//! The rules at the bottom of this module (derived indicator metrics, value
//! formatting, staff vacancies) are computed in Rust before rows are written.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a text-labelled enum with `as_str`, `ALL`, `Display` and `FromStr`
macro_rules! labelled_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $label:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Database label
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(Error::InvalidInput(format!(
                        "unknown {} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

labelled_enum! {
    /// Sector an indicator belongs to
    Sector {
        Health => "health",
        Education => "education",
    }
}

labelled_enum! {
    /// Thematic category of an indicator
    IndicatorCategory {
        Access => "access",
        Quality => "quality",
        Resources => "resources",
        Outcomes => "outcomes",
        Infrastructure => "infrastructure",
        Personnel => "personnel",
        Finance => "finance",
    }
}

labelled_enum! {
    /// Value type of an indicator, drives clamping and formatting
    IndicatorType {
        Number => "number",
        Percentage => "percentage",
        Ratio => "ratio",
        Currency => "currency",
        Count => "count",
    }
}

labelled_enum! {
    /// Validation status of an indicator value
    ValueStatus {
        Draft => "draft",
        Pending => "pending",
        Validated => "validated",
        Rejected => "rejected",
    }
}

labelled_enum! {
    HealthFacilityType {
        Hospital => "hospital",
        HealthCenter => "health_center",
        HealthPost => "health_post",
        Clinic => "clinic",
        Other => "other",
    }
}

labelled_enum! {
    EducationFacilityType {
        Preschool => "preschool",
        Primary => "primary",
        Secondary => "secondary",
        HighSchool => "high_school",
        University => "university",
        Vocational => "vocational",
    }
}

labelled_enum! {
    EducationLevel {
        Basic => "basic",
        Secondary => "secondary",
        Superior => "superior",
    }
}

labelled_enum! {
    StaffCategory {
        Doctor => "doctor",
        Nurse => "nurse",
        Midwife => "midwife",
        Technician => "technician",
        Admin => "admin",
        Other => "other",
    }
}

labelled_enum! {
    UserRole {
        Admin => "admin",
        Institution => "institution",
        SectorHealth => "sector_health",
        SectorEducation => "sector_education",
        LocalManager => "local_manager",
        Contributor => "contributor",
        Viewer => "viewer",
    }
}

labelled_enum! {
    UserStatus {
        Active => "active",
        Inactive => "inactive",
        Pending => "pending",
        Suspended => "suspended",
    }
}

labelled_enum! {
    AlertSeverity {
        Critical => "critical",
        High => "high",
        Medium => "medium",
        Low => "low",
        Info => "info",
    }
}

labelled_enum! {
    AlertType {
        Threshold => "threshold",
        Trend => "trend",
        Anomaly => "anomaly",
        Delay => "delay",
        Validation => "validation",
    }
}

labelled_enum! {
    /// Administrative level an indicator value is attached to
    GeoLevel {
        Commune => "commune",
        Department => "department",
        Region => "region",
        National => "national",
    }
}

/// Level of the most specific territory that is set
pub fn geographic_level(has_region: bool, has_department: bool, has_commune: bool) -> GeoLevel {
    if has_commune {
        GeoLevel::Commune
    } else if has_department {
        GeoLevel::Department
    } else if has_region {
        GeoLevel::Region
    } else {
        GeoLevel::National
    }
}

/// Metrics recomputed every time an indicator value is written
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMetrics {
    /// Percent change from the previous value
    pub variation: Option<f64>,
    /// Value as a percent of the target
    pub achievement_rate: Option<f64>,
}

impl DerivedMetrics {
    /// Compute variation and achievement rate
    ///
    /// The value's own target wins over the indicator target. Zero or
    /// missing denominators leave the metric unset.
    pub fn compute(
        value: f64,
        previous_value: Option<f64>,
        own_target: Option<f64>,
        indicator_target: Option<f64>,
    ) -> Self {
        let variation = previous_value
            .filter(|p| *p != 0.0)
            .map(|p| (value - p) / p * 100.0);

        let target = own_target.filter(|t| *t != 0.0).or(indicator_target);
        let achievement_rate = target.filter(|t| *t != 0.0).map(|t| value / t * 100.0);

        Self {
            variation,
            achievement_rate,
        }
    }
}

/// Human-readable value according to the indicator type
pub fn format_value(indicator_type: IndicatorType, value: f64, unit: &str) -> String {
    match indicator_type {
        IndicatorType::Percentage => format!("{:.1}%", value),
        IndicatorType::Ratio => format!("{:.1}{}", value, unit),
        IndicatorType::Currency => format!("{} {}", group_thousands(value), unit),
        IndicatorType::Count => group_thousands(value),
        IndicatorType::Number => format!("{:.2} {}", value, unit),
    }
}

/// Integer rendering with `,` between groups of three digits
fn group_thousands(value: f64) -> String {
    let rendered = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(rendered.len() + rendered.len() / 3);
    for (i, ch) in rendered.chars().enumerate() {
        if i > 0 && (rendered.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 && rendered != "0" {
        grouped.insert(0, '-');
    }
    grouped
}

/// Vacant posts for a staff row
pub fn staff_vacancies(total: u32, filled: u32) -> u32 {
    total.saturating_sub(filled)
}

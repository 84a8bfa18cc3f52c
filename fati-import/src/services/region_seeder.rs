//! Built-in Senegal regions for databases without boundary CSVs

use super::statistics::RegionSeedStats;
use crate::db::geography::{
    find_department_by_code, find_region_by_code, save_department, save_region, Department, Region,
};
use fati_common::Result;
use sqlx::{Pool, Sqlite};

/// One built-in region: code, name, population, centroid (lon, lat)
struct RegionSeed {
    code: &'static str,
    name: &'static str,
    population: i64,
    centroid: (f64, f64),
}

const REGIONS: &[RegionSeed] = &[
    RegionSeed { code: "DK", name: "Dakar", population: 4_042_225, centroid: (-17.4677, 14.7167) },
    RegionSeed { code: "ZL", name: "Ziguinchor", population: 549_151, centroid: (-16.2667, 12.5833) },
    RegionSeed { code: "DB", name: "Diourbel", population: 1_842_255, centroid: (-16.2333, 14.6603) },
    RegionSeed { code: "SF", name: "Saint-Louis", population: 1_020_335, centroid: (-16.5, 16.0333) },
    RegionSeed { code: "TC", name: "Tambacounda", population: 807_912, centroid: (-13.6667, 13.7667) },
    RegionSeed { code: "KA", name: "Kaolack", population: 1_198_662, centroid: (-16.0667, 14.15) },
    RegionSeed { code: "TH", name: "Thiès", population: 2_238_861, centroid: (-16.9333, 14.7833) },
    RegionSeed { code: "LG", name: "Louga", population: 1_089_059, centroid: (-15.6167, 15.6167) },
    RegionSeed { code: "FA", name: "Fatick", population: 959_702, centroid: (-16.4167, 14.2833) },
    RegionSeed { code: "KE", name: "Kolda", population: 803_817, centroid: (-14.95, 12.8833) },
    RegionSeed { code: "MT", name: "Matam", population: 706_699, centroid: (-13.6333, 15.6167) },
    RegionSeed { code: "KN", name: "Kaffrine", population: 722_464, centroid: (-15.55, 14.1) },
    RegionSeed { code: "KD", name: "Kédougou", population: 181_520, centroid: (-12.1833, 12.55) },
    RegionSeed { code: "SE", name: "Sédhiou", population: 553_041, centroid: (-15.55, 12.7) },
];

/// Sample departments of the Dakar region: code, name, population
const DAKAR_DEPARTMENTS: &[(&str, &str, i64)] = &[
    ("DK01", "Dakar", 1_200_000),
    ("DK02", "Pikine", 1_300_000),
    ("DK03", "Guédiawaye", 400_000),
    ("DK04", "Rufisque", 600_000),
];

/// Get-or-create the built-in regions, keyed by code
pub struct RegionSeeder {
    db: Pool<Sqlite>,
}

impl RegionSeeder {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    pub async fn seed(&self) -> Result<RegionSeedStats> {
        let mut stats = RegionSeedStats::default();

        for seed in REGIONS {
            if find_region_by_code(&self.db, seed.code).await?.is_some() {
                tracing::debug!(code = seed.code, "Region already present");
                stats.regions_existing += 1;
                continue;
            }

            let mut region = Region::new(seed.code, seed.name, Some(seed.population));
            region.centroid = Some(seed.centroid);
            save_region(&self.db, &region).await?;
            tracing::debug!(code = seed.code, name = seed.name, "Region created");
            stats.regions_created += 1;
        }

        if let Some(dakar) = find_region_by_code(&self.db, "DK").await? {
            for (code, name, population) in DAKAR_DEPARTMENTS {
                if find_department_by_code(&self.db, code).await?.is_some() {
                    continue;
                }
                let mut department = Department::new(*code, *name, dakar.guid);
                department.population = Some(*population);
                save_department(&self.db, &department).await?;
                stats.departments_created += 1;
            }
        }

        tracing::info!(
            created = stats.regions_created,
            existing = stats.regions_existing,
            departments = stats.departments_created,
            "Regions seeded"
        );
        Ok(stats)
    }
}

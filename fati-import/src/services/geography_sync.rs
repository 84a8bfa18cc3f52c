//! Geography synchronization from administrative boundary CSV exports
//!
//! Reads three files from one directory:
//! - `SEN_adm1.csv` (`;`-delimited): `NAME_1`, `Pop`, `ID_region`
//! - `SEN_adm2.csv` (`,`): `NAME_1`, `NAME_2`, `ID_2`
//! - `SEN_adm3.csv` (`,`): `NAME_2`, `NAME_3`, `ID_3`
//!
//! Existing rows are matched by case-insensitive name and never duplicated.
//! New rows get codes `R01`, `D001`, `C0001` derived from the file ids.

use super::statistics::GeographySyncStats;
use crate::codes::unique_code;
use crate::db::geography::{
    commune_exists, find_department_by_name, find_region_by_name, save_commune, save_department,
    save_region, taken_codes, update_region_population, Commune, Department, GeoTable, Region,
};
use crate::error::ImportResult;
use crate::parsing::parse_int_str;
use sqlx::{Pool, Sqlite};
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub const REGIONS_FILE: &str = "SEN_adm1.csv";
pub const DEPARTMENTS_FILE: &str = "SEN_adm2.csv";
pub const COMMUNES_FILE: &str = "SEN_adm3.csv";

/// One CSV record keyed by header
pub type CsvRow = HashMap<String, String>;

/// Decode file bytes: UTF-8 (with or without BOM), else Latin-1
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
        Err(_) => {
            tracing::debug!("CSV is not UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}

/// Read every record of a delimited file
pub fn read_csv_rows(path: &Path, delimiter: u8) -> ImportResult<Vec<CsvRow>> {
    let bytes = std::fs::read(path)?;
    let text = decode_text(&bytes);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), v.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

fn field<'a>(row: &'a CsvRow, key: &str) -> &'a str {
    row.get(key).map(|s| s.trim()).unwrap_or("")
}

fn file_id(row: &CsvRow, key: &str) -> i64 {
    parse_int_str(field(row, key)).unwrap_or(0)
}

/// CSV → regions/departments/communes synchronizer
pub struct GeographySync {
    db: Pool<Sqlite>,
}

impl GeographySync {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Synchronize all three levels from `geo_dir`
    ///
    /// Missing files skip the whole sync with a warning.
    pub async fn sync(&self, geo_dir: &Path) -> ImportResult<GeographySyncStats> {
        let regions_csv = geo_dir.join(REGIONS_FILE);
        let departments_csv = geo_dir.join(DEPARTMENTS_FILE);
        let communes_csv = geo_dir.join(COMMUNES_FILE);

        let missing: Vec<_> = [&regions_csv, &departments_csv, &communes_csv]
            .into_iter()
            .filter(|p| !p.exists())
            .collect();
        if !missing.is_empty() {
            for path in missing {
                tracing::warn!("Geography CSV not found: {}", path.display());
            }
            tracing::warn!("Geography synchronization skipped");
            return Ok(GeographySyncStats {
                skipped: true,
                ..Default::default()
            });
        }

        let mut stats = GeographySyncStats::default();

        let rows = read_csv_rows(&regions_csv, b';')?;
        self.sync_regions(&rows, &mut stats).await?;

        let rows = read_csv_rows(&departments_csv, b',')?;
        self.sync_departments(&rows, &mut stats).await?;

        let rows = read_csv_rows(&communes_csv, b',')?;
        self.sync_communes(&rows, &mut stats).await?;

        tracing::info!(
            regions = stats.regions_created,
            departments = stats.departments_created,
            communes = stats.communes_created,
            "Geography synchronized"
        );
        Ok(stats)
    }

    async fn sync_regions(&self, rows: &[CsvRow], stats: &mut GeographySyncStats) -> ImportResult<()> {
        let mut taken: HashSet<String> = taken_codes(&self.db, GeoTable::Regions).await?;

        for row in rows {
            let name = field(row, "NAME_1");
            if name.is_empty() {
                continue;
            }
            let population = parse_int_str(field(row, "Pop"));

            if let Some(region) = find_region_by_name(&self.db, name).await? {
                if let Some(pop) = population.filter(|p| *p != 0) {
                    if region.population != Some(pop) {
                        update_region_population(&self.db, region.guid, pop).await?;
                        stats.regions_updated += 1;
                    }
                }
                continue;
            }

            let code = unique_code(&format!("R{:02}", file_id(row, "ID_region")), |c| taken.contains(c));
            let region = Region::new(code.clone(), name, population);
            save_region(&self.db, &region).await?;
            taken.insert(code);
            stats.regions_created += 1;
        }
        Ok(())
    }

    async fn sync_departments(&self, rows: &[CsvRow], stats: &mut GeographySyncStats) -> ImportResult<()> {
        let mut taken = taken_codes(&self.db, GeoTable::Departments).await?;

        for row in rows {
            let region_name = field(row, "NAME_1");
            let name = field(row, "NAME_2");
            if region_name.is_empty() || name.is_empty() {
                continue;
            }

            let Some(region) = find_region_by_name(&self.db, region_name).await? else {
                tracing::debug!(region = %region_name, department = %name, "Unknown region, department skipped");
                continue;
            };
            if find_department_by_name(&self.db, name, Some(region.guid)).await?.is_some() {
                continue;
            }

            let code = unique_code(&format!("D{:03}", file_id(row, "ID_2")), |c| taken.contains(c));
            save_department(&self.db, &Department::new(code.clone(), name, region.guid)).await?;
            taken.insert(code);
            stats.departments_created += 1;
        }
        Ok(())
    }

    async fn sync_communes(&self, rows: &[CsvRow], stats: &mut GeographySyncStats) -> ImportResult<()> {
        let mut taken = taken_codes(&self.db, GeoTable::Communes).await?;

        for row in rows {
            let department_name = field(row, "NAME_2");
            let name = field(row, "NAME_3");
            if department_name.is_empty() || name.is_empty() {
                continue;
            }

            let Some(department) = find_department_by_name(&self.db, department_name, None).await? else {
                tracing::debug!(department = %department_name, commune = %name, "Unknown department, commune skipped");
                continue;
            };
            if commune_exists(&self.db, name, department.guid).await? {
                continue;
            }

            let code = unique_code(&format!("C{:04}", file_id(row, "ID_3")), |c| taken.contains(c));
            save_commune(&self.db, &Commune::new(code.clone(), name, department.guid)).await?;
            taken.insert(code);
            stats.communes_created += 1;
        }
        Ok(())
    }
}

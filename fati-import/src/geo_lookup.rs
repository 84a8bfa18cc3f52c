//! Resolution of free-text territory labels
//!
//! Spreadsheet rows name their territory in free text ("ST LOUIS",
//! "Région de Thiès", "Pikine"). [`GeoLookup`] maps such a label to at most
//! one department or region, never a commune.
//!
//! Resolution order:
//! 1. empty labels and national aggregates (SENEGAL, TOTAL, NATIONAL) → none
//! 2. exact department name
//! 3. exact region name (aliases included)
//! 4. substring containment either way, departments first
//! 5. Jaro-Winkler similarity ≥ [`APPROXIMATE_THRESHOLD`], departments first

use crate::db::geography::{Department, Region, TerritoryRef};
use crate::parsing::normalize_opt;
use std::collections::HashMap;
use uuid::Uuid;

/// Minimum Jaro-Winkler similarity for an approximate match
pub const APPROXIMATE_THRESHOLD: f64 = 0.92;

/// Labels shorter than this never match approximately
const APPROXIMATE_MIN_LEN: usize = 4;

const NATIONAL_LABELS: &[&str] = &["SENEGAL", "TOTAL", "NATIONAL"];

/// Alternative spellings found in the exports → region name
const REGION_ALIASES: &[(&str, &str)] = &[("ST LOUIS", "SAINT LOUIS")];

/// Insertion-ordered map from normalized name to record id
///
/// Re-inserting a key replaces its value but keeps its first position, so
/// the substring pass scans names in their original order.
#[derive(Debug, Default)]
struct NameIndex {
    entries: Vec<(String, Uuid)>,
    positions: HashMap<String, usize>,
}

impl NameIndex {
    fn insert(&mut self, key: String, id: Uuid) {
        if key.is_empty() {
            return;
        }
        match self.positions.get(&key) {
            Some(&pos) => self.entries[pos].1 = id,
            None => {
                self.positions.insert(key.clone(), self.entries.len());
                self.entries.push((key, id));
            }
        }
    }

    fn get(&self, key: &str) -> Option<Uuid> {
        self.positions.get(key).map(|&pos| self.entries[pos].1)
    }

    fn find_containing(&self, label: &str) -> Option<Uuid> {
        self.entries
            .iter()
            .find(|(key, _)| key.contains(label) || label.contains(key.as_str()))
            .map(|(_, id)| *id)
    }

    /// Most similar key at or above the threshold; earlier keys win ties
    fn find_similar(&self, label: &str) -> Option<(Uuid, f64)> {
        let mut best: Option<(Uuid, f64)> = None;
        for (key, id) in &self.entries {
            let score = strsim::jaro_winkler(key, label);
            if score >= APPROXIMATE_THRESHOLD && best.map_or(true, |(_, s)| score > s) {
                best = Some((*id, score));
            }
        }
        best
    }
}

/// Label → territory resolver built once per populate run
#[derive(Debug, Default)]
pub struct GeoLookup {
    regions: NameIndex,
    departments: NameIndex,
}

impl GeoLookup {
    /// Build from regions and departments, each in name order
    pub fn new(regions: &[Region], departments: &[Department]) -> Self {
        let mut lookup = Self::default();

        for region in regions {
            lookup.regions.insert(normalize_opt(Some(&region.name)), region.guid);
        }
        for department in departments {
            lookup
                .departments
                .insert(normalize_opt(Some(&department.name)), department.guid);
        }

        for (alias, target) in REGION_ALIASES {
            if let Some(id) = lookup.regions.get(target) {
                lookup.regions.insert(alias.to_string(), id);
            }
        }

        tracing::debug!(
            regions = lookup.regions.entries.len(),
            departments = lookup.departments.entries.len(),
            "Geographic lookup built"
        );
        lookup
    }

    pub fn is_empty(&self) -> bool {
        self.regions.entries.is_empty() && self.departments.entries.is_empty()
    }

    /// Territory for a raw label, `None` when nothing matches
    pub fn resolve(&self, raw_label: Option<&str>) -> Option<TerritoryRef> {
        let label = normalize_opt(raw_label);
        if label.is_empty() || NATIONAL_LABELS.contains(&label.as_str()) {
            return None;
        }

        if let Some(id) = self.departments.get(&label) {
            return Some(TerritoryRef::department(id));
        }
        if let Some(id) = self.regions.get(&label) {
            return Some(TerritoryRef::region(id));
        }

        if let Some(id) = self.departments.find_containing(&label) {
            return Some(TerritoryRef::department(id));
        }
        if let Some(id) = self.regions.find_containing(&label) {
            return Some(TerritoryRef::region(id));
        }

        if label.chars().count() < APPROXIMATE_MIN_LEN {
            return None;
        }
        if let Some((id, score)) = self.departments.find_similar(&label) {
            tracing::debug!(label = %label, score, "Approximate department match");
            return Some(TerritoryRef::department(id));
        }
        if let Some((id, score)) = self.regions.find_similar(&label) {
            tracing::debug!(label = %label, score, "Approximate region match");
            return Some(TerritoryRef::region(id));
        }

        None
    }

    /// [`GeoLookup::resolve`], falling back to national
    pub fn resolve_or_national(&self, raw_label: Option<&str>) -> TerritoryRef {
        self.resolve(raw_label).unwrap_or_else(TerritoryRef::national)
    }
}

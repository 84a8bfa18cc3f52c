//! Year columns and education indicator headers

use super::number::parse_number;
use super::cell_text;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static YEAR_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(19|20)\d{2}$").expect("static pattern"));
static YEAR_ANYWHERE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(19|20)\d{2}").expect("static pattern"));
static INDICATOR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)indicateurs?\s*:\s*([^,]+)").expect("static pattern"));
static INDICATOR_UNIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)unit[ée]?\s*:\s*([^,]+)").expect("static pattern"));

/// `(year, value)` pairs from columns named exactly like a year
///
/// Cells that do not parse as a number are left out. Row order is kept.
pub fn extract_year_values(row: &Map<String, Value>) -> Vec<(i32, f64)> {
    row.iter()
        .filter_map(|(key, cell)| {
            let key = key.trim();
            if !YEAR_KEY.is_match(key) {
                return None;
            }
            let year = key.parse::<i32>().ok()?;
            parse_number(cell).map(|value| (year, value))
        })
        .collect()
}

/// Column name → year for an education "période" row
///
/// Each non-null cell contributes the first `19xx`/`20xx` found in its text.
pub fn extract_year_map(row: &Map<String, Value>) -> Vec<(String, i32)> {
    row.iter()
        .filter(|(_, cell)| !cell.is_null())
        .filter_map(|(column, cell)| {
            let text = cell_text(cell);
            let year = YEAR_ANYWHERE.find(&text)?.as_str().parse::<i32>().ok()?;
            Some((column.clone(), year))
        })
        .collect()
}

/// Indicator name and unit from an education header line
///
/// `"Fréquence : annuelle, Indicateur : Taux brut, Unité : %"` yields
/// `("Taux brut", "%")`. Without an `indicateur:` part the whole trimmed
/// text is the name; without a `unité:` part the unit is empty.
pub fn parse_education_indicator_line(text: &str) -> (String, String) {
    let name = INDICATOR_NAME
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| text.trim().to_string());

    let unit = INDICATOR_UNIT
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    (name, unit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_extract_year_values_keeps_order_and_skips_blanks() {
        let r = row(json!({
            "Période": "Dakar",
            "2019": "12,5",
            " 2020 ": 13,
            "2021": "-",
            "1899": 4,
            "2022a": 5,
            "2018": null
        }));
        assert_eq!(extract_year_values(&r), vec![(2019, 12.5), (2020, 13.0)]);
    }

    #[test]
    fn test_extract_year_map_searches_cell_text() {
        let r = row(json!({
            "Unnamed: 0": "PERIODE",
            "Unnamed: 1": "Année 2019-2020",
            "Unnamed: 2": 2021,
            "Unnamed: 3": null,
            "Unnamed: 4": "total"
        }));
        assert_eq!(
            extract_year_map(&r),
            vec![("Unnamed: 1".to_string(), 2019), ("Unnamed: 2".to_string(), 2021)]
        );
    }

    #[test]
    fn test_parse_education_indicator_line() {
        let (name, unit) =
            parse_education_indicator_line("Fréquence : annuelle, Indicateur : Taux brut de scolarisation, Unité : %");
        assert_eq!(name, "Taux brut de scolarisation");
        assert_eq!(unit, "%");

        let (name, unit) = parse_education_indicator_line("INDICATEURS: Effectif des élèves");
        assert_eq!(name, "Effectif des élèves");
        assert_eq!(unit, "");
    }

    #[test]
    fn test_parse_education_indicator_line_without_markers() {
        let (name, unit) = parse_education_indicator_line("  Fréquence annuelle  ");
        assert_eq!(name, "Fréquence annuelle");
        assert_eq!(unit, "");
    }
}

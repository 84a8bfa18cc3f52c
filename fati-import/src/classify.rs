//! Text heuristics for indicator rows
//!
//! Every check runs on [`normalize`]d text, so accents and punctuation
//! never matter. Rule order is significant: the first match wins.

use crate::parsing::normalize;
use fati_common::models::{IndicatorCategory, IndicatorType, Sector};

const HEADER_PATTERNS: &[&str] = &[
    "PRINCIPAUX INDICATEURS",
    "DECOUPAGE ADMINISTRATIF",
    "ETABLISSEMENTS DE SANTE",
    "INDICATEURS",
];

const EDUCATION_META_PREFIXES: &[&str] = &[
    "STATUT", "CYCLES", "NIVEAU", "MILIEU", "SEXE", "ACADEMIES", "IA",
];

const HEALTH_CATEGORY_RULES: &[(&[&str], IndicatorCategory)] = &[
    (&["DEPENSE", "BUDGET", "FINANCE"], IndicatorCategory::Finance),
    (&["PERSONNEL", "SOIGNANT", "MEDECIN", "SAGE FEMME"], IndicatorCategory::Personnel),
    (
        &["LIT", "ETABLISSEMENT", "HOPITAL", "CENTRE", "POSTE", "INFRA"],
        IndicatorCategory::Infrastructure,
    ),
    (&["MORTAL", "PREVALENCE", "DECES", "RESULTAT"], IndicatorCategory::Outcomes),
    (&["ACCES", "COUVERTURE", "CONSULTATION", "VACCIN"], IndicatorCategory::Access),
];

const EDUCATION_CATEGORY_RULES: &[(&[&str], IndicatorCategory)] = &[
    (&["RESULTAT", "REUSSITE", "ADMIS", "EXAMEN"], IndicatorCategory::Outcomes),
    (&["ETABLISSEMENT", "CLASSE", "SALLE", "INFRA"], IndicatorCategory::Infrastructure),
    (&["ENSEIGNANT", "PERSONNEL", "MAITRE"], IndicatorCategory::Personnel),
    (&["SCOLAR", "INSCRIPTION", "ACCES"], IndicatorCategory::Access),
    (&["RATIO", "QUALITE"], IndicatorCategory::Quality),
];

const RATIO_UNITS: &[&str] = &["PER 1000", "1000", "POUR 1000"];

fn contains_any(text: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| text.contains(t))
}

/// Section titles and table headers that sit in the indicator column
pub fn looks_like_header(indicator_name: &str) -> bool {
    let normalized = normalize(indicator_name);
    normalized.len() < 3 || contains_any(&normalized, HEADER_PATTERNS)
}

/// Breakdown rows in education sheets (status, cycle, gender, ...)
///
/// Takes text that is already normalized.
pub fn is_education_meta_row(normalized: &str) -> bool {
    EDUCATION_META_PREFIXES.iter().any(|p| normalized.starts_with(p))
}

/// Category from the group, sheet and indicator name
pub fn guess_category(
    sector: Sector,
    group_key: &str,
    sheet_name: &str,
    indicator_name: &str,
) -> IndicatorCategory {
    let text = normalize(&format!("{} {} {}", group_key, sheet_name, indicator_name));
    let rules = match sector {
        Sector::Health => HEALTH_CATEGORY_RULES,
        Sector::Education => EDUCATION_CATEGORY_RULES,
    };

    rules
        .iter()
        .find(|(tokens, _)| contains_any(&text, tokens))
        .map(|(_, category)| *category)
        .unwrap_or(IndicatorCategory::Resources)
}

/// Value type from the unit and indicator name
pub fn guess_type(unit: &str, indicator_name: &str) -> IndicatorType {
    let text = normalize(&format!("{} {}", unit, indicator_name));
    let unit_norm = normalize(unit);

    if unit.contains('%') || contains_any(&text, &["TAUX", "POURCENT"]) {
        IndicatorType::Percentage
    } else if text.contains("RATIO") || RATIO_UNITS.contains(&unit_norm.as_str()) {
        IndicatorType::Ratio
    } else if contains_any(&text, &["BUDGET", "DEPENSE", "COUT", "FCFA"]) {
        IndicatorType::Currency
    } else if contains_any(&text, &["NOMBRE", "EFFECTIF", "NB", "ETABLISSEMENT"]) {
        IndicatorType::Count
    } else {
        IndicatorType::Number
    }
}

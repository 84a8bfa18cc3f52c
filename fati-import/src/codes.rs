//! Code generation for indicators, territories and facilities

use fati_common::models::Sector;
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

/// Maximum length of an indicator code
pub const MAX_CODE_LEN: usize = 50;

/// URL-style slug: ASCII, lowercase, words joined by `-`
pub fn slugify(s: &str) -> String {
    let ascii: String = s
        .nfkd()
        .filter(char::is_ascii)
        .collect::<String>()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();

    let mut slug = String::with_capacity(ascii.len());
    let mut in_separator = false;
    for c in ascii.chars() {
        if c == '-' || c.is_whitespace() {
            if !in_separator {
                slug.push('-');
                in_separator = true;
            }
        } else {
            slug.push(c);
            in_separator = false;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

/// Indicator code from its provenance and name
///
/// Always non-empty, at most [`MAX_CODE_LEN`] chars of `[A-Z0-9_]`.
pub fn build_indicator_code(
    sector: Sector,
    group_key: &str,
    sheet_name: &str,
    indicator_name: &str,
) -> String {
    let raw = format!("{}_{}_{}_{}", sector, group_key, sheet_name, indicator_name);
    let token: String = slugify(&raw)
        .replace('-', "_")
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || *c == '_')
        .collect();

    if token.is_empty() {
        return fallback_code(sector);
    }
    token.chars().take(MAX_CODE_LEN).collect()
}

fn fallback_code(sector: Sector) -> String {
    let prefix: String = sector.as_str().chars().take(3).collect();
    format!("{}_IND", prefix.to_uppercase())
}

/// Alternative code for a name whose natural code belongs to another indicator
///
/// The suffix depends only on the name and the attempt number, so a re-run
/// produces the same code for the same name.
pub fn collision_code(base: &str, name: &str, attempt: u32) -> String {
    let digest = Sha256::digest(name.as_bytes());
    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    let bucket = u64::from_be_bytes(head) % 1000;

    let suffix = if attempt == 0 {
        format!("_{:03}", bucket)
    } else {
        format!("_{:03}_{}", bucket, attempt)
    };

    let keep = MAX_CODE_LEN.saturating_sub(suffix.len());
    let truncated: String = base.chars().take(keep).collect();
    format!("{}{}", truncated, suffix)
}

/// `base`, or the first free `base_1`, `base_2`, ...
pub fn unique_code(base: &str, is_taken: impl Fn(&str) -> bool) -> String {
    if !is_taken(base) {
        return base.to_string();
    }
    (1u32..)
        .map(|idx| format!("{}_{}", base, idx))
        .find(|code| !is_taken(code))
        .unwrap_or_else(|| base.to_string())
}

/// First free `PREFIX-0001`, `PREFIX-0002`, ...
pub fn next_sequential_code(prefix: &str, is_taken: impl Fn(&str) -> bool) -> String {
    (1u32..)
        .map(|idx| format!("{}-{:04}", prefix, idx))
        .find(|code| !is_taken(code))
        .unwrap_or_else(|| format!("{}-0000", prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn is_code(s: &str) -> bool {
        !s.is_empty()
            && s.len() <= MAX_CODE_LEN
            && s.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Taux de réussite (%)"), "taux-de-reussite");
        assert_eq!(slugify("  --Hello   World--  "), "hello-world");
        assert_eq!(slugify("a_b - c"), "a_b-c");
        assert_eq!(slugify("Œuvre"), "uvre");
    }

    #[test]
    fn test_build_indicator_code() {
        let code = build_indicator_code(Sector::Health, "Santé", "Feuil1", "Taux de couverture");
        assert_eq!(code, "HEALTH_SANTE_FEUIL1_TAUX_DE_COUVERTURE");
        assert!(is_code(&code));
    }

    #[test]
    fn test_build_indicator_code_truncates() {
        let long = "indicateur ".repeat(20);
        let code = build_indicator_code(Sector::Education, "g", "s", &long);
        assert_eq!(code.len(), MAX_CODE_LEN);
        assert!(is_code(&code));
    }

    #[test]
    fn test_fallback_code() {
        assert_eq!(fallback_code(Sector::Health), "HEA_IND");
        assert_eq!(fallback_code(Sector::Education), "EDU_IND");
    }

    #[test]
    fn test_collision_code_is_deterministic_and_bounded() {
        let base = "X".repeat(MAX_CODE_LEN);
        let first = collision_code(&base, "Nom", 0);
        assert_eq!(first, collision_code(&base, "Nom", 0));
        assert_eq!(first.len(), MAX_CODE_LEN);
        assert!(is_code(&first));

        let second = collision_code(&base, "Nom", 1);
        assert_ne!(first, second);
        assert!(second.len() <= MAX_CODE_LEN);
        assert!(is_code(&second));
    }

    #[test]
    fn test_unique_code() {
        let taken: HashSet<String> = ["R01", "R01_1"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unique_code("R02", |c| taken.contains(c)), "R02");
        assert_eq!(unique_code("R01", |c| taken.contains(c)), "R01_2");
    }

    #[test]
    fn test_next_sequential_code() {
        let taken: HashSet<String> = ["HS-0001", "HS-0003"].iter().map(|s| s.to_string()).collect();
        assert_eq!(next_sequential_code("HS", |c| taken.contains(c)), "HS-0002");
        assert_eq!(next_sequential_code("ED", |_| false), "ED-0001");
    }
}

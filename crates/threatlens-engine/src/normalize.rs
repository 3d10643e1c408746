//! Product identifier normalization and version comparison
//!
//! Canonicalizes vendor/product/version strings from both the
//! vulnerability record and the asset inventory into a comparable form.
//! Normalization never fails: unparsable input degrades to opaque-token
//! matching instead of raising.

use std::cmp::Ordering;
use threatlens_core::VersionConstraint;

/// A normalized (vendor, product) pair used by the matching relation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProductKey {
    pub vendor: String,
    pub product: String,
}

/// Normalize raw vendor and product strings into a `ProductKey`
pub fn normalize_product(raw_vendor: &str, raw_product: &str) -> ProductKey {
    ProductKey {
        vendor: normalize_token(raw_vendor),
        product: normalize_token(raw_product),
    }
}

/// Lower-case a token and collapse separator runs (`_`, `-`, `.`,
/// whitespace) into a single `_`, trimming at both ends.
pub fn normalize_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;

    for c in raw.trim().chars() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            pending_sep = !out.is_empty();
        } else {
            if pending_sep {
                out.push('_');
                pending_sep = false;
            }
            out.extend(c.to_lowercase());
        }
    }

    out
}

/// Whether a version string follows dotted-numeric convention and can be
/// compared ordinally. Anything else is an opaque token.
pub fn is_comparable_version(version: &str) -> bool {
    version
        .trim()
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

/// Test an asset's installed version against an affected-version constraint
pub fn version_matches(asset_version: &str, constraint: &VersionConstraint) -> bool {
    let asset_version = asset_version.trim();

    match constraint {
        VersionConstraint::Any => true,
        VersionConstraint::Exact(wanted) => {
            let wanted = wanted.trim();
            if is_comparable_version(asset_version) && is_comparable_version(wanted) {
                compare_versions(asset_version, wanted) == Ordering::Equal
            } else {
                // Opaque tokens only match via exact string equality
                asset_version.eq_ignore_ascii_case(wanted)
            }
        }
        VersionConstraint::Range {
            start,
            start_inclusive,
            end,
            end_inclusive,
        } => {
            // An opaque version cannot be placed in a range; fail closed
            if !is_comparable_version(asset_version) {
                return false;
            }

            if let Some(start) = start {
                let cmp = compare_versions(asset_version, start);
                if *start_inclusive {
                    if cmp == Ordering::Less {
                        return false;
                    }
                } else if cmp != Ordering::Greater {
                    return false;
                }
            }

            if let Some(end) = end {
                let cmp = compare_versions(asset_version, end);
                if *end_inclusive {
                    if cmp == Ordering::Greater {
                        return false;
                    }
                } else if cmp != Ordering::Less {
                    return false;
                }
            }

            true
        }
    }
}

/// Compare two dotted version strings.
///
/// Segments are compared numerically where possible; alphabetic segments
/// (e.g. the "p1" in "8.9p1") compare lexically and sort after numerics.
/// Missing trailing segments are treated as zero, so "1.0" == "1.0.0".
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = version_parts(a);
    let b_parts = version_parts(b);
    let len = a_parts.len().max(b_parts.len());

    for i in 0..len {
        let a_part = a_parts.get(i).cloned().unwrap_or(VersionPart::Number(0));
        let b_part = b_parts.get(i).cloned().unwrap_or(VersionPart::Number(0));

        let ord = match (a_part, b_part) {
            (VersionPart::Number(x), VersionPart::Number(y)) => x.cmp(&y),
            (VersionPart::Text(x), VersionPart::Text(y)) => x.cmp(&y),
            (VersionPart::Number(_), VersionPart::Text(_)) => Ordering::Less,
            (VersionPart::Text(_), VersionPart::Number(_)) => Ordering::Greater,
        };

        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

#[derive(Debug, Clone)]
enum VersionPart {
    Number(u64),
    Text(String),
}

fn version_parts(version: &str) -> Vec<VersionPart> {
    let mut parts = Vec::new();
    let mut digits = String::new();
    let mut alpha = String::new();

    let mut flush_digits = |digits: &mut String, parts: &mut Vec<VersionPart>| {
        if !digits.is_empty() {
            if let Ok(n) = digits.parse::<u64>() {
                parts.push(VersionPart::Number(n));
            }
            digits.clear();
        }
    };

    for c in version.trim().chars() {
        if c.is_ascii_digit() {
            if !alpha.is_empty() {
                parts.push(VersionPart::Text(std::mem::take(&mut alpha)));
            }
            digits.push(c);
        } else if c.is_alphabetic() {
            flush_digits(&mut digits, &mut parts);
            alpha.extend(c.to_lowercase());
        } else {
            flush_digits(&mut digits, &mut parts);
            if !alpha.is_empty() {
                parts.push(VersionPart::Text(std::mem::take(&mut alpha)));
            }
        }
    }

    flush_digits(&mut digits, &mut parts);
    if !alpha.is_empty() {
        parts.push(VersionPart::Text(alpha));
    }

    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_token_separators() {
        assert_eq!(normalize_token("Microsoft"), "microsoft");
        assert_eq!(normalize_token("http_server"), "http_server");
        assert_eq!(normalize_token("HTTP-Server"), "http_server");
        assert_eq!(normalize_token("http server"), "http_server");
        assert_eq!(normalize_token("http.server"), "http_server");
        assert_eq!(normalize_token("  _spark-core_  "), "spark_core");
    }

    #[test]
    fn test_normalize_never_fails() {
        assert_eq!(normalize_token(""), "");
        assert_eq!(normalize_token("---"), "");
        assert_eq!(normalize_token("_._"), "");
    }

    #[test]
    fn test_separator_variants_are_equivalent() {
        let variants = ["Http Server", "http-server", "HTTP_SERVER", "http.server"];
        let keys: Vec<_> = variants
            .iter()
            .map(|v| normalize_product("apache", v))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_compare_versions() {
        assert_eq!(compare_versions("1.0", "1.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
        assert_eq!(compare_versions("1.0", "2.0"), Ordering::Less);
        assert_eq!(compare_versions("1.10", "1.9"), Ordering::Greater);
        assert_eq!(compare_versions("2.14.1", "2.17.0"), Ordering::Less);
        assert_eq!(compare_versions("8.9p1", "8.9p2"), Ordering::Less);
    }

    #[test]
    fn test_exact_match_numeric_and_opaque() {
        let exact = VersionConstraint::Exact("2019".into());
        assert!(version_matches("2019", &exact));
        assert!(version_matches("2019.0", &exact));
        assert!(!version_matches("2016", &exact));

        let opaque = VersionConstraint::Exact("rolling".into());
        assert!(version_matches("Rolling", &opaque));
        assert!(!version_matches("stable", &opaque));
    }

    #[test]
    fn test_range_match() {
        let range = VersionConstraint::between("2.0", "2.17.0");
        assert!(version_matches("2.14.1", &range));
        assert!(version_matches("2.0", &range));
        assert!(!version_matches("2.17.0", &range));
        assert!(!version_matches("1.9", &range));
        // Opaque versions fail closed against ranges
        assert!(!version_matches("unknown", &range));
    }

    #[test]
    fn test_no_constraint_matches_all() {
        assert!(version_matches("9.9.9", &VersionConstraint::Any));
        assert!(version_matches("", &VersionConstraint::Any));
    }
}

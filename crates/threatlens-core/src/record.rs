//! Vulnerability records and their affected-product identifiers

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A CVE record as fetched from a vulnerability registry.
///
/// Immutable once fetched; constructed per assessment request and
/// discarded at the end of the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    /// Canonical identifier (`CVE-YYYY-NNNN`)
    pub cve_id: String,

    /// English-language description
    pub description: String,

    /// CVSS v3 base score (0.0-10.0), if the registry published one
    pub cvss_score: Option<f32>,

    /// Severity label derived from the score
    pub severity: Severity,

    /// Weakness classification identifiers (CWE)
    #[serde(default)]
    pub cwe_ids: Vec<String>,

    /// Affected-product identifiers, in registry order
    #[serde(default)]
    pub affected: Vec<AffectedProduct>,

    /// Publication date as reported by the registry
    #[serde(default)]
    pub published: Option<String>,
}

impl VulnerabilityRecord {
    pub fn new(cve_id: impl Into<String>) -> Self {
        Self {
            cve_id: cve_id.into(),
            description: String::new(),
            cvss_score: None,
            severity: Severity::Low,
            cwe_ids: Vec::new(),
            affected: Vec::new(),
            published: None,
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_cvss(mut self, score: f32) -> Self {
        self.cvss_score = Some(score);
        self.severity = Severity::from_cvss(score);
        self
    }

    pub fn with_affected(mut self, product: AffectedProduct) -> Self {
        self.affected.push(product);
        self
    }
}

/// A (vendor, product, version-constraint) triple from a vulnerability record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AffectedProduct {
    pub vendor: String,
    pub product: String,
    #[serde(default)]
    pub versions: VersionConstraint,
}

impl AffectedProduct {
    pub fn new(vendor: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            product: product.into(),
            versions: VersionConstraint::Any,
        }
    }

    pub fn exact(
        vendor: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            vendor: vendor.into(),
            product: product.into(),
            versions: VersionConstraint::Exact(version.into()),
        }
    }

    pub fn with_versions(mut self, versions: VersionConstraint) -> Self {
        self.versions = versions;
        self
    }
}

/// The version portion of an affected-product identifier.
///
/// No constraint means "all versions" per the matching relation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionConstraint {
    /// All versions are affected
    #[default]
    Any,
    /// A single affected version
    Exact(String),
    /// A bounded version range
    Range {
        start: Option<String>,
        start_inclusive: bool,
        end: Option<String>,
        end_inclusive: bool,
    },
}

impl VersionConstraint {
    /// Range for ">= start AND < end"
    pub fn between(start: &str, end: &str) -> Self {
        VersionConstraint::Range {
            start: Some(start.to_string()),
            start_inclusive: true,
            end: Some(end.to_string()),
            end_inclusive: false,
        }
    }

    /// Range for "< end"
    pub fn less_than(end: &str) -> Self {
        VersionConstraint::Range {
            start: None,
            start_inclusive: false,
            end: Some(end.to_string()),
            end_inclusive: false,
        }
    }
}

/// Canonicalize a raw CVE identifier into `CVE-YYYY-NNNN` form.
///
/// Accepts lowercase input and a missing `CVE-` prefix; returns `None`
/// when the year/sequence shape is wrong.
pub fn canonical_cve_id(raw: &str) -> Option<String> {
    let upper = raw.trim().to_ascii_uppercase();
    let rest = upper.strip_prefix("CVE-").unwrap_or(&upper);

    let (year, seq) = rest.split_once('-')?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if seq.len() < 4 || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(format!("CVE-{}-{}", year, seq))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_cve_id() {
        assert_eq!(
            canonical_cve_id("CVE-2025-53770").as_deref(),
            Some("CVE-2025-53770")
        );
        assert_eq!(
            canonical_cve_id("cve-2021-44228").as_deref(),
            Some("CVE-2021-44228")
        );
        assert_eq!(
            canonical_cve_id("2023-1234").as_deref(),
            Some("CVE-2023-1234")
        );
        assert_eq!(
            canonical_cve_id("  CVE-0000-00000 ").as_deref(),
            Some("CVE-0000-00000")
        );
    }

    #[test]
    fn test_canonical_cve_id_rejects_malformed() {
        assert_eq!(canonical_cve_id("CVE-21-44228"), None);
        assert_eq!(canonical_cve_id("CVE-2021-123"), None);
        assert_eq!(canonical_cve_id("CVE-2021-44a28"), None);
        assert_eq!(canonical_cve_id("log4shell"), None);
        assert_eq!(canonical_cve_id(""), None);
    }

    #[test]
    fn test_record_builder() {
        let record = VulnerabilityRecord::new("CVE-2025-53770")
            .with_description("SharePoint deserialization of untrusted data")
            .with_cvss(9.8)
            .with_affected(AffectedProduct::exact("microsoft", "sharepoint", "2019"));

        assert_eq!(record.severity, Severity::Critical);
        assert_eq!(record.affected.len(), 1);
        assert_eq!(
            record.affected[0].versions,
            VersionConstraint::Exact("2019".into())
        );
    }
}

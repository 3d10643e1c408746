//! Asset matching - which inventory entries does a vulnerability affect
//!
//! Pure function over its inputs: no side effects, order of the
//! inventory is preserved in the result.

use crate::normalize::{normalize_product, version_matches};
use threatlens_core::{AffectedProduct, Asset, VulnerabilityRecord};
use tracing::debug;

/// Return the subset of `inventory` affected by `record`, in inventory
/// order. An asset is included if it matches any of the record's
/// affected-product identifiers.
pub fn match_assets(record: &VulnerabilityRecord, inventory: &[Asset]) -> Vec<Asset> {
    let matched: Vec<Asset> = inventory
        .iter()
        .filter(|asset| affects(record, asset))
        .cloned()
        .collect();

    debug!(
        cve_id = %record.cve_id,
        inventory = inventory.len(),
        matched = matched.len(),
        "asset matching complete"
    );

    matched
}

/// Partial-match relation: vendor and product must match exactly after
/// normalization; the installed version must satisfy the constraint.
fn affects(record: &VulnerabilityRecord, asset: &Asset) -> bool {
    let asset_key = normalize_product(&asset.vendor, &asset.product);

    // An asset with a missing product identifier never matches
    if asset_key.product.is_empty() {
        return false;
    }

    record
        .affected
        .iter()
        .any(|affected| product_matches(affected, &asset_key, &asset.version))
}

fn product_matches(
    affected: &AffectedProduct,
    asset_key: &crate::normalize::ProductKey,
    asset_version: &str,
) -> bool {
    let affected_key = normalize_product(&affected.vendor, &affected.product);

    affected_key.vendor == asset_key.vendor
        && affected_key.product == asset_key.product
        && version_matches(asset_version, &affected.versions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use threatlens_core::{Criticality, Environment, VersionConstraint};

    fn sharepoint_record() -> VulnerabilityRecord {
        VulnerabilityRecord::new("CVE-2025-53770")
            .with_cvss(9.8)
            .with_affected(AffectedProduct::exact("microsoft", "sharepoint", "2019"))
    }

    fn sharepoint_asset() -> Asset {
        Asset::new("PROD-SP-01", "Microsoft", "SharePoint", "2019")
            .in_environment(Environment::Production)
            .with_criticality(Criticality::High)
    }

    #[test]
    fn test_matching_asset_is_included() {
        let matched = match_assets(&sharepoint_record(), &[sharepoint_asset()]);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].hostname, "PROD-SP-01");
    }

    #[test]
    fn test_non_matching_inventory_yields_empty() {
        let tomcat = Asset::new("DEV-TC-01", "Apache", "Tomcat", "9");
        assert!(match_assets(&sharepoint_record(), &[tomcat]).is_empty());
    }

    #[test]
    fn test_empty_affected_set_matches_nothing() {
        let record = VulnerabilityRecord::new("CVE-2025-1111");
        assert!(match_assets(&record, &[sharepoint_asset()]).is_empty());
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let record = VulnerabilityRecord::new("CVE-2025-2222")
            .with_affected(AffectedProduct::exact("MICROSOFT", "SharePoint", "2019"));
        assert_eq!(match_assets(&record, &[sharepoint_asset()]).len(), 1);
    }

    #[test]
    fn test_or_across_affected_products() {
        let record = VulnerabilityRecord::new("CVE-2025-3333")
            .with_affected(AffectedProduct::exact("apache", "tomcat", "9"))
            .with_affected(AffectedProduct::exact("microsoft", "sharepoint", "2019"));
        assert_eq!(match_assets(&record, &[sharepoint_asset()]).len(), 1);
    }

    #[test]
    fn test_inventory_order_is_preserved() {
        let record = VulnerabilityRecord::new("CVE-2025-4444").with_affected(
            AffectedProduct::new("apache", "log4j")
                .with_versions(VersionConstraint::between("2.0", "2.17.0")),
        );

        let inventory = vec![
            Asset::new("host-c", "apache", "log4j", "2.14.1"),
            Asset::new("host-a", "apache", "log4j", "2.16.0"),
            Asset::new("host-b", "apache", "log4j", "2.17.1"),
        ];

        let matched = match_assets(&record, &inventory);
        let hosts: Vec<_> = matched.iter().map(|a| a.hostname.as_str()).collect();
        assert_eq!(hosts, vec!["host-c", "host-a"]);
    }

    #[test]
    fn test_missing_product_fails_closed() {
        let record = VulnerabilityRecord::new("CVE-2025-5555")
            .with_affected(AffectedProduct::new("", "").with_versions(VersionConstraint::Any));
        let blank = Asset::new("mystery-host", "", "", "1.0");
        assert!(match_assets(&record, &[blank]).is_empty());
    }
}

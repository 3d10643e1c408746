//! CISA Known Exploited Vulnerabilities catalog
//!
//! The catalog is downloaded once and queried in memory. Lookup by CVE
//! id is exact; the vendor/product search is a case-insensitive
//! substring fallback.

use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use threatlens_core::{Error, ExploitationStatus, ExploitedVulnFeed, Result};
use tracing::{debug, info};

const DEFAULT_CATALOG_URL: &str =
    "https://www.cisa.gov/sites/default/files/feeds/known_exploited_vulnerabilities.json";

/// In-memory view of the KEV catalog
pub struct KevFeed {
    entries: Vec<KevEntry>,
    by_id: HashMap<String, usize>,
}

impl KevFeed {
    /// Download the catalog and index it by CVE id
    pub async fn fetch(client: &Client) -> Result<Self> {
        Self::fetch_from(client, DEFAULT_CATALOG_URL).await
    }

    pub async fn fetch_from(client: &Client, url: &str) -> Result<Self> {
        debug!(%url, "downloading KEV catalog");

        let response = client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::unavailable("kev", e.to_string()))?;

        if !response.status().is_success() {
            return Err(Error::unavailable(
                "kev",
                format!("catalog returned status {}", response.status()),
            ));
        }

        let catalog: KevCatalog = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("failed to parse KEV catalog: {}", e)))?;

        info!(entries = catalog.vulnerabilities.len(), "KEV catalog loaded");
        Ok(Self::from_entries(catalog.vulnerabilities))
    }

    pub fn from_entries(entries: Vec<KevEntry>) -> Self {
        let by_id = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.cve_id.to_ascii_uppercase(), i))
            .collect();
        Self { entries, by_id }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ExploitedVulnFeed for KevFeed {
    async fn lookup_cve(&self, cve_id: &str) -> Result<Option<ExploitationStatus>> {
        Ok(self
            .by_id
            .get(&cve_id.to_ascii_uppercase())
            .map(|&i| status_from_entry(&self.entries[i])))
    }

    async fn search_vendor_product(
        &self,
        vendor: &str,
        product: &str,
    ) -> Result<Option<ExploitationStatus>> {
        let vendor = fold_name(vendor);
        let product = fold_name(product);

        let hit = self.entries.iter().find(|e| {
            fold_name(&e.vendor_project).contains(&vendor)
                && fold_name(&e.product).contains(&product)
        });

        Ok(hit.map(status_from_entry))
    }
}

/// Lower-case a vendor/product name and drop separators, so CPE-style
/// tokens ("sharepoint_server") and catalog names ("SharePoint Server")
/// compare in the same form.
fn fold_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '_' | '-' | '.') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn status_from_entry(entry: &KevEntry) -> ExploitationStatus {
    ExploitationStatus {
        actively_exploited: true,
        ransomware_campaign: entry
            .known_ransomware_campaign_use
            .as_deref()
            .is_some_and(|v| v.eq_ignore_ascii_case("known")),
        due_date: entry.due_date.clone(),
    }
}

#[derive(Debug, Deserialize)]
struct KevCatalog {
    vulnerabilities: Vec<KevEntry>,
}

/// One catalog entry; field names follow the published JSON
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KevEntry {
    #[serde(rename = "cveID")]
    pub cve_id: String,
    pub vendor_project: String,
    pub product: String,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub known_ransomware_campaign_use: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_feed() -> KevFeed {
        let catalog: KevCatalog = serde_json::from_str(
            r#"{
                "vulnerabilities": [
                    {
                        "cveID": "CVE-2025-53770",
                        "vendorProject": "Microsoft",
                        "product": "SharePoint Server",
                        "dueDate": "2025-07-23",
                        "knownRansomwareCampaignUse": "Known"
                    },
                    {
                        "cveID": "CVE-2021-44228",
                        "vendorProject": "Apache",
                        "product": "Log4j2",
                        "knownRansomwareCampaignUse": "Unknown"
                    }
                ]
            }"#,
        )
        .unwrap();
        KevFeed::from_entries(catalog.vulnerabilities)
    }

    #[tokio::test]
    async fn test_lookup_by_cve_id() {
        let feed = sample_feed();
        let status = feed.lookup_cve("CVE-2025-53770").await.unwrap().unwrap();
        assert!(status.actively_exploited);
        assert!(status.ransomware_campaign);
        assert_eq!(status.due_date.as_deref(), Some("2025-07-23"));
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let feed = sample_feed();
        assert!(feed.lookup_cve("cve-2021-44228").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_lookup_miss() {
        let feed = sample_feed();
        assert!(feed.lookup_cve("CVE-2020-0001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_vendor_product_substring_search() {
        let feed = sample_feed();
        let status = feed
            .search_vendor_product("microsoft", "sharepoint")
            .await
            .unwrap()
            .unwrap();
        assert!(status.actively_exploited);
    }

    #[tokio::test]
    async fn test_search_accepts_cpe_style_tokens() {
        // NVD-derived products arrive underscored; catalog names use spaces
        let feed = sample_feed();
        let status = feed
            .search_vendor_product("microsoft", "sharepoint_server")
            .await
            .unwrap()
            .expect("separator variant should still match");
        assert!(status.actively_exploited);

        assert!(feed
            .search_vendor_product("apache", "LOG4J2")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_unknown_ransomware_use_is_false() {
        let feed = sample_feed();
        let status = feed
            .search_vendor_product("apache", "log4j")
            .await
            .unwrap()
            .unwrap();
        assert!(status.actively_exploited);
        assert!(!status.ransomware_campaign);
        assert!(status.due_date.is_none());
    }

    #[tokio::test]
    async fn test_vendor_product_miss() {
        let feed = sample_feed();
        assert!(feed
            .search_vendor_product("oracle", "weblogic")
            .await
            .unwrap()
            .is_none());
    }
}

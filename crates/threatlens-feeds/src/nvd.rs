//! NVD API 2.0 client
//!
//! Fetches a single CVE record per assessment. Response parsing is kept
//! separate from transport so it can be tested against captured JSON.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use threatlens_core::{
    AffectedProduct, Error, Result, VersionConstraint, VulnerabilityRecord, VulnerabilityRegistry,
};
use tracing::debug;

const DEFAULT_API_URL: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

/// Vulnerability registry backed by the NVD CVE API
pub struct NvdRegistry {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl NvdRegistry {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
            api_key,
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }
}

#[async_trait]
impl VulnerabilityRegistry for NvdRegistry {
    async fn fetch(&self, cve_id: &str) -> Result<Option<VulnerabilityRecord>> {
        let url = format!("{}?cveId={}", self.api_url, cve_id);
        debug!(%cve_id, "fetching CVE from NVD");

        let mut request = self.client.get(&url);
        if let Some(ref key) = self.api_key {
            request = request.header("apiKey", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::unavailable("nvd", e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            // NVD signals rate limiting with 403 rather than 429
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                return Err(Error::RateLimited {
                    service: "nvd".to_string(),
                    retry_after_seconds: 30,
                });
            }
            status if !status.is_success() => {
                return Err(Error::unavailable(
                    "nvd",
                    format!("API returned status {}", status),
                ));
            }
            _ => {}
        }

        let data: NvdResponse = response
            .json()
            .await
            .map_err(|e| Error::Parse(format!("failed to parse NVD response: {}", e)))?;

        Ok(data
            .vulnerabilities
            .into_iter()
            .next()
            .map(|vuln| record_from_cve(vuln.cve)))
    }
}

/// Convert an NVD CVE entry into a domain record
fn record_from_cve(cve: NvdCve) -> VulnerabilityRecord {
    let cvss_score = cve
        .metrics
        .as_ref()
        .and_then(|m| m.cvss_metric_v31.as_ref())
        .and_then(|v| v.first())
        .map(|m| m.cvss_data.base_score as f32);

    let cwe_ids: Vec<String> = cve
        .weaknesses
        .as_ref()
        .map(|w| {
            w.iter()
                .flat_map(|weakness| {
                    weakness
                        .description
                        .iter()
                        .filter(|d| d.value.starts_with("CWE-"))
                        .map(|d| d.value.clone())
                })
                .collect()
        })
        .unwrap_or_default();

    let description = cve
        .descriptions
        .iter()
        .find(|d| d.lang == "en")
        .map(|d| d.value.clone())
        .unwrap_or_default();

    let mut record = VulnerabilityRecord::new(&cve.id).with_description(description);
    if let Some(score) = cvss_score {
        record = record.with_cvss(score);
    }
    record.cwe_ids = cwe_ids;
    record.published = cve.published;

    if let Some(configs) = cve.configurations {
        for config in configs {
            for node in config.nodes {
                for cpe_match in node.cpe_match.unwrap_or_default() {
                    if !cpe_match.vulnerable {
                        continue;
                    }
                    if let Some(product) = affected_from_match(&cpe_match) {
                        record.affected.push(product);
                    }
                }
            }
        }
    }

    record
}

/// Build an affected product from a CPE match entry.
///
/// Returns `None` when the criteria string is not a parseable
/// `cpe:2.3:` URI; such entries cannot participate in matching.
fn affected_from_match(cpe_match: &NvdCpeMatch) -> Option<AffectedProduct> {
    let (vendor, product, version) = parse_cpe_criteria(&cpe_match.criteria)?;

    let versions = if cpe_match.version_start_including.is_some()
        || cpe_match.version_start_excluding.is_some()
        || cpe_match.version_end_including.is_some()
        || cpe_match.version_end_excluding.is_some()
    {
        let (start, start_inclusive) = match (
            &cpe_match.version_start_including,
            &cpe_match.version_start_excluding,
        ) {
            (Some(v), _) => (Some(v.clone()), true),
            (None, Some(v)) => (Some(v.clone()), false),
            (None, None) => (None, false),
        };
        let (end, end_inclusive) = match (
            &cpe_match.version_end_including,
            &cpe_match.version_end_excluding,
        ) {
            (Some(v), _) => (Some(v.clone()), true),
            (None, Some(v)) => (Some(v.clone()), false),
            (None, None) => (None, false),
        };
        VersionConstraint::Range {
            start,
            start_inclusive,
            end,
            end_inclusive,
        }
    } else if version == "*" || version == "-" {
        VersionConstraint::Any
    } else {
        VersionConstraint::Exact(version)
    };

    Some(AffectedProduct::new(vendor, product).with_versions(versions))
}

/// Extract (vendor, product, version) from a CPE 2.3 URI.
///
/// Format: `cpe:2.3:<part>:<vendor>:<product>:<version>:...`
fn parse_cpe_criteria(criteria: &str) -> Option<(String, String, String)> {
    let parts: Vec<&str> = criteria.split(':').collect();
    if parts.len() < 6 || parts[0] != "cpe" || parts[1] != "2.3" {
        return None;
    }
    Some((
        parts[3].to_string(),
        parts[4].to_string(),
        parts[5].to_string(),
    ))
}

// NVD API response structures
#[derive(Debug, Deserialize)]
struct NvdResponse {
    #[serde(default)]
    vulnerabilities: Vec<NvdVulnerability>,
}

#[derive(Debug, Deserialize)]
struct NvdVulnerability {
    cve: NvdCve,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdCve {
    id: String,
    published: Option<String>,
    descriptions: Vec<NvdDescription>,
    metrics: Option<NvdMetrics>,
    weaknesses: Option<Vec<NvdWeakness>>,
    configurations: Option<Vec<NvdConfiguration>>,
}

#[derive(Debug, Deserialize)]
struct NvdDescription {
    lang: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdMetrics {
    cvss_metric_v31: Option<Vec<CvssMetricV31>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvssMetricV31 {
    cvss_data: CvssData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CvssData {
    base_score: f64,
}

#[derive(Debug, Deserialize)]
struct NvdWeakness {
    description: Vec<NvdDescription>,
}

#[derive(Debug, Deserialize)]
struct NvdConfiguration {
    nodes: Vec<NvdNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdNode {
    cpe_match: Option<Vec<NvdCpeMatch>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NvdCpeMatch {
    vulnerable: bool,
    criteria: String,
    version_start_including: Option<String>,
    version_start_excluding: Option<String>,
    version_end_including: Option<String>,
    version_end_excluding: Option<String>,
}

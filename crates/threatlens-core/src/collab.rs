//! Collaborator contracts consumed, never implemented, by the engine
//!
//! Implementations live in `threatlens-feeds` (and in test fakes). The
//! engine only ever sees validated types through these traits; wire
//! formats and caching policy belong to the implementations.

use crate::assessment::{ExploitCandidate, ExploitationStatus};
use crate::asset::Asset;
use crate::error::Result;
use crate::record::VulnerabilityRecord;
use async_trait::async_trait;

/// Vulnerability registry lookup (e.g. NVD)
#[async_trait]
pub trait VulnerabilityRegistry: Send + Sync {
    /// Fetch a record by canonical CVE id. `Ok(None)` means the id does
    /// not resolve; errors mean the registry call itself failed.
    async fn fetch(&self, cve_id: &str) -> Result<Option<VulnerabilityRecord>>;
}

/// Read-only asset inventory provider
#[async_trait]
pub trait AssetInventory: Send + Sync {
    /// List all owned assets. No filtering contract is required.
    async fn list(&self) -> Result<Vec<Asset>>;
}

/// Exploited-vulnerabilities feed (e.g. CISA KEV)
#[async_trait]
pub trait ExploitedVulnFeed: Send + Sync {
    /// Exact lookup by CVE id
    async fn lookup_cve(&self, cve_id: &str) -> Result<Option<ExploitationStatus>>;

    /// Fallback substring search by vendor/product
    async fn search_vendor_product(
        &self,
        vendor: &str,
        product: &str,
    ) -> Result<Option<ExploitationStatus>>;
}

/// Code-repository search provider (e.g. GitHub)
#[async_trait]
pub trait RepoSearchProvider: Send + Sync {
    /// Search repositories matching the query
    async fn search(&self, query: &str) -> Result<Vec<ExploitCandidate>>;

    /// List file paths in a repository branch
    async fn list_files(&self, repo: &str, branch: &str) -> Result<Vec<String>>;

    /// Fetch the content of a single file
    async fn get_file_content(&self, repo: &str, path: &str, branch: &str) -> Result<String>;
}

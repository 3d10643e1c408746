//! External data sources for ThreatLens
//!
//! Implements the collaborator traits from `threatlens-core` against
//! real services: the NVD CVE API, the CISA KEV catalog, the GitHub
//! search API, and a TOML-backed asset inventory. All wire-format
//! handling lives here; the engine only sees validated domain types.

pub mod github;
pub mod inventory;
pub mod kev;
pub mod nvd;

pub use github::GithubSearch;
pub use inventory::FileInventory;
pub use kev::KevFeed;
pub use nvd::NvdRegistry;

use std::time::Duration;

use threatlens_core::{Error, Result};

/// Default timeout for all outbound HTTP calls
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the shared HTTP client used by all feed implementations.
///
/// GitHub rejects requests without a User-Agent, so one is always set.
pub fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .user_agent("threatlens/0.1")
        .build()
        .map_err(|e| Error::Internal(format!("failed to build HTTP client: {}", e)))
}

//! Exploitation status resolution
//!
//! Delegates to an exploited-vulnerabilities feed through an ordered
//! list of lookup strategies. Absence of an entry resolves to the
//! conservative "not exploited" default; a failing feed call propagates
//! to the caller.

use std::sync::Arc;
use threatlens_core::{
    ExploitationStatus, ExploitedVulnFeed, Result, VulnerabilityRecord,
};
use tracing::debug;

/// Lookup strategies, tried in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Strategy {
    /// Exact match on the CVE id
    ExactId,
    /// Substring search on each affected vendor/product pair
    VendorProduct,
}

const STRATEGY_ORDER: [Strategy; 2] = [Strategy::ExactId, Strategy::VendorProduct];

/// Outcome of a single strategy
enum LookupOutcome {
    Found(ExploitationStatus),
    Absent,
}

/// Resolves exploitation urgency for a vulnerability record
pub struct ExploitationResolver {
    feed: Arc<dyn ExploitedVulnFeed>,
}

impl ExploitationResolver {
    pub fn new(feed: Arc<dyn ExploitedVulnFeed>) -> Self {
        Self { feed }
    }

    /// Resolve the exploitation status for a record.
    ///
    /// Returns the first `Found` strategy result, or the default
    /// not-exploited status when every strategy comes back `Absent`.
    pub async fn resolve(&self, record: &VulnerabilityRecord) -> Result<ExploitationStatus> {
        for strategy in STRATEGY_ORDER {
            if let LookupOutcome::Found(status) = self.apply(strategy, record).await? {
                debug!(
                    cve_id = %record.cve_id,
                    strategy = ?strategy,
                    exploited = status.actively_exploited,
                    "exploitation status resolved"
                );
                return Ok(status);
            }
        }

        debug!(cve_id = %record.cve_id, "no feed entry, defaulting to not exploited");
        Ok(ExploitationStatus::default())
    }

    async fn apply(
        &self,
        strategy: Strategy,
        record: &VulnerabilityRecord,
    ) -> Result<LookupOutcome> {
        match strategy {
            Strategy::ExactId => match self.feed.lookup_cve(&record.cve_id).await? {
                Some(status) => Ok(LookupOutcome::Found(status)),
                None => Ok(LookupOutcome::Absent),
            },
            Strategy::VendorProduct => {
                for affected in &record.affected {
                    if let Some(status) = self
                        .feed
                        .search_vendor_product(&affected.vendor, &affected.product)
                        .await?
                    {
                        return Ok(LookupOutcome::Found(status));
                    }
                }
                Ok(LookupOutcome::Absent)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use threatlens_core::{AffectedProduct, Error};

    struct FakeFeed {
        by_id: Option<ExploitationStatus>,
        by_product: Option<ExploitationStatus>,
        fail: bool,
    }

    #[async_trait]
    impl ExploitedVulnFeed for FakeFeed {
        async fn lookup_cve(&self, _cve_id: &str) -> Result<Option<ExploitationStatus>> {
            if self.fail {
                return Err(Error::unavailable("kev", "feed down"));
            }
            Ok(self.by_id.clone())
        }

        async fn search_vendor_product(
            &self,
            _vendor: &str,
            _product: &str,
        ) -> Result<Option<ExploitationStatus>> {
            if self.fail {
                return Err(Error::unavailable("kev", "feed down"));
            }
            Ok(self.by_product.clone())
        }
    }

    fn record() -> VulnerabilityRecord {
        VulnerabilityRecord::new("CVE-2025-53770")
            .with_affected(AffectedProduct::exact("microsoft", "sharepoint", "2019"))
    }

    #[tokio::test]
    async fn test_exact_id_hit() {
        let resolver = ExploitationResolver::new(Arc::new(FakeFeed {
            by_id: Some(ExploitationStatus::exploited()),
            by_product: None,
            fail: false,
        }));
        let status = resolver.resolve(&record()).await.unwrap();
        assert!(status.actively_exploited);
    }

    #[tokio::test]
    async fn test_falls_back_to_vendor_product() {
        let resolver = ExploitationResolver::new(Arc::new(FakeFeed {
            by_id: None,
            by_product: Some(ExploitationStatus::exploited()),
            fail: false,
        }));
        let status = resolver.resolve(&record()).await.unwrap();
        assert!(status.actively_exploited);
    }

    #[tokio::test]
    async fn test_absent_defaults_to_not_exploited() {
        let resolver = ExploitationResolver::new(Arc::new(FakeFeed {
            by_id: None,
            by_product: None,
            fail: false,
        }));
        let status = resolver.resolve(&record()).await.unwrap();
        assert!(!status.actively_exploited);
        assert!(!status.ransomware_campaign);
    }

    #[tokio::test]
    async fn test_feed_error_propagates() {
        let resolver = ExploitationResolver::new(Arc::new(FakeFeed {
            by_id: None,
            by_product: None,
            fail: true,
        }));
        let err = resolver.resolve(&record()).await.unwrap_err();
        assert_eq!(err.code(), "SERVICE_UNAVAILABLE");
    }
}

//! ThreatLens Core - Foundation types, traits, and error handling
//!
//! This crate provides the core abstractions used throughout ThreatLens:
//! - `VulnerabilityRecord`: A CVE record with its affected-product set
//! - `Asset`: An inventory entry with environment and criticality tags
//! - `ThreatAssessment`: The final output of an assessment run
//! - Collaborator traits (`VulnerabilityRegistry`, `AssetInventory`, ...)
//! - `Severity`, `ThreatLevel`, `ScoringConfig`: scoring primitives

pub mod asset;
pub mod assessment;
pub mod collab;
pub mod error;
pub mod record;
pub mod scoring;
pub mod severity;

// Re-export commonly used types at crate root
pub use asset::{Asset, Criticality, Environment};
pub use assessment::{
    AssessmentOutcome, ExploitCandidate, ExploitationStatus, ThreatAssessment,
};
pub use collab::{
    AssetInventory, ExploitedVulnFeed, RepoSearchProvider, VulnerabilityRegistry,
};
pub use error::{Error, Result};
pub use record::{canonical_cve_id, AffectedProduct, VersionConstraint, VulnerabilityRecord};
pub use scoring::{ScoringConfig, ThreatScore};
pub use severity::{Severity, ThreatLevel};

//! ThreatLens Engine - Impact assessment for CVE records
//!
//! This crate provides the decision logic of ThreatLens:
//! - Normalizes product identifiers and compares versions
//! - Matches a vulnerability's affected-product set against the inventory
//! - Computes a threat level from criticality, exposure, and match count
//! - Resolves exploitation urgency from an exploited-vulnerabilities feed
//! - Ranks and curates exploit-evidence repositories
//! - Sequences it all as an explicit assessment state machine

pub mod evidence;
pub mod exploitation;
pub mod matcher;
pub mod normalize;
pub mod scoring;
pub mod workflow;

pub use evidence::{rank, EvidenceCollector, DEFAULT_EVIDENCE_LIMIT};
pub use exploitation::ExploitationResolver;
pub use matcher::match_assets;
pub use normalize::{compare_versions, normalize_product, version_matches, ProductKey};
pub use scoring::ThreatScorer;
pub use workflow::{AssessmentWorkflow, WorkflowState};

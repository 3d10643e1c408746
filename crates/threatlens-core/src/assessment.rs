//! Assessment outputs: exploitation status, exploit evidence, and the final result

use crate::asset::Asset;
use crate::record::VulnerabilityRecord;
use crate::scoring::ThreatScore;
use crate::severity::ThreatLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exploitation urgency derived from an exploited-vulnerabilities feed.
///
/// The default is the conservative "not exploited"; absence of a feed
/// entry is encoded this way rather than failing the assessment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploitationStatus {
    /// Listed as actively/knowingly exploited
    pub actively_exploited: bool,

    /// Used in a known campaign (e.g. ransomware)
    pub ransomware_campaign: bool,

    /// Remediation due-date published by the feed
    #[serde(default)]
    pub due_date: Option<String>,
}

impl ExploitationStatus {
    pub fn exploited() -> Self {
        Self {
            actively_exploited: true,
            ..Default::default()
        }
    }
}

/// A candidate proof-of-concept repository.
///
/// Ephemeral: produced and consumed within a single assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploitCandidate {
    /// Repository identifier, e.g. "owner/repo"
    pub full_name: String,

    /// Repository URL
    pub url: String,

    /// Star count
    pub stars: u32,

    /// Fork count
    pub forks: u32,

    /// Last push timestamp
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,

    /// Repository description
    #[serde(default)]
    pub description: Option<String>,

    /// Default branch, needed to enrich the candidate with file content
    #[serde(default = "default_branch")]
    pub default_branch: String,

    /// Extracted code snippet, attached after ranking
    #[serde(default)]
    pub snippet: Option<String>,
}

fn default_branch() -> String {
    String::from("main")
}

impl ExploitCandidate {
    pub fn new(full_name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            url: url.into(),
            stars: 0,
            forks: 0,
            pushed_at: None,
            description: None,
            default_branch: default_branch(),
            snippet: None,
        }
    }

    pub fn with_stars(mut self, stars: u32) -> Self {
        self.stars = stars;
        self
    }

    pub fn with_pushed_at(mut self, pushed_at: DateTime<Utc>) -> Self {
        self.pushed_at = Some(pushed_at);
        self
    }

    pub fn with_snippet(mut self, snippet: impl Into<String>) -> Self {
        self.snippet = Some(snippet.into());
        self
    }
}

/// The complete output of a successful assessment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreatAssessment {
    /// Unique assessment id
    pub id: Uuid,

    /// The assessed vulnerability
    pub record: VulnerabilityRecord,

    /// Assets affected by the vulnerability, in inventory order
    pub matched_assets: Vec<Asset>,

    /// Exploitation urgency
    pub exploitation: ExploitationStatus,

    /// Computed threat level
    pub score: ThreatScore,

    /// Curated exploit-evidence candidates, highest confidence first
    pub evidence: Vec<ExploitCandidate>,

    /// Assessment timestamp
    pub assessed_at: DateTime<Utc>,
}

/// One assessment run produces exactly one outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AssessmentOutcome {
    /// The CVE id did not resolve in the registry
    NotFound { cve_id: String },

    /// The record exists but no owned asset is affected
    Unaffected { record: VulnerabilityRecord },

    /// Full assessment with matches, score, and evidence
    Assessed(Box<ThreatAssessment>),
}

impl AssessmentOutcome {
    /// The CVE id this outcome refers to
    pub fn cve_id(&self) -> &str {
        match self {
            AssessmentOutcome::NotFound { cve_id } => cve_id,
            AssessmentOutcome::Unaffected { record } => &record.cve_id,
            AssessmentOutcome::Assessed(assessment) => &assessment.record.cve_id,
        }
    }

    /// Threat level of this outcome; NONE for the terminal short-circuits
    pub fn threat_level(&self) -> ThreatLevel {
        match self {
            AssessmentOutcome::Assessed(assessment) => assessment.score.level,
            _ => ThreatLevel::None,
        }
    }
}

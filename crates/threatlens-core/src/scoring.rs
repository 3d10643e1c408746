//! Scoring configuration and computed threat scores
//!
//! All weights and thresholds are tunable configuration, not hidden
//! constants. The calculator itself lives in `threatlens-engine`; this
//! module only defines the data it is parameterized with.

use crate::asset::{Criticality, Environment};
use crate::severity::ThreatLevel;
use serde::{Deserialize, Serialize};

/// Weights and thresholds for the threat level calculation.
///
/// Raw score = criticality weight * `criticality_factor`
///           + exposure weight
///           + min(match count, `volume_cap`),
/// plus `exploited_bonus` when the CVE is actively exploited.
/// With the defaults the attainable range is 0..=26.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Asset criticality weights
    #[serde(default = "default_critical_asset_weight")]
    pub critical_asset_weight: u32,
    #[serde(default = "default_high_asset_weight")]
    pub high_asset_weight: u32,
    #[serde(default = "default_medium_asset_weight")]
    pub medium_asset_weight: u32,

    /// Environment exposure weights
    #[serde(default = "default_production_weight")]
    pub production_weight: u32,
    #[serde(default = "default_infrastructure_weight")]
    pub infrastructure_weight: u32,
    #[serde(default = "default_security_weight")]
    pub security_weight: u32,
    #[serde(default = "default_management_weight")]
    pub management_weight: u32,
    #[serde(default = "default_development_weight")]
    pub development_weight: u32,

    /// Multiplier applied to the criticality component
    #[serde(default = "default_criticality_factor")]
    pub criticality_factor: u32,

    /// Cap on the affected-asset count component
    #[serde(default = "default_volume_cap")]
    pub volume_cap: u32,

    /// Bonus added when the CVE is actively exploited
    #[serde(default = "default_exploited_bonus")]
    pub exploited_bonus: u32,

    /// Label thresholds (lower bound of each band, monotonic)
    #[serde(default = "default_low_threshold")]
    pub low_threshold: u32,
    #[serde(default = "default_medium_threshold")]
    pub medium_threshold: u32,
    #[serde(default = "default_high_threshold")]
    pub high_threshold: u32,
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: u32,
}

fn default_critical_asset_weight() -> u32 {
    3
}
fn default_high_asset_weight() -> u32 {
    2
}
fn default_medium_asset_weight() -> u32 {
    1
}
fn default_production_weight() -> u32 {
    5
}
fn default_infrastructure_weight() -> u32 {
    4
}
fn default_security_weight() -> u32 {
    3
}
fn default_management_weight() -> u32 {
    2
}
fn default_development_weight() -> u32 {
    1
}
fn default_criticality_factor() -> u32 {
    2
}
fn default_volume_cap() -> u32 {
    5
}
fn default_exploited_bonus() -> u32 {
    10
}
fn default_low_threshold() -> u32 {
    1
}
fn default_medium_threshold() -> u32 {
    7
}
fn default_high_threshold() -> u32 {
    11
}
fn default_critical_threshold() -> u32 {
    15
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            critical_asset_weight: default_critical_asset_weight(),
            high_asset_weight: default_high_asset_weight(),
            medium_asset_weight: default_medium_asset_weight(),
            production_weight: default_production_weight(),
            infrastructure_weight: default_infrastructure_weight(),
            security_weight: default_security_weight(),
            management_weight: default_management_weight(),
            development_weight: default_development_weight(),
            criticality_factor: default_criticality_factor(),
            volume_cap: default_volume_cap(),
            exploited_bonus: default_exploited_bonus(),
            low_threshold: default_low_threshold(),
            medium_threshold: default_medium_threshold(),
            high_threshold: default_high_threshold(),
            critical_threshold: default_critical_threshold(),
        }
    }
}

impl ScoringConfig {
    /// Weight for an asset criticality tag
    pub fn criticality_weight(&self, criticality: Criticality) -> u32 {
        match criticality {
            Criticality::Critical => self.critical_asset_weight,
            Criticality::High => self.high_asset_weight,
            Criticality::Medium => self.medium_asset_weight,
        }
    }

    /// Weight for an environment exposure tag
    pub fn exposure_weight(&self, environment: Environment) -> u32 {
        match environment {
            Environment::Production => self.production_weight,
            Environment::Infrastructure => self.infrastructure_weight,
            Environment::Security => self.security_weight,
            Environment::Management => self.management_weight,
            Environment::Development => self.development_weight,
        }
    }

    /// Map a raw score onto its threat level band
    pub fn level_for(&self, raw: u32) -> ThreatLevel {
        if raw >= self.critical_threshold {
            ThreatLevel::Critical
        } else if raw >= self.high_threshold {
            ThreatLevel::High
        } else if raw >= self.medium_threshold {
            ThreatLevel::Medium
        } else if raw >= self.low_threshold {
            ThreatLevel::Low
        } else {
            ThreatLevel::None
        }
    }
}

/// A computed threat score: raw value plus its mapped label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatScore {
    pub value: u32,
    pub level: ThreatLevel,
}

impl ThreatScore {
    /// The score for an empty match set
    pub fn none() -> Self {
        Self {
            value: 0,
            level: ThreatLevel::None,
        }
    }
}

impl std::fmt::Display for ThreatScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.level, self.value)
    }
}

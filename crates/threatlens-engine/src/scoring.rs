//! Threat level calculation
//!
//! Documented arithmetic over matched assets and exploitation status:
//!
//! ```text
//! raw = max(criticality weight) * criticality_factor
//!     + max(exposure weight)
//!     + min(match count, volume_cap)
//! ```
//!
//! An actively exploited CVE gets `exploited_bonus` added and its label
//! forced to at least CRITICAL. Same inputs always produce the same
//! score: no randomness, no external calls.

use threatlens_core::{Asset, ExploitationStatus, ScoringConfig, ThreatLevel, ThreatScore};
use tracing::debug;

/// Threat level calculator parameterized by a `ScoringConfig`
#[derive(Debug, Clone, Default)]
pub struct ThreatScorer {
    config: ScoringConfig,
}

impl ThreatScorer {
    /// Calculator with default weights
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculator with custom weights/thresholds
    pub fn with_config(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Compute the threat score for a match set
    pub fn score(&self, matches: &[Asset], exploitation: &ExploitationStatus) -> ThreatScore {
        if matches.is_empty() {
            return ThreatScore::none();
        }

        let asset_component = matches
            .iter()
            .map(|a| self.config.criticality_weight(a.criticality))
            .max()
            .unwrap_or(0);

        let exposure_component = matches
            .iter()
            .map(|a| self.config.exposure_weight(a.environment))
            .max()
            .unwrap_or(0);

        let volume_component = (matches.len() as u32).min(self.config.volume_cap);

        let mut raw =
            asset_component * self.config.criticality_factor + exposure_component + volume_component;

        let mut level = self.config.level_for(raw);

        if exploitation.actively_exploited {
            raw += self.config.exploited_bonus;
            level = self.config.level_for(raw).max(ThreatLevel::Critical);
        }

        debug!(
            asset_component,
            exposure_component,
            volume_component,
            raw,
            level = level.as_str(),
            exploited = exploitation.actively_exploited,
            "threat score computed"
        );

        ThreatScore { value: raw, level }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threatlens_core::{Criticality, Environment};

    fn asset(criticality: Criticality, environment: Environment) -> Asset {
        Asset::new("host", "vendor", "product", "1.0")
            .in_environment(environment)
            .with_criticality(criticality)
    }

    #[test]
    fn test_empty_matches_score_none() {
        let scorer = ThreatScorer::new();
        let score = scorer.score(&[], &ExploitationStatus::exploited());
        assert_eq!(score.value, 0);
        assert_eq!(score.level, ThreatLevel::None);
    }

    #[test]
    fn test_documented_arithmetic() {
        let scorer = ThreatScorer::new();
        // High (2*2) + Production (5) + one asset (1) = 10 -> Medium
        let matches = [asset(Criticality::High, Environment::Production)];
        let score = scorer.score(&matches, &ExploitationStatus::default());
        assert_eq!(score.value, 10);
        assert_eq!(score.level, ThreatLevel::Medium);
    }

    #[test]
    fn test_exploited_forces_critical() {
        let scorer = ThreatScorer::new();
        // Weakest possible match set: Medium (1*2) + Development (1) + 1 = 4
        let matches = [asset(Criticality::Medium, Environment::Development)];
        let score = scorer.score(&matches, &ExploitationStatus::exploited());
        assert_eq!(score.value, 14);
        assert_eq!(score.level, ThreatLevel::Critical);
    }

    #[test]
    fn test_exploited_production_asset_scores_twenty() {
        let scorer = ThreatScorer::new();
        let matches = [asset(Criticality::High, Environment::Production)];
        let score = scorer.score(&matches, &ExploitationStatus::exploited());
        assert_eq!(score.value, 20);
        assert!(score.level >= ThreatLevel::Critical);
    }

    #[test]
    fn test_monotonic_in_criticality() {
        let scorer = ThreatScorer::new();
        let status = ExploitationStatus::default();
        let medium = scorer.score(
            &[asset(Criticality::Medium, Environment::Production)],
            &status,
        );
        let high = scorer.score(&[asset(Criticality::High, Environment::Production)], &status);
        let critical = scorer.score(
            &[asset(Criticality::Critical, Environment::Production)],
            &status,
        );
        assert!(medium.value < high.value);
        assert!(high.value < critical.value);
    }

    #[test]
    fn test_monotonic_in_exposure() {
        let scorer = ThreatScorer::new();
        let status = ExploitationStatus::default();
        let mut last = 0;
        for env in [
            Environment::Development,
            Environment::Management,
            Environment::Security,
            Environment::Infrastructure,
            Environment::Production,
        ] {
            let score = scorer.score(&[asset(Criticality::Medium, env)], &status);
            assert!(score.value > last);
            last = score.value;
        }
    }

    #[test]
    fn test_monotonic_in_volume_until_cap() {
        let scorer = ThreatScorer::new();
        let status = ExploitationStatus::default();
        let one = asset(Criticality::Medium, Environment::Development);

        let mut last = 0;
        for count in 1..=5 {
            let matches = vec![one.clone(); count];
            let score = scorer.score(&matches, &status);
            assert!(score.value > last);
            last = score.value;
        }

        // Capped at volume_cap
        let capped = scorer.score(&vec![one.clone(); 50], &status);
        assert_eq!(capped.value, last);
    }

    #[test]
    fn test_max_score_with_defaults() {
        let scorer = ThreatScorer::new();
        let matches = vec![asset(Criticality::Critical, Environment::Production); 5];
        let score = scorer.score(&matches, &ExploitationStatus::exploited());
        // 3*2 + 5 + 5 + 10
        assert_eq!(score.value, 26);
        assert_eq!(score.level, ThreatLevel::Critical);
    }

    #[test]
    fn test_determinism() {
        let scorer = ThreatScorer::new();
        let matches = [
            asset(Criticality::High, Environment::Infrastructure),
            asset(Criticality::Medium, Environment::Production),
        ];
        let status = ExploitationStatus::default();
        assert_eq!(scorer.score(&matches, &status), scorer.score(&matches, &status));
    }
}

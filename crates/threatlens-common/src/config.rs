//! Configuration management for ThreatLens components

use serde::{Deserialize, Serialize};
use std::path::Path;
use threatlens_core::{Error, Result, ScoringConfig};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Vulnerability registry (NVD) settings
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Exploited-vulnerabilities feed (KEV) settings
    #[serde(default)]
    pub kev: KevConfig,

    /// GitHub search settings
    #[serde(default)]
    pub github: GithubConfig,

    /// Path to the asset inventory file
    #[serde(default = "default_inventory_path")]
    pub inventory: String,

    /// Threat scoring weights and thresholds
    #[serde(default)]
    pub scoring: ScoringConfig,

    /// Evidence collection settings
    #[serde(default)]
    pub evidence: EvidenceConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_inventory_path() -> String {
    String::from("inventory.toml")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            registry: RegistryConfig::default(),
            kev: KevConfig::default(),
            github: GithubConfig::default(),
            inventory: default_inventory_path(),
            scoring: ScoringConfig::default(),
            evidence: EvidenceConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("Failed to read config file {:?}: {}", path, e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    /// Merge with environment variables (THREATLENS_ prefix)
    pub fn merge_env(mut self) -> Self {
        if let Ok(val) = std::env::var("THREATLENS_NVD_API_KEY") {
            self.registry.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("THREATLENS_NVD_API_URL") {
            self.registry.api_url = Some(val);
        }
        if let Ok(val) = std::env::var("THREATLENS_KEV_URL") {
            self.kev.catalog_url = Some(val);
        }
        if let Ok(val) = std::env::var("THREATLENS_GITHUB_TOKEN") {
            self.github.token = Some(val);
        }
        if let Ok(val) = std::env::var("THREATLENS_INVENTORY") {
            self.inventory = val;
        }
        if let Ok(val) = std::env::var("THREATLENS_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("THREATLENS_LOG_FORMAT") {
            self.logging.format = val;
        }
        self
    }
}

/// Vulnerability registry configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Override for the NVD API base URL
    pub api_url: Option<String>,

    /// NVD API key (raises the rate limit)
    pub api_key: Option<String>,
}

/// KEV catalog configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KevConfig {
    /// Override for the catalog download URL
    pub catalog_url: Option<String>,
}

/// GitHub search configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token (optional)
    pub token: Option<String>,
}

/// Evidence collection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceConfig {
    /// Maximum candidates to keep after ranking
    #[serde(default = "default_evidence_limit")]
    pub limit: usize,

    /// Maximum snippet length in characters
    #[serde(default = "default_snippet_max_chars")]
    pub snippet_max_chars: usize,
}

fn default_evidence_limit() -> usize {
    3
}

fn default_snippet_max_chars() -> usize {
    1200
}

impl Default for EvidenceConfig {
    fn default() -> Self {
        Self {
            limit: default_evidence_limit(),
            snippet_max_chars: default_snippet_max_chars(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Minimum log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: "pretty", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_log_format() -> String {
    String::from("pretty")
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

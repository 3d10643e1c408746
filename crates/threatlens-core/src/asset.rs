//! Asset inventory entries - read-only reference data owned by the inventory collaborator

use serde::{Deserialize, Serialize};

/// An owned asset in the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Hostname, e.g. "PROD-SP-01"
    pub hostname: String,

    /// Product vendor as recorded in the inventory
    pub vendor: String,

    /// Product name as recorded in the inventory
    pub product: String,

    /// Installed version
    #[serde(default)]
    pub version: String,

    /// Environment exposure tag
    #[serde(default)]
    pub environment: Environment,

    /// Business criticality tag
    #[serde(default)]
    pub criticality: Criticality,
}

impl Asset {
    pub fn new(
        hostname: impl Into<String>,
        vendor: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            vendor: vendor.into(),
            product: product.into(),
            version: version.into(),
            environment: Environment::Development,
            criticality: Criticality::Medium,
        }
    }

    pub fn in_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }
}

/// Environment exposure ranking: Production > Infrastructure > Security >
/// Management > Development. Declared in ascending order so `Ord` agrees
/// with the exposure ranking.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Management,
    Security,
    Infrastructure,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Management => "management",
            Environment::Security => "security",
            Environment::Infrastructure => "infrastructure",
            Environment::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Business criticality ranking: Critical > High > Medium
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    #[default]
    Medium,
    High,
    Critical,
}

impl Criticality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Criticality::Medium => "medium",
            Criticality::High => "high",
            Criticality::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

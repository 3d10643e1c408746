//! Shared configuration and logging for ThreatLens components

pub mod config;
pub mod logging;

pub use config::{Config, EvidenceConfig, GithubConfig, KevConfig, LoggingConfig, RegistryConfig};
pub use logging::{init_logging, LogFormat};

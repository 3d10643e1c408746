//! Error types for ThreatLens

use thiserror::Error;

/// Result type alias using ThreatLens Error
pub type Result<T> = std::result::Result<T, Error>;

/// ThreatLens error types
#[derive(Error, Debug)]
pub enum Error {
    // === Assessment Errors ===
    #[error("Vulnerability not found: {cve_id}")]
    NotFound { cve_id: String },

    #[error("Invalid CVE identifier: {0}")]
    InvalidCveId(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    // === Collaborator Errors ===
    #[error("{service} unavailable: {message}")]
    ServiceUnavailable { service: String, message: String },

    #[error("Rate limited by {service}: retry after {retry_after_seconds}s")]
    RateLimited {
        service: String,
        retry_after_seconds: u32,
    },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Missing required configuration: {key}")]
    MissingConfig { key: String },

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    // === Generic ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Check if this error is retryable by the transport layer
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::ServiceUnavailable { .. } | Error::RateLimited { .. }
        )
    }

    /// Get an error code for logging/metrics
    pub fn code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NOT_FOUND",
            Error::InvalidCveId(_) => "INVALID_CVE_ID",
            Error::InvariantViolation(_) => "INVARIANT_VIOLATION",
            Error::ServiceUnavailable { .. } => "SERVICE_UNAVAILABLE",
            Error::RateLimited { .. } => "RATE_LIMITED",
            Error::Configuration(_) => "CONFIG_ERROR",
            Error::MissingConfig { .. } => "MISSING_CONFIG",
            Error::Io(_) => "IO_ERROR",
            Error::Json(_) => "JSON_ERROR",
            Error::Parse(_) => "PARSE_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Shorthand for a collaborator failure
    pub fn unavailable(service: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ServiceUnavailable {
            service: service.into(),
            message: message.into(),
        }
    }
}

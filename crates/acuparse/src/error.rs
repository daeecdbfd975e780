//! Error types for the Acuparse integration.

use crate::catalog::Section;

/// Configuration errors, raised while loading or validating [`crate::config::AcuparseConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("hostname must not be empty")]
    MissingHostname,
    #[error("monitored_conditions must list at least one condition")]
    NoConditions,
    #[error("unknown monitored condition: {0}")]
    UnknownCondition(String),
    #[error("refresh_seconds must be at least 1")]
    InvalidRefresh,
}

/// Failures of a single fetch against the appliance.
///
/// These never leave [`crate::client::RefreshCache::refresh`]; they are logged
/// there and the previous document is kept.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("appliance returned status {0}")]
    Status(u16),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,
}

/// A measurement path that could not be resolved against the fetched document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("section '{0}' missing from document")]
    MissingSection(Section),

    #[error("section '{0}' is not an object")]
    NotAnObject(Section),

    #[error("field '{field}' missing from section '{section}'")]
    MissingField { section: Section, field: String },
}

/// Text that is not a 24-hour `H:MM` time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid 24-hour time: {0:?}")]
pub struct TimeFormatError(pub String);

/// Errors from [`crate::platform::setup_platform`].
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The initial fetch produced no document; the host should retry setup later.
    #[error("Acuparse appliance at {0} is not ready")]
    NotReady(String),
}

use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::catalog;
use crate::error::ConfigError;

/// Configuration for one Acuparse appliance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcuparseConfig {
    /// Host (optionally `host:port`) of the appliance's web server.
    pub hostname: String,

    /// Accepted for compatibility; has no effect.
    #[serde(default = "default_debug")]
    pub debug: String,

    /// Minimum seconds between two fetches. Integers and numeric strings are accepted.
    #[serde(
        default = "default_refresh_seconds",
        deserialize_with = "deserialize_seconds"
    )]
    pub refresh_seconds: u64,

    /// Catalog identifiers to expose, one sensor each.
    pub monitored_conditions: Vec<String>,
}

fn default_debug() -> String {
    "false".to_string()
}

fn default_refresh_seconds() -> u64 {
    60
}

fn deserialize_seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Number(u64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Number(seconds) => Ok(seconds),
        Seconds::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("refresh_seconds {:?}: {}", text, e))),
    }
}

impl AcuparseConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hostname.trim().is_empty() {
            return Err(ConfigError::MissingHostname);
        }
        if self.refresh_seconds == 0 {
            return Err(ConfigError::InvalidRefresh);
        }
        if self.monitored_conditions.is_empty() {
            return Err(ConfigError::NoConditions);
        }
        if let Some(unknown) = self
            .monitored_conditions
            .iter()
            .find(|c| !catalog::contains(c))
        {
            return Err(ConfigError::UnknownCondition(unknown.clone()));
        }
        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_seconds)
    }
}

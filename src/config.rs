use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{CompactError, CompactResult};

/// Configuration for the schema service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaServiceConfig {
    /// How long `put` waits for cluster replication, in milliseconds
    pub replication_timeout_ms: u64,
    /// Number of cluster lookups `resolve` makes before giving up
    pub fetch_attempts: u32,
    /// Pause between two cluster lookups, in milliseconds
    pub fetch_retry_interval_ms: u64,
}

impl Default for SchemaServiceConfig {
    fn default() -> Self {
        Self {
            replication_timeout_ms: 30_000,
            fetch_attempts: 3,
            fetch_retry_interval_ms: 100,
        }
    }
}

impl SchemaServiceConfig {
    /// Set the replication timeout in milliseconds
    pub fn with_replication_timeout_ms(mut self, timeout: u64) -> Self {
        self.replication_timeout_ms = timeout;
        self
    }

    /// Set the number of cluster lookups made by `resolve`
    pub fn with_fetch_attempts(mut self, attempts: u32) -> Self {
        self.fetch_attempts = attempts;
        self
    }

    /// Set the pause between cluster lookups in milliseconds
    pub fn with_fetch_retry_interval_ms(mut self, interval: u64) -> Self {
        self.fetch_retry_interval_ms = interval;
        self
    }

    pub fn replication_timeout(&self) -> Duration {
        Duration::from_millis(self.replication_timeout_ms)
    }

    pub fn fetch_retry_interval(&self) -> Duration {
        Duration::from_millis(self.fetch_retry_interval_ms)
    }

    /// Checks the values a service can not run with.
    pub fn validate(&self) -> CompactResult<()> {
        if self.fetch_attempts == 0 {
            return Err(CompactError::Config(
                "fetch_attempts must be at least 1".to_string(),
            ));
        }
        if self.replication_timeout_ms == 0 {
            return Err(CompactError::Config(
                "replication_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parses a TOML document; missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> CompactResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| CompactError::Config(format!("Invalid schema service config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> CompactResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }
}

//! Reader configuration, loaded from TOML.
//!
//! Every section is optional; an empty file (or no file at all) yields the
//! defaults: caching off, full-scan date discovery for every table, a five
//! second storage busy timeout.
//!
//! ```toml
//! [cache]
//! enabled = true
//!
//! [calendar.sample]
//! price = ["0050", "1101", "2330"]
//!
//! [storage]
//! busy_timeout_ms = 5000
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level reader configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub cache: CacheConfig,
    pub calendar: CalendarConfig,
    pub storage: StorageConfig,
}

impl ReaderConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }
}

/// Cache enablement. Caching is opt-in: with `enabled = false` the reader
/// is stateless and every `get` goes to storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
}

/// Per-table date-discovery policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Tables listed here have their calendar inferred from the given
    /// representative entities instead of a full distinct-date scan.
    pub sample: BTreeMap<String, Vec<String>>,
}

/// How to discover a table's distinct dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateDiscovery {
    /// Exact `SELECT DISTINCT` over the whole table.
    FullScan,
    /// Scan only the named entities; gaps in their history become gaps in
    /// the inferred calendar.
    Sample(Vec<String>),
}

impl CalendarConfig {
    /// The discovery policy for one table.
    pub fn policy_for(&self, table: &str) -> DateDiscovery {
        match self.sample.get(table) {
            Some(entities) if !entities.is_empty() => DateDiscovery::Sample(entities.clone()),
            _ => DateDiscovery::FullScan,
        }
    }
}

/// Storage connection tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// How long a fetch may block on a locked database before erroring.
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config = ReaderConfig::from_toml("").unwrap();
        assert!(!config.cache.enabled);
        assert!(config.calendar.sample.is_empty());
        assert_eq!(config.storage.busy_timeout_ms, 5_000);
    }

    #[test]
    fn full_config_parses() {
        let config = ReaderConfig::from_toml(
            r#"
            [cache]
            enabled = true

            [calendar.sample]
            price = ["0050", "1101", "2330"]

            [storage]
            busy_timeout_ms = 250
            "#,
        )
        .unwrap();
        assert!(config.cache.enabled);
        assert_eq!(
            config.calendar.policy_for("price"),
            DateDiscovery::Sample(vec!["0050".into(), "1101".into(), "2330".into()])
        );
        assert_eq!(config.calendar.policy_for("fundamentals"), DateDiscovery::FullScan);
        assert_eq!(config.storage.busy_timeout_ms, 250);
    }

    #[test]
    fn empty_sample_list_falls_back_to_full_scan() {
        let config = ReaderConfig::from_toml("[calendar.sample]\nprice = []\n").unwrap();
        assert_eq!(config.calendar.policy_for("price"), DateDiscovery::FullScan);
    }
}

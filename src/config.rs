use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::codec::StateCodec;
use crate::error::ConfigError;

/// Storage key the dashboard has always persisted under.
pub const DEFAULT_STORAGE_KEY: &str = "crm-storage";

/// Simulated network latency of the bulk-load, in milliseconds.
pub const DEFAULT_FETCH_DELAY_MS: u64 = 500;

/// How delete and flag-changing operations move the stats counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteAccounting {
    /// Counters move only when a record was found, and the completed counter
    /// follows the flag wherever it changes. Stats always equal a recompute.
    #[default]
    Guarded,
    /// Reproduce the dashboard exactly: contact and deal deletes decrement
    /// their counts even when the id is unknown, and only `complete_activity`
    /// / `delete_activity` move the completed counter.
    Legacy,
}

/// Store configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct StoreConfig {
    /// Storage key of the persisted snapshot.
    pub storage_key: String,
    /// Whether mutations write a snapshot.
    pub persist: bool,
    pub codec: StateCodec,
    /// Layout version stamped into the snapshot envelope.
    pub persist_version: u32,
    pub fetch_delay_ms: u64,
    pub accounting: DeleteAccounting,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            persist: true,
            codec: StateCodec::Json,
            persist_version: 0,
            fetch_delay_ms: DEFAULT_FETCH_DELAY_MS,
            accounting: DeleteAccounting::Guarded,
        }
    }
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON config file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn with_codec(mut self, codec: StateCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_persist_version(mut self, version: u32) -> Self {
        self.persist_version = version;
        self
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn with_accounting(mut self, accounting: DeleteAccounting) -> Self {
        self.accounting = accounting;
        self
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_millis(self.fetch_delay_ms)
    }
}

//! Store configuration.

use std::path::PathBuf;

use crate::item::DEFAULT_EXPIRY_WINDOW_DAYS;

/// Backing file used when nothing else is configured.
pub const DEFAULT_DATA_FILE: &str = "inventory_data.csv";

pub const ENV_DATA_FILE: &str = "STOCKROOM_DATA_FILE";
pub const ENV_EXPIRY_WINDOW_DAYS: &str = "STOCKROOM_EXPIRY_WINDOW_DAYS";

/// Where the store persists and how it classifies expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_file: PathBuf,
    /// Days ahead that count as "expiring soon".
    pub expiry_window_days: i64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            expiry_window_days: DEFAULT_EXPIRY_WINDOW_DAYS,
        }
    }
}

impl StoreConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unusable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATA_FILE).filter(|p| !p.trim().is_empty()) {
            config.data_file = PathBuf::from(path);
        }

        if let Some(raw) = lookup(ENV_EXPIRY_WINDOW_DAYS) {
            match raw.trim().parse::<i64>() {
                Ok(days) if days >= 0 => config.expiry_window_days = days,
                _ => tracing::warn!(
                    key = ENV_EXPIRY_WINDOW_DAYS,
                    value = %raw,
                    "ignoring invalid expiry window; using default"
                ),
            }
        }

        config
    }

    pub fn with_data_file(mut self, data_file: impl Into<PathBuf>) -> Self {
        self.data_file = data_file.into();
        self
    }
}

//! Database configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default storage directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = "./db";

/// Database configuration.
///
/// # Example
///
/// ```rust
/// use minidb_sql::DatabaseConfig;
///
/// let config = DatabaseConfig::default();
/// assert_eq!(config.data_dir.to_str(), Some("./db"));
/// assert!(!config.eager_load);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Directory holding one `<table>.txt` file per table.
    pub data_dir: PathBuf,

    /// Load every table file when the database opens.
    /// Default: false (tables load on first use)
    pub eager_load: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            eager_load: false,
        }
    }
}

impl DatabaseConfig {
    /// Creates a configuration with the specified data directory.
    #[must_use]
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Sets whether tables are loaded when the database opens.
    #[must_use]
    pub fn eager_load(mut self, eager: bool) -> Self {
        self.eager_load = eager;
        self
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }
        Ok(())
    }
}

//! Configuration file support for the CLI.
//!
//! Loads CLI configuration from TOML files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use minidb_sql::{DatabaseConfig, DEFAULT_DATA_DIR};
use serde::{Deserialize, Serialize};

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory holding the table files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Load every table when the shell starts.
    #[serde(default)]
    pub eager_load: bool,

    /// Default output format.
    #[serde(default = "default_format")]
    pub output_format: String,

    /// Enable timing by default.
    #[serde(default)]
    pub timing: bool,

    /// History file path.
    #[serde(default)]
    pub history_file: Option<PathBuf>,

    /// Maximum history size.
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_format() -> String {
    "plain".to_string()
}

fn default_history_size() -> usize {
    1000
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            eager_load: false,
            output_format: default_format(),
            timing: false,
            history_file: None,
            history_size: default_history_size(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Loads the default configuration file.
    ///
    /// Looks in the following locations:
    /// 1. `<config_dir>/minidb/config.toml`
    /// 2. `~/.minidb/config.toml`
    /// 3. Returns default if not found
    pub fn load_default() -> Result<Self> {
        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("minidb").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let path = home.join(".minidb").join("config.toml");
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Returns the database settings.
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::with_data_dir(&self.data_dir).eager_load(self.eager_load)
    }

    /// Returns the history file, falling back to the local data directory.
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_local_dir().map(|d| d.join("minidb").join("history")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./db"));
        assert_eq!(config.output_format, "plain");
        assert!(!config.eager_load);
        assert_eq!(config.history_size, 1000);
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            data_dir = "/var/lib/minidb"
            eager_load = true
            output_format = "json"
            timing = true
        "#;

        let config: CliConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/minidb"));
        assert!(config.eager_load);
        assert_eq!(config.output_format, "json");
        assert!(config.timing);
        assert_eq!(config.history_size, 1000);

        let db = config.database_config();
        assert_eq!(db.data_dir, PathBuf::from("/var/lib/minidb"));
        assert!(db.eager_load);
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "history_file = \"/tmp/h\"\nhistory_size = 5\n").unwrap();

        let loaded = CliConfig::from_file(&path).unwrap();
        assert_eq!(loaded.history_path(), Some(PathBuf::from("/tmp/h")));
        assert_eq!(loaded.history_size, 5);
        assert_eq!(loaded.output_format, "plain");
    }

    #[test]
    fn test_from_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        assert!(CliConfig::from_file(&temp_dir.path().join("missing.toml")).is_err());

        let path = temp_dir.path().join("bad.toml");
        std::fs::write(&path, "timing = \"yes\"").unwrap();
        assert!(CliConfig::from_file(&path).is_err());
    }
}

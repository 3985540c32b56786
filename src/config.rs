//! Project configuration
//!
//! Loads the optional `discount_rules.yaml` from a directory and merges
//! command-line flags over it. Flags always win over file values.

use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up in the working directory
pub const CONFIG_FILE: &str = "discount_rules.yaml";

const CONFIG_VERSION: u32 = 1;

/// Settings read from `discount_rules.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AppConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Knowledge base file; the built-in rules are used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<PathBuf>,

    /// SQLite database; rules are kept in memory when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Seed the database only when it has no rules yet
    #[serde(default = "default_true")]
    pub seed_when_empty: bool,

    /// `tracing` filter directive, e.g. "discount_rules=debug"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            rules: None,
            database: None,
            seed_when_empty: true,
            log_filter: None,
        }
    }
}

/// Overrides taken from the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub rules: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub verbose: bool,
}

impl AppConfig {
    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_norway::from_str(yaml)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", CONFIG_FILE, e)))?;

        if config.version != CONFIG_VERSION {
            return Err(Error::Config(format!(
                "Unsupported {} version: {}",
                CONFIG_FILE, config.version
            )));
        }

        Ok(config)
    }

    /// Load `discount_rules.yaml` from a directory
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_file = dir.join(CONFIG_FILE);
        if !config_file.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_file).map_err(Error::Io)?;
        let mut config = Self::from_yaml(&content)?;

        // Relative paths are relative to the config file, not the caller
        config.rules = config.rules.map(|p| resolve(dir, p));
        config.database = config.database.map(|p| resolve(dir, p));

        Ok(Some(config))
    }

    /// Apply command-line overrides
    pub fn merge_flags(mut self, flags: &ConfigFlags) -> Self {
        if let Some(rules) = &flags.rules {
            self.rules = Some(rules.clone());
        }
        if let Some(database) = &flags.database {
            self.database = Some(database.clone());
        }
        if flags.verbose {
            self.log_filter = Some("discount_rules=debug".to_string());
        }
        self
    }

    /// Filter directive used when `RUST_LOG` is unset
    pub fn effective_log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or("discount_rules=warn")
    }
}

fn resolve(dir: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_yaml() {
        let config = AppConfig::from_yaml("version: 1\n").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.effective_log_filter(), "discount_rules=warn");
    }

    #[test]
    fn test_rejects_unknown_version() {
        let err = AppConfig::from_yaml("version: 2\n").unwrap_err();
        assert!(err.to_string().contains("Unsupported"));
    }

    #[test]
    fn test_flags_override_file() {
        let config = AppConfig::from_yaml(
            "version: 1\nrules: a.yaml\ndatabase: a.db\nlog_filter: discount_rules=info\n",
        )
        .unwrap();

        let merged = config.merge_flags(&ConfigFlags {
            rules: Some(PathBuf::from("b.yaml")),
            database: None,
            verbose: true,
        });

        assert_eq!(merged.rules, Some(PathBuf::from("b.yaml")));
        assert_eq!(merged.database, Some(PathBuf::from("a.db")));
        assert_eq!(merged.effective_log_filter(), "discount_rules=debug");
    }

    #[test]
    fn test_load_from_dir_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "version: 1\nrules: kb.yaml\nseed_when_empty: false\n",
        )
        .unwrap();

        let config = AppConfig::load_from_dir(dir.path()).unwrap().unwrap();
        assert_eq!(config.rules, Some(dir.path().join("kb.yaml")));
        assert!(!config.seed_when_empty);
    }

    #[test]
    fn test_load_from_dir_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load_from_dir(dir.path()).unwrap().is_none());
    }
}

//! Application configuration, loaded from an optional TOML file.
//!
//! Every key is optional; a missing file section falls back to defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradecal_core::data::NormalizeOptions;
use tradecal_core::engine::{AggregateOptions, GroupBy};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub journal: JournalConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JournalConfig {
    /// Where journal entries are appended.
    pub path: PathBuf,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("trade_journal.txt"),
        }
    }
}

/// How broker exports are read and grouped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub price_multiplier: f64,
    pub timezone_suffixes: Vec<String>,
    pub group_by: GroupBy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        let normalize = NormalizeOptions::default();
        Self {
            price_multiplier: normalize.price_multiplier,
            timezone_suffixes: normalize.timezone_suffixes,
            group_by: GroupBy::default(),
        }
    }
}

impl ImportConfig {
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            price_multiplier: self.price_multiplier,
            timezone_suffixes: self.timezone_suffixes.clone(),
        }
    }

    pub fn aggregate_options(&self) -> AggregateOptions {
        AggregateOptions {
            group_by: self.group_by,
        }
    }
}

impl AppConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = self.import.price_multiplier;
        if !m.is_finite() || m <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "import.price_multiplier must be a positive number, got {m}"
            )));
        }
        if self.import.timezone_suffixes.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "import.timezone_suffixes must not contain empty entries".into(),
            ));
        }
        if self.journal.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("journal.path must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.journal.path, PathBuf::from("trade_journal.txt"));
        assert_eq!(config.import.price_multiplier, 100.0);
        assert_eq!(config.import.timezone_suffixes, vec!["EDT".to_string()]);
        assert_eq!(config.import.group_by, GroupBy::Symbol);
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [import]
            timezone_suffixes = ["EDT", "EST"]
            group_by = "contract"
            "#,
        )
        .unwrap();
        assert_eq!(config.import.price_multiplier, 100.0);
        assert_eq!(config.import.group_by, GroupBy::Contract);

        let normalize = config.import.normalize_options();
        assert_eq!(normalize.timezone_suffixes.len(), 2);
        assert_eq!(config.import.aggregate_options().group_by, GroupBy::Contract);
    }

    #[test]
    fn test_rejects_non_positive_multiplier() {
        let err = AppConfig::from_toml("[import]\nprice_multiplier = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = AppConfig::from_toml("[import]\nprice_multiplier = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_unknown_group_by() {
        let err = AppConfig::from_toml("[import]\ngroup_by = \"strike\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = AppConfig::from_file(Path::new("/nonexistent/tradecal.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(AppConfig::from_toml(&text).unwrap(), config);
    }
}

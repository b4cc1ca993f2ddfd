//! Configuration management for Vista.
//!
//! Configuration is loaded from the platform config directory (falling back
//! to `~/.vista/config.toml`). Every section has defaults, so a missing file
//! or a partial one is fine. The semantic rule tables and filter lists live
//! here too, so they can be versioned and replaced without code changes.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for Vista.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Accepted input files
    pub input: InputConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Object detector source
    pub detector: DetectorConfig,

    /// Remote classification backend source
    pub backend: BackendConfig,

    /// Local fallback classifier source
    pub classifier: ClassifierConfig,

    /// Description-derived label rules
    pub semantic: SemanticConfig,

    /// Validity filter for local classifier labels
    pub filter: FilterConfig,

    /// Result size and confidence handling
    pub ranking: RankingConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let path = Self::expand(path);
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.vista.vista/config.toml
    /// - Linux: ~/.config/vista/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\vista\config\config.toml
    ///
    /// Falls back to ~/.vista/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "vista", "vista")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".vista").join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }

    fn expand(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        PathBuf::from(shellexpand::tilde(&path_str).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.ranking.max_results, 4);
        assert_eq!(config.detector.max_predictions, 2);
        assert_eq!(config.limits.max_file_size_mb, 16);
        assert_eq!(config.backend.endpoint, "http://localhost:5000");
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[backend]"));
        assert!(toml.contains("[[semantic.keywords]]"));
        assert!(toml.contains("[filter]"));
    }

    #[test]
    fn test_default_config_roundtrips_through_toml() {
        let toml = Config::default().to_toml().unwrap();
        let parsed = Config::from_toml(&toml).unwrap();
        assert_eq!(parsed.semantic.keywords, Config::default().semantic.keywords);
        assert_eq!(parsed.filter.denylist, Config::default().filter.denylist);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [backend]
            endpoint = "http://vision.internal:8080"
            "#,
        )
        .unwrap();
        assert_eq!(config.backend.endpoint, "http://vision.internal:8080");
        assert_eq!(config.backend.timeout_ms, 30_000);
        assert_eq!(config.ranking.max_results, 4);
    }

    #[test]
    fn test_load_from_file_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[ranking]\nmax_results = 0").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("ranking.max_results"));
    }

    #[test]
    fn test_load_from_missing_file_is_read_error() {
        let err = Config::load_from(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }
}

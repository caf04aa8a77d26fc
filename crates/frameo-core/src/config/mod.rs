//! Configuration management for frameo-miniatures.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. CLI flags are layered on top by the binary.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Image transform settings
    pub transform: TransformConfig,

    /// Worker pool and queue settings
    pub pipeline: PipelineConfig,

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
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// - macOS: ~/Library/Application Support/com.frameo.frameo-miniatures/config.toml
    /// - Linux: ~/.config/frameo-miniatures/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\frameo\frameo-miniatures\config\config.toml
    ///
    /// Falls back to ~/.frameo-miniatures/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "frameo", "frameo-miniatures")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home)
                    .join(".frameo-miniatures")
                    .join("config.toml")
            })
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.transform.resolution, Resolution::new(1280, 800));
        assert_eq!(config.transform.format, OutputFormat::Webp);
        assert_eq!(config.transform.quality, 80);
        assert_eq!(config.pipeline.workers, 0);
        assert_eq!(config.pipeline.buffer_size, 1000);
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[transform]"));
        assert!(toml.contains("resolution = \"1280x800\""));
        assert!(toml.contains("format = \"webp\""));
        assert!(!toml.contains("dry_run"));
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[transform]\nresolution = \"1920x1080\"\nformat = \"jpeg\"\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.transform.resolution, Resolution::new(1920, 1080));
        assert_eq!(config.transform.format, OutputFormat::Jpeg);
        assert_eq!(config.transform.quality, 80);
        assert_eq!(config.pipeline.buffer_size, 1000);
    }

    #[test]
    fn test_load_rejects_bad_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[transform]\nresolution = \"wide\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}

//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let res = self.transform.resolution;
        if res.width == 0 || res.height == 0 {
            return Err(ConfigError::ValidationError(format!(
                "transform.resolution must have non-zero dimensions, got {res}"
            )));
        }
        if self.transform.quality > 100 {
            return Err(ConfigError::ValidationError(
                "transform.quality must be between 0 and 100".into(),
            ));
        }
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        Ok(())
    }
}

//! Error types for the frameo-miniatures pipeline.
//!
//! Errors are split by how far they are allowed to travel: configuration
//! errors abort the run, pipeline errors abort a single file, metadata errors
//! never leave the transformer and prune errors abort only the prune step.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for frameo-miniatures operations.
#[derive(Error, Debug)]
pub enum MiniaturesError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Pipeline processing errors
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// Output pruning errors
    #[error("Prune error: {0}")]
    Prune(#[from] PruneError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    /// Resolution string is not `<width>x<height>`
    #[error("Invalid resolution format: {0}")]
    InvalidResolution(String),

    /// Unknown output format
    #[error("Unsupported output format: {0} (expected webp, jpg or jpeg)")]
    InvalidFormat(String),
}

/// Per-file pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Source file could not be read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Image decoding failed
    #[error("Decode error for {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// No decoder available for this file
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// Encoding the resized image failed
    #[error("Encode error for {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Destination directory could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Final bytes could not be written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Metadata errors. Callers treat any of these as "metadata unavailable".
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Source EXIF could not be parsed
    #[error("Failed to read EXIF: {0}")]
    Read(#[from] exif::Error),

    /// Curated EXIF block could not be serialized
    #[error("Failed to build EXIF block: {0}")]
    Build(String),

    /// Encoded output could not carry the EXIF block
    #[error("Failed to embed EXIF: {0}")]
    Embed(String),
}

/// Ignore rule loading errors.
#[derive(Error, Debug)]
pub enum IgnoreError {
    /// The ignore file exists but could not be read
    #[error("Failed to read ignore file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A rule does not compile into a glob
    #[error("Invalid ignore pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: globset::Error,
    },
}

/// Output pruning errors.
#[derive(Error, Debug)]
pub enum PruneError {
    /// The output tree could not be walked
    #[error("Failed to walk output directory {path}: {message}")]
    Walk { path: PathBuf, message: String },
}

/// Convenience type alias for frameo-miniatures results.
pub type Result<T> = std::result::Result<T, MiniaturesError>;

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_mentions_path() {
        let err = PipelineError::Decode {
            path: PathBuf::from("/photos/broken.jpg"),
            message: "truncated".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("/photos/broken.jpg"));
        assert!(text.contains("truncated"));
    }

    #[test]
    fn test_config_error_converts_to_top_level() {
        let err: MiniaturesError = ConfigError::InvalidResolution("1280".into()).into();
        assert!(err.to_string().contains("Invalid resolution format: 1280"));
    }
}

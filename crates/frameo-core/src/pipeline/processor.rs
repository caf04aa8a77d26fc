//! Per-file transform: decode, orient, fit, encode, curate EXIF, write.

use filetime::FileTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::config::TransformConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::Outcome;

use super::decode::ImageDecoder;
use super::embed::embed_exif;
use super::encode::OutputEncoder;
use super::geometry::{apply_orientation, fit_to_frame};
use super::metadata::SourceMetadata;
use super::naming::output_filename;

/// Transforms one source photo into one frame-sized output.
///
/// Cheap to clone; the config is shared read-only between workers.
#[derive(Debug, Clone)]
pub struct ImageTransformer {
    config: Arc<TransformConfig>,
}

impl ImageTransformer {
    pub fn new(config: Arc<TransformConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    /// Destination path for `src` inside `dest_dir`.
    pub fn destination(&self, src: &Path, dest_dir: &Path) -> PathBuf {
        let filename = src
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();
        dest_dir.join(output_filename(&filename, self.config.format))
    }

    /// Process a single file into `dest_dir`.
    ///
    /// Writes at most one file and never leaves a partially written
    /// destination behind. Metadata problems only cost the output its EXIF.
    pub fn process(&self, src: &Path, dest_dir: &Path) -> PipelineResult<Outcome> {
        let start = std::time::Instant::now();
        tracing::debug!(path = %src.display(), "Processing");

        let bytes = std::fs::read(src).map_err(|source| PipelineError::Read {
            path: src.to_path_buf(),
            source,
        })?;

        let decoded = ImageDecoder::decode(&bytes, src)?;
        tracing::trace!(path = %src.display(), width = decoded.width, height = decoded.height, "Decoded");

        let metadata = match SourceMetadata::read(&bytes) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!(path = %src.display(), error = %e, "No usable EXIF");
                None
            }
        };
        let capture_time = metadata.as_ref().and_then(SourceMetadata::capture_time);
        let orientation = metadata.as_ref().and_then(SourceMetadata::orientation);

        let oriented = apply_orientation(decoded.image, orientation);
        let resized = fit_to_frame(oriented, self.config.resolution);

        let dest = self.destination(src, dest_dir);

        if self.config.dry_run {
            tracing::info!(src = %src.display(), dest = %dest.display(), "[DRY RUN] Would write");
            return Ok(Outcome::Planned(dest));
        }

        if self.config.skip_existing && dest.exists() {
            tracing::debug!(dest = %dest.display(), "Output exists, skipping");
            return Ok(Outcome::Skipped(dest));
        }

        std::fs::create_dir_all(dest_dir).map_err(|source| PipelineError::CreateDir {
            path: dest_dir.to_path_buf(),
            source,
        })?;

        let encoder = OutputEncoder::new(self.config.format, self.config.quality);
        let encoded = encoder.encode(&resized, src)?;
        let encoded = match metadata.as_ref() {
            Some(meta) => self.with_curated_exif(encoded, meta, src),
            None => encoded,
        };

        write_atomic(&dest, &encoded)?;

        let mtime = match capture_time {
            Some(t) => Some(t),
            None => std::fs::metadata(src).and_then(|m| m.modified()).ok(),
        };
        if let Some(mtime) = mtime {
            set_mtime(&dest, mtime);
        }

        tracing::debug!(
            dest = %dest.display(),
            bytes = encoded.len(),
            elapsed = ?start.elapsed(),
            "Written"
        );
        Ok(Outcome::Written(dest))
    }

    /// Attach the curated EXIF block, falling back to the bare encoding.
    fn with_curated_exif(&self, encoded: Vec<u8>, meta: &SourceMetadata, src: &Path) -> Vec<u8> {
        let block = match meta.curated_block() {
            Ok(Some(block)) => block,
            Ok(None) => return encoded,
            Err(e) => {
                tracing::warn!(src = %src.display(), error = %e, "Failed to rebuild EXIF, skipping metadata");
                return encoded;
            }
        };
        // embed_exif consumes its input, keep a copy for the fallback
        match embed_exif(encoded.clone(), block, self.config.format) {
            Ok(with_exif) => with_exif,
            Err(e) => {
                tracing::warn!(src = %src.display(), error = %e, "Failed to embed EXIF, writing without metadata");
                encoded
            }
        }
    }
}

/// Write through a uniquely named hidden sibling and rename it into place.
///
/// Sources that normalize to the same destination never share a temp file;
/// the last rename wins.
fn write_atomic(dest: &Path, bytes: &[u8]) -> PipelineResult<()> {
    let write_err = |source: std::io::Error| PipelineError::Write {
        path: dest.to_path_buf(),
        source,
    };
    let dir = dest.parent().unwrap_or(Path::new("."));

    let mut builder = tempfile::Builder::new();
    builder.prefix(".").suffix(".part");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }

    // Dropped (and deleted) on any error below
    let mut tmp = builder.tempfile_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.persist(dest).map_err(|e| write_err(e.error))?;
    Ok(())
}

fn set_mtime(path: &Path, time: SystemTime) {
    if let Err(e) = filetime::set_file_mtime(path, FileTime::from_system_time(time)) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to set file time");
    }
}

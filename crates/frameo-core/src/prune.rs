//! Removal of outputs whose source no longer maps to them.
//!
//! An output is expected when some discovered input would produce exactly that
//! path. Everything else under the output root is an orphan: deleted sources,
//! newly ignored sources, leftovers from a previous output format and stray
//! files alike.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::OutputFormat;
use crate::error::PruneError;
use crate::pipeline::discovery::FileDiscovery;
use crate::pipeline::naming::output_relative_path;
use crate::types::PruneReport;

/// Deletes orphaned outputs and the directories they leave empty.
pub struct Pruner {
    discovery: FileDiscovery,
    output_root: PathBuf,
    format: OutputFormat,
    dry_run: bool,
    excluded: Option<PathBuf>,
}

impl Pruner {
    pub fn new(
        discovery: FileDiscovery,
        output_root: impl Into<PathBuf>,
        format: OutputFormat,
        dry_run: bool,
    ) -> Self {
        Self {
            discovery,
            output_root: output_root.into(),
            format,
            dry_run,
            excluded: None,
        }
    }

    /// Never look inside `dir`, given relative to the output root.
    ///
    /// Used when the input tree lives inside the output tree, so sources are
    /// never mistaken for orphans.
    pub fn with_excluded_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded = Some(dir.into());
        self
    }

    /// Output paths, relative to the output root, that the input maps to.
    pub fn expected_outputs(&self) -> HashSet<PathBuf> {
        self.discovery
            .walk()
            .map(|file| output_relative_path(&file.relative_path, self.format))
            .collect()
    }

    /// Run one prune pass. In dry-run mode nothing is removed but the report
    /// counts what would have been.
    pub fn prune(&self) -> Result<PruneReport, PruneError> {
        if !self.output_root.is_dir() {
            tracing::debug!(path = %self.output_root.display(), "Output root missing, nothing to prune");
            return Ok(PruneReport::default());
        }

        let expected = self.expected_outputs();
        tracing::debug!(expected = expected.len(), "Built expected output set");

        let mut report = PruneReport::default();
        let mut gone: HashSet<PathBuf> = HashSet::new();

        for entry in self.walk_output(false) {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            if entry.file_type().is_dir() {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.output_root) else {
                continue;
            };
            if expected.contains(relative) {
                continue;
            }

            if self.remove_file(entry.path()) {
                report.removed_files += 1;
                gone.insert(entry.path().to_path_buf());
            }
        }

        // Children come before parents, so nested empty trees collapse fully
        for entry in self.walk_output(true) {
            let entry = entry.map_err(|e| self.walk_error(e))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            if is_effectively_empty(entry.path(), &gone) && self.remove_dir(entry.path()) {
                report.removed_dirs += 1;
                gone.insert(entry.path().to_path_buf());
            }
        }

        tracing::info!(
            files = report.removed_files,
            dirs = report.removed_dirs,
            dry_run = self.dry_run,
            "Prune finished"
        );
        Ok(report)
    }

    fn walk_output(
        &self,
        contents_first: bool,
    ) -> impl Iterator<Item = walkdir::Result<walkdir::DirEntry>> + '_ {
        WalkDir::new(&self.output_root)
            .min_depth(1)
            .contents_first(contents_first)
            .into_iter()
            .filter_entry(move |entry| !self.is_excluded(entry.path()))
    }

    // filter_entry cannot prune a subtree in contents-first order, so every
    // descendant is tested too
    fn is_excluded(&self, path: &Path) -> bool {
        match (&self.excluded, path.strip_prefix(&self.output_root)) {
            (Some(excluded), Ok(relative)) => relative.starts_with(excluded),
            _ => false,
        }
    }

    fn remove_file(&self, path: &Path) -> bool {
        if self.dry_run {
            tracing::info!(path = %path.display(), "[DRY RUN] Would remove orphan");
            return true;
        }
        match std::fs::remove_file(path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Removed orphan");
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove orphan");
                false
            }
        }
    }

    fn remove_dir(&self, path: &Path) -> bool {
        if self.dry_run {
            tracing::info!(path = %path.display(), "[DRY RUN] Would remove empty directory");
            return true;
        }
        match std::fs::remove_dir(path) {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "Removed empty directory");
                true
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to remove directory");
                false
            }
        }
    }

    fn walk_error(&self, e: walkdir::Error) -> PruneError {
        PruneError::Walk {
            path: e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.output_root.clone()),
            message: e.to_string(),
        }
    }
}

/// Whether every entry of `dir` has been (or in dry run, would be) removed.
fn is_effectively_empty(dir: &Path, gone: &HashSet<PathBuf>) -> bool {
    match std::fs::read_dir(dir) {
        Ok(mut entries) => entries.all(|entry| match entry {
            Ok(entry) => gone.contains(&entry.path()),
            Err(_) => false,
        }),
        Err(e) => {
            tracing::warn!(path = %dir.display(), error = %e, "Failed to list directory");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::ignore::IgnoreMatcher;
    use std::sync::Arc;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"x").unwrap();
    }

    fn pruner(input: &Path, output: &Path, matcher: IgnoreMatcher, dry_run: bool) -> Pruner {
        let discovery = FileDiscovery::new(input, Arc::new(matcher));
        Pruner::new(discovery, output, OutputFormat::Webp, dry_run)
    }

    #[test]
    fn test_prune_removes_only_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = (dir.path().join("in"), dir.path().join("out"));
        touch(&input.join("a.jpg"));
        touch(&input.join("b.jpg"));
        touch(&output.join("a.webp"));
        touch(&output.join("b.webp"));
        touch(&output.join("orphan.webp"));

        let p = pruner(&input, &output, IgnoreMatcher::empty(), false);
        let report = p.prune().unwrap();
        assert_eq!(
            report,
            PruneReport {
                removed_files: 1,
                removed_dirs: 0,
            }
        );
        assert!(output.join("a.webp").exists());
        assert!(output.join("b.webp").exists());
        assert!(!output.join("orphan.webp").exists());

        // Nothing left to do on a second pass
        assert_eq!(p.prune().unwrap(), PruneReport::default());
    }

    #[test]
    fn test_prune_treats_ignored_inputs_as_orphans() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = (dir.path().join("in"), dir.path().join("out"));
        touch(&input.join("keep.jpg"));
        touch(&input.join("secret/x.jpg"));
        touch(&output.join("keep.webp"));
        touch(&output.join("secret/x.webp"));

        let matcher = IgnoreMatcher::from_lines(["secret/"]).unwrap();
        let report = pruner(&input, &output, matcher, false).prune().unwrap();

        assert_eq!(report.removed_files, 1);
        assert_eq!(report.removed_dirs, 1);
        assert!(output.join("keep.webp").exists());
        assert!(!output.join("secret").exists());
    }

    #[test]
    fn test_prune_after_format_switch() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = (dir.path().join("in"), dir.path().join("out"));
        touch(&input.join("a.jpg"));
        touch(&output.join("a.jpg"));
        touch(&output.join("a.webp"));

        let report = pruner(&input, &output, IgnoreMatcher::empty(), false)
            .prune()
            .unwrap();

        assert_eq!(report.removed_files, 1);
        assert!(!output.join("a.jpg").exists());
        assert!(output.join("a.webp").exists());
    }

    #[test]
    fn test_prune_collapses_nested_empty_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = (dir.path().join("in"), dir.path().join("out"));
        std::fs::create_dir_all(&input).unwrap();
        touch(&output.join("old/deeper/gone.webp"));
        std::fs::create_dir_all(output.join("empty")).unwrap();

        let report = pruner(&input, &output, IgnoreMatcher::empty(), false)
            .prune()
            .unwrap();

        assert_eq!(report.removed_files, 1);
        assert_eq!(report.removed_dirs, 3);
        assert!(output.exists(), "output root is never removed");
        assert_eq!(std::fs::read_dir(&output).unwrap().count(), 0);
    }

    #[test]
    fn test_prune_dry_run_reports_without_removing() {
        let dir = tempfile::tempdir().unwrap();
        let (input, output) = (dir.path().join("in"), dir.path().join("out"));
        touch(&input.join("a.jpg"));
        touch(&output.join("a.webp"));
        touch(&output.join("stale/orphan.webp"));

        let report = pruner(&input, &output, IgnoreMatcher::empty(), true)
            .prune()
            .unwrap();

        assert_eq!(
            report,
            PruneReport {
                removed_files: 1,
                removed_dirs: 1,
            }
        );
        assert!(output.join("stale/orphan.webp").exists());
    }

    #[test]
    fn test_prune_skips_excluded_input_tree() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("frame");
        let input = output.join("originals");
        touch(&input.join("a.jpg"));
        touch(&input.join("trip/b.jpg"));
        touch(&output.join("a.webp"));
        touch(&output.join("trip/b.webp"));
        touch(&output.join("orphan.webp"));
        std::fs::create_dir_all(input.join("empty-album")).unwrap();

        let report = pruner(&input, &output, IgnoreMatcher::empty(), false)
            .with_excluded_dir("originals")
            .prune()
            .unwrap();

        assert_eq!(report.removed_files, 1);
        assert_eq!(report.removed_dirs, 0);
        assert!(input.join("a.jpg").exists());
        assert!(input.join("trip/b.jpg").exists());
        assert!(input.join("empty-album").exists());
        assert!(output.join("trip/b.webp").exists());
    }

    #[test]
    fn test_prune_missing_output_root() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("in/a.jpg"));

        let report = pruner(
            &dir.path().join("in"),
            &dir.path().join("nowhere"),
            IgnoreMatcher::empty(),
            false,
        )
        .prune()
        .unwrap();
        assert_eq!(report, PruneReport::default());
    }

    #[test]
    fn test_expected_outputs_normalizes_names() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in");
        touch(&input.join("sub/photo:test.JPG"));

        let p = pruner(&input, &dir.path().join("out"), IgnoreMatcher::empty(), false);
        assert_eq!(
            p.expected_outputs(),
            HashSet::from([PathBuf::from("sub/photo_test.webp")])
        );
    }
}

//! File discovery for finding photos in an input tree.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use walkdir::WalkDir;

use super::ignore::IgnoreMatcher;

/// Extensions accepted as input, compared lowercase.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "heic"];

/// A photo found by the walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Full path to the file
    pub path: PathBuf,
    /// Path relative to the input root
    pub relative_path: PathBuf,
}

/// Discovers photos under an input root, honoring ignore rules.
#[derive(Debug, Clone)]
pub struct FileDiscovery {
    root: PathBuf,
    anchor: Option<OsString>,
    matcher: Arc<IgnoreMatcher>,
    excluded: Option<PathBuf>,
}

impl FileDiscovery {
    /// Create a discovery instance for `root`.
    pub fn new(root: impl Into<PathBuf>, matcher: Arc<IgnoreMatcher>) -> Self {
        let root = root.into();
        // `.` has no file name, so resolve the real directory name for anchored rules
        let anchor = std::fs::canonicalize(&root)
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_os_string()));
        Self {
            root,
            anchor,
            matcher,
            excluded: None,
        }
    }

    /// Never descend into `dir`, given relative to the root.
    ///
    /// Used when the output tree lives inside the input tree.
    pub fn with_excluded_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.excluded = Some(dir.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start a fresh traversal.
    ///
    /// The returned iterator is lazy and single-use; call `walk` again for a
    /// second pass.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            discovery: self,
            inner: WalkDir::new(&self.root).follow_links(true).into_iter(),
        }
    }

    /// Feed a full traversal into a bounded channel.
    ///
    /// Blocks when the channel is full. The sender is dropped on return, which
    /// closes the queue for the consumers. Must run outside the async runtime
    /// (e.g. in `spawn_blocking`). Returns the number of files sent.
    pub fn stream(&self, sender: mpsc::Sender<FileDescriptor>) -> usize {
        let mut sent = 0;
        for file in self.walk() {
            if sender.blocking_send(file).is_err() {
                tracing::warn!("File queue closed before the walk finished");
                break;
            }
            sent += 1;
        }
        tracing::debug!(files = sent, root = %self.root.display(), "Discovery finished");
        sent
    }

    fn is_ignored(&self, relative: &Path, is_dir: bool) -> bool {
        if is_dir && self.excluded.as_deref() == Some(relative) {
            return true;
        }
        self.matcher
            .matches_entry(self.anchor.as_deref(), relative, is_dir)
    }
}

/// Check if a path has a supported photo extension.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// A single traversal of the input tree.
pub struct Walk<'a> {
    discovery: &'a FileDiscovery,
    inner: walkdir::IntoIter,
}

impl Iterator for Walk<'_> {
    type Item = FileDescriptor;

    fn next(&mut self) -> Option<FileDescriptor> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().map(|p| p.display().to_string()).unwrap_or_default();
                    tracing::warn!(path = %path, error = %e, "Error walking path");
                    continue;
                }
            };

            if entry.depth() == 0 {
                continue;
            }

            let Ok(relative) = entry.path().strip_prefix(&self.discovery.root) else {
                tracing::warn!(path = %entry.path().display(), "Entry outside input root");
                continue;
            };
            let is_dir = entry.file_type().is_dir();

            if self.discovery.is_ignored(relative, is_dir) {
                if is_dir {
                    tracing::debug!(path = %relative.display(), "Skipping ignored directory");
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if is_dir || !entry.file_type().is_file() || !is_supported(entry.path()) {
                continue;
            }

            return Some(FileDescriptor {
                relative_path: relative.to_path_buf(),
                path: entry.into_path(),
            });
        }
    }
}

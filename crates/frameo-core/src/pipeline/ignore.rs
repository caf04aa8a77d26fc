//! Gitignore-style ignore rules loaded from `.frameoignore`.
//!
//! Rules are evaluated in file order and the last matching rule decides,
//! so a later `!pattern` can re-include a path. Patterns without a `/` match
//! at any depth, patterns with a `/` are anchored to the root, and `*` never
//! crosses a path separator. A trailing `/` restricts a rule to directories.
//!
//! Once a directory is ignored nothing below it can be re-included: the
//! walker never descends into it, and [`IgnoreMatcher::matches`] checks every
//! ancestor before the path itself.

use globset::{GlobBuilder, GlobMatcher};
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::IgnoreError;

/// Name of the per-tree ignore file.
pub const IGNORE_FILE_NAME: &str = ".frameoignore";

/// Compiled, read-only set of ignore rules.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    rules: Vec<IgnoreRule>,
    source: Option<PathBuf>,
}

#[derive(Debug, Clone)]
struct IgnoreRule {
    matcher: GlobMatcher,
    negated: bool,
    dir_only: bool,
}

impl IgnoreRule {
    fn parse(line: &str) -> Result<Option<Self>, IgnoreError> {
        let line = line.trim_end();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (negated, body) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, unescape_leading(line)),
        };
        let (dir_only, body) = match body.strip_suffix('/') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        if body.is_empty() {
            return Ok(None);
        }

        let glob = match body.strip_prefix('/') {
            Some(anchored) => anchored.to_string(),
            None if body.contains('/') => body.to_string(),
            None => format!("**/{body}"),
        };

        let matcher = GlobBuilder::new(&glob)
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|source| IgnoreError::Pattern {
                pattern: line.to_string(),
                source,
            })?
            .compile_matcher();

        Ok(Some(Self {
            matcher,
            negated,
            dir_only,
        }))
    }
}

impl IgnoreMatcher {
    /// A matcher that ignores nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compile rules from lines in gitignore syntax.
    pub fn from_lines<I, S>(lines: I) -> Result<Self, IgnoreError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut rules = Vec::new();
        for line in lines {
            if let Some(rule) = IgnoreRule::parse(line.as_ref())? {
                rules.push(rule);
            }
        }
        Ok(Self {
            rules,
            source: None,
        })
    }

    /// Compile rules from an ignore file.
    pub fn from_file(path: &Path) -> Result<Self, IgnoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| IgnoreError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut matcher = Self::from_lines(content.lines())?;
        matcher.source = Some(path.to_path_buf());
        Ok(matcher)
    }

    /// Find the ignore file to use for a run.
    ///
    /// Candidates, first existing wins:
    /// 1. `explicit` (if provided)
    /// 2. `~/.config/frameoignore`
    /// 3. `<input_root>/.frameoignore`
    /// 4. `./.frameoignore`
    pub fn locate(explicit: Option<&Path>, input_root: &Path) -> Option<PathBuf> {
        let user_config = directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".config").join("frameoignore"));

        explicit
            .map(Path::to_path_buf)
            .into_iter()
            .chain(user_config)
            .chain([
                input_root.join(IGNORE_FILE_NAME),
                PathBuf::from(IGNORE_FILE_NAME),
            ])
            .find(|candidate| candidate.is_file())
    }

    /// Locate and compile the ignore file for a run.
    ///
    /// Returns an empty matcher when no candidate exists.
    pub fn load(explicit: Option<&Path>, input_root: &Path) -> Result<Self, IgnoreError> {
        match Self::locate(explicit, input_root) {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading ignore rules");
                Self::from_file(&path)
            }
            None => {
                tracing::debug!("No ignore file found, nothing will be ignored");
                Ok(Self::empty())
            }
        }
    }

    /// File the rules were loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether `path` is ignored, testing this single path form.
    pub fn matches(&self, path: &Path, is_dir: bool) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        self.matches_components(&[], &normal_components(path), is_dir)
    }

    /// Whether a walker entry is ignored.
    ///
    /// Tests the root-relative path and, when `anchor` is given, the same path
    /// prefixed with the input root's own directory name. Rule authors write
    /// patterns like `*/2005.07/*` assuming either anchor.
    pub fn matches_entry(&self, anchor: Option<&OsStr>, relative: &Path, is_dir: bool) -> bool {
        if self.rules.is_empty() {
            return false;
        }
        let components = normal_components(relative);
        if self.matches_components(&[], &components, is_dir) {
            return true;
        }
        match anchor.map(|a| a.to_string_lossy()) {
            Some(anchor) => self.matches_components(&[anchor.as_ref()], &components, is_dir),
            None => false,
        }
    }

    fn matches_components(&self, prefix: &[&str], components: &[String], is_dir: bool) -> bool {
        if components.is_empty() {
            return false;
        }

        // An excluded ancestor hides everything below it.
        for depth in 1..components.len() {
            let candidate = join(prefix, &components[..depth]);
            if self.decide(&candidate, true) == Some(true) {
                return true;
            }
        }

        self.decide(&join(prefix, components), is_dir)
            .unwrap_or(false)
    }

    /// Last matching rule wins: `Some(true)` ignored, `Some(false)` re-included.
    fn decide(&self, candidate: &str, is_dir: bool) -> Option<bool> {
        self.rules
            .iter()
            .rev()
            .find(|rule| (is_dir || !rule.dir_only) && rule.matcher.is_match(candidate))
            .map(|rule| !rule.negated)
    }
}

fn normal_components(path: &Path) -> Vec<String> {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect()
}

fn join(prefix: &[&str], components: &[String]) -> String {
    prefix
        .iter()
        .copied()
        .chain(components.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join("/")
}

/// Drop a backslash that escapes a leading `#` or `!`. Any other escape is
/// left for globset.
fn unescape_leading(line: &str) -> &str {
    match line.strip_prefix('\\') {
        Some(rest) if rest.starts_with(['#', '!']) => rest,
        _ => line,
    }
}

//! Glob matching of filesystem entries with an optional modification-time floor.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use glob::{MatchOptions, Pattern};

use crate::error::UtilError;

/// Which kind of filesystem entry a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Regular files only.
    File,
    /// Directories only.
    Directory,
}

// `*` crosses path separators so `*build/reports` matches at any depth.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Matches entries below a root directory against a glob-like pattern.
#[derive(Debug, Clone)]
pub struct PathMatcher {
    root: PathBuf,
    pattern: Pattern,
}

impl PathMatcher {
    /// Compile `pattern` for searching under `root`.
    ///
    /// Absolute patterns and patterns starting with `*` are matched against
    /// absolute entry paths as-is. Any other relative pattern is anchored at
    /// `root`.
    ///
    /// # Errors
    /// Returns an error if the pattern is not a valid glob.
    pub fn new(root: &Path, pattern: &str) -> Result<Self, UtilError> {
        let full = if Path::new(pattern).is_absolute() || pattern.starts_with('*') {
            pattern.to_owned()
        } else {
            let escaped_root = Pattern::escape(&root.display().to_string());
            format!("{}/{pattern}", escaped_root.trim_end_matches('/'))
        };

        let compiled = Pattern::new(&full).map_err(|e| UtilError::GlobPattern {
            pattern: full.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            pattern: compiled,
        })
    }

    /// The effective pattern after anchoring.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether `path` matches the pattern. The entry kind is not checked.
    pub fn matches(&self, path: &Path) -> bool {
        self.pattern.matches_path_with(path, MATCH_OPTIONS)
    }

    /// Find all entries of `kind` below the root that match the pattern.
    ///
    /// When `modified_after` is set, only entries whose own modification time
    /// is at or after it are returned. Results are sorted by path. Entries that
    /// vanish while walking are skipped.
    ///
    /// # Errors
    /// Returns an error if the root or any directory below it cannot be read.
    pub fn find(
        &self,
        modified_after: Option<SystemTime>,
        kind: EntryKind,
    ) -> Result<Vec<PathBuf>, UtilError> {
        let mut found = Vec::new();

        for entry in walkdir::WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let path = e.path().unwrap_or(&self.root).to_path_buf();
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    if source.kind() == std::io::ErrorKind::NotFound {
                        continue;
                    }
                    return Err(UtilError::io(&path, source));
                }
            };

            let file_type = entry.file_type();
            let kind_matches = match kind {
                EntryKind::File => file_type.is_file(),
                EntryKind::Directory => file_type.is_dir(),
            };
            if !kind_matches || !self.matches(entry.path()) {
                continue;
            }

            if let Some(floor) = modified_after {
                let modified = match entry.metadata().map_err(std::io::Error::from) {
                    Ok(meta) => meta.modified(),
                    Err(e) => Err(e),
                };
                match modified {
                    Ok(mtime) if mtime >= floor => {}
                    Ok(_) => continue,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                    Err(source) => return Err(UtilError::io(entry.path(), source)),
                }
            }

            found.push(entry.into_path());
        }

        found.sort();
        Ok(found)
    }
}

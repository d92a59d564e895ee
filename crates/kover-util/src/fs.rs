//! Filesystem utilities for the Kover step.

use std::path::{Path, PathBuf};

use crate::error::UtilError;

/// Create a directory and all parent directories if they do not exist.
///
/// # Errors
/// Returns an error if the directory cannot be created.
pub fn ensure_dir(path: &Path) -> Result<(), UtilError> {
    std::fs::create_dir_all(path).map_err(|source| UtilError::io(path, source))
}

/// Check whether `path` exists.
///
/// Unlike [`Path::exists`], a failure to stat the path (e.g. permission denied
/// on a parent directory) is reported instead of being treated as "absent".
///
/// # Errors
/// Returns an error if the existence of `path` cannot be determined.
pub fn path_exists(path: &Path) -> Result<bool, UtilError> {
    path.try_exists().map_err(|source| UtilError::io(path, source))
}

/// Copy the file `src` to `dest`, creating the parent directories of `dest`.
///
/// An existing file at `dest` is overwritten.
///
/// # Errors
/// Returns an error if the parent directory cannot be created or the copy fails.
pub fn copy_file(src: &Path, dest: &Path) -> Result<(), UtilError> {
    if let Some(parent) = dest.parent() {
        ensure_dir(parent)?;
    }
    std::fs::copy(src, dest).map_err(|source| UtilError::io(dest, source))?;
    Ok(())
}

/// Render `path` for progress output.
///
/// Paths under the current working directory are shown as `./<relative>`;
/// anything else falls back to the file name.
pub fn display_source(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf));
    match relative {
        Some(rel) if !rel.as_os_str().is_empty() => format!("./{}", rel.display()),
        _ => path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
    }
}

/// Return the current user's home directory.
///
/// Resolves via `HOME` (Unix) or `USERPROFILE` (Windows).
///
/// # Errors
/// Returns an error if neither environment variable is set.
pub fn home_dir() -> Result<PathBuf, UtilError> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .map_err(|_| UtilError::NoHomeDir)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn ensure_dir_creates_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let nested = tmp.path().join("a").join("b").join("c");
        ensure_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn path_exists_reports_presence() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("app-debug.zip");
        assert!(!path_exists(&file).unwrap());
        fs::write(&file, b"zip").unwrap();
        assert!(path_exists(&file).unwrap());
    }

    #[test]
    fn copy_file_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("report.xml");
        let dest = tmp.path().join("results").join("other").join("report.xml");
        fs::write(&src, b"<report/>").unwrap();

        copy_file(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"<report/>");
    }

    #[test]
    fn copy_file_overwrites_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("new.xml");
        let dest = tmp.path().join("old.xml");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        copy_file(&src, &dest).unwrap();
        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn copy_file_missing_source_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = copy_file(&tmp.path().join("absent.xml"), &tmp.path().join("out.xml"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("cannot access"), "error was: {err}");
    }

    #[test]
    fn display_source_outside_cwd_uses_file_name() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("html");
        // The temp dir is never below the test's working directory.
        assert_eq!(display_source(&path), "html");
    }

    #[cfg(unix)]
    #[test]
    fn display_source_under_cwd_is_relative() {
        let cwd = std::env::current_dir().unwrap();
        let path = cwd.join("build").join("reports");
        assert_eq!(display_source(&path), "./build/reports");
    }
}

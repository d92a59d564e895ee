//! An opened Gradle workspace.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use kover_util::find::{EntryKind, PathMatcher};
use kover_util::process::CommandFactory;

use crate::artifact::Artifact;
use crate::error::GradleError;
use crate::task::Task;

/// A Gradle workspace driven through its wrapper script.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    wrapper: PathBuf,
    factory: CommandFactory,
}

impl Project {
    /// Open the Gradle workspace at `location`.
    ///
    /// The location is canonicalized so artifact paths found later are
    /// absolute and free of symlinked prefixes.
    ///
    /// # Errors
    /// Returns an error if the location is empty, is not a directory, or has
    /// no `gradlew` wrapper.
    pub fn open(location: &Path, factory: CommandFactory) -> Result<Self, GradleError> {
        if location.as_os_str().is_empty() {
            return Err(GradleError::EmptyLocation);
        }
        let root = location
            .canonicalize()
            .ok()
            .filter(|p| p.is_dir())
            .ok_or_else(|| GradleError::NotADirectory {
                path: location.display().to_string(),
            })?;

        let wrapper = root.join("gradlew");
        if !wrapper.is_file() {
            return Err(GradleError::WrapperMissing {
                path: wrapper.display().to_string(),
            });
        }

        Ok(Self {
            root,
            wrapper,
            factory,
        })
    }

    /// Canonical root directory of the workspace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the `gradlew` wrapper script.
    pub fn wrapper(&self) -> &Path {
        &self.wrapper
    }

    /// The command factory used for every Gradle invocation.
    pub fn factory(&self) -> &CommandFactory {
        &self.factory
    }

    /// A handle on the task `name` (e.g. `koverXmlReport`).
    pub fn task(&self, name: &str) -> Task<'_> {
        Task::new(self, name)
    }

    /// Find directories matching `pattern` below the workspace root.
    ///
    /// # Errors
    /// Returns an error if the pattern is invalid or the workspace cannot be read.
    pub fn find_dirs(
        &self,
        modified_after: Option<SystemTime>,
        pattern: &str,
        include_module: bool,
    ) -> Result<Vec<Artifact>, GradleError> {
        self.find(modified_after, pattern, include_module, EntryKind::Directory)
    }

    /// Find regular files matching `pattern` below the workspace root.
    ///
    /// # Errors
    /// Returns an error if the pattern is invalid or the workspace cannot be read.
    pub fn find_files(
        &self,
        modified_after: Option<SystemTime>,
        pattern: &str,
        include_module: bool,
    ) -> Result<Vec<Artifact>, GradleError> {
        self.find(modified_after, pattern, include_module, EntryKind::File)
    }

    /// Find entries of `kind` matching `pattern`, modified at or after
    /// `modified_after` when it is set. Results are sorted by path.
    ///
    /// # Errors
    /// Returns an error if the pattern is invalid or the workspace cannot be read.
    pub fn find(
        &self,
        modified_after: Option<SystemTime>,
        pattern: &str,
        include_module: bool,
        kind: EntryKind,
    ) -> Result<Vec<Artifact>, GradleError> {
        let matcher = PathMatcher::new(&self.root, pattern)?;
        let is_dir = kind == EntryKind::Directory;
        Ok(matcher
            .find(modified_after, kind)?
            .iter()
            .map(|path| Artifact::new(&self.root, path, include_module, is_dir))
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use super::*;

    fn workspace() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("gradlew"), "#!/bin/sh\n").unwrap();
        fs::create_dir_all(tmp.path().join("app/build/reports/kover/html")).unwrap();
        fs::create_dir_all(tmp.path().join("app/build/reports/kover/xml")).unwrap();
        fs::write(
            tmp.path().join("app/build/reports/kover/xml/report.xml"),
            "<report/>",
        )
        .unwrap();
        tmp
    }

    #[test]
    fn open_valid_workspace() {
        let tmp = workspace();
        let project = Project::open(tmp.path(), CommandFactory::new()).unwrap();
        assert_eq!(project.root(), tmp.path().canonicalize().unwrap());
        assert_eq!(project.wrapper(), project.root().join("gradlew"));
    }

    #[test]
    fn open_empty_location_errors() {
        let err = Project::open(Path::new(""), CommandFactory::new()).unwrap_err();
        assert!(matches!(err, GradleError::EmptyLocation));
    }

    #[test]
    fn open_missing_location_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Project::open(&tmp.path().join("nope"), CommandFactory::new())
            .unwrap_err()
            .to_string();
        assert!(err.contains("does not exist"), "error was: {err}");
    }

    #[test]
    fn open_without_wrapper_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let err = Project::open(tmp.path(), CommandFactory::new())
            .unwrap_err()
            .to_string();
        assert!(err.contains("no gradlew found"), "error was: {err}");
    }

    #[test]
    fn find_dirs_names_by_module() {
        let tmp = workspace();
        let project = Project::open(tmp.path(), CommandFactory::new()).unwrap();

        let dirs = project
            .find_dirs(None, "*build/reports/kover/html", true)
            .unwrap();
        assert_eq!(dirs.len(), 1);
        let html = dirs.first().unwrap();
        assert_eq!(html.name, "app-html");
        assert!(html.is_dir);
        assert_eq!(html.path, project.root().join("app/build/reports/kover/html"));
    }

    #[test]
    fn find_files_without_module_segment() {
        let tmp = workspace();
        let project = Project::open(tmp.path(), CommandFactory::new()).unwrap();

        let files = project
            .find_files(None, "*build/reports/kover/xml*.xml", false)
            .unwrap();
        assert_eq!(files.len(), 1);
        let report = files.first().unwrap();
        assert_eq!(report.name, "report.xml");
        assert!(!report.is_dir);
    }

    #[test]
    fn find_with_invalid_pattern_errors() {
        let tmp = workspace();
        let project = Project::open(tmp.path(), CommandFactory::new()).unwrap();
        assert!(project.find_dirs(None, "*[", true).is_err());
    }
}

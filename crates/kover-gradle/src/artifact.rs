//! Report artifacts found in a Gradle workspace.

use std::path::{Component, Path, PathBuf};

use crate::error::GradleError;

/// A file or directory produced by the build that the step publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Absolute path of the artifact.
    pub path: PathBuf,
    /// Export name proposed for the artifact, without archive extension.
    pub name: String,
    /// Whether the artifact is a directory tree rather than a single file.
    pub is_dir: bool,
}

impl Artifact {
    /// Describe the entry at `path` inside the project at `root`.
    ///
    /// With `include_module`, the name is `<module>-<basename>`, where the
    /// module is the first path component below `root`. Entries directly in
    /// `root`, and every entry when `include_module` is false, are named by
    /// their basename alone.
    pub fn new(root: &Path, path: &Path, include_module: bool, is_dir: bool) -> Self {
        Self {
            path: path.to_path_buf(),
            name: display_name(root, path, include_module),
            is_dir,
        }
    }

    /// Zip the artifact into `deploy_dir/file_name`.
    ///
    /// # Errors
    /// Returns an error if the artifact cannot be read or the archive cannot
    /// be written.
    pub fn export_zip(&self, deploy_dir: &Path, file_name: &str) -> Result<PathBuf, GradleError> {
        let dest = deploy_dir.join(file_name);
        kover_util::archive::zip_path(&self.path, &dest)?;
        Ok(dest)
    }
}

fn display_name(root: &Path, path: &Path, include_module: bool) -> String {
    let base = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    if !include_module {
        return base;
    }

    let Ok(rel) = path.strip_prefix(root) else {
        return base;
    };
    let mut components = rel.components().filter(|c| matches!(c, Component::Normal(_)));
    let module = components.next();
    if components.next().is_none() {
        return base;
    }
    match module {
        Some(module) => format!("{}-{base}", module.as_os_str().to_string_lossy()),
        None => base,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn module_qualified_name() {
        let root = Path::new("/work/project");
        let artifact = Artifact::new(
            root,
            &root.join("app/build/reports/kover/debug"),
            true,
            true,
        );
        assert_eq!(artifact.name, "app-debug");
        assert!(artifact.is_dir);
    }

    #[test]
    fn module_segment_suppressed() {
        let root = Path::new("/work/project");
        let artifact = Artifact::new(
            root,
            &root.join("app/build/reports/kover/xml/report.xml"),
            false,
            false,
        );
        assert_eq!(artifact.name, "report.xml");
    }

    #[test]
    fn entry_directly_in_root_uses_basename() {
        let root = Path::new("/work/project");
        let artifact = Artifact::new(root, &root.join("html"), true, true);
        assert_eq!(artifact.name, "html");
    }

    #[test]
    fn entry_outside_root_uses_basename() {
        let artifact = Artifact::new(
            Path::new("/work/project"),
            Path::new("/elsewhere/reports/html"),
            true,
            true,
        );
        assert_eq!(artifact.name, "html");
    }

    #[test]
    fn export_zip_writes_named_archive() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("project");
        let html = root.join("app/build/reports/kover/html");
        std::fs::create_dir_all(&html).unwrap();
        std::fs::write(html.join("index.html"), b"<html/>").unwrap();
        let deploy = tmp.path().join("deploy");
        std::fs::create_dir_all(&deploy).unwrap();

        let artifact = Artifact::new(&root, &html, true, true);
        let dest = artifact.export_zip(&deploy, "app-html.zip").unwrap();
        assert_eq!(dest, deploy.join("app-html.zip"));
        assert!(dest.is_file());
    }
}

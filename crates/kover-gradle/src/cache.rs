//! Gradle cache path collection for the CI cache step.

use std::path::{Path, PathBuf};

use kover_config::CacheLevel;
use kover_util::error::UtilError;
use kover_util::process::CommandFactory;

use crate::error::GradleError;

/// Environment variable listing the paths the CI cache step keeps.
pub const CACHE_INCLUDE_KEY: &str = "BITRISE_CACHE_INCLUDE_PATHS";
/// Environment variable listing the paths the CI cache step skips.
pub const CACHE_EXCLUDE_KEY: &str = "BITRISE_CACHE_EXCLUDE_PATHS";

/// Records which Gradle paths should survive into the next build.
pub trait CacheCollector {
    /// Collect cache paths for the workspace at `project_root`.
    ///
    /// # Errors
    /// Returns an error if the paths cannot be recorded. Callers treat this
    /// as a warning.
    fn collect(&self, project_root: &Path, level: CacheLevel) -> Result<(), GradleError>;
}

/// Include and exclude path lists for one cache level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachePaths {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Compute the cache paths for `level`, rooted at the user's `home` and the
/// workspace at `project_root`.
pub fn cache_paths(home: &Path, project_root: &Path, level: CacheLevel) -> CachePaths {
    let gradle_home = home.join(".gradle");
    let path = |p: PathBuf| p.display().to_string();

    let mut paths = CachePaths::default();
    if level == CacheLevel::None {
        return paths;
    }

    paths.include = vec![
        path(gradle_home.join("caches")),
        path(gradle_home.join("wrapper")),
        path(home.join(".m2")),
        path(home.join(".kotlin")),
    ];
    paths.exclude = vec![
        "*.lock".to_owned(),
        "*.bin".to_owned(),
        path(gradle_home.join("caches").join("*").join("fileHashes")),
        path(gradle_home.join("caches").join("*").join("plugin-resolution")),
        path(gradle_home.join("caches").join("journal-1")),
    ];

    if level == CacheLevel::All {
        paths.include.push(path(home.join(".android").join("build-cache")));
        paths.include.push(path(project_root.join(".gradle")));
    } else {
        paths
            .exclude
            .push(path(gradle_home.join("caches").join("build-cache-*")));
        paths
            .exclude
            .push(path(gradle_home.join("caches").join("transforms-*")));
    }

    paths
}

/// Merge `additions` into an existing newline-separated list, keeping order
/// and dropping duplicates.
fn merge_list(existing: &str, additions: &[String]) -> String {
    let mut merged: Vec<&str> = existing
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    for item in additions {
        if !merged.contains(&item.as_str()) {
            merged.push(item);
        }
    }
    merged.join("\n")
}

/// Records cache paths through `envman`, the CI's environment store.
///
/// The home directory is only looked up when there is something to collect.
#[derive(Debug, Clone)]
pub struct EnvmanCacheCollector {
    factory: CommandFactory,
    home: fn() -> Result<PathBuf, UtilError>,
}

impl EnvmanCacheCollector {
    pub fn new(factory: CommandFactory) -> Self {
        Self {
            factory,
            home: kover_util::fs::home_dir,
        }
    }

    fn commit(&self, key: &str, additions: &[String]) -> Result<(), GradleError> {
        if additions.is_empty() {
            return Ok(());
        }
        let existing = std::env::var(key).unwrap_or_default();
        let value = merge_list(&existing, additions);

        let cmd = self.factory.create(
            Path::new("envman"),
            vec![
                "add".to_owned(),
                "--key".to_owned(),
                key.to_owned(),
                "--value".to_owned(),
                value,
            ],
            None,
        );
        let output = cmd.output()?;
        if !output.success {
            return Err(GradleError::CacheCommit {
                key: key.to_owned(),
                output: output.combined(),
            });
        }
        Ok(())
    }
}

impl CacheCollector for EnvmanCacheCollector {
    fn collect(&self, project_root: &Path, level: CacheLevel) -> Result<(), GradleError> {
        if level == CacheLevel::None {
            return Ok(());
        }
        let home = (self.home)()?;
        let paths = cache_paths(&home, project_root, level);
        for path in &paths.include {
            tracing::debug!("cache include: {path}");
        }
        self.commit(CACHE_INCLUDE_KEY, &paths.include)?;
        self.commit(CACHE_EXCLUDE_KEY, &paths.exclude)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn none_level_collects_nothing() {
        let paths = cache_paths(Path::new("/home/ci"), Path::new("/work"), CacheLevel::None);
        assert_eq!(paths, CachePaths::default());
    }

    #[test]
    fn only_deps_keeps_dependencies_without_build_cache() {
        let paths = cache_paths(
            Path::new("/home/ci"),
            Path::new("/work"),
            CacheLevel::OnlyDeps,
        );
        assert!(paths.include.contains(&"/home/ci/.gradle/caches".to_owned()));
        assert!(paths.include.contains(&"/home/ci/.gradle/wrapper".to_owned()));
        assert!(!paths.include.contains(&"/work/.gradle".to_owned()));
        assert!(paths
            .exclude
            .contains(&"/home/ci/.gradle/caches/build-cache-*".to_owned()));
    }

    #[test]
    fn all_level_adds_build_caches() {
        let paths = cache_paths(Path::new("/home/ci"), Path::new("/work"), CacheLevel::All);
        assert!(paths
            .include
            .contains(&"/home/ci/.android/build-cache".to_owned()));
        assert!(paths.include.contains(&"/work/.gradle".to_owned()));
        assert!(!paths
            .exclude
            .contains(&"/home/ci/.gradle/caches/build-cache-*".to_owned()));
    }

    #[test]
    fn merge_list_appends_new_and_skips_duplicates() {
        let merged = merge_list(
            "/home/ci/.m2\n\n/opt/sdk\n",
            &["/opt/sdk".to_owned(), "/home/ci/.gradle".to_owned()],
        );
        assert_eq!(merged, "/home/ci/.m2\n/opt/sdk\n/home/ci/.gradle");
    }

    #[test]
    fn collect_at_none_level_runs_nothing() {
        // No envman on the test host: any spawn attempt would error.
        let collector = EnvmanCacheCollector {
            factory: CommandFactory::new(),
            home: || Err(UtilError::NoHomeDir),
        };
        collector
            .collect(Path::new("/work"), CacheLevel::None)
            .unwrap();
    }

    #[test]
    fn missing_home_is_reported_from_collect() {
        let collector = EnvmanCacheCollector {
            factory: CommandFactory::new(),
            home: || Err(UtilError::NoHomeDir),
        };
        let err = collector
            .collect(Path::new("/work"), CacheLevel::OnlyDeps)
            .unwrap_err();
        assert!(matches!(err, GradleError::Util(UtilError::NoHomeDir)));
    }
}

//! Two-pass report discovery: fresh outputs first, then anything that matches.

use std::time::SystemTime;

use kover_gradle::{Artifact, GradleError, Project};
use kover_util::find::EntryKind;

/// Something that can list report artifacts in a workspace.
pub trait ArtifactSource {
    /// Find entries of `kind` matching `pattern`, modified at or after
    /// `modified_after` when it is set.
    ///
    /// # Errors
    /// Returns an error if the pattern is invalid or the workspace cannot be read.
    fn find_artifacts(
        &self,
        modified_after: Option<SystemTime>,
        pattern: &str,
        include_module: bool,
        kind: EntryKind,
    ) -> Result<Vec<Artifact>, GradleError>;
}

impl ArtifactSource for Project {
    fn find_artifacts(
        &self,
        modified_after: Option<SystemTime>,
        pattern: &str,
        include_module: bool,
        kind: EntryKind,
    ) -> Result<Vec<Artifact>, GradleError> {
        self.find(modified_after, pattern, include_module, kind)
    }
}

/// Find the artifacts matching `pattern`, preferring ones produced since `started`.
///
/// The first pass only accepts entries modified at or after `started`. If it
/// finds nothing (e.g. Gradle restored outputs from its build cache without
/// touching them), a second pass drops the modification-time check. An empty
/// result is not an error.
///
/// # Errors
/// Returns an error if either pass fails to list the workspace.
pub fn harvest<S: ArtifactSource + ?Sized>(
    source: &S,
    started: SystemTime,
    pattern: &str,
    include_module: bool,
    kind: EntryKind,
) -> Result<Vec<Artifact>, GradleError> {
    let fresh = source.find_artifacts(Some(started), pattern, include_module, kind)?;
    if !fresh.is_empty() {
        return Ok(fresh);
    }

    tracing::warn!(
        "No artifacts found with pattern: {pattern} that has modification time after: {}",
        chrono::DateTime::<chrono::Local>::from(started).format("%Y-%m-%d %H:%M:%S")
    );
    tracing::warn!("Retrying without modtime check....");

    let any = source.find_artifacts(None, pattern, include_module, kind)?;
    if any.is_empty() {
        tracing::warn!("No artifacts found with pattern: {pattern} without modtime check");
        tracing::warn!(
            "If you have changed default report export path in your gradle files then you might need to change the pattern accordingly."
        );
    }
    Ok(any)
}

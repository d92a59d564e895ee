//! Export of zipped reports into the deploy directory.

use std::path::{Path, PathBuf};

use kover_gradle::Artifact;
use kover_util::error::UtilError;

/// An artifact exported into the deploy directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// Where the artifact was read from.
    pub source: PathBuf,
    /// File name of the archive inside the deploy directory.
    pub file_name: String,
}

/// Pick a name for `name.zip` in `deploy_dir` that does not overwrite an
/// existing file.
///
/// On collision the name becomes `<name>-<YYYYMMDDhhmmss>.zip`, stamped with
/// the current local time at seconds resolution. If that is taken too, a
/// counter goes before the stamp: `<name>-1-<YYYYMMDDhhmmss>.zip`, and so on.
///
/// # Errors
/// Returns an error if the deploy directory cannot be inspected.
pub fn archive_name(deploy_dir: &Path, name: &str) -> Result<String, UtilError> {
    let file_name = format!("{name}.zip");
    if !kover_util::fs::path_exists(&deploy_dir.join(&file_name))? {
        return Ok(file_name);
    }

    let timestamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
    let stamped = format!("{name}-{timestamp}.zip");
    if !kover_util::fs::path_exists(&deploy_dir.join(&stamped))? {
        return Ok(stamped);
    }

    let mut counter = 1_u32;
    loop {
        let candidate = format!("{name}-{counter}-{timestamp}.zip");
        if !kover_util::fs::path_exists(&deploy_dir.join(&candidate))? {
            return Ok(candidate);
        }
        counter = counter.saturating_add(1);
    }
}

/// Zip each artifact into `deploy_dir` under a collision-free name.
///
/// A failure to archive one artifact is logged and skipped. Returns the
/// artifacts that were exported, in input order.
///
/// # Errors
/// Returns an error if the deploy directory cannot be inspected.
pub fn export_artifacts(
    deploy_dir: &Path,
    artifacts: &[Artifact],
) -> Result<Vec<ExportRecord>, UtilError> {
    let mut exported = Vec::with_capacity(artifacts.len());

    for artifact in artifacts {
        let file_name = archive_name(deploy_dir, &artifact.name)?;

        tracing::info!(
            "  Export [ {} => $BITRISE_DEPLOY_DIR/{file_name} ]",
            kover_util::fs::display_source(&artifact.path)
        );

        if let Err(e) = artifact.export_zip(deploy_dir, &file_name) {
            tracing::warn!(
                "failed to export artifact ({}), error: {e}",
                artifact.path.display()
            );
            continue;
        }

        exported.push(ExportRecord {
            source: artifact.path.clone(),
            file_name,
        });
    }

    Ok(exported)
}

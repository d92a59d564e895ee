//! Re-export of XML results in the layout the test addon reads.
//!
//! Each result lands in `<output>/<bucket>/<basename>` next to a
//! `test-info.json` naming the bucket. Results whose bucket cannot be
//! determined share the `other` bucket, indexed per batch so they do not
//! overwrite each other: `other`, `other-1`, `other-2`, ...

use std::path::{Path, PathBuf};

use serde::Serialize;

use kover_util::error::UtilError;

/// Bucket for results that cannot be attributed to a variant.
pub const OTHER_DIR_NAME: &str = "other";

const TEST_INFO_FILE: &str = "test-info.json";

/// Decides which bucket a result file belongs to.
pub trait ExportDirResolver {
    /// The bucket name for the result at `path`, or [`OTHER_DIR_NAME`].
    fn export_dir(&self, path: &Path) -> String;
}

/// Buckets results by the variant report directory they were written to.
///
/// Looks at the file stem and then each ancestor directory below the project
/// root for a name like `testDebugUnitTest` or Kover's `reportDebug`.
#[derive(Debug, Clone)]
pub struct ReportDirResolver {
    root: PathBuf,
}

impl ReportDirResolver {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
        }
    }
}

fn is_variant_dir_name(name: &str) -> bool {
    let unit_test = name.len() > "testUnitTest".len()
        && name.starts_with("test")
        && name.ends_with("UnitTest");
    let kover_report = name
        .strip_prefix("report")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase());
    unit_test || kover_report
}

impl ExportDirResolver for ReportDirResolver {
    fn export_dir(&self, path: &Path) -> String {
        let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned());
        let ancestors = path
            .ancestors()
            .skip(1)
            .take_while(|dir| *dir != self.root && dir.starts_with(&self.root))
            .filter_map(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()));

        stem.into_iter()
            .chain(ancestors)
            .find(|name| is_variant_dir_name(name))
            .unwrap_or_else(|| OTHER_DIR_NAME.to_owned())
    }
}

/// Resolve the final bucket for `dir`, given the index of the last `other`
/// bucket handed out in this batch.
///
/// Returns the bucket name and the updated index. Only `other` buckets are
/// ever suffixed.
pub fn bucket_name(dir: String, last_other_idx: Option<usize>) -> (String, Option<usize>) {
    if dir != OTHER_DIR_NAME {
        return (dir, last_other_idx);
    }
    let idx = last_other_idx.map_or(0, |i| i + 1);
    if idx == 0 {
        (dir, Some(idx))
    } else {
        (format!("{dir}-{idx}"), Some(idx))
    }
}

#[derive(Serialize)]
struct TestInfo<'a> {
    #[serde(rename = "test-name")]
    test_name: &'a str,
}

/// Copy the result at `artifact` into `output_dir/bucket/` and describe the
/// bucket in its `test-info.json`.
///
/// # Errors
/// Returns an error if the bucket directory, the copy, or the info file
/// cannot be written.
pub fn export_artifact(artifact: &Path, output_dir: &Path, bucket: &str) -> Result<PathBuf, UtilError> {
    let bucket_dir = output_dir.join(bucket);
    kover_util::fs::ensure_dir(&bucket_dir)?;

    let Some(file_name) = artifact.file_name() else {
        return Err(UtilError::Io {
            path: artifact.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "artifact path has no file name",
            ),
        });
    };
    let dest = bucket_dir.join(file_name);
    kover_util::fs::copy_file(artifact, &dest)?;

    let info_path = bucket_dir.join(TEST_INFO_FILE);
    let info = serde_json::to_vec(&TestInfo { test_name: bucket }).map_err(|e| UtilError::Io {
        path: info_path.display().to_string(),
        source: std::io::Error::other(e),
    })?;
    std::fs::write(&info_path, info).map_err(|source| UtilError::Io {
        path: info_path.display().to_string(),
        source,
    })?;

    Ok(dest)
}

/// Exports result files into the test addon layout under one output directory.
pub struct TestAddonExporter<'r> {
    output_dir: PathBuf,
    resolver: &'r dyn ExportDirResolver,
}

impl<'r> TestAddonExporter<'r> {
    pub fn new(output_dir: &Path, resolver: &'r dyn ExportDirResolver) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            resolver,
        }
    }

    /// Export one result, threading the `other` bucket index through.
    ///
    /// Failures are logged and skipped. Returns the updated index to pass to
    /// the next call.
    pub fn export(&self, artifact: &Path, last_other_idx: Option<usize>) -> Option<usize> {
        let (bucket, idx) = bucket_name(self.resolver.export_dir(artifact), last_other_idx);

        match export_artifact(artifact, &self.output_dir, &bucket) {
            Ok(_) => tracing::info!(
                "  Export [{} => $BITRISE_TEST_RESULT_DIR/{bucket}/{}]",
                kover_util::fs::display_source(artifact),
                artifact
                    .file_name()
                    .map_or_else(String::new, |n| n.to_string_lossy().into_owned())
            ),
            Err(e) => tracing::warn!("Failed to export test results for test addon: {e}"),
        }
        idx
    }

    /// Export a batch of results in order, starting with a fresh `other` index.
    pub fn export_all<'a>(&self, artifacts: impl IntoIterator<Item = &'a Path>) {
        let mut last_other_idx = None;
        for artifact in artifacts {
            last_other_idx = self.export(artifact, last_other_idx);
        }
    }
}

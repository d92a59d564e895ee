//! Error types for kover-gradle.

/// Errors produced by the Gradle adapter.
#[derive(Debug, thiserror::Error)]
pub enum GradleError {
    /// The project location is empty.
    #[error("project location is empty; set project_location to the Gradle workspace root")]
    EmptyLocation,

    /// The project location does not exist or is not a directory.
    #[error("project location {path} does not exist or is not a directory")]
    NotADirectory { path: String },

    /// The Gradle wrapper script is missing.
    #[error("no gradlew found at {path}; commit the Gradle wrapper to the repository")]
    WrapperMissing { path: String },

    /// `gradlew tasks` exited unsuccessfully.
    #[error("gradlew tasks failed with exit code {code}: {output}")]
    TasksFailed { code: String, output: String },

    /// `envman` could not record the cache paths.
    #[error("cannot record {key} with envman: {output}")]
    CacheCommit { key: String, output: String },

    /// A utility operation failed.
    #[error("{0}")]
    Util(#[from] kover_util::error::UtilError),
}

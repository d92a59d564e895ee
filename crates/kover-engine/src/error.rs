//! Error types for kover-engine.

/// Errors produced by the step pipeline.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The Gradle workspace could not be opened.
    #[error("failed to open project: {0}")]
    ProjectOpen(#[source] kover_gradle::GradleError),

    /// The task variants could not be listed.
    #[error("failed to fetch variants: {0}")]
    VariantsFetch(#[source] kover_gradle::GradleError),

    /// The selected module is not part of the workspace.
    #[error("module not found: {module}")]
    ModuleNotFound { module: String },

    /// No module has the selected variant.
    #[error("variant {variant} not found in any module")]
    VariantNotFound { variant: String },

    /// Report discovery failed.
    #[error("failed to find {what}: {source}")]
    Discovery {
        what: &'static str,
        source: kover_gradle::GradleError,
    },

    /// The deploy directory could not be inspected.
    #[error("failed to export {what}: {source}")]
    Export {
        what: &'static str,
        source: kover_util::error::UtilError,
    },

    /// The build task could not be started.
    #[error("failed to run build task: {0}")]
    BuildSpawn(#[source] kover_util::error::UtilError),

    /// The build task exited unsuccessfully.
    #[error("build task failed with exit code {code}")]
    BuildFailed { code: String },
}

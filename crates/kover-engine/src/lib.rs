#![forbid(unsafe_code)]
//! Report discovery, export, and the step pipeline that drives Kover through Gradle.

pub mod deploy;
pub mod error;
pub mod filter;
pub mod harvest;
pub mod step;
pub mod testaddon;

pub use deploy::{export_artifacts, ExportRecord};
pub use error::EngineError;
pub use filter::filter_variants;
pub use harvest::{harvest, ArtifactSource};
pub use step::{Step, StepReport, KOVER_TASK};
pub use testaddon::{ExportDirResolver, ReportDirResolver, TestAddonExporter, OTHER_DIR_NAME};

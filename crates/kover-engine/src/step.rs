//! The step pipeline: select variants, run Kover, export reports, collect cache.

use std::path::Path;
use std::time::SystemTime;

use kover_config::Config;
use kover_gradle::{Artifact, CacheCollector, Project, Variants};
use kover_util::find::EntryKind;
use kover_util::process::CommandFactory;

use crate::deploy::{export_artifacts, ExportRecord};
use crate::error::EngineError;
use crate::filter::filter_variants;
use crate::harvest::harvest;
use crate::testaddon::{ExportDirResolver, ReportDirResolver, TestAddonExporter};

/// The Gradle task that produces the Kover XML report for a variant.
pub const KOVER_TASK: &str = "koverXmlReport";

const XML_FILE_SUFFIX: &str = "*.xml";

/// Archives written to the deploy directory by a successful run.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub html: Vec<ExportRecord>,
    pub xml: Vec<ExportRecord>,
}

/// One run of the step against a validated configuration.
pub struct Step<'a> {
    config: &'a Config,
    factory: CommandFactory,
    cache: &'a dyn CacheCollector,
    resolver: Option<&'a dyn ExportDirResolver>,
}

impl<'a> Step<'a> {
    pub fn new(config: &'a Config, factory: CommandFactory, cache: &'a dyn CacheCollector) -> Self {
        Self {
            config,
            factory,
            cache,
            resolver: None,
        }
    }

    /// Use `resolver` to bucket test addon results instead of the default
    /// [`ReportDirResolver`].
    pub fn with_resolver(mut self, resolver: &'a dyn ExportDirResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Run the whole pipeline.
    ///
    /// A failing build does not stop the report exports: reports are
    /// published first and the build failure is returned afterwards, without
    /// collecting the cache.
    ///
    /// # Errors
    /// Returns an error if the project cannot be opened, the variants cannot
    /// be listed or selected, reports cannot be discovered or exported, or
    /// the build failed.
    pub fn run(&self) -> Result<StepReport, EngineError> {
        let project = Project::open(&self.config.project_location, self.factory.clone())
            .map_err(EngineError::ProjectOpen)?;
        let task = project.task(KOVER_TASK);

        tracing::info!("Variants:");
        let variants = task
            .variants(&self.config.arguments)
            .map_err(EngineError::VariantsFetch)?;
        let selected = filter_variants(&self.config.module, &self.config.variant, &variants)?;
        log_variants(&variants, &selected);

        let started = SystemTime::now();

        tracing::info!("Run test:");
        let command = task.command(&selected, &self.config.arguments);
        tracing::info!("$ {}", command.printable());
        let build = match command.run() {
            Ok(status) if status.success() => Ok(()),
            Ok(status) => Err(EngineError::BuildFailed {
                code: status
                    .code()
                    .map_or_else(|| "signal".to_owned(), |c| c.to_string()),
            }),
            Err(e) => Err(EngineError::BuildSpawn(e)),
        };
        if let Err(e) = &build {
            tracing::error!("Run: test task failed, error: {e}");
        }

        kover_util::fs::ensure_dir(&self.config.deploy_dir).map_err(|source| {
            EngineError::Export {
                what: "reports",
                source,
            }
        })?;

        tracing::info!("Export HTML results:");
        let html = self.export_reports(&project, started, &self.config.html_pattern, "reports")?;

        tracing::info!("Export XML results:");
        let xml = self.export_reports(&project, started, &self.config.xml_pattern, "results")?;

        if let Some(test_result_dir) = &self.config.test_result_dir {
            tracing::info!("Export XML results for test addon:");
            self.export_test_addon(&project, started, test_result_dir);
        }

        build?;

        tracing::info!("Collecting cache:");
        if let Err(warning) = self.cache.collect(project.root(), self.config.cache_level) {
            tracing::warn!("{warning}");
        }
        tracing::info!("  Done");

        Ok(StepReport { html, xml })
    }

    fn export_reports(
        &self,
        project: &Project,
        started: SystemTime,
        pattern: &str,
        what: &'static str,
    ) -> Result<Vec<ExportRecord>, EngineError> {
        let found = harvest(project, started, pattern, true, EntryKind::Directory)
            .map_err(|source| EngineError::Discovery { what, source })?;
        export_artifacts(&self.config.deploy_dir, &found)
            .map_err(|source| EngineError::Export { what, source })
    }

    fn export_test_addon(&self, project: &Project, started: SystemTime, output_dir: &Path) {
        let pattern = xml_file_pattern(&self.config.xml_pattern);
        let results = match harvest(project, started, &pattern, false, EntryKind::File) {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!("Failed to find test XML test results, error: {e}");
                return;
            }
        };

        let default_resolver = ReportDirResolver::new(project.root());
        let resolver = self.resolver.unwrap_or(&default_resolver);
        TestAddonExporter::new(output_dir, resolver)
            .export_all(results.iter().map(|a: &Artifact| a.path.as_path()));
    }
}

/// The XML report pattern narrowed to the result files themselves.
pub fn xml_file_pattern(pattern: &str) -> String {
    if pattern.ends_with(XML_FILE_SUFFIX) {
        pattern.to_owned()
    } else {
        format!("{pattern}{XML_FILE_SUFFIX}")
    }
}

fn log_variants(all: &Variants, selected: &Variants) {
    for (module, variants) in all {
        tracing::info!("{module}:");
        for variant in variants {
            if selected.get(module).is_some_and(|s| s.contains(variant)) {
                tracing::info!("✓ {variant}");
            } else {
                tracing::info!("- {variant}");
            }
        }
    }
}

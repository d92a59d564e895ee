//! Gradle task variants and command planning.

use std::collections::BTreeMap;

use kover_util::process::StepCommand;

use crate::error::GradleError;
use crate::project::Project;

/// Variants per module, e.g. `{"app": ["Debug", "Release"]}`.
///
/// The root project is keyed by the empty string. Iteration order is stable.
pub type Variants = BTreeMap<String, Vec<String>>;

/// Task-name suffixes that belong to helper tasks rather than build variants.
const IGNORED_SUFFIXES: &[&str] = &[
    "Classes",
    "Resources",
    "UnitTestClasses",
    "AndroidTestClasses",
    "AndroidTestResources",
    "UnitTestResources",
];

/// A variant-aware Gradle task such as `koverXmlReport`.
#[derive(Debug, Clone)]
pub struct Task<'p> {
    project: &'p Project,
    name: String,
}

impl<'p> Task<'p> {
    pub(crate) fn new(project: &'p Project, name: &str) -> Self {
        Self {
            project,
            name: name.to_owned(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// List the variants of this task known to the workspace.
    ///
    /// Runs `gradlew tasks --all --console=plain --quiet` followed by `args`
    /// in the project root and parses its output.
    ///
    /// # Errors
    /// Returns an error if `gradlew` cannot be spawned or exits unsuccessfully.
    pub fn variants(&self, args: &[String]) -> Result<Variants, GradleError> {
        let mut all_args: Vec<String> = ["tasks", "--all", "--console=plain", "--quiet"]
            .iter()
            .map(|s| (*s).to_owned())
            .collect();
        all_args.extend(args.iter().cloned());

        let cmd = self.project.factory().create(
            self.project.wrapper(),
            all_args,
            Some(self.project.root()),
        );
        tracing::debug!("$ {}", cmd.printable());

        let output = cmd.output()?;
        if !output.success {
            return Err(GradleError::TasksFailed {
                code: output
                    .exit_code
                    .map_or_else(|| "signal".to_owned(), |c| c.to_string()),
                output: output.combined(),
            });
        }
        Ok(parse_variants(&self.name, &output.stdout))
    }

    /// Plan a run of this task on every module/variant pair in `variants`,
    /// with `args` appended.
    pub fn command(&self, variants: &Variants, args: &[String]) -> StepCommand {
        let mut all_args = Vec::new();
        for (module, module_variants) in variants {
            for variant in module_variants {
                let task = format!("{}{variant}", self.name);
                // A bare task name would run in every subproject.
                if module.is_empty() {
                    all_args.push(format!(":{task}"));
                } else {
                    all_args.push(format!(":{module}:{task}"));
                }
            }
        }
        all_args.extend(args.iter().cloned());

        self.project.factory().create(
            self.project.wrapper(),
            all_args,
            Some(self.project.root()),
        )
    }
}

/// Parse `gradlew tasks --all` output into the variants of `task_name`.
///
/// Lines look like `app:koverXmlReportDebug - Task description`. Nested
/// modules keep their full path (`feature:login`).
pub fn parse_variants(task_name: &str, output: &str) -> Variants {
    let mut variants = Variants::new();

    for line in output.lines() {
        let Some(token) = line.split_whitespace().next() else {
            continue;
        };

        let (module, task) = match token.rsplit_once(':') {
            Some((module, task)) => (module.trim_start_matches(':'), task),
            None => ("", token),
        };

        let Some(variant) = task.strip_prefix(task_name) else {
            continue;
        };
        if variant.is_empty() || IGNORED_SUFFIXES.iter().any(|s| variant.ends_with(s)) {
            continue;
        }

        let entry = variants.entry(module.to_owned()).or_default();
        if !entry.iter().any(|v| v == variant) {
            entry.push(variant.to_owned());
        }
    }

    variants
}

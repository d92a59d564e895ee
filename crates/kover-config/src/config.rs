use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

/// How much of the Gradle state the cache step keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheLevel {
    /// Skip cache collection.
    None,
    /// Dependencies and the Gradle wrapper only.
    #[default]
    OnlyDeps,
    /// Dependencies plus build caches.
    All,
}

impl CacheLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::OnlyDeps => "only_deps",
            Self::All => "all",
        }
    }
}

impl fmt::Display for CacheLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CacheLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "only_deps" => Ok(Self::OnlyDeps),
            "all" => Ok(Self::All),
            other => Err(ConfigError::CacheLevel {
                value: other.to_owned(),
            }),
        }
    }
}

/// Raw step inputs as read from the environment, before validation.
///
/// Field names serialize to the environment variable names they come from.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepInputs {
    pub project_location: String,
    #[serde(rename = "report_path_pattern")]
    pub html_pattern: String,
    #[serde(rename = "result_path_pattern")]
    pub xml_pattern: String,
    pub variant: String,
    pub module: String,
    pub arguments: String,
    pub cache_level: String,
    pub is_debug: bool,
    #[serde(rename = "BITRISE_DEPLOY_DIR")]
    pub deploy_dir: String,
    #[serde(rename = "BITRISE_TEST_RESULT_DIR")]
    pub test_result_dir: String,
}

/// Validated, immutable step configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute path of the Gradle workspace.
    pub project_location: PathBuf,
    /// Pattern locating the HTML report directories.
    pub html_pattern: String,
    /// Pattern locating the XML report directories.
    pub xml_pattern: String,
    /// Case-insensitive variant name; empty selects every variant.
    pub variant: String,
    /// Exact module name; empty selects every module.
    pub module: String,
    /// Extra Gradle arguments, already split.
    pub arguments: Vec<String>,
    pub cache_level: CacheLevel,
    pub debug: bool,
    /// Destination of the zipped reports.
    pub deploy_dir: PathBuf,
    /// Root of the test addon layout; `None` disables the test addon export.
    pub test_result_dir: Option<PathBuf>,
}

impl Config {
    /// Validate raw inputs into a configuration.
    ///
    /// # Errors
    /// Returns an error if a required input is empty, the project location is
    /// not an existing directory, the cache level is unknown, or the arguments
    /// cannot be split.
    pub fn from_inputs(inputs: &StepInputs) -> Result<Self, ConfigError> {
        let project_location = project_dir(&inputs.project_location)?;

        if inputs.html_pattern.is_empty() {
            return Err(ConfigError::Missing {
                name: "report_path_pattern",
            });
        }
        if inputs.xml_pattern.is_empty() {
            return Err(ConfigError::Missing {
                name: "result_path_pattern",
            });
        }
        if inputs.deploy_dir.is_empty() {
            return Err(ConfigError::Missing {
                name: "BITRISE_DEPLOY_DIR",
            });
        }

        let cache_level = if inputs.cache_level.is_empty() {
            CacheLevel::default()
        } else {
            inputs.cache_level.parse()?
        };

        let test_result_dir = Some(inputs.test_result_dir.trim())
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);

        Ok(Self {
            project_location,
            html_pattern: inputs.html_pattern.clone(),
            xml_pattern: inputs.xml_pattern.clone(),
            variant: inputs.variant.trim().to_owned(),
            module: inputs.module.trim().to_owned(),
            arguments: split_arguments(&inputs.arguments)?,
            cache_level,
            debug: inputs.is_debug,
            deploy_dir: PathBuf::from(&inputs.deploy_dir),
            test_result_dir,
        })
    }
}

fn project_dir(raw: &str) -> Result<PathBuf, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::Missing {
            name: "project_location",
        });
    }
    let path = Path::new(raw);
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => {
            return Err(ConfigError::NotADirectory {
                path: raw.to_owned(),
            })
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: raw.to_owned(),
                source,
            })
        }
    }
    std::path::absolute(path).map_err(|source| ConfigError::Io {
        path: raw.to_owned(),
        source,
    })
}

/// Split a shell-quoted argument string into individual arguments.
///
/// # Errors
/// Returns an error if the string has unbalanced quotes or a trailing escape.
pub fn split_arguments(raw: &str) -> Result<Vec<String>, ConfigError> {
    shlex::split(raw).ok_or_else(|| ConfigError::Arguments {
        value: raw.to_owned(),
    })
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} is required but was empty")]
    Missing { name: &'static str },

    #[error("project_location {path} is not a directory")]
    NotADirectory { path: String },

    #[error("cannot access project_location {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid cache_level \"{value}\"; expected one of: none, only_deps, all")]
    CacheLevel { value: String },

    #[error("cannot parse arguments `{value}`: unbalanced quotes or trailing escape")]
    Arguments { value: String },
}

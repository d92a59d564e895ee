//! Process execution helpers for the Kover step.

use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::error::UtilError;

/// Structured output from a command execution.
#[derive(Debug)]
pub struct CommandOutput {
    /// Standard output as a string.
    pub stdout: String,
    /// Standard error as a string.
    pub stderr: String,
    /// Whether the command exited successfully.
    pub success: bool,
    /// The exit code, if the process was not killed by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Stdout and stderr joined and trimmed, for error messages.
    pub fn combined(&self) -> String {
        let mut out = self.stdout.trim().to_owned();
        let err = self.stderr.trim();
        if !err.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(err);
        }
        out
    }
}

/// The execution context shared by every command the step spawns.
///
/// Holds environment overrides applied to each created command. One factory
/// is constructed per process and passed to whatever needs to spawn.
#[derive(Debug, Clone, Default)]
pub struct CommandFactory {
    envs: Vec<(String, String)>,
}

impl CommandFactory {
    /// Create a factory that passes the parent environment through unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an environment variable on every command created by this factory.
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.envs.push((key.to_owned(), value.to_owned()));
        self
    }

    /// Create a command for `program` with `args`, run from `dir` if given.
    pub fn create(&self, program: &Path, args: Vec<String>, dir: Option<&Path>) -> StepCommand {
        StepCommand {
            program: program.to_path_buf(),
            args,
            dir: dir.map(Path::to_path_buf),
            envs: self.envs.clone(),
        }
    }
}

/// A fully planned child process.
#[derive(Debug, Clone)]
pub struct StepCommand {
    program: PathBuf,
    args: Vec<String>,
    dir: Option<PathBuf>,
    envs: Vec<(String, String)>,
}

impl StepCommand {
    /// The program path.
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// The arguments, in order.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The working directory, if one is set.
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Shell-escaped rendering of the command line, for logging.
    pub fn printable(&self) -> String {
        let program = self.program.display().to_string();
        let parts: Vec<&str> = std::iter::once(program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect();
        shlex::try_join(parts.iter().copied()).unwrap_or_else(|_| parts.join(" "))
    }

    /// Run the command with inherited stdin, stdout, and stderr.
    ///
    /// # Errors
    /// Returns an error if the command cannot be spawned. A non-zero exit is
    /// **not** an error; inspect the returned status instead.
    pub fn run(&self) -> Result<ExitStatus, UtilError> {
        self.to_command()
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| UtilError::CommandExec {
                program: self.program.display().to_string(),
                source,
            })
    }

    /// Run the command and capture its output.
    ///
    /// # Errors
    /// Returns an error if the command cannot be spawned.
    pub fn output(&self) -> Result<CommandOutput, UtilError> {
        run_command(&mut self.to_command()).map_err(|e| match e {
            UtilError::CommandExec { source, .. } => UtilError::CommandExec {
                program: self.program.display().to_string(),
                source,
            },
            other => other,
        })
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.dir {
            cmd.current_dir(dir);
        }
        for (key, value) in &self.envs {
            cmd.env(key, value);
        }
        cmd
    }
}

/// Execute a command and capture its output.
///
/// # Errors
/// Returns an error if the command cannot be spawned (e.g. binary not found).
/// A non-zero exit code is **not** an error; check `CommandOutput::success` instead.
pub fn run_command(cmd: &mut Command) -> Result<CommandOutput, UtilError> {
    let output = cmd.output().map_err(|source| UtilError::CommandExec {
        program: cmd.get_program().to_string_lossy().into_owned(),
        source,
    })?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        success: output.status.success(),
        exit_code: output.status.code(),
    })
}

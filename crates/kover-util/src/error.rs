//! Error types for kover-util.

/// Errors produced by utility functions.
#[derive(Debug, thiserror::Error)]
pub enum UtilError {
    /// An I/O operation failed.
    #[error("cannot access {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A glob pattern was invalid.
    #[error("invalid glob pattern `{pattern}`: {message}")]
    GlobPattern { pattern: String, message: String },

    /// A command failed to execute.
    #[error("cannot execute {program}: {source}")]
    CommandExec {
        program: String,
        source: std::io::Error,
    },

    /// Writing a zip archive failed.
    #[error("cannot write archive {path}: {message}")]
    Archive { path: String, message: String },

    /// Cannot determine the user's home directory.
    #[error("cannot determine home directory; set the HOME environment variable")]
    NoHomeDir,
}

impl UtilError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

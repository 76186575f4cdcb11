//! Error types for cider
//!
//! Every failure a command can end with is one variant of [`CiderError`].
//! The top-level reporter in `cli::report` maps each variant to exactly one
//! message and exit code.

use std::{fmt, path::PathBuf};
use thiserror::Error;

/// Exit code reserved for command-line usage errors
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit code used when a program could not be started at all
pub const NOT_FOUND_EXIT_CODE: i32 = 127;

/// External tools cider cannot work without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    /// Xcode and its command line tools
    Xcode,
    /// The Homebrew package manager
    Homebrew,
}

impl fmt::Display for Prerequisite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Xcode => f.write_str("Xcode"),
            Self::Homebrew => f.write_str("Homebrew"),
        }
    }
}

/// Main error type for cider
#[derive(Error, Debug)]
pub enum CiderError {
    /// Bad or missing command-line arguments, raised before any backend call
    #[error("{message}")]
    Usage { message: String },

    /// An external command exited unsuccessfully
    #[error("`{}` failed with code {exit_code}", .command.join(" "))]
    Subprocess { command: Vec<String>, exit_code: i32 },

    /// A persisted settings file is not valid JSON
    #[error("Error reading JSON at {}: {message}", .path.display())]
    MalformedData { path: PathBuf, message: String },

    /// A required external tool is not installed
    #[error("{tool} is not installed (see {url})")]
    MissingPrerequisite { tool: Prerequisite, url: String },

    /// Any other failure raised by a backend operation
    #[error("{message}")]
    Domain { message: String, exit_code: i32 },

    /// The user interrupted an interactive prompt
    #[error("Aborted!")]
    Aborted,
}

impl CiderError {
    /// Create a new usage error
    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Create a new subprocess failure from the full argv of the command
    pub fn subprocess<S: AsRef<str>>(command: &[S], exit_code: Option<i32>) -> Self {
        Self::Subprocess {
            command: command.iter().map(|s| s.as_ref().to_string()).collect(),
            exit_code: exit_code.unwrap_or(1),
        }
    }

    /// Create a new malformed data error
    pub fn malformed_data<P: Into<PathBuf>>(path: P, message: impl Into<String>) -> Self {
        Self::MalformedData {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new missing prerequisite error
    pub fn missing_prerequisite(tool: Prerequisite, url: impl Into<String>) -> Self {
        Self::MissingPrerequisite {
            tool,
            url: url.into(),
        }
    }

    /// Create a new domain error with exit code 1
    pub fn domain(message: impl Into<String>) -> Self {
        Self::Domain {
            message: message.into(),
            exit_code: 1,
        }
    }

    /// Create a new file system error
    pub fn file_system<P: Into<PathBuf>>(
        operation: impl Into<String>,
        path: P,
        source: std::io::Error,
    ) -> Self {
        Self::domain(format!(
            "{} failed on {}: {source}",
            operation.into(),
            path.into().display()
        ))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, CiderError>;

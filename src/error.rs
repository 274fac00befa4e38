//! Error types for the FileBox index engine.

use std::path::PathBuf;
use thiserror::Error;

/// Exit status for usage and precondition failures.
pub const EXIT_USAGE: i32 = 1;
/// Exit status for operational failures (I/O, serialization, watch backend).
pub const EXIT_FAILURE: i32 = 2;

/// Errors raised by scanning, persisting, loading and watching an index.
///
/// Per-file read failures during a scan or a watch event never surface here;
/// they are logged and the file is skipped.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("I/O failure while {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed index{}: {message}", line_suffix(.line))]
    Serialization {
        line: Option<usize>,
        message: String,
    },

    #[error(
        "Index root {index_root} does not match watch root {watch_root}. Run `filebox scan` on the watch root first."
    )]
    RootMismatch {
        index_root: String,
        watch_root: String,
    },

    #[error("Watch backend error: {0}")]
    Watch(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),
}

fn line_suffix(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(" (line {})", n),
        None => String::new(),
    }
}

impl IndexError {
    /// Wrap an I/O error with a short description of what was being done.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        IndexError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn serialization(line: Option<usize>, message: impl Into<String>) -> Self {
        IndexError::Serialization {
            line,
            message: message.into(),
        }
    }

    /// Process exit status for this error: 1 for usage/precondition
    /// failures, 2 for operational failures.
    pub fn exit_code(&self) -> i32 {
        match self {
            IndexError::PathNotFound(_)
            | IndexError::NotADirectory(_)
            | IndexError::RootMismatch { .. }
            | IndexError::Config(_)
            | IndexError::Usage(_) => EXIT_USAGE,
            IndexError::Io { .. } | IndexError::Serialization { .. } | IndexError::Watch(_) => {
                EXIT_FAILURE
            }
        }
    }
}

impl From<config::ConfigError> for IndexError {
    fn from(err: config::ConfigError) -> Self {
        IndexError::Config(err.to_string())
    }
}

impl From<notify::Error> for IndexError {
    fn from(err: notify::Error) -> Self {
        IndexError::Watch(err.to_string())
    }
}

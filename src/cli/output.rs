//! CLI output: error mapping from domain errors to the stable CLI surface.

use crate::error::IndexError;

/// Message printed for a failed command.
pub fn map_error(e: &IndexError) -> String {
    match e {
        IndexError::Usage(message) => format!("{}\nRun `filebox --help` for usage.", message),
        other => format!("Error: {}", other),
    }
}

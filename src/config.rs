//! Configuration System
//!
//! Layered configuration built with the `config` crate: built-in defaults,
//! the global config file, an explicit `--config` file and `FILEBOX__*`
//! environment variables, in increasing precedence.

use crate::error::IndexError;
use crate::logging::{self, LogOutput, LoggingConfig};
use crate::tree::walker::WalkerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::env_vars::{environment, ENV_PREFIX};
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileboxConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub index: IndexConfig,
}

/// Settings for scanning and index placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Index file used when a command is given no explicit index path.
    #[serde(default = "default_index_path")]
    pub default_index_path: PathBuf,

    #[serde(default)]
    pub follow_symlinks: bool,

    /// Directory or file names skipped while scanning.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_index_path() -> PathBuf {
    PathBuf::from(crate::store::DEFAULT_INDEX_FILE_NAME)
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            default_index_path: default_index_path(),
            follow_symlinks: false,
            ignore_patterns: Vec::new(),
        }
    }
}

impl IndexConfig {
    /// Walker settings for a scan.
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            follow_symlinks: self.follow_symlinks,
            ignore_patterns: self.ignore_patterns.clone(),
            ..WalkerConfig::default()
        }
    }
}

impl FileboxConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), IndexError> {
        if self.index.default_index_path.as_os_str().is_empty() {
            return Err(IndexError::Config(
                "index.default_index_path cannot be empty".to_string(),
            ));
        }
        if self.index.ignore_patterns.iter().any(|p| p.is_empty()) {
            return Err(IndexError::Config(
                "index.ignore_patterns cannot contain empty names".to_string(),
            ));
        }
        logging::validate_format(&self.logging.format)?;
        LogOutput::parse(&self.logging.output)?;
        Ok(())
    }
}

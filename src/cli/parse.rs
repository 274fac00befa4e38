//! CLI parse: clap types for FileBox. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// FileBox - content-addressed directory index
#[derive(Parser, Debug)]
#[command(name = "filebox", version)]
#[command(about = "Index a directory tree by content hash, report duplicates, keep the index live")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (layered over the global config)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Scan a directory and write its index
    Scan {
        /// Directory to index
        path: PathBuf,
        /// Index file or directory (default: index.txt)
        output: Option<PathBuf>,
    },
    /// Report files with identical content
    Dedupe {
        /// Index file or directory holding index.txt (default: index.txt)
        index: Option<PathBuf>,
        /// Output format
        #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
        format: ReportFormat,
    },
    /// Keep an existing index up to date until interrupted
    Watch {
        /// Directory the index was built from
        path: PathBuf,
        /// Index file or directory holding index.txt (default: index.txt)
        index: Option<PathBuf>,
    },
}

impl Commands {
    /// Stable command name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Commands::Scan { .. } => "scan",
            Commands::Dedupe { .. } => "dedupe",
            Commands::Watch { .. } => "watch",
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Json,
}

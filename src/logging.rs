//! Logging System
//!
//! Structured logging through `tracing`. The binary initializes the
//! subscriber once; library code only emits events.
//!
//! Priority order (highest to lowest):
//! 1. CLI flags (applied to the config before initialization)
//! 2. Environment variables (FILEBOX_LOG, FILEBOX_LOG_FORMAT, FILEBOX_LOG_OUTPUT)
//! 3. Configuration file
//! 4. Defaults

use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub const LOG_ENV: &str = "FILEBOX_LOG";
pub const LOG_FORMAT_ENV: &str = "FILEBOX_LOG_FORMAT";
pub const LOG_OUTPUT_ENV: &str = "FILEBOX_LOG_OUTPUT";

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Install a subscriber at all (false with --quiet)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stderr, stdout, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (when output is "file")
    #[serde(default = "default_log_file")]
    pub file: PathBuf,

    /// Colored output (text format on a stream only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    // stdout carries command results
    "stderr".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("filebox.log")
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: default_log_file(),
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Output destination of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
}

impl LogOutput {
    pub fn parse(output: &str) -> Result<Self, IndexError> {
        match output {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            _ => Err(IndexError::Config(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', or 'file')",
                output
            ))),
        }
    }
}

/// Initialize the global subscriber.
pub fn init_logging(config: &LoggingConfig) -> Result<(), IndexError> {
    if !config.enabled {
        return Ok(());
    }
    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let output = determine_output(config)?;

    let writer = match output {
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::File => {
            if let Some(parent) = config.file.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| {
                    IndexError::Config(format!("Failed to create log directory: {}", e))
                })?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.file)
                .map_err(|e| {
                    IndexError::Config(format!(
                        "Failed to open log file {}: {}",
                        config.file.display(),
                        e
                    ))
                })?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
    };
    let use_color = config.color && output != LogOutput::File;

    let subscriber = Registry::default().with(filter);
    let result = if format == "json" {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(use_color)
                    .with_writer(writer),
            )
            .try_init()
    };

    result.map_err(|e| IndexError::Config(format!("Failed to install logger: {}", e)))
}

/// Build environment filter from FILEBOX_LOG or the config.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, IndexError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| IndexError::Config(format!("Invalid log level '{}': {}", config.level, e)))?;
    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| IndexError::Config(format!("Invalid log directive: {}", e)))?,
        );
    }

    Ok(filter)
}

fn determine_format(config: &LoggingConfig) -> Result<String, IndexError> {
    if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }
    validate_format(&config.format)?;
    Ok(config.format.clone())
}

fn determine_output(config: &LoggingConfig) -> Result<LogOutput, IndexError> {
    if let Ok(output) = std::env::var(LOG_OUTPUT_ENV) {
        return LogOutput::parse(&output);
    }
    LogOutput::parse(&config.output)
}

pub(crate) fn validate_format(format: &str) -> Result<(), IndexError> {
    if format != "json" && format != "text" {
        return Err(IndexError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }
    Ok(())
}

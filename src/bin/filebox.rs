//! FileBox CLI Binary
//!
//! Parses arguments, initializes logging, runs one command and maps the
//! outcome to the process exit status.

use clap::error::ErrorKind;
use clap::Parser;
use filebox::cli::{map_error, Cli, RunContext};
use filebox::error::EXIT_USAGE;
use filebox::logging::{init_logging, LoggingConfig};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => EXIT_USAGE,
            };
            // Printing help or the error itself; nothing else to report.
            let _ = e.print();
            process::exit(code);
        }
    };

    let context = match RunContext::new(cli.config.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(e.exit_code());
        }
    };

    let logging_config = build_logging_config(&cli, &context.config().logging);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(e.exit_code());
    }

    info!(command = cli.command.name(), "FileBox starting");

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            error!(error = %e, "Command failed");
            eprintln!("{}", map_error(&e));
            process::exit(e.exit_code());
        }
    }
}

/// Apply CLI flags on top of the loaded logging configuration.
/// Precedence: explicit flags, then --verbose/--quiet, then config.
fn build_logging_config(cli: &Cli, loaded: &LoggingConfig) -> LoggingConfig {
    let mut config = loaded.clone();

    if cli.quiet {
        config.enabled = false;
    }
    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }

    config
}

//! CLI route: single route table and run context. Dispatches to the scanner,
//! store, deduplicator and watcher, then to presentation.

use crate::cli::parse::{Commands, ReportFormat};
use crate::cli::presentation::{
    format_dedupe_json, format_dedupe_text, format_scan_skipped, format_scan_summary,
    format_watch_outcome,
};
use crate::config::{ConfigLoader, FileboxConfig};
use crate::dedupe::DuplicateReport;
use crate::error::IndexError;
use crate::scanner::Scanner;
use crate::store::{self, IndexStore};
use crate::watch::{verify_root, IndexWatcher, NotifySource, SourceCloser, StopHandle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Runtime context for CLI execution: the resolved configuration.
pub struct RunContext {
    config: FileboxConfig,
    color: bool,
}

impl RunContext {
    /// Build from all configuration sources; `config_path` is the `--config` file.
    pub fn new(config_path: Option<PathBuf>) -> Result<Self, IndexError> {
        let config = ConfigLoader::load(config_path.as_deref())?;
        Ok(Self::from_config(config))
    }

    pub fn from_config(config: FileboxConfig) -> Self {
        let color = std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none();
        Self { config, color }
    }

    /// Force colored text output on or off.
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn config(&self) -> &FileboxConfig {
        &self.config
    }

    /// Execute a CLI command via the single route table.
    pub fn execute(&self, command: &Commands) -> Result<String, IndexError> {
        let started = Instant::now();
        let result = match command {
            Commands::Scan { path, output } => self.handle_scan(path, output.as_deref()),
            Commands::Dedupe { index, format } => self.handle_dedupe(index.as_deref(), *format),
            Commands::Watch { path, index } => self.handle_watch(path, index.as_deref()),
        };
        debug!(
            command = command.name(),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn index_path<'a>(&'a self, given: Option<&'a Path>) -> &'a Path {
        given.unwrap_or(self.config.index.default_index_path.as_path())
    }

    fn handle_scan(&self, path: &Path, output: Option<&Path>) -> Result<String, IndexError> {
        let store = IndexStore::new(self.index_path(output));

        let mut walker_config = self.config.index.walker_config();
        walker_config.exclude.push(store.canonical_target().to_path_buf());
        let scanner = Scanner::new(path)?.with_walker_config(walker_config);

        let Some(result) = scanner.scan()? else {
            return Ok(format_scan_skipped(scanner.root()));
        };
        let written = store.save(&result.summary, &result.entries)?;
        info!(index = %written.display(), files = result.entries.len(), "Index written");
        Ok(format_scan_summary(&result.summary, &written))
    }

    fn handle_dedupe(
        &self,
        index: Option<&Path>,
        format: ReportFormat,
    ) -> Result<String, IndexError> {
        let data = store::load(self.index_path(index))?;
        let report = DuplicateReport::from_index(&data);
        info!(
            groups = report.groups.len(),
            duplicate_files = report.duplicate_files,
            "Duplicate report built"
        );
        match format {
            ReportFormat::Text => Ok(format_dedupe_text(&report, self.color)),
            ReportFormat::Json => format_dedupe_json(&report),
        }
    }

    fn handle_watch(&self, path: &Path, index: Option<&Path>) -> Result<String, IndexError> {
        let index_path = self.index_path(index);
        let data = store::load(index_path)?;
        // Before any subscription exists.
        let root = verify_root(&data, path)?;

        let store = IndexStore::new(index_path);
        let source = NotifySource::new()?;
        let mut watcher = IndexWatcher::new(root.clone(), data.entries, source, store);
        watcher.register_directory(&root)?;

        install_ctrl_c(watcher.stop_handle());
        let outcome = watcher.start()?;
        Ok(format_watch_outcome(
            outcome,
            &root,
            watcher.live_index().len(),
        ))
    }
}

/// Stop `handle` on Ctrl-C. The signal is awaited on a dedicated thread
/// with its own current-thread runtime; the main thread blocks in the watch
/// loop.
fn install_ctrl_c<C: SourceCloser>(handle: StopHandle<C>) {
    let spawned = std::thread::Builder::new()
        .name("filebox-ctrl-c".to_string())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!(error = %e, "Could not start signal runtime; Ctrl-C will not stop cleanly");
                    return;
                }
            };
            match runtime.block_on(tokio::signal::ctrl_c()) {
                Ok(()) => {
                    info!("Interrupt received, stopping watch");
                    handle.stop();
                }
                Err(e) => warn!(error = %e, "Could not listen for Ctrl-C"),
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "Could not spawn signal thread");
    }
}

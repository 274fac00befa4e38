//! Directory scanner
//!
//! Walks a tree once, hashing every regular file sequentially, and assembles
//! the entries plus an aggregate summary.

use crate::error::IndexError;
use crate::tree::hasher;
use crate::tree::path::{canonicalize_path, relative_key};
use crate::tree::walker::{Walker, WalkerConfig};
use crate::types::{FileEntry, ScanResult, ScanSummary};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, UNIX_EPOCH};
use tracing::{debug, info, warn};

/// One-shot scanner for a directory tree.
pub struct Scanner {
    root: PathBuf,
    walker_config: WalkerConfig,
}

impl Scanner {
    /// Resolve `path` to its canonical form. Fails fast if it does not exist.
    pub fn new(path: &Path) -> Result<Self, IndexError> {
        let root = canonicalize_path(path)?;
        Ok(Self {
            root,
            walker_config: WalkerConfig::default(),
        })
    }

    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Canonical root this scanner covers.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Scan the tree.
    ///
    /// Returns `Ok(None)` when the root is a single file: no index is
    /// produced and this is not an error.
    pub fn scan(&self) -> Result<Option<ScanResult>, IndexError> {
        if !self.root.is_dir() {
            info!(path = %self.root.display(), "Path is a file, nothing to index");
            return Ok(None);
        }

        info!(root = %self.root.display(), "Scanning directory");
        let started = Instant::now();

        let walker = Walker::with_config(self.root.clone(), self.walker_config.clone());
        let files = walker.files()?;

        let mut entries = Vec::with_capacity(files.len());
        for file in &files {
            match file_entry(&self.root, file) {
                Ok(Some(entry)) => entries.push(entry),
                Ok(None) => {}
                Err(e) => warn!(path = %file.display(), error = %e, "Skipping unreadable file"),
            }
        }

        let duration_millis = started.elapsed().as_millis() as u64;
        let summary = ScanSummary::from_entries(
            self.root.to_string_lossy().into_owned(),
            &entries,
            duration_millis,
        );
        info!(
            files = summary.total_files,
            bytes = summary.total_bytes,
            duration_ms = summary.duration_millis,
            "Scan complete"
        );

        Ok(Some(ScanResult { entries, summary }))
    }
}

/// Build the entry for one file: size, mtime in milliseconds and content hash.
///
/// Returns `Ok(None)` when `path` does not lie under `root`.
pub fn file_entry(root: &Path, path: &Path) -> Result<Option<FileEntry>, IndexError> {
    let Some(relative_path) = relative_key(root, path) else {
        debug!(path = %path.display(), "Path is outside the indexed root");
        return Ok(None);
    };

    let metadata = fs::metadata(path)
        .map_err(|e| IndexError::io(format!("reading metadata of {}", path.display()), e))?;
    let content_hash = hasher::hash_file(path)?;

    Ok(Some(FileEntry {
        relative_path,
        size: metadata.len(),
        modified_time_millis: modified_millis(&metadata),
        content_hash,
    }))
}

/// Modification time in milliseconds since the Unix epoch (0 if unavailable).
fn modified_millis(metadata: &fs::Metadata) -> u64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

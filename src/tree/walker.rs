//! Filesystem walker for traversing directory structures

use crate::error::IndexError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Filesystem walker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WalkerConfig {
    /// Whether to follow symbolic links (default: false)
    #[serde(default)]
    pub follow_symlinks: bool,
    /// Path component names to skip entirely (e.g. ".git")
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    /// Maximum depth to traverse (None = unlimited)
    #[serde(default)]
    pub max_depth: Option<usize>,
    /// Exact paths to skip, such as the index file being written
    #[serde(skip)]
    pub exclude: Vec<PathBuf>,
}

/// Filesystem walker
pub struct Walker {
    root: PathBuf,
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given root path
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            config: WalkerConfig::default(),
        }
    }

    /// Create a walker with custom configuration
    pub fn with_config(root: PathBuf, config: WalkerConfig) -> Self {
        Self { root, config }
    }

    /// Collect every regular file under the root, sorted by path.
    ///
    /// Directories and other non-regular entries are traversed but not
    /// returned. Failing to enumerate any part of the tree is fatal.
    pub fn files(&self) -> Result<Vec<PathBuf>, IndexError> {
        let mut files = Vec::new();
        for entry in self.entries() {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    /// Collect the root and every descendant directory, sorted by path.
    pub fn directories(&self) -> Result<Vec<PathBuf>, IndexError> {
        let mut dirs = Vec::new();
        for entry in self.entries() {
            let entry = entry?;
            if entry.file_type().is_dir() {
                dirs.push(entry.into_path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn entries(&self) -> impl Iterator<Item = Result<DirEntry, IndexError>> + '_ {
        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .max_depth(self.config.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(move |entry| !self.should_ignore(entry))
            .map(|entry| {
                entry.map_err(|e| {
                    let context = match e.path() {
                        Some(path) => format!("walking {}", path.display()),
                        None => "walking directory tree".to_string(),
                    };
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
                    IndexError::io(context, source)
                })
            })
    }

    /// Check if an entry should be skipped. The root itself is never skipped.
    fn should_ignore(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        let path = entry.path();
        if self.config.exclude.iter().any(|excluded| excluded == path) {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        self.config
            .ignore_patterns
            .iter()
            .any(|pattern| pattern.as_str() == name)
    }
}

/// The root and every directory beneath it that exists right now.
///
/// Has no side effects, so callers decide what to do with each directory
/// (the watcher subscribes to them).
pub fn list_directories(root: &Path) -> Result<Vec<PathBuf>, IndexError> {
    Walker::new(root.to_path_buf()).directories()
}

//! Live index maintenance
//!
//! [`IndexWatcher`] owns the in-memory index of one root and applies every
//! notification batch to it, rewriting the whole index file after each
//! change. All state is mutated from the single thread running [`start`];
//! registration calls made before `start` happen-before the loop, so no
//! locking is needed. Only the stop flag is shared, with [`StopHandle`].
//!
//! [`start`]: IndexWatcher::start

use super::source::{
    Notification, NotificationBatch, NotificationKind, NotificationSource, SourceClosed,
    SourceCloser, WatchToken,
};
use crate::error::IndexError;
use crate::scanner::file_entry;
use crate::store::IndexStore;
use crate::tree::path::{canonicalize_path, normalize_path_string, relative_key};
use crate::tree::walker::list_directories;
use crate::types::{FileEntry, IndexData, ScanSummary};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifecycle of a watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Constructed, nothing subscribed.
    Idle,
    /// Subscribing the initial tree.
    Registering,
    /// Blocking event loop.
    Running,
    /// Terminal.
    Stopped,
}

/// Why [`IndexWatcher::start`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    /// No directory was registered; the loop never ran.
    NothingRegistered,
    /// Shut down through a [`StopHandle`].
    Stopped,
    /// Every subscription became invalid.
    Exhausted,
}

/// Stops a running watcher from another thread (e.g. a Ctrl-C hook).
#[derive(Clone)]
pub struct StopHandle<C: SourceCloser> {
    stop_requested: Arc<AtomicBool>,
    closer: C,
}

impl<C: SourceCloser> StopHandle<C> {
    /// Mark the loop as stopping and close the source, which makes the
    /// pending wait return instead of a notification.
    pub fn stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
        self.closer.close();
    }
}

/// Check that the loaded index describes the tree about to be watched.
///
/// Returns the canonical watch root. Must be called before any directory is
/// subscribed; a mismatch is a configuration error.
pub fn verify_root(index: &IndexData, watch_path: &Path) -> Result<PathBuf, IndexError> {
    let watch_root = canonicalize_path(watch_path)?;
    let watch_root_str = watch_root.to_string_lossy().into_owned();
    if normalize_path_string(&index.root_path) != normalize_path_string(&watch_root_str) {
        return Err(IndexError::RootMismatch {
            index_root: index.root_path.clone(),
            watch_root: watch_root_str,
        });
    }
    Ok(watch_root)
}

/// Incremental index maintenance engine.
pub struct IndexWatcher<S: NotificationSource> {
    root: PathBuf,
    live_index: BTreeMap<String, FileEntry>,
    // Owned by the loop thread; see module docs.
    watched: HashMap<WatchToken, PathBuf>,
    source: S,
    store: IndexStore,
    stop_requested: Arc<AtomicBool>,
    state: WatcherState,
}

impl<S: NotificationSource> IndexWatcher<S> {
    /// Create a watcher seeded with previously loaded entries.
    ///
    /// When the same relative path appears more than once, the last
    /// occurrence wins.
    pub fn new(root: PathBuf, entries: Vec<FileEntry>, source: S, store: IndexStore) -> Self {
        let live_index = entries
            .into_iter()
            .map(|entry| (entry.relative_path.clone(), entry))
            .collect();
        Self {
            root,
            live_index,
            watched: HashMap::new(),
            source,
            store,
            stop_requested: Arc::new(AtomicBool::new(false)),
            state: WatcherState::Idle,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state(&self) -> WatcherState {
        self.state
    }

    /// Current entries keyed by relative path.
    pub fn live_index(&self) -> &BTreeMap<String, FileEntry> {
        &self.live_index
    }

    /// Directories currently subscribed, sorted.
    pub fn watched_directories(&self) -> Vec<&Path> {
        let mut dirs: Vec<&Path> = self.watched.values().map(PathBuf::as_path).collect();
        dirs.sort();
        dirs
    }

    /// Token of the subscription covering `dir`, if any.
    pub fn token_for(&self, dir: &Path) -> Option<WatchToken> {
        self.watched
            .iter()
            .find(|(_, watched)| watched.as_path() == dir)
            .map(|(token, _)| *token)
    }

    pub fn stop_handle(&self) -> StopHandle<S::Closer> {
        StopHandle {
            stop_requested: Arc::clone(&self.stop_requested),
            closer: self.source.closer(),
        }
    }

    /// Subscribe `path` and every directory beneath it that exists now.
    ///
    /// Returns the number of newly subscribed directories.
    pub fn register_directory(&mut self, path: &Path) -> Result<usize, IndexError> {
        let dir = canonicalize_path(path)?;
        if !dir.is_dir() {
            return Err(IndexError::NotADirectory(dir));
        }
        if self.state == WatcherState::Idle {
            self.state = WatcherState::Registering;
        }
        let added = self.register_tree(&dir)?;
        info!(root = %dir.display(), directories = added, "Registered directory tree");
        Ok(added)
    }

    fn register_tree(&mut self, dir: &Path) -> Result<usize, IndexError> {
        let mut added = 0;
        for found in list_directories(dir)? {
            if self.watched.values().any(|watched| *watched == found) {
                continue;
            }
            let token = self.source.subscribe(&found)?;
            self.watched.insert(token, found);
            added += 1;
        }
        Ok(added)
    }

    /// Run the event loop until stopped, exhausted, or a fatal error.
    pub fn start(&mut self) -> Result<WatchOutcome, IndexError> {
        if self.watched.is_empty() {
            info!("No directories registered, nothing to watch");
            return Ok(WatchOutcome::NothingRegistered);
        }

        self.state = WatcherState::Running;
        info!(
            root = %self.root.display(),
            directories = self.watched.len(),
            entries = self.live_index.len(),
            "Watching for changes (recursive). Press Ctrl-C to stop"
        );

        let outcome = self.run_loop();
        self.state = WatcherState::Stopped;
        outcome
    }

    fn run_loop(&mut self) -> Result<WatchOutcome, IndexError> {
        // Batches queued before a stop are still applied; the close marker
        // arrives after them.
        loop {
            let batch = match self.source.next_batch() {
                Ok(batch) => batch,
                Err(SourceClosed) => {
                    if !self.stop_requested.load(Ordering::SeqCst) {
                        return Err(IndexError::Watch(
                            "notification source closed unexpectedly".to_string(),
                        ));
                    }
                    info!("Watch stopped");
                    return Ok(WatchOutcome::Stopped);
                }
            };

            self.handle_batch(&batch)?;

            if !self.source.revalidate(batch.token) {
                self.drop_subscription(batch.token);
            }
            if self.watched.is_empty() {
                info!("No directories left to watch, stopping");
                return Ok(WatchOutcome::Exhausted);
            }
        }
    }

    fn drop_subscription(&mut self, token: WatchToken) {
        if let Some(dir) = self.watched.remove(&token) {
            debug!(dir = %dir.display(), token = %token, "Subscription no longer valid");
        }
    }

    /// Apply one batch to the live index.
    ///
    /// Only a failure to persist the index is returned as an error.
    pub fn handle_batch(&mut self, batch: &NotificationBatch) -> Result<(), IndexError> {
        let Some(base) = self.watched.get(&batch.token).cloned() else {
            warn!(token = %batch.token, "Notification for unknown subscription");
            return Ok(());
        };

        for notification in &batch.events {
            self.handle_notification(&base, notification)?;
        }
        Ok(())
    }

    fn handle_notification(
        &mut self,
        base: &Path,
        notification: &Notification,
    ) -> Result<(), IndexError> {
        if notification.kind == NotificationKind::Overflow {
            warn!(
                dir = %base.display(),
                "Notifications were dropped; the index may be stale until the next scan"
            );
            return Ok(());
        }

        let full = if notification.context.as_os_str().is_empty() {
            base.to_path_buf()
        } else {
            base.join(&notification.context)
        };
        if self.store.owns_path(&full) {
            return Ok(());
        }
        debug!(kind = notification.kind.as_str(), path = %full.display(), "Change");

        match notification.kind {
            NotificationKind::Create if full.is_dir() => {
                // Entries created before this registration completes may be missed.
                match self.register_tree(&full) {
                    Ok(added) => {
                        info!(dir = %full.display(), directories = added, "Watching new directory")
                    }
                    Err(e) => {
                        warn!(dir = %full.display(), error = %e, "Could not watch new directory")
                    }
                }
                Ok(())
            }
            NotificationKind::Create | NotificationKind::Modify => {
                if full.is_file() {
                    self.upsert(&full)
                } else {
                    Ok(())
                }
            }
            NotificationKind::Delete => self.remove(&full),
            NotificationKind::Overflow => Ok(()),
        }
    }

    fn upsert(&mut self, full: &Path) -> Result<(), IndexError> {
        let entry = match file_entry(&self.root, full) {
            Ok(Some(entry)) => entry,
            Ok(None) => return Ok(()),
            Err(e) => {
                warn!(path = %full.display(), error = %e, "Skipping unreadable file");
                return Ok(());
            }
        };
        info!(path = %entry.relative_path, size = entry.size, "Indexed file");
        self.live_index.insert(entry.relative_path.clone(), entry);
        self.persist()
    }

    /// Remove the entry at `full`. Entries below a removed directory are left
    /// in place; subscriptions at or below it are revalidated.
    fn remove(&mut self, full: &Path) -> Result<(), IndexError> {
        let affected: Vec<WatchToken> = self
            .watched
            .iter()
            .filter(|(_, dir)| dir.starts_with(full))
            .map(|(token, _)| *token)
            .collect();
        for token in affected {
            if !self.source.revalidate(token) {
                self.drop_subscription(token);
            }
        }

        let Some(key) = relative_key(&self.root, full) else {
            return Ok(());
        };
        if self.live_index.remove(&key).is_some() {
            info!(path = %key, "Removed file from index");
        }
        self.persist()
    }

    /// Rewrite the whole index file from the live index.
    fn persist(&self) -> Result<(), IndexError> {
        let summary = ScanSummary::from_entries(
            self.root.to_string_lossy().into_owned(),
            self.live_index.values(),
            0,
        );
        self.store.save(&summary, self.live_index.values())?;
        Ok(())
    }
}

//! Notification source backed by the `notify` crate.
//!
//! Every registered directory gets its own non-recursive watch and token, so
//! newly created subdirectories must be subscribed explicitly.

use super::source::{
    Notification, NotificationBatch, NotificationKind, NotificationSource, SourceClosed,
    SourceCloser, WatchToken,
};
use crate::error::IndexError;
use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, warn};

enum Message {
    Event(notify::Result<Event>),
    Close,
}

/// Production notification source.
pub struct NotifySource {
    watcher: RecommendedWatcher,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    next_token: u64,
    tokens: HashMap<PathBuf, WatchToken>,
    dirs: HashMap<WatchToken, PathBuf>,
    pending: VecDeque<NotificationBatch>,
}

impl NotifySource {
    pub fn new() -> Result<Self, IndexError> {
        let (tx, rx) = mpsc::channel();
        let event_tx = tx.clone();
        let watcher = notify::recommended_watcher(move |res| {
            // The receiver only disappears once the source is dropped.
            let _ = event_tx.send(Message::Event(res));
        })?;

        Ok(Self {
            watcher,
            tx,
            rx,
            next_token: 0,
            tokens: HashMap::new(),
            dirs: HashMap::new(),
            pending: VecDeque::new(),
        })
    }

    /// Turn classified changes into per-directory batches, preserving order.
    fn batch_by_directory(&self, changes: Vec<(NotificationKind, PathBuf)>) -> Vec<NotificationBatch> {
        let mut batches: Vec<NotificationBatch> = Vec::new();

        for (kind, path) in changes {
            let routed = if kind == NotificationKind::Overflow {
                // Dropped notifications are not tied to one directory.
                self.dirs
                    .keys()
                    .min()
                    .map(|token| (*token, Notification::overflow()))
            } else {
                let parent_token = path.parent().and_then(|parent| self.tokens.get(parent));
                match (parent_token, path.file_name()) {
                    (Some(token), Some(name)) => Some((*token, Notification::new(kind, name))),
                    // A watched directory reporting on itself (e.g. the root being removed)
                    _ => self
                        .tokens
                        .get(&path)
                        .map(|token| (*token, Notification::new(kind, PathBuf::new()))),
                }
            };

            let Some((token, notification)) = routed else {
                debug!(path = %path.display(), kind = kind.as_str(), "Change outside watched directories");
                continue;
            };

            match batches.last_mut() {
                Some(batch) if batch.token == token => batch.events.push(notification),
                _ => batches.push(NotificationBatch {
                    token,
                    events: vec![notification],
                }),
            }
        }

        batches
    }
}

/// Map one `notify` event to `(kind, absolute path)` changes.
///
/// Access events and unclassified events carry no index-relevant change and
/// map to nothing.
pub fn classify(event: &Event) -> Vec<(NotificationKind, PathBuf)> {
    if event.need_rescan() {
        return vec![(NotificationKind::Overflow, PathBuf::new())];
    }

    let all = |kind: NotificationKind| -> Vec<(NotificationKind, PathBuf)> {
        event.paths.iter().map(|p| (kind, p.clone())).collect()
    };

    match event.kind {
        EventKind::Create(_) => all(NotificationKind::Create),
        EventKind::Remove(_) => all(NotificationKind::Delete),
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => all(NotificationKind::Delete),
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => all(NotificationKind::Create),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => vec![
            (NotificationKind::Delete, event.paths[0].clone()),
            (NotificationKind::Create, event.paths[1].clone()),
        ],
        EventKind::Modify(ModifyKind::Name(_)) => event
            .paths
            .iter()
            .map(|p| {
                // Backends that cannot tell the rename direction
                let kind = if p.exists() {
                    NotificationKind::Create
                } else {
                    NotificationKind::Delete
                };
                (kind, p.clone())
            })
            .collect(),
        EventKind::Modify(_) => all(NotificationKind::Modify),
        EventKind::Access(_) | EventKind::Any | EventKind::Other => Vec::new(),
    }
}

impl NotificationSource for NotifySource {
    type Closer = NotifyCloser;

    fn subscribe(&mut self, dir: &Path) -> Result<WatchToken, IndexError> {
        if let Some(token) = self.tokens.get(dir) {
            return Ok(*token);
        }
        self.watcher.watch(dir, RecursiveMode::NonRecursive)?;

        self.next_token += 1;
        let token = WatchToken(self.next_token);
        self.tokens.insert(dir.to_path_buf(), token);
        self.dirs.insert(token, dir.to_path_buf());
        debug!(dir = %dir.display(), token = %token, "Subscribed directory");
        Ok(token)
    }

    fn next_batch(&mut self) -> Result<NotificationBatch, SourceClosed> {
        loop {
            if let Some(batch) = self.pending.pop_front() {
                return Ok(batch);
            }
            match self.rx.recv() {
                Ok(Message::Event(Ok(event))) => {
                    let batches = self.batch_by_directory(classify(&event));
                    self.pending.extend(batches);
                }
                Ok(Message::Event(Err(e))) => {
                    warn!(error = %e, paths = ?e.paths, "Watch backend reported an error");
                }
                Ok(Message::Close) | Err(_) => return Err(SourceClosed),
            }
        }
    }

    fn revalidate(&mut self, token: WatchToken) -> bool {
        let Some(dir) = self.dirs.get(&token).cloned() else {
            return false;
        };
        if dir.is_dir() {
            return true;
        }

        // The kernel usually drops the watch itself once the directory is gone.
        if let Err(e) = self.watcher.unwatch(&dir) {
            debug!(dir = %dir.display(), error = %e, "Unwatch of removed directory failed");
        }
        self.dirs.remove(&token);
        self.tokens.remove(&dir);
        false
    }

    fn closer(&self) -> NotifyCloser {
        NotifyCloser {
            tx: self.tx.clone(),
        }
    }
}

/// Closes a [`NotifySource`] from any thread.
#[derive(Clone)]
pub struct NotifyCloser {
    tx: Sender<Message>,
}

impl SourceCloser for NotifyCloser {
    fn close(&self) {
        let _ = self.tx.send(Message::Close);
    }
}

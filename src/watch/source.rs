//! Notification source capability
//!
//! The event loop only ever talks to a [`NotificationSource`]: it subscribes
//! directories, blocks on the next batch and revalidates subscriptions. The
//! production source wraps `notify`; tests drive the loop with
//! [`MemorySource`](super::memory::MemorySource).

use crate::error::IndexError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Handle tying one watched directory to the notification mechanism.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchToken(pub u64);

impl fmt::Display for WatchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened to an entry of a watched directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Create,
    Modify,
    Delete,
    /// Notifications were dropped; the index may be stale.
    Overflow,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Create => "create",
            NotificationKind::Modify => "modify",
            NotificationKind::Delete => "delete",
            NotificationKind::Overflow => "overflow",
        }
    }
}

/// One change, relative to the batch's watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Entry name (or relative path) inside the watched directory. Empty for
    /// overflow notifications.
    pub context: PathBuf,
}

impl Notification {
    pub fn new(kind: NotificationKind, context: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            context: context.into(),
        }
    }

    pub fn overflow() -> Self {
        Self::new(NotificationKind::Overflow, PathBuf::new())
    }
}

/// Changes delivered together for one watched directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationBatch {
    pub token: WatchToken,
    pub events: Vec<Notification>,
}

/// Returned by [`NotificationSource::next_batch`] once the source was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceClosed;

impl fmt::Display for SourceClosed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("notification source closed")
    }
}

impl std::error::Error for SourceClosed {}

/// Closes a source from another thread, unblocking a pending `next_batch`.
pub trait SourceCloser: Clone + Send + Sync + 'static {
    fn close(&self);
}

/// Blocking supplier of filesystem change notifications.
pub trait NotificationSource {
    type Closer: SourceCloser;

    /// Start observing the entries of `dir` (not its descendants).
    fn subscribe(&mut self, dir: &Path) -> Result<WatchToken, IndexError>;

    /// Block until the next batch arrives. No timeout.
    fn next_batch(&mut self) -> Result<NotificationBatch, SourceClosed>;

    /// Whether `token` still delivers notifications. An invalid subscription
    /// is released by the source.
    fn revalidate(&mut self, token: WatchToken) -> bool;

    /// Handle that closes this source.
    fn closer(&self) -> Self::Closer;
}

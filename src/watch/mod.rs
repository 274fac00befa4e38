//! Change-notification driven index maintenance.

pub mod memory;
pub mod notify_source;
pub mod source;
pub mod watcher;

pub use memory::{MemoryFeeder, MemorySource};
pub use notify_source::{NotifyCloser, NotifySource};
pub use source::{
    Notification, NotificationBatch, NotificationKind, NotificationSource, SourceClosed,
    SourceCloser, WatchToken,
};
pub use watcher::{verify_root, IndexWatcher, StopHandle, WatchOutcome, WatcherState};

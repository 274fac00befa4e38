//! In-memory notification source.
//!
//! Batches are pushed through a [`MemoryFeeder`]; subscriptions stay valid
//! while their directory exists on disk. Used to drive the event loop
//! deterministically in tests.

use super::source::{
    Notification, NotificationBatch, NotificationSource, SourceClosed, SourceCloser, WatchToken,
};
use crate::error::IndexError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};

enum Message {
    Batch(NotificationBatch),
    Close,
}

/// Notification source fed by hand.
pub struct MemorySource {
    tx: Sender<Message>,
    rx: Receiver<Message>,
    next_token: u64,
    subscriptions: HashMap<WatchToken, PathBuf>,
}

impl Default for MemorySource {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            next_token: 0,
            subscriptions: HashMap::new(),
        }
    }

    /// Handle for queueing batches, usable after the source is moved.
    pub fn feeder(&self) -> MemoryFeeder {
        MemoryFeeder {
            tx: self.tx.clone(),
        }
    }

    /// Token assigned to `dir`, if it is subscribed.
    pub fn token_for(&self, dir: &Path) -> Option<WatchToken> {
        self.subscriptions
            .iter()
            .find(|(_, path)| path.as_path() == dir)
            .map(|(token, _)| *token)
    }
}

impl NotificationSource for MemorySource {
    type Closer = MemoryFeeder;

    fn subscribe(&mut self, dir: &Path) -> Result<WatchToken, IndexError> {
        self.next_token += 1;
        let token = WatchToken(self.next_token);
        self.subscriptions.insert(token, dir.to_path_buf());
        Ok(token)
    }

    fn next_batch(&mut self) -> Result<NotificationBatch, SourceClosed> {
        match self.rx.recv() {
            Ok(Message::Batch(batch)) => Ok(batch),
            Ok(Message::Close) | Err(_) => Err(SourceClosed),
        }
    }

    fn revalidate(&mut self, token: WatchToken) -> bool {
        let valid = self
            .subscriptions
            .get(&token)
            .map(|dir| dir.is_dir())
            .unwrap_or(false);
        if !valid {
            self.subscriptions.remove(&token);
        }
        valid
    }

    fn closer(&self) -> MemoryFeeder {
        self.feeder()
    }
}

/// Sending half of a [`MemorySource`].
#[derive(Clone)]
pub struct MemoryFeeder {
    tx: Sender<Message>,
}

impl MemoryFeeder {
    /// Queue a batch for `token`.
    pub fn push(&self, token: WatchToken, events: Vec<Notification>) {
        let _ = self.tx.send(Message::Batch(NotificationBatch { token, events }));
    }
}

impl SourceCloser for MemoryFeeder {
    fn close(&self) {
        let _ = self.tx.send(Message::Close);
    }
}

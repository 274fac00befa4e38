//! Filesystem tree access
//!
//! Content hashing, path normalization and directory walking used by both the
//! one-shot scanner and the live watcher.

pub mod hasher;
pub mod path;
pub mod walker;

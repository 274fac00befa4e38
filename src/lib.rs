//! FileBox: content-addressed directory index
//!
//! Records size, modification time and SHA-256 content hash for every regular
//! file under a root, persists that index as a line-oriented text file, reports
//! duplicate content, and keeps the index current from filesystem change
//! notifications.

pub mod cli;
pub mod config;
pub mod dedupe;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod store;
pub mod tree;
pub mod types;
pub mod watch;

pub use error::IndexError;
pub use types::{FileEntry, IndexData, ScanResult, ScanSummary};

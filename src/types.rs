//! Core data model shared by the scanner, store, deduplicator and watcher.

use serde::{Deserialize, Serialize};

/// Length in bytes of a content digest.
pub const DIGEST_LEN: usize = 32;

/// One regular file's recorded metadata and content hash.
///
/// `relative_path` is the identity key: it is unique within one index and is
/// always rendered with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileEntry {
    pub relative_path: String,
    pub size: u64,
    pub modified_time_millis: u64,
    /// Lowercase hex SHA-256 of the file's bytes.
    pub content_hash: String,
}

/// Aggregate figures written at the bottom of every index file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub root_path: String,
    pub total_bytes: u64,
    pub total_files: u64,
    /// Wall-clock duration of the scan; `0` for watcher-driven saves.
    pub duration_millis: u64,
}

impl ScanSummary {
    /// Recompute totals from a set of entries.
    pub fn from_entries<'a, I>(root_path: impl Into<String>, entries: I, duration_millis: u64) -> Self
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        let (total_files, total_bytes) = entries
            .into_iter()
            .fold((0u64, 0u64), |(files, bytes), e| (files + 1, bytes.saturating_add(e.size)));
        Self {
            root_path: root_path.into(),
            total_bytes,
            total_files,
            duration_millis,
        }
    }
}

/// A persisted or freshly loaded index snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexData {
    pub root_path: String,
    /// Entries in file order. The store does not deduplicate by path.
    pub entries: Vec<FileEntry>,
    /// Value of the `# generatedAt:` header, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

/// Result of scanning a directory tree.
#[derive(Debug, Clone)]
pub struct ScanResult {
    pub entries: Vec<FileEntry>,
    pub summary: ScanSummary,
}

//! Duplicate detection over a loaded index.
//!
//! Grouping is by content hash alone. Two entries with the same SHA-256 are
//! taken to have identical content; sizes are not cross-checked.

use crate::types::{FileEntry, IndexData};
use serde::Serialize;
use std::collections::HashMap;

/// Entries sharing one content hash (always two or more).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub hash: String,
    /// Members in input order.
    pub entries: Vec<FileEntry>,
}

impl DuplicateGroup {
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// Size of the first member.
    pub fn representative_size(&self) -> u64 {
        self.entries.first().map(|e| e.size).unwrap_or(0)
    }

    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.relative_path.as_str()).collect()
    }

    /// Bytes freed if all but one member were removed.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.representative_size()
            .saturating_mul(self.count().saturating_sub(1) as u64)
    }
}

/// Group `entries` by content hash, keeping only groups with two or more
/// members. Groups are ordered by the first appearance of their hash.
pub fn find_duplicates(entries: &[FileEntry]) -> Vec<DuplicateGroup> {
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for entry in entries {
        let slot = *slots.entry(entry.content_hash.as_str()).or_insert_with(|| {
            groups.push(DuplicateGroup {
                hash: entry.content_hash.clone(),
                entries: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].entries.push(entry.clone());
    }

    groups.retain(|group| group.count() >= 2);
    groups
}

/// Duplicate groups of one index plus totals.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateReport {
    pub root_path: String,
    pub groups: Vec<DuplicateGroup>,
    pub duplicate_files: usize,
    pub reclaimable_bytes: u64,
}

impl DuplicateReport {
    pub fn from_index(index: &IndexData) -> Self {
        let groups = find_duplicates(&index.entries);
        let duplicate_files = groups.iter().map(DuplicateGroup::count).sum();
        // Sizes come from the index file and may be arbitrarily large.
        let reclaimable_bytes = groups
            .iter()
            .map(DuplicateGroup::reclaimable_bytes)
            .fold(0u64, u64::saturating_add);
        Self {
            root_path: index.root_path.clone(),
            groups,
            duplicate_files,
            reclaimable_bytes,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

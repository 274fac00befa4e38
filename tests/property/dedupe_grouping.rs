//! Duplicate groups partition exactly the entries whose hash repeats

use filebox::dedupe::find_duplicates;
use filebox::tree::hasher::hash_bytes;
use filebox::FileEntry;
use proptest::prelude::*;
use std::collections::HashMap;

proptest! {
    #[test]
    fn prop_groups_cover_repeated_hashes(contents in proptest::collection::vec(0u8..6, 0..30)) {
        let entries: Vec<FileEntry> = contents
            .iter()
            .enumerate()
            .map(|(i, c)| FileEntry {
                relative_path: format!("f{}", i),
                size: 1,
                modified_time_millis: 0,
                content_hash: hash_bytes(&[*c]),
            })
            .collect();

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for entry in &entries {
            *counts.entry(entry.content_hash.as_str()).or_default() += 1;
        }

        let groups = find_duplicates(&entries);
        let repeated = counts.values().filter(|n| **n >= 2).count();
        prop_assert_eq!(groups.len(), repeated);

        for group in &groups {
            prop_assert!(group.count() >= 2);
            prop_assert_eq!(group.count(), counts[group.hash.as_str()]);
            prop_assert!(group.entries.iter().all(|e| e.content_hash == group.hash));
            // Members keep input order.
            let positions: Vec<usize> = group
                .entries
                .iter()
                .map(|e| e.relative_path[1..].parse().unwrap())
                .collect();
            prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

//! Integration tests for scanning a tree into an index file

use super::test_utils::{sha256_hex, TestTree};
use filebox::scanner::Scanner;
use filebox::store::{self, IndexStore};
use filebox::tree::walker::WalkerConfig;
use filebox::IndexError;
use std::fs;
use std::time::UNIX_EPOCH;

/// Scanning files of 10, 20 and 30 bytes yields the expected totals and hashes
#[test]
fn test_scan_totals_and_hashes() {
    let tree = TestTree::new();
    let contents = [
        ("ten.bin", vec![1u8; 10]),
        ("nested/twenty.bin", vec![2u8; 20]),
        ("nested/deeper/thirty.bin", vec![3u8; 30]),
    ];
    for (path, content) in &contents {
        tree.write(path, content);
    }

    let result = Scanner::new(&tree.root).unwrap().scan().unwrap().unwrap();

    assert_eq!(result.summary.total_bytes, 60);
    assert_eq!(result.summary.total_files, 3);
    assert_eq!(result.summary.root_path, tree.root.to_string_lossy());
    for (path, content) in &contents {
        let entry = result
            .entries
            .iter()
            .find(|e| e.relative_path == *path)
            .unwrap_or_else(|| panic!("missing entry for {}", path));
        assert_eq!(entry.size, content.len() as u64);
        assert_eq!(entry.content_hash, sha256_hex(content));
    }
}

/// Modification times are recorded in milliseconds since the epoch
#[test]
fn test_scan_records_mtime_millis() {
    let tree = TestTree::new();
    let path = tree.write("a.txt", "a");
    let expected = fs::metadata(&path)
        .unwrap()
        .modified()
        .unwrap()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64;

    let result = Scanner::new(&tree.root).unwrap().scan().unwrap().unwrap();
    assert_eq!(result.entries[0].modified_time_millis, expected);
}

/// Relative paths use forward slashes and never include directories
#[test]
fn test_scan_relative_paths() {
    let tree = TestTree::new();
    tree.write("x/y/z.txt", "z");
    fs::create_dir_all(tree.path("empty/dir")).unwrap();

    let result = Scanner::new(&tree.root).unwrap().scan().unwrap().unwrap();
    let paths: Vec<&str> = result
        .entries
        .iter()
        .map(|e| e.relative_path.as_str())
        .collect();
    assert_eq!(paths, vec!["x/y/z.txt"]);
}

/// Scanning a path given with `..` components resolves to the canonical root
#[test]
fn test_scan_normalizes_root() {
    let tree = TestTree::new();
    tree.write("sub/f.txt", "f");
    let indirect = tree.root.join("sub").join("..");

    let scanner = Scanner::new(&indirect).unwrap();
    assert_eq!(scanner.root(), tree.root.as_path());
}

/// A bare file produces no index and no error
#[test]
fn test_scan_bare_file_is_noop() {
    let tree = TestTree::new();
    let file = tree.write("only.txt", "x");
    assert!(Scanner::new(&file).unwrap().scan().unwrap().is_none());
}

/// A missing root fails before anything is read
#[test]
fn test_scan_missing_root() {
    let tree = TestTree::new();
    let err = Scanner::new(&tree.path("absent")).err().unwrap();
    assert!(matches!(err, IndexError::PathNotFound(_)));
}

/// Ignore patterns skip whole subtrees by name
#[test]
fn test_scan_with_ignore_patterns() {
    let tree = TestTree::new();
    tree.write("keep.txt", "k");
    tree.write(".git/objects/blob", "b");
    tree.write("src/target/out.o", "o");

    let config = WalkerConfig {
        ignore_patterns: vec![".git".to_string(), "target".to_string()],
        ..WalkerConfig::default()
    };
    let result = Scanner::new(&tree.root)
        .unwrap()
        .with_walker_config(config)
        .scan()
        .unwrap()
        .unwrap();
    assert_eq!(result.entries.len(), 1);
    assert_eq!(result.entries[0].relative_path, "keep.txt");
}

/// scan followed by save and load reproduces the entries
#[test]
fn test_scan_save_load() {
    let tree = TestTree::new();
    tree.write("a.txt", "alpha");
    tree.write("b/c.txt", "gamma");
    let out = TestTree::new();

    let result = Scanner::new(&tree.root).unwrap().scan().unwrap().unwrap();
    let written = IndexStore::new(&out.root)
        .save(&result.summary, &result.entries)
        .unwrap();
    assert_eq!(written, out.root.join("index.txt"));

    let loaded = store::load(&out.root).unwrap();
    assert_eq!(loaded.root_path, result.summary.root_path);
    assert_eq!(loaded.entries, result.entries);
    assert!(loaded.generated_at.is_some());
}

//! Hasher Implementation Verification Tests
//!
//! The content hash must be plain SHA-256 over the file bytes, streamed in
//! chunks, regardless of file size.

use super::test_utils::{sha256_hex, TestTree};
use filebox::tree::hasher;
use filebox::IndexError;

/// Test that content hash matches SHA-256 computed directly
#[test]
fn test_content_hash_matches_sha256() {
    let content = b"test content";
    assert_eq!(hasher::hash_bytes(content), sha256_hex(content));
}

/// Test that hashing a file spanning several chunks equals hashing its bytes
#[test]
fn test_multi_chunk_file_hash() {
    let tree = TestTree::new();
    let content: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
    let path = tree.write("big.bin", &content);

    assert_eq!(hasher::hash_file(&path).unwrap(), sha256_hex(&content));
}

/// Test that an empty file hashes to the SHA-256 of nothing
#[test]
fn test_empty_file_hash() {
    let tree = TestTree::new();
    let path = tree.write("empty", b"");
    assert_eq!(
        hasher::hash_file(&path).unwrap(),
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
    );
}

/// Test that hashing a missing file is an I/O failure, not a partial hash
#[test]
fn test_missing_file_is_io_error() {
    let tree = TestTree::new();
    let err = hasher::hash_file(&tree.path("absent")).unwrap_err();
    assert!(matches!(err, IndexError::Io { .. }));
}

/// Test that identical content in different files hashes identically
#[test]
fn test_hash_depends_only_on_content() {
    let tree = TestTree::new();
    let a = tree.write("a/one.txt", "same bytes");
    let b = tree.write("b/two.log", "same bytes");
    let c = tree.write("c.txt", "other bytes");

    assert_eq!(hasher::hash_file(&a).unwrap(), hasher::hash_file(&b).unwrap());
    assert_ne!(hasher::hash_file(&a).unwrap(), hasher::hash_file(&c).unwrap());
}

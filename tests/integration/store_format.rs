//! Integration tests for the text index format

use super::test_utils::{read, sha256_hex, TestTree};
use filebox::store::{self, resolve_target, IndexStore};
use filebox::{FileEntry, IndexError, ScanSummary};

fn entry(path: &str, content: &[u8], mtime: u64) -> FileEntry {
    FileEntry {
        relative_path: path.to_string(),
        size: content.len() as u64,
        modified_time_millis: mtime,
        content_hash: sha256_hex(content),
    }
}

fn summary(root: &str, entries: &[FileEntry]) -> ScanSummary {
    ScanSummary::from_entries(root, entries, 12)
}

/// The written file follows the documented layout line by line
#[test]
fn test_saved_layout() {
    let out = TestTree::new();
    let entries = vec![entry("a.txt", b"hello", 1_700_000_000_000)];
    let path = IndexStore::new(&out.path("index.txt"))
        .save(&summary("/data/root", &entries), &entries)
        .unwrap();

    let text = read(&path);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "# FileBox Index v1.0");
    assert_eq!(lines[1], "# rootDir: /data/root");
    assert!(lines[2].starts_with("# generatedAt: "));
    assert!(lines[2].ends_with('Z'));
    assert_eq!(lines[3], "# fields=relativePath\tsize\tmtimeMillis\tsha256");
    assert_eq!(lines[4], "");
    assert_eq!(
        lines[5],
        format!("a.txt\t5\t1700000000000\t{}", sha256_hex(b"hello"))
    );
    assert_eq!(lines[6], "======================");
    assert_eq!(
        lines[7],
        "# Summary: files=1, totalBytes=5 durationMillis=12 ms"
    );
    assert_eq!(lines.len(), 8);
}

/// Hand-written files with extra comments, blank lines and CRLF endings load
#[test]
fn test_load_tolerates_comments_and_blank_lines() {
    let out = TestTree::new();
    let hash = sha256_hex(b"x");
    let text = format!(
        "# FileBox Index v1.0\r\n# rootDir: /srv/files\r\n# a note\r\n\r\n\
         docs/x.md\t1\t42\t{hash}\r\n\
         ==========\r\n\
         # Summary: whatever\r\n\
         docs/y.md\t1\t43\t{hash}\r\n",
        hash = hash
    );
    let path = out.path("hand.txt");
    std::fs::write(&path, text).unwrap();

    let data = store::load(&path).unwrap();
    assert_eq!(data.root_path, "/srv/files");
    assert_eq!(data.generated_at, None);
    assert_eq!(data.entries.len(), 2);
    assert_eq!(data.entries[0].relative_path, "docs/x.md");
    assert_eq!(data.entries[1].modified_time_millis, 43);
}

/// A malformed entry line rejects the whole load and names the line
#[test]
fn test_malformed_line_is_fatal() {
    let out = TestTree::new();
    let path = out.path("bad.txt");
    std::fs::write(
        &path,
        format!(
            "# rootDir: /r\n\nok\t1\t1\t{}\nbroken line without tabs\n",
            sha256_hex(b"ok")
        ),
    )
    .unwrap();

    let err = store::load(&path).unwrap_err();
    match &err {
        IndexError::Serialization { line, .. } => assert_eq!(*line, Some(4)),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(err.exit_code(), 2);
}

/// A non-numeric size is fatal rather than silently dropped
#[test]
fn test_unparsable_number_is_fatal() {
    let err = store::parse(&format!(
        "# rootDir: /r\na\tten\t1\t{}\n",
        sha256_hex(b"a")
    ))
    .unwrap_err();
    assert!(matches!(err, IndexError::Serialization { line: Some(2), .. }));
}

/// A missing rootDir header is fatal
#[test]
fn test_missing_root_header_is_fatal() {
    let err = store::parse("# FileBox Index v1.0\n").unwrap_err();
    assert!(matches!(err, IndexError::Serialization { line: None, .. }));
}

/// Output paths naming a directory resolve to index.txt inside it
#[test]
fn test_target_resolution_and_parent_creation() {
    let out = TestTree::new();
    let entries = vec![entry("f", b"f", 1)];

    let nested = out.path("reports/latest");
    assert_eq!(resolve_target(&nested), nested.join("index.txt"));
    let written = IndexStore::new(&nested)
        .save(&summary("/r", &entries), &entries)
        .unwrap();
    assert_eq!(written, nested.join("index.txt"));
    assert!(written.is_file());

    let explicit = out.path("custom.idx");
    assert_eq!(resolve_target(&explicit), explicit);

    // Loading through the directory finds the same file.
    assert_eq!(store::load(&nested).unwrap().entries, entries);
}

/// Each save replaces the previous snapshot completely
#[test]
fn test_save_replaces_previous_content() {
    let out = TestTree::new();
    let store = IndexStore::new(&out.root);
    let first = vec![entry("a", b"a", 1), entry("b", b"b", 2)];
    let second = vec![entry("c", b"c", 3)];

    store.save(&summary("/r", &first), &first).unwrap();
    store.save(&summary("/r", &second), &second).unwrap();

    let data = store::load(&out.root).unwrap();
    assert_eq!(data.entries, second);
    assert!(!read(&out.path("index.txt")).contains("\nb\t"));

    let leftovers: Vec<_> = std::fs::read_dir(&out.root)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("index.txt")]);
}

//! End-to-end tests for the watch engine driven by an in-memory notification
//! source against real temporary directories.

use super::test_utils::{sha256_hex, TestTree};
use filebox::scanner::Scanner;
use filebox::store::{self, IndexStore};
use filebox::watch::{
    verify_root, IndexWatcher, MemorySource, Notification, NotificationKind, NotifySource,
    WatchOutcome, WatcherState,
};
use filebox::{IndexData, IndexError};
use std::fs;
use std::thread;
use std::time::{Duration, Instant};

fn scan_into(tree: &TestTree, out: &TestTree) -> IndexData {
    let result = Scanner::new(&tree.root).unwrap().scan().unwrap().unwrap();
    IndexStore::new(&out.root)
        .save(&result.summary, &result.entries)
        .unwrap();
    store::load(&out.root).unwrap()
}

/// Create, modify and delete notifications processed on the loop thread are
/// reflected in the index file once the watch stops
#[test]
fn test_watch_loop_applies_changes() {
    let tree = TestTree::new();
    tree.write("existing.txt", "old");
    tree.write("gone.txt", "bye");
    let out = TestTree::new();
    let data = scan_into(&tree, &out);

    let root = verify_root(&data, &tree.root).unwrap();
    let source = MemorySource::new();
    let feeder = source.feeder();
    let mut watcher =
        IndexWatcher::new(root.clone(), data.entries, source, IndexStore::new(&out.root));
    assert_eq!(watcher.register_directory(&root).unwrap(), 1);
    let token = watcher.token_for(&root).unwrap();
    let stop = watcher.stop_handle();

    let running = thread::spawn(move || {
        let outcome = watcher.start();
        (outcome, watcher)
    });

    tree.write("new.txt", "fresh");
    feeder.push(token, vec![Notification::new(NotificationKind::Create, "new.txt")]);
    tree.write("existing.txt", "updated");
    feeder.push(token, vec![Notification::new(NotificationKind::Modify, "existing.txt")]);
    fs::remove_file(tree.path("gone.txt")).unwrap();
    feeder.push(token, vec![Notification::new(NotificationKind::Delete, "gone.txt")]);
    stop.stop();

    let (outcome, watcher) = running.join().unwrap();
    assert_eq!(outcome.unwrap(), WatchOutcome::Stopped);
    assert_eq!(watcher.state(), WatcherState::Stopped);

    let on_disk = store::load(&out.root).unwrap();
    assert_eq!(on_disk.root_path, root.to_string_lossy());
    let hash_of = |path: &str| {
        on_disk
            .entries
            .iter()
            .find(|e| e.relative_path == path)
            .map(|e| e.content_hash.clone())
    };
    assert_eq!(hash_of("new.txt"), Some(sha256_hex(b"fresh")));
    assert_eq!(hash_of("existing.txt"), Some(sha256_hex(b"updated")));
    assert_eq!(hash_of("gone.txt"), None);
    assert_eq!(on_disk.entries.len(), 2);
}

/// A new subdirectory is subscribed and changes inside it are indexed
#[test]
fn test_new_subdirectory_is_followed() {
    let tree = TestTree::new();
    let out = TestTree::new();
    let data = scan_into(&tree, &out);

    let root = verify_root(&data, &tree.root).unwrap();
    let mut watcher = IndexWatcher::new(
        root.clone(),
        data.entries,
        MemorySource::new(),
        IndexStore::new(&out.root),
    );
    watcher.register_directory(&root).unwrap();
    let root_token = watcher.token_for(&root).unwrap();

    fs::create_dir_all(tree.path("albums/2024")).unwrap();
    watcher
        .handle_batch(&filebox::watch::NotificationBatch {
            token: root_token,
            events: vec![Notification::new(NotificationKind::Create, "albums")],
        })
        .unwrap();
    assert!(watcher.token_for(&tree.path("albums")).is_some());

    let nested = watcher.token_for(&tree.path("albums/2024")).unwrap();
    tree.write("albums/2024/cover.png", "png");
    watcher
        .handle_batch(&filebox::watch::NotificationBatch {
            token: nested,
            events: vec![Notification::new(NotificationKind::Create, "cover.png")],
        })
        .unwrap();

    let on_disk = store::load(&out.root).unwrap();
    assert_eq!(on_disk.entries.len(), 1);
    assert_eq!(on_disk.entries[0].relative_path, "albums/2024/cover.png");
}

/// A watch on a different tree than the index describes is refused
#[test]
fn test_root_mismatch_refused() {
    let tree = TestTree::new();
    let elsewhere = TestTree::new();
    let out = TestTree::new();
    let data = scan_into(&tree, &out);

    let err = verify_root(&data, &elsewhere.root).unwrap_err();
    assert!(matches!(err, IndexError::RootMismatch { .. }));
    assert_eq!(err.exit_code(), 1);
}

/// Removing the watched root ends the loop on its own
#[test]
fn test_loop_ends_when_tree_disappears() {
    let parent = TestTree::new();
    parent.write("tree/file.txt", "f");
    let root = parent.path("tree");
    let out = TestTree::new();

    let result = Scanner::new(&root).unwrap().scan().unwrap().unwrap();
    let source = MemorySource::new();
    let feeder = source.feeder();
    let mut watcher =
        IndexWatcher::new(root.clone(), result.entries, source, IndexStore::new(&out.root));
    watcher.register_directory(&root).unwrap();
    let token = watcher.token_for(&root).unwrap();

    fs::remove_dir_all(&root).unwrap();
    feeder.push(token, vec![Notification::new(NotificationKind::Delete, "file.txt")]);

    assert_eq!(watcher.start().unwrap(), WatchOutcome::Exhausted);
    // The file's entry was removed by its own delete event.
    assert!(watcher.live_index().is_empty());
}

/// Real filesystem writes reach the index through the notify backend
#[test]
fn test_notify_backend_updates_index() {
    let tree = TestTree::new();
    tree.write("existing.txt", "old");
    let out = TestTree::new();
    let data = scan_into(&tree, &out);

    let root = verify_root(&data, &tree.root).unwrap();
    let mut watcher = IndexWatcher::new(
        root.clone(),
        data.entries,
        NotifySource::new().unwrap(),
        IndexStore::new(&out.root),
    );
    watcher.register_directory(&root).unwrap();
    let stop = watcher.stop_handle();
    let running = thread::spawn(move || watcher.start());

    tree.write("fresh.txt", "fresh");
    let expected = sha256_hex(b"fresh");
    let deadline = Instant::now() + Duration::from_secs(10);
    let indexed = loop {
        let hit = store::load(&out.root)
            .map(|data| {
                data.entries
                    .iter()
                    .any(|e| e.relative_path == "fresh.txt" && e.content_hash == expected)
            })
            .unwrap_or(false);
        if hit || Instant::now() >= deadline {
            break hit;
        }
        thread::sleep(Duration::from_millis(25));
    };
    stop.stop();

    assert_eq!(running.join().unwrap().unwrap(), WatchOutcome::Stopped);
    assert!(indexed, "fresh.txt was not indexed from a real notification");
}

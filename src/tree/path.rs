//! Path canonicalization and normalization utilities

use crate::error::IndexError;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use unicode_normalization::UnicodeNormalization;

/// Canonicalize a path for filesystem access
///
/// The result is absolute, with symlinks, `..` and `.` resolved. The bytes of
/// each component are kept as stored on disk, so the path stays openable even
/// when a name is not in NFC form. Compare paths through
/// [`normalize_path_string`] or [`relative_key`].
pub fn canonicalize_path(path: &Path) -> Result<PathBuf, IndexError> {
    // Use dunce for cross-platform canonicalization
    dunce::canonicalize(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => IndexError::PathNotFound(path.to_path_buf()),
        _ => IndexError::io(format!("canonicalizing {}", path.display()), e),
    })
}

/// Normalize a path string (without filesystem access)
///
/// NFC form with trailing separators removed (except root). Used when comparing
/// a stored root path against a freshly canonicalized one.
pub fn normalize_path_string(path: &str) -> String {
    // Normalize Unicode to NFC
    let mut result: String = path.nfc().collect();

    // Remove trailing slashes (except root)
    while result.len() > 1 && (result.ends_with('/') || result.ends_with('\\')) {
        result.pop();
    }

    result
}

/// Identity key of `path` inside the tree rooted at `root`
///
/// The key is `path` relativized against `root`, with `.` components dropped,
/// joined by `/` and NFC-normalized. Returns `None` if `path` lies outside
/// `root`, is `root` itself, or climbs out through `..`.
pub fn relative_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(name) => parts.push(name.to_string_lossy().nfc().collect()),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

//! Text index format
//!
//! ```text
//! # FileBox Index v1.0
//! # rootDir: /abs/root
//! # generatedAt: 2024-01-01T00:00:00.000Z
//! # fields=relativePath<TAB>size<TAB>mtimeMillis<TAB>sha256
//!
//! a/b.txt<TAB>12<TAB>1700000000000<TAB>9f86d0...
//! ======================
//! # Summary: files=1, totalBytes=12 durationMillis=0 ms
//! ```
//!
//! Parsing skips blank lines and lines starting with `#` or `=`. Every other
//! line must hold exactly four tab-separated fields.

use crate::error::IndexError;
use crate::tree::hasher::is_digest_hex;
use crate::tree::path::canonicalize_path;
use crate::types::{FileEntry, IndexData, ScanSummary};
use chrono::{SecondsFormat, Utc};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const DEFAULT_INDEX_FILE_NAME: &str = "index.txt";

const FORMAT_HEADER: &str = "# FileBox Index v1.0";
const ROOT_DIR_PREFIX: &str = "# rootDir:";
const GENERATED_AT_PREFIX: &str = "# generatedAt:";
const FIELDS_HEADER: &str = "# fields=relativePath\tsize\tmtimeMillis\tsha256";
const SEPARATOR: &str = "======================";

/// Resolve where an index lives for a configured output path.
///
/// An existing directory, a path ending in a separator, or a final component
/// without an extension all mean "the directory that holds `index.txt`".
pub fn resolve_target(output: &Path) -> PathBuf {
    let raw = output.to_string_lossy();
    let names_directory = output.is_dir()
        || raw.ends_with('/')
        || raw.ends_with(std::path::MAIN_SEPARATOR)
        || output.extension().is_none();
    if names_directory {
        output.join(DEFAULT_INDEX_FILE_NAME)
    } else {
        output.to_path_buf()
    }
}

fn canonical_form(target: &Path) -> Option<PathBuf> {
    let name = target.file_name()?;
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    canonicalize_path(parent).ok().map(|dir| dir.join(name))
}

/// Writer for one index file location.
#[derive(Debug, Clone)]
pub struct IndexStore {
    target: PathBuf,
    // Target with its directory canonicalized, when that directory existed at
    // construction. Matches paths reported under a canonical root.
    canonical_target: Option<PathBuf>,
}

impl IndexStore {
    /// Create a store for `output`, resolved with [`resolve_target`].
    pub fn new(output: &Path) -> Self {
        let target = resolve_target(output);
        let canonical_target = canonical_form(&target);
        Self {
            target,
            canonical_target,
        }
    }

    /// The file this store writes.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Prefix of the temporary files `save` writes next to the target.
    fn temp_prefix(&self) -> String {
        let name = self
            .target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| DEFAULT_INDEX_FILE_NAME.to_string());
        format!(".{}.", name)
    }

    /// Whether `path` is this store's target or one of its temporary files.
    ///
    /// `path` is compared with the target as given and with its canonical
    /// form, so notifications under a canonical root match either way.
    pub fn owns_path(&self, path: &Path) -> bool {
        let prefix = self.temp_prefix();
        std::iter::once(&self.target)
            .chain(self.canonical_target.iter())
            .any(|target| {
                if path == target {
                    return true;
                }
                path.parent() == target.parent()
                    && path
                        .file_name()
                        .map(|n| n.to_string_lossy().starts_with(&prefix))
                        .unwrap_or(false)
            })
    }

    /// Target path comparable with paths found by walking a canonical root.
    pub fn canonical_target(&self) -> &Path {
        self.canonical_target.as_deref().unwrap_or(&self.target)
    }

    /// Write the full index, replacing any previous content.
    ///
    /// The file is written to a temporary sibling and renamed into place, so a
    /// concurrent reader sees either the old or the new snapshot. Parent
    /// directories are created as needed.
    pub fn save<'a, I>(&self, summary: &ScanSummary, entries: I) -> Result<PathBuf, IndexError>
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        let parent = match self.target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent)
            .map_err(|e| IndexError::io(format!("creating {}", parent.display()), e))?;

        let temp = tempfile::Builder::new()
            .prefix(&self.temp_prefix())
            .tempfile_in(&parent)
            .map_err(|e| IndexError::io(format!("creating temporary file in {}", parent.display()), e))?;

        {
            let mut writer = BufWriter::new(temp.as_file());
            write_index(&mut writer, summary, entries)
                .and_then(|_| writer.flush())
                .map_err(|e| IndexError::io(format!("writing {}", self.target.display()), e))?;
        }

        temp.persist(&self.target).map_err(|e| {
            IndexError::io(format!("replacing {}", self.target.display()), e.error)
        })?;

        debug!(
            path = %self.target.display(),
            files = summary.total_files,
            "Index saved"
        );
        Ok(self.target.clone())
    }
}

fn write_index<'a, W, I>(out: &mut W, summary: &ScanSummary, entries: I) -> std::io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a FileEntry>,
{
    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);

    writeln!(out, "{}", FORMAT_HEADER)?;
    writeln!(out, "{} {}", ROOT_DIR_PREFIX, summary.root_path)?;
    writeln!(out, "{} {}", GENERATED_AT_PREFIX, generated_at)?;
    writeln!(out, "{}", FIELDS_HEADER)?;
    writeln!(out)?;

    for entry in entries {
        if !is_representable(&entry.relative_path) {
            warn!(path = ?entry.relative_path, "Path cannot be stored in the index, skipping");
            continue;
        }
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            entry.relative_path, entry.size, entry.modified_time_millis, entry.content_hash
        )?;
    }

    writeln!(out, "{}", SEPARATOR)?;
    writeln!(
        out,
        "# Summary: files={}, totalBytes={} durationMillis={} ms",
        summary.total_files, summary.total_bytes, summary.duration_millis
    )
}

/// Tabs and line breaks would corrupt the line format, and a leading `#` or
/// `=` would read back as a comment.
fn is_representable(relative_path: &str) -> bool {
    !relative_path.contains(['\t', '\n', '\r'])
        && !relative_path.starts_with(['#', '='])
}

/// Load the index at `path` (resolved with [`resolve_target`]).
pub fn load(path: &Path) -> Result<IndexData, IndexError> {
    let target = resolve_target(path);
    let content = fs::read_to_string(&target).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => IndexError::PathNotFound(target.clone()),
        std::io::ErrorKind::InvalidData => {
            IndexError::serialization(None, format!("{} is not valid UTF-8", target.display()))
        }
        _ => IndexError::io(format!("reading {}", target.display()), e),
    })?;
    parse(&content)
}

/// Parse index text.
///
/// Entries keep file order; duplicate paths are preserved as-is.
pub fn parse(content: &str) -> Result<IndexData, IndexError> {
    let mut root_path: Option<String> = None;
    let mut generated_at = None;
    let mut entries = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        // Header lines are only recognized before the first entry.
        let in_header = entries.is_empty();

        if let Some(rest) = line.strip_prefix(ROOT_DIR_PREFIX).filter(|_| in_header) {
            if root_path.is_some() {
                return Err(IndexError::serialization(
                    Some(line_no),
                    "duplicate `# rootDir:` header",
                ));
            }
            // Only the separator space is stripped; root names may end in whitespace.
            root_path = Some(rest.strip_prefix(' ').unwrap_or(rest).to_string());
            continue;
        }
        if let Some(rest) = line.strip_prefix(GENERATED_AT_PREFIX).filter(|_| in_header) {
            generated_at = Some(rest.trim().to_string());
            continue;
        }
        if line.trim().is_empty() || line.starts_with('#') || line.starts_with('=') {
            continue;
        }

        entries.push(parse_entry(line, line_no)?);
    }

    let root_path = root_path
        .filter(|root| !root.is_empty())
        .ok_or_else(|| IndexError::serialization(None, "missing `# rootDir:` header"))?;

    Ok(IndexData {
        root_path,
        entries,
        generated_at,
    })
}

fn parse_entry(line: &str, line_no: usize) -> Result<FileEntry, IndexError> {
    let fields: Vec<&str> = line.split('\t').collect();
    let [path, size, mtime, hash] = fields.as_slice() else {
        return Err(IndexError::serialization(
            Some(line_no),
            format!("expected 4 tab-separated fields, found {}", fields.len()),
        ));
    };

    if path.is_empty() {
        return Err(IndexError::serialization(Some(line_no), "empty relative path"));
    }
    let size = size.parse::<u64>().map_err(|e| {
        IndexError::serialization(Some(line_no), format!("invalid size {:?}: {}", size, e))
    })?;
    let modified_time_millis = mtime.parse::<u64>().map_err(|e| {
        IndexError::serialization(Some(line_no), format!("invalid mtime {:?}: {}", mtime, e))
    })?;
    if !is_digest_hex(hash) {
        return Err(IndexError::serialization(
            Some(line_no),
            format!("invalid sha256 {:?}", hash),
        ));
    }

    Ok(FileEntry {
        relative_path: path.to_string(),
        size,
        modified_time_millis,
        content_hash: hash.to_ascii_lowercase(),
    })
}

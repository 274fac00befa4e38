//! Content hashing using SHA-256

use crate::error::IndexError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read buffer size; files are never loaded whole into memory.
const CHUNK_SIZE: usize = 64 * 1024;

/// Hash every byte of `reader`, returning the lowercase hex digest.
///
/// A read error aborts hashing; no partial digest is ever returned.
pub fn hash_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Hash the content of the file at `path`.
pub fn hash_file(path: &Path) -> Result<String, IndexError> {
    let file = File::open(path)
        .map_err(|e| IndexError::io(format!("opening {}", path.display()), e))?;
    hash_reader(file).map_err(|e| IndexError::io(format!("hashing {}", path.display()), e))
}

/// Hash in-memory content.
pub fn hash_bytes(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

/// Whether `value` looks like a hex-encoded 32-byte digest.
pub fn is_digest_hex(value: &str) -> bool {
    value.len() == crate::types::DIGEST_LEN * 2 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

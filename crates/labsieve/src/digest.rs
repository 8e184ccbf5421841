//! Content hashing: record ids, file digests and directory fingerprints.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use crate::error::{Result, SieveError};

const READ_CHUNK: usize = 8192;

/// SHA-256 of a text's UTF-8 bytes, lowercase hex.
///
/// This is the content id of a record.
///
/// ```
/// assert_eq!(
///     labsieve::digest::sha256_text(""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn sha256_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// SHA-256 of a file's exact bytes, streamed in fixed-size chunks.
pub fn sha256_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SieveError::io(path, e))?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buf = [0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut buf).map_err(|e| SieveError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Cheap fingerprint of a directory tree.
///
/// Hashes, in sorted order of relative path, each regular file's relative path
/// (`/`-separated) immediately followed by its decimal byte size. File contents
/// are never read, so a same-size in-place edit is not detected.
pub fn dir_fingerprint(dir: impl AsRef<Path>) -> Result<String> {
    let dir = dir.as_ref();
    let mut files: Vec<(String, u64)> = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let size = entry.metadata()?.len();
        let relative = entry.path().strip_prefix(dir).unwrap_or(entry.path());
        files.push((relative_key(relative), size));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = Sha256::new();
    for (path, size) in &files {
        hasher.update(path.as_bytes());
        hasher.update(size.to_string().as_bytes());
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Platform-independent form of a relative path.
fn relative_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

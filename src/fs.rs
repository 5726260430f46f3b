//! File system helpers: atomic writes and content hashing

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::BinderyResult;

/// Write content to a file atomically.
///
/// Writes into a temporary file in the destination directory and renames it
/// over the target, so readers never observe a half-written file.
pub fn write_atomic(path: &Path, content: &[u8]) -> BinderyResult<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    std::io::Write::write_all(&mut tmp, content)?;
    tmp.persist(path)
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(())
}

/// SHA-256 hash of content, `sha256:`-prefixed hex
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{:x}", hasher.finalize())
}

/// File size in kilobytes, 0.0 when the file cannot be inspected
pub fn size_kb(path: &Path) -> f64 {
    std::fs::metadata(path)
        .map(|m| m.len() as f64 / 1024.0)
        .unwrap_or(0.0)
}

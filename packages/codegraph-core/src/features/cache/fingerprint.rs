//! Content fingerprinting (§4.4 step 1, §4.3 key scheme).
//!
//! Two hashes are kept deliberately distinct: `metadata_hash` is a cheap
//! mtime+size check usable before reading file bytes, `content_hash` is the
//! canonical blake3 digest used as the cache key and for invariant 3
//! (unchanged content after `remove_file`+`parse_file` reproduces the same
//! node/edge ids).

use std::fs;
use std::path::Path;

use crate::shared::models::{CodegraphError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub content_hash: String,
    pub metadata_hash: String,
    pub byte_len: u64,
}

impl Fingerprint {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let content_hash = blake3::hash(bytes).to_hex().to_string();
        Self {
            content_hash,
            metadata_hash: String::new(),
            byte_len: bytes.len() as u64,
        }
    }

    /// Full content hash: reads and hashes the file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = fs::read(path.as_ref()).map_err(|e| {
            CodegraphError::source_unreadable(format!("failed to read file: {e}"))
                .with_file(path.as_ref().to_string_lossy().to_string())
        })?;
        Ok(Self::from_bytes(&bytes))
    }

    /// Fast-path hash from mtime+size only, without reading file contents.
    /// Useful to short-circuit a reparse when metadata is unchanged; callers
    /// still fall back to `from_file` before trusting a cache hit, since two
    /// edits within the same mtime granularity can share a metadata hash.
    pub fn metadata_hash_for(path: impl AsRef<Path>) -> Result<String> {
        let meta = fs::metadata(path.as_ref()).map_err(|e| {
            CodegraphError::source_unreadable(format!("failed to stat file: {e}"))
                .with_file(path.as_ref().to_string_lossy().to_string())
        })?;
        let mtime = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let digest = blake3::hash(format!("{}:{}", meta.len(), mtime).as_bytes());
        Ok(digest.to_hex().to_string())
    }

    pub fn from_file_with_metadata(path: impl AsRef<Path>) -> Result<Self> {
        let metadata_hash = Self::metadata_hash_for(path.as_ref())?;
        let mut fp = Self::from_file(path)?;
        fp.metadata_hash = metadata_hash;
        Ok(fp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;
    use std::io::Write;

    #[test]
    fn same_content_same_hash() {
        let a = Fingerprint::from_bytes(b"hello world");
        let b = Fingerprint::from_bytes(b"hello world");
        assert_eq!(a.content_hash, b.content_hash);
    }

    #[test]
    fn different_content_different_hash() {
        let a = Fingerprint::from_bytes(b"hello");
        let b = Fingerprint::from_bytes(b"world");
        assert_ne!(a.content_hash, b.content_hash);
    }

    #[test]
    fn from_file_reads_and_hashes() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"fn main() {}").unwrap();
        let fp = Fingerprint::from_file(file.path()).unwrap();
        assert_eq!(fp.byte_len, 12);
    }
}

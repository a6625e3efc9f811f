//! Cache key scheme (§4.3) and the cacheable value envelope.

use std::time::Duration;

/// Hierarchical, colon-delimited keys, always namespaced. Building these
/// through one module keeps the prefix scheme in a single place so
/// `invalidate_file`/`invalidate_prefix` stay correct as new key shapes are
/// added.
pub struct CacheKey;

impl CacheKey {
    pub fn file_nodes(file_path: &str, content_hash: &str) -> String {
        format!("file:nodes:{file_path}:{content_hash}")
    }

    pub fn file_rels(file_path: &str, content_hash: &str) -> String {
        format!("file:rels:{file_path}:{content_hash}")
    }

    pub fn lang_ext(extension: &str) -> String {
        format!("lang:ext:{extension}")
    }

    pub fn lang_name(tag: &str) -> String {
        format!("lang:name:{tag}")
    }

    pub fn query(op: &str, arg_hash: &str) -> String {
        format!("query:{op}:{arg_hash}")
    }

    /// Prefix matching every key scoped to `file_path`, used by
    /// `invalidate_file`.
    pub fn file_prefix(file_path: &str) -> String {
        format!(":{file_path}:")
    }
}

/// A cached value plus the TTL it was written with, so L1 can honor per-entry
/// expiry independent of L2's own expiry mechanism.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub bytes: Vec<u8>,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(bytes: Vec<u8>, ttl: Duration) -> Self {
        Self { bytes, ttl }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_scoped_keys_share_a_matchable_prefix() {
        let k1 = CacheKey::file_nodes("src/a.py", "abc123");
        let k2 = CacheKey::file_rels("src/a.py", "abc123");
        let prefix = CacheKey::file_prefix("src/a.py");
        assert!(k1.contains(&prefix));
        assert!(k2.contains(&prefix));
    }
}

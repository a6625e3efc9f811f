//! L1 — in-process cache tier (§4.3).
//!
//! Bounded by entry count with per-entry TTL expiry via a moka `Expiry`
//! policy (each entry carries its own requested TTL rather than sharing one
//! global value), and moka's size-weighted eviction approximates the LRU
//! behavior §4.3 asks for. moka shards internally so concurrent readers and
//! writers don't contend on one lock (§5 "L1 uses sharded locks").

use std::time::{Duration, Instant};

use moka::{sync::Cache, Expiry};

use super::types::CacheEntry;

struct PerEntryTtl;

impl Expiry<String, CacheEntry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct L1Cache {
    cache: Cache<String, CacheEntry>,
}

impl L1Cache {
    pub fn new(max_entries: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_entries)
                .expire_after(PerEntryTtl)
                .build(),
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.cache.get(key).map(|entry| entry.bytes)
    }

    pub fn set(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.cache.insert(key, CacheEntry::new(value, ttl));
    }

    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
    }

    /// Remove every key containing the file-scoped pattern `:{file_path}:`
    /// (§4.3 `invalidate_file`).
    pub fn invalidate_prefix(&self, prefix: &str) {
        let keys: Vec<String> = self
            .cache
            .iter()
            .filter(|(k, _)| k.contains(prefix))
            .map(|(k, _)| k.as_ref().clone())
            .collect();
        for key in keys {
            self.cache.invalidate(&key);
        }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips() {
        let cache = L1Cache::new(100);
        cache.set("k1".to_string(), b"v1".to_vec(), Duration::from_secs(60));
        assert_eq!(cache.get("k1"), Some(b"v1".to_vec()));
    }

    #[test]
    fn invalidate_prefix_removes_matching_keys_only() {
        let cache = L1Cache::new(100);
        cache.set(
            "file:nodes:a.py:hash1".to_string(),
            b"v".to_vec(),
            Duration::from_secs(60),
        );
        cache.set(
            "file:nodes:b.py:hash2".to_string(),
            b"v".to_vec(),
            Duration::from_secs(60),
        );
        cache.invalidate_prefix(":a.py:");
        cache.cache.run_pending_tasks();
        assert_eq!(cache.get("file:nodes:a.py:hash1"), None);
        assert_eq!(cache.get("file:nodes:b.py:hash2"), Some(b"v".to_vec()));
    }
}

//! L2 — the external key/value store port (§4.3, §6).
//!
//! §6 deliberately leaves the backend product-agnostic ("any backend
//! satisfying these operations is acceptable"). This port is the async
//! trait the tiered cache programs against; `codegraph-storage`'s SQLite
//! adapter implements it standing in for a real network KV store, the same
//! way the teacher's `ChunkStore` trait let the lexical search feature swap
//! backends without touching call sites.

use std::time::Duration;

use async_trait::async_trait;

use crate::shared::models::Result;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<()>;
    /// Remove every key containing `fragment` — used for `invalidate_file`
    /// and `invalidate_prefix`.
    async fn delete_matching(&self, fragment: &str) -> Result<u64>;
}

/// An in-memory `KvStore` used in tests and as the degraded-mode fallback
/// target is never this — degraded mode means skipping L2 entirely (§4.3
/// "Failure"). This exists purely to exercise the tiered cache without a
/// real backend.
#[derive(Default)]
pub struct InMemoryKvStore {
    inner: parking_lot::Mutex<ahash::AHashMap<String, Vec<u8>>>,
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) -> Result<()> {
        self.inner.lock().insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.lock().remove(key);
        Ok(())
    }

    async fn delete_matching(&self, fragment: &str) -> Result<u64> {
        let mut guard = self.inner.lock();
        let matching: Vec<String> = guard
            .keys()
            .filter(|k| k.contains(fragment))
            .cloned()
            .collect();
        let count = matching.len() as u64;
        for key in matching {
            guard.remove(&key);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_store_round_trips() {
        let store = InMemoryKvStore::default();
        store.set("k1", b"v1".to_vec(), Duration::from_secs(1)).await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some(b"v1".to_vec()));
        store.delete("k1").await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_matching_removes_by_fragment() {
        let store = InMemoryKvStore::default();
        store.set("file:nodes:a.py:h1", b"v".to_vec(), Duration::from_secs(1)).await.unwrap();
        store.set("file:nodes:b.py:h2", b"v".to_vec(), Duration::from_secs(1)).await.unwrap();
        let removed = store.delete_matching(":a.py:").await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("file:nodes:b.py:h2").await.unwrap().is_some());
    }
}

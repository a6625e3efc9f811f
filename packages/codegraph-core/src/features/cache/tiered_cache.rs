//! C3 — Cache Layer coordinator.
//!
//! Composes L1 (in-process) and L2 (external KV, §4.3) behind one API.
//! `invalidate_file` is the only operation guaranteed to remove a key from
//! both tiers before returning; `set` otherwise writes L2 fire-and-forget so
//! the caller never blocks on network I/O (§4.3 "Failure").

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use super::kv_store::KvStore;
use super::l1_cache::L1Cache;
use super::metrics::CacheMetrics;
use super::types::CacheKey;
use crate::shared::models::Result;

/// How often a repeated L2-unreachable warning is allowed to log, so a
/// sustained outage doesn't spam (§7 "Logged at WARN once per degradation
/// window").
const DEGRADATION_LOG_WINDOW_SECS: u64 = 60;

pub struct TieredCache {
    l1: L1Cache,
    l2: Option<Arc<dyn KvStore>>,
    l2_timeout: Duration,
    metrics: CacheMetrics,
    degraded: AtomicBool,
    last_degradation_log_epoch_secs: AtomicU64,
}

impl TieredCache {
    pub fn new(
        l1_max_entries: u64,
        l2: Option<Arc<dyn KvStore>>,
        l2_timeout: Duration,
        registry: &prometheus::Registry,
    ) -> Self {
        Self {
            l1: L1Cache::new(l1_max_entries),
            l2,
            l2_timeout,
            metrics: CacheMetrics::new(registry),
            degraded: AtomicBool::new(false),
            last_degradation_log_epoch_secs: AtomicU64::new(0),
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    /// L1-only, synchronous read, for callers that can't await an L2 round
    /// trip (the bulk/rayon parse path, which shares this same instance
    /// with whatever incremental `get`/`set` calls the async path makes, so
    /// the two never diverge on what's cached).
    pub fn get_l1_only(&self, key: &str) -> Option<Vec<u8>> {
        self.l1.get(key)
    }

    /// L1-only, synchronous write. See `get_l1_only`.
    pub fn set_l1_only(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.l1.set(key, value, ttl);
    }

    fn note_l2_unreachable(&self) {
        self.degraded.store(true, Ordering::Relaxed);
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let last = self.last_degradation_log_epoch_secs.load(Ordering::Relaxed);
        if now.saturating_sub(last) >= DEGRADATION_LOG_WINDOW_SECS {
            self.last_degradation_log_epoch_secs.store(now, Ordering::Relaxed);
            warn!("cache-degraded: L2 unreachable, continuing on L1 only");
        }
    }

    /// Checks L1, then L2; on an L2 hit, populates L1 with `ttl`.
    pub async fn get(&self, key: &str, ttl_on_l2_hit: Duration) -> Option<Vec<u8>> {
        if let Some(value) = self.l1.get(key) {
            self.metrics.record_hit("l1");
            return Some(value);
        }
        self.metrics.record_miss("l1");

        let Some(l2) = &self.l2 else {
            return None;
        };

        match tokio::time::timeout(self.l2_timeout, l2.get(key)).await {
            Ok(Ok(Some(value))) => {
                self.metrics.record_hit("l2");
                self.degraded.store(false, Ordering::Relaxed);
                self.l1.set(key.to_string(), value.clone(), ttl_on_l2_hit);
                Some(value)
            }
            Ok(Ok(None)) => {
                self.metrics.record_miss("l2");
                self.degraded.store(false, Ordering::Relaxed);
                None
            }
            Ok(Err(_)) | Err(_) => {
                self.note_l2_unreachable();
                None
            }
        }
    }

    /// Writes both tiers; the L2 write is fire-and-forget with one retry and
    /// never blocks the caller on its outcome.
    pub fn set(&self, key: String, value: Vec<u8>, ttl: Duration) {
        self.l1.set(key.clone(), value.clone(), ttl);

        if let Some(l2) = self.l2.clone() {
            let timeout = self.l2_timeout;
            tokio::spawn(async move {
                for attempt in 0..2 {
                    match tokio::time::timeout(timeout, l2.set(&key, value.clone(), ttl)).await {
                        Ok(Ok(())) => return,
                        _ if attempt == 0 => continue,
                        _ => {
                            warn!(key = %key, "cache-degraded: L2 write failed after retry, dropped");
                        }
                    }
                }
            });
        }
    }

    /// Removes every key prefixed with `file:*:<file_path>:*` from both
    /// tiers before returning (§4.3's one cross-tier guarantee).
    pub async fn invalidate_file(&self, file_path: &str) -> Result<()> {
        let prefix = CacheKey::file_prefix(file_path);
        self.l1.invalidate_prefix(&prefix);

        if let Some(l2) = &self.l2 {
            match tokio::time::timeout(self.l2_timeout, l2.delete_matching(&prefix)).await {
                Ok(Ok(_)) => {}
                Ok(Err(e)) => return Err(e),
                Err(_) => self.note_l2_unreachable(),
            }
        }
        Ok(())
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::kv_store::InMemoryKvStore;

    fn cache_with_l2() -> TieredCache {
        let registry = prometheus::Registry::new();
        TieredCache::new(
            1000,
            Some(Arc::new(InMemoryKvStore::default())),
            Duration::from_millis(250),
            &registry,
        )
    }

    #[tokio::test]
    async fn l2_hit_populates_l1() {
        let cache = cache_with_l2();
        cache.set("k1".to_string(), b"v1".to_vec(), Duration::from_secs(60));
        // force an L1 miss to exercise the L2 path
        cache.l1.invalidate("k1");
        let value = cache.get("k1", Duration::from_secs(60)).await;
        assert_eq!(value, Some(b"v1".to_vec()));
        assert_eq!(cache.l1.get("k1"), Some(b"v1".to_vec()));
    }

    #[tokio::test]
    async fn invalidate_file_clears_both_tiers() {
        let cache = cache_with_l2();
        cache.set(
            CacheKey::file_nodes("a.py", "h1"),
            b"v".to_vec(),
            Duration::from_secs(60),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate_file("a.py").await.unwrap();
        assert_eq!(cache.l1.get(&CacheKey::file_nodes("a.py", "h1")), None);
    }

    #[tokio::test]
    async fn l1_only_cache_never_touches_l2() {
        let registry = prometheus::Registry::new();
        let cache = TieredCache::new(1000, None, Duration::from_millis(250), &registry);
        cache.set("k1".to_string(), b"v1".to_vec(), Duration::from_secs(60));
        assert_eq!(cache.get("k1", Duration::from_secs(60)).await, Some(b"v1".to_vec()));
        assert!(!cache.is_degraded());
    }
}

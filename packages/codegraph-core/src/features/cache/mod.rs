//! C3 — Cache Layer (§4.3).
//!
//! Two tiers behind one [`TieredCache`] coordinator: L1 is in-process
//! (`moka`, per-entry TTL), L2 is an external [`KvStore`] implementation.
//! `codec` owns the explicit enum-to-string wire format that crosses the L2
//! boundary; `fingerprint` derives the content hashes the key scheme is
//! keyed on.

pub mod codec;
pub mod fingerprint;
pub mod kv_store;
pub mod l1_cache;
pub mod metrics;
pub mod tiered_cache;
pub mod types;

pub use fingerprint::Fingerprint;
pub use kv_store::{InMemoryKvStore, KvStore};
pub use l1_cache::L1Cache;
pub use metrics::CacheMetrics;
pub use tiered_cache::TieredCache;
pub use types::{CacheEntry, CacheKey};

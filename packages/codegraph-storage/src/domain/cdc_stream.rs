//! Durable stream port backing C7's CDC Manager (§4.7, §6).
//!
//! §6 leaves the backend product-agnostic: "a stream data structure with
//! `append(stream, fields)` / `read(stream, since_id)`... any backend
//! satisfying these operations is acceptable." This trait is that contract;
//! `infrastructure::sqlite::SqliteEventStore` is the adapter standing in for
//! a real durable log the way `codegraph_core`'s `KvStore` port stands in
//! for a real network KV store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;

/// One durable record. `id` is the stream-local, strictly increasing
/// sequence number `read`'s `since_id` cursor is measured against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEvent {
    pub id: u64,
    pub stream: String,
    pub kind: String,
    pub payload: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
pub trait DurableStream: Send + Sync {
    /// Appends one record to `stream` and returns its assigned id.
    /// At-least-once: a caller that times out waiting for this must assume
    /// the write may have landed and should not blindly retry with the same
    /// record twice if exactly-once matters downstream (§4.7 durable-stream
    /// semantics only promise at-least-once, never exactly-once).
    async fn append(&self, stream: &str, kind: &str, payload: serde_json::Value) -> Result<u64>;

    /// Every record in `stream` with `id > since_id`, oldest first, capped
    /// at `limit`.
    async fn read(&self, stream: &str, since_id: u64, limit: usize) -> Result<Vec<StoredEvent>>;
}

//! SQLite-backed `KvStore` (C3's L2 tier, §4.3/§6).
//!
//! §6 calls for "a key/value store supporting binary values, TTL expiry"
//! without mandating a product. `codegraph_core::TieredCache` programs
//! against the `KvStore` trait alone, so this adapter is swappable for a
//! real network store without touching the cache layer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use codegraph_core::features::cache::KvStore;
use codegraph_core::{CodegraphError, Result};
use parking_lot::Mutex;
use rusqlite::{params, Connection};

pub struct SqliteKvStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteKvStore {
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(CodegraphError::from)?;
        Self::from_connection(conn)
    }

    pub fn open(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(CodegraphError::from)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv_store (
                key TEXT PRIMARY KEY,
                value BLOB NOT NULL,
                expires_at_ms INTEGER NOT NULL
            )",
            [],
        )
        .map_err(CodegraphError::from)?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[async_trait]
impl KvStore for SqliteKvStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let conn = self.conn.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            let row: Option<(Vec<u8>, i64)> = conn
                .query_row(
                    "SELECT value, expires_at_ms FROM kv_store WHERE key = ?1",
                    params![key],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .ok();
            match row {
                Some((value, expires_at_ms)) if expires_at_ms > Self::now_ms() => Ok(Some(value)),
                Some(_) => {
                    conn.execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                        .map_err(CodegraphError::from)?;
                    Ok(None)
                }
                None => Ok(None),
            }
        })
        .await
        .map_err(|e| CodegraphError::internal(format!("sqlite kv task panicked: {e}")))?
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) -> Result<()> {
        let conn = self.conn.clone();
        let key = key.to_string();
        let expires_at_ms = Self::now_ms() + ttl.as_millis() as i64;
        tokio::task::spawn_blocking(move || {
            conn.lock()
                .execute(
                    "INSERT INTO kv_store (key, value, expires_at_ms) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at_ms = excluded.expires_at_ms",
                    params![key, value, expires_at_ms],
                )
                .map_err(CodegraphError::from)?;
            Ok(())
        })
        .await
        .map_err(|e| CodegraphError::internal(format!("sqlite kv task panicked: {e}")))?
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let conn = self.conn.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || {
            conn.lock()
                .execute("DELETE FROM kv_store WHERE key = ?1", params![key])
                .map_err(CodegraphError::from)?;
            Ok(())
        })
        .await
        .map_err(|e| CodegraphError::internal(format!("sqlite kv task panicked: {e}")))?
    }

    async fn delete_matching(&self, fragment: &str) -> Result<u64> {
        let conn = self.conn.clone();
        let pattern = format!("%{fragment}%");
        tokio::task::spawn_blocking(move || {
            let changed = conn
                .lock()
                .execute("DELETE FROM kv_store WHERE key LIKE ?1", params![pattern])
                .map_err(CodegraphError::from)?;
            Ok(changed as u64)
        })
        .await
        .map_err(|e| CodegraphError::internal(format!("sqlite kv task panicked: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_value() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("k1", b"v1".to_vec(), Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("k1").await.unwrap(), Some(b"v1".to_vec()));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("k1", b"v1".to_vec(), Duration::from_millis(1)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.get("k1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn delete_matching_removes_by_fragment() {
        let store = SqliteKvStore::open_in_memory().unwrap();
        store.set("file:nodes:a.py:h1", b"v".to_vec(), Duration::from_secs(60)).await.unwrap();
        store.set("file:nodes:b.py:h2", b"v".to_vec(), Duration::from_secs(60)).await.unwrap();
        let removed = store.delete_matching(":a.py:").await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("file:nodes:b.py:h2").await.unwrap().is_some());
    }
}

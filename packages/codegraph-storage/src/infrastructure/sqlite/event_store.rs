//! SQLite-backed `DurableStream` (C7's durable side, §4.7/§6).
//!
//! One `cdc_events` table, append-only, indexed on `(stream, id)` so
//! `read(stream, since_id)` is a single range scan. `id` is the table's
//! rowid, which SQLite guarantees is strictly increasing for an
//! `INTEGER PRIMARY KEY AUTOINCREMENT` column, giving the monotonic cursor
//! §4.7's ordering guarantee needs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};

use crate::domain::cdc_stream::{DurableStream, StoredEvent};
use crate::Result;

pub struct SqliteEventStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteEventStore {
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    pub fn open(path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS cdc_events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                stream TEXT NOT NULL,
                kind TEXT NOT NULL,
                payload TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_cdc_events_stream_id ON cdc_events (stream, id)",
            [],
        )?;
        Ok(Self { conn: Arc::new(Mutex::new(conn)) })
    }
}

#[async_trait]
impl DurableStream for SqliteEventStore {
    async fn append(&self, stream: &str, kind: &str, payload: serde_json::Value) -> Result<u64> {
        let conn = self.conn.clone();
        let stream = stream.to_string();
        let kind = kind.to_string();
        let payload_text = serde_json::to_string(&payload)?;
        let recorded_at = Utc::now().to_rfc3339();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            conn.execute(
                "INSERT INTO cdc_events (stream, kind, payload, recorded_at) VALUES (?1, ?2, ?3, ?4)",
                params![stream, kind, payload_text, recorded_at],
            )?;
            Ok::<u64, rusqlite::Error>(conn.last_insert_rowid() as u64)
        })
        .await
        .map_err(|e| crate::StorageError::database(format!("sqlite event task panicked: {e}")))?
        .map_err(crate::StorageError::from)
    }

    async fn read(&self, stream: &str, since_id: u64, limit: usize) -> Result<Vec<StoredEvent>> {
        let conn = self.conn.clone();
        let stream = stream.to_string();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock();
            let mut stmt = conn.prepare(
                "SELECT id, stream, kind, payload, recorded_at FROM cdc_events
                 WHERE stream = ?1 AND id > ?2 ORDER BY id ASC LIMIT ?3",
            )?;
            let rows = stmt.query_map(
                params![stream, since_id as i64, limit as i64],
                |row| {
                    let id: i64 = row.get(0)?;
                    let stream: String = row.get(1)?;
                    let kind: String = row.get(2)?;
                    let payload_text: String = row.get(3)?;
                    let recorded_at: String = row.get(4)?;
                    Ok((id, stream, kind, payload_text, recorded_at))
                },
            )?;

            let mut events = Vec::new();
            for row in rows {
                let (id, stream, kind, payload_text, recorded_at) = row?;
                let payload: serde_json::Value = serde_json::from_str(&payload_text)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                let recorded_at: DateTime<Utc> = recorded_at
                    .parse()
                    .map_err(|_| rusqlite::Error::InvalidColumnType(4, "recorded_at".into(), rusqlite::types::Type::Text))?;
                events.push(StoredEvent { id: id as u64, stream, kind, payload, recorded_at });
            }
            Ok::<_, rusqlite::Error>(events)
        })
        .await
        .map_err(|e| crate::StorageError::database(format!("sqlite event task panicked: {e}")))?
        .map_err(crate::StorageError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn append_assigns_increasing_ids() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        let id1 = store.append("graph-events", "node-added", json!({"id": "n1"})).await.unwrap();
        let id2 = store.append("graph-events", "node-added", json!({"id": "n2"})).await.unwrap();
        assert!(id2 > id1);
    }

    #[tokio::test]
    async fn read_since_id_excludes_earlier_records() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        let id1 = store.append("graph-events", "node-added", json!({"id": "n1"})).await.unwrap();
        store.append("graph-events", "node-added", json!({"id": "n2"})).await.unwrap();
        let page = store.read("graph-events", id1, 10).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].payload, json!({"id": "n2"}));
    }

    #[tokio::test]
    async fn streams_are_isolated() {
        let store = SqliteEventStore::open_in_memory().unwrap();
        store.append("graph-events", "node-added", json!({"id": "n1"})).await.unwrap();
        store.append("other-stream", "node-added", json!({"id": "n2"})).await.unwrap();
        let page = store.read("graph-events", 0, 10).await.unwrap();
        assert_eq!(page.len(), 1);
    }
}

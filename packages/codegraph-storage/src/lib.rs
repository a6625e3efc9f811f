//! Storage adapters backing `codegraph-core`'s cache (C3 L2) and
//! `codegraph-realtime`'s durable event stream (C7), both defined as ports
//! in `domain` so the in-process callers never depend on SQLite directly.

pub mod domain;
pub mod error;

#[cfg(feature = "sqlite")]
pub mod infrastructure;

pub use domain::{DurableStream, StoredEvent};
pub use error::{Result, StorageError};

#[cfg(feature = "sqlite")]
pub use infrastructure::{SqliteEventStore, SqliteKvStore};

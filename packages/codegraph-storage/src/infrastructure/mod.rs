//! Infrastructure layer - Storage adapters
//!
//! SQLite adapters for the domain ports: `SqliteKvStore` backs C3's L2 tier,
//! `SqliteEventStore` backs C7's durable event stream.

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteEventStore, SqliteKvStore};

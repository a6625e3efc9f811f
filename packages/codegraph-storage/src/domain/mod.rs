//! Domain layer: the ports `codegraph-storage`'s infrastructure adapters
//! implement.

pub mod cdc_stream;

pub use cdc_stream::{DurableStream, StoredEvent};

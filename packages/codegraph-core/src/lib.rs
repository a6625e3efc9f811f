//! codegraph-core: the language-agnostic code graph engine.
//!
//! Parses source trees across multiple languages into one typed graph
//! (nodes, relationships), keeps a two-tier cache in front of re-parsing,
//! and exposes a paginated query surface over the graph. Real-time and
//! durable change-data-capture fan-out live in `codegraph-realtime`; this
//! crate owns everything upstream of that boundary.

pub mod api;
pub mod config;
pub mod features;
pub mod shared;
pub mod usecases;

pub use config::EngineConfig;
pub use shared::models::{CodegraphError, Result};

//! Feature modules, one per engine component (C1-C9 minus the realtime
//! fan-out, which lives in the `codegraph-realtime` crate).

pub mod cache;
pub mod entry_points;
pub mod graph;
pub mod ignore_matcher;
pub mod language_registry;
pub mod parsing;
pub mod query_engine;

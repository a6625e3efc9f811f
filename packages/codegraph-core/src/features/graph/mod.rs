//! C5 — Universal Graph (§4.5).

pub mod engine;

pub use engine::{
    Classification, EventSink, GraphEngine, GraphStats, NeighborDirection, RemoveFileOutcome,
    TraversalMode, TraversalOutcome,
};

//! codegraph-realtime: fans mutation events out of the graph engine.
//!
//! `cdc` is C7 — the single-writer CDC Manager that durably persists and
//! broadcasts every event `codegraph_core::GraphEngine` emits. `ws` is C8 —
//! the WebSocket Broadcaster that serves C7's real-time channel to
//! connected clients. Neither component exists in the teacher; both are
//! grounded in `canopy-server`/`canopy-watcher`'s channel-and-broadcast
//! plumbing (see each module's doc comment).

pub mod cdc;
pub mod ws;

pub use cdc::{CdcManager, EventFilter, Subscription};
pub use ws::{router, ws_handler, ClientMessage, ServerMessage, WsBroadcasterState};

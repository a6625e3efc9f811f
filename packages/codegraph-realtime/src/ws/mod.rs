//! C8 — WebSocket Broadcaster (§4.8): delivers C7's real-time channel to
//! connected clients, filtered per-client.

pub mod broadcaster;
pub mod protocol;

pub use broadcaster::{router, ws_handler, WsBroadcasterState};
pub use protocol::{ClientMessage, ServerMessage};

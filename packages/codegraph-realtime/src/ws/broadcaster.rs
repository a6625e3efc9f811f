//! C8 — WebSocket Broadcaster (§4.8).
//!
//! Grounded in `canopy-server/src/websocket.rs`: axum's `WebSocketUpgrade`,
//! one task per connection, a single-writer socket. Unlike the teacher
//! (which fans out a pre-serialized `String` and applies no per-client
//! filter), each connection here holds its own `Subscription` from C7 and
//! an `EventFilter` it can update at runtime — so "iterate the active set,
//! apply each client's filter" (§4.8) happens per-connection against the
//! shared broadcast channel rather than via a central registry loop; a
//! send failure ends that connection's task, which is the sweep.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::cdc::{CdcManager, EventFilter};

use super::protocol::{ClientMessage, ServerMessage};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const MAX_MISSED_HEARTBEATS: u32 = 2;

pub struct WsBroadcasterState {
    cdc: Arc<CdcManager>,
    next_client_id: AtomicU64,
    connected: AtomicU64,
}

impl WsBroadcasterState {
    pub fn new(cdc: Arc<CdcManager>) -> Arc<Self> {
        Arc::new(Self { cdc, next_client_id: AtomicU64::new(1), connected: AtomicU64::new(0) })
    }

    /// Number of currently connected clients, exposed for introspection.
    pub fn connected_count(&self) -> u64 {
        self.connected.load(Ordering::Relaxed)
    }
}

/// A router exposing just `/ws` (§6 "the graph query operations... are the
/// API surface" is explicitly out of scope here — only the WebSocket
/// protocol is). An embedding binary merges this with its own routes.
pub fn router(state: Arc<WsBroadcasterState>) -> Router {
    Router::new().route("/ws", get(ws_handler)).with_state(state)
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WsBroadcasterState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<WsBroadcasterState>) {
    let client_id = state.next_client_id.fetch_add(1, Ordering::Relaxed);
    state.connected.fetch_add(1, Ordering::Relaxed);
    info!(client_id, "websocket client connected");

    let (mut sender, mut receiver) = socket.split();
    let mut subscription = state.cdc.subscribe(EventFilter::any());
    let mut filter = EventFilter::any();

    let welcome = ServerMessage::Welcome { client_id: client_id.to_string(), cursor: state.cdc.cursor() };
    if !send_frame(&mut sender, &welcome).await {
        state.connected.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    let mut missed_heartbeats = 0u32;
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await; // first tick fires immediately

    loop {
        tokio::select! {
            event = subscription.next() => {
                match event {
                    Some(event) if filter.matches(&event) => {
                        if !send_frame(&mut sender, &ServerMessage::Event { event }).await {
                            break;
                        }
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(ClientMessage::Ping) => {
                                missed_heartbeats = 0;
                                if !send_frame(&mut sender, &ServerMessage::Pong).await {
                                    break;
                                }
                            }
                            Ok(msg @ ClientMessage::Filter { .. }) => {
                                if let Some(new_filter) = msg.into_filter() {
                                    filter = new_filter;
                                }
                            }
                            Err(e) => {
                                debug!(client_id, error = %e, "unparseable client frame");
                            }
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {
                        missed_heartbeats = 0;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
            _ = heartbeat.tick() => {
                if missed_heartbeats >= MAX_MISSED_HEARTBEATS {
                    warn!(client_id, "websocket client missed heartbeats, disconnecting");
                    break;
                }
                missed_heartbeats += 1;
                if sender.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    state.connected.fetch_sub(1, Ordering::Relaxed);
    info!(client_id, "websocket client disconnected");
}

async fn send_frame(
    sender: &mut futures_util::stream::SplitSink<WebSocket, Message>,
    frame: &ServerMessage,
) -> bool {
    match serde_json::to_string(frame) {
        Ok(text) => sender.send(Message::Text(text)).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "failed to serialize outgoing frame");
            false
        }
    }
}

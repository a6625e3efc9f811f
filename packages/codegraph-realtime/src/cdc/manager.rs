//! C7 — CDC Manager (§4.7): single-writer publisher fed by C5's `EventSink`
//! port.
//!
//! Grounded in `canopy-watcher`'s `mpsc`-channel-fed event loop (a
//! `notify` callback pushes onto an unbounded channel a background task
//! drains) and `canopy-server`'s `broadcast::Sender<String>` client fan-out
//! — here the channel carries `GraphEvent` instead of a pre-serialized
//! string so `replay` and `register_handler` get the structured value, and
//! callers at the WebSocket boundary serialize only once, per client.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use codegraph_core::features::graph::EventSink;
use codegraph_core::shared::models::{EventKind, GraphEvent};
use codegraph_core::{CodegraphError, Result};
use codegraph_storage::DurableStream;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use super::filter::EventFilter;

const DURABLE_QUEUE_CAPACITY: usize = 4096;
const BROADCAST_CAPACITY: usize = 4096;
const DURABLE_WRITE_ATTEMPTS: u32 = 2;
const DURABLE_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
const REPLAY_STREAM_LIMIT: usize = 500;

type Handler = Arc<dyn Fn(&GraphEvent) + Send + Sync>;

struct HandlerEntry {
    kind: EventKind,
    handler: Handler,
}

/// A subscription started by `CdcManager::subscribe`. Sees only events
/// published after the call that created it (§4.7 "new subscribers see
/// only events published after subscription").
pub struct Subscription {
    rx: broadcast::Receiver<GraphEvent>,
    filter: EventFilter,
}

impl Subscription {
    /// Pulls the next event matching this subscription's filter. Returns
    /// `None` once the manager has shut down. A slow subscriber that falls
    /// behind the broadcast channel's buffer silently skips the events it
    /// missed rather than erroring — the real-time channel is at-most-once
    /// by design (§4.7).
    pub async fn next(&mut self) -> Option<GraphEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "cdc subscriber lagged, skipping events");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

pub struct CdcManager {
    dispatch_tx: mpsc::Sender<GraphEvent>,
    durable_tx: mpsc::Sender<GraphEvent>,
    broadcast_tx: broadcast::Sender<GraphEvent>,
    durable: Arc<dyn DurableStream>,
    handlers: parking_lot::RwLock<Vec<HandlerEntry>>,
    last_event_id: std::sync::atomic::AtomicU64,
}

impl CdcManager {
    /// Spawns two background tasks: `run_dispatch_loop` broadcasts and runs
    /// handlers for each event as soon as it's dequeued, and
    /// `run_durable_writer` persists events to `durable` on its own queue so
    /// a slow or retrying durable write never delays the real-time path for
    /// that event or any event behind it (§4.7 "at-most-once real-time,
    /// at-least-once durable" — the two paths don't gate each other).
    /// `durable` partitions by event kind for replay (§4.7).
    pub fn new(durable: Arc<dyn DurableStream>) -> Arc<Self> {
        let (dispatch_tx, dispatch_rx) = mpsc::channel(DURABLE_QUEUE_CAPACITY);
        let (durable_tx, durable_rx) = mpsc::channel(DURABLE_QUEUE_CAPACITY);
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);

        let manager = Arc::new(Self {
            dispatch_tx,
            durable_tx,
            broadcast_tx,
            durable,
            handlers: parking_lot::RwLock::new(Vec::new()),
            last_event_id: std::sync::atomic::AtomicU64::new(0),
        });

        tokio::spawn(Self::run_dispatch_loop(manager.clone(), dispatch_rx));
        tokio::spawn(Self::run_durable_writer(manager.clone(), durable_rx));
        manager
    }

    /// Broadcasts and runs handlers immediately, then forwards the event to
    /// the durable-write queue. Never waits on durable I/O.
    async fn run_dispatch_loop(self: Arc<Self>, mut dispatch_rx: mpsc::Receiver<GraphEvent>) {
        while let Some(event) = dispatch_rx.recv().await {
            self.last_event_id.store(event.id, std::sync::atomic::Ordering::Relaxed);
            let _ = self.broadcast_tx.send(event.clone());
            self.run_handlers(&event);
            if let Err(e) = self.durable_tx.try_send(event) {
                warn!(error = %e, "cdc durable queue full, event dropped from durable stream");
            }
        }
    }

    /// Persists events in the order they were dispatched, one at a time, so
    /// a stream's durable ordering matches publication order even though
    /// this task runs independently of `run_dispatch_loop`.
    async fn run_durable_writer(self: Arc<Self>, mut durable_rx: mpsc::Receiver<GraphEvent>) {
        while let Some(event) = durable_rx.recv().await {
            self.write_durable(&event).await;
        }
    }

    async fn write_durable(&self, event: &GraphEvent) {
        let stream = event.kind.as_str();
        let payload = match serde_json::to_value(event) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "cdc: failed to serialize event, dropped from durable stream");
                return;
            }
        };

        for attempt in 0..DURABLE_WRITE_ATTEMPTS {
            let write = self.durable.append(stream, event.kind.as_str(), payload.clone());
            match tokio::time::timeout(DURABLE_WRITE_TIMEOUT, write).await {
                Ok(Ok(_)) => return,
                Ok(Err(e)) if attempt + 1 < DURABLE_WRITE_ATTEMPTS => {
                    warn!(error = %e, attempt, "cdc: durable write failed, retrying");
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "stream-unavailable: durable write dropped after retry");
                }
                Err(_) if attempt + 1 < DURABLE_WRITE_ATTEMPTS => {
                    warn!(attempt, "cdc: durable write timed out, retrying");
                }
                Err(_) => {
                    warn!("stream-unavailable: durable write timed out, dropped");
                }
            }
        }
    }

    fn run_handlers(&self, event: &GraphEvent) {
        for entry in self.handlers.read().iter() {
            if entry.kind == event.kind {
                (entry.handler)(event);
            }
        }
    }

    /// New subscribers never see events published before this call.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription { rx: self.broadcast_tx.subscribe(), filter }
    }

    /// In-process handler hook used by C8 (§4.7) — invoked synchronously,
    /// after the durable write attempt, on the background writer task.
    pub fn register_handler(&self, kind: EventKind, handler: impl Fn(&GraphEvent) + Send + Sync + 'static) {
        self.handlers.write().push(HandlerEntry { kind, handler: Arc::new(handler) });
    }

    /// Replays every durable record with `id > since_id`, across the
    /// streams named by `filter` (or all four event kinds if unfiltered),
    /// merged oldest-first by the event's own id and capped at `limit`.
    pub async fn replay(&self, since_id: u64, filter: &EventFilter, limit: usize) -> Result<Vec<GraphEvent>> {
        let kinds: HashSet<EventKind> = filter.event_kinds.clone().unwrap_or_else(|| {
            [EventKind::NodeAdded, EventKind::NodeUpdated, EventKind::RelationshipAdded, EventKind::FileRemoved]
                .into_iter()
                .collect()
        });

        let mut events = Vec::new();
        for kind in kinds {
            let records = self
                .durable
                .read(kind.as_str(), since_id, REPLAY_STREAM_LIMIT)
                .await
                .map_err(|e| CodegraphError::stream_unavailable(e.to_string()))?;
            for record in records {
                match serde_json::from_value::<GraphEvent>(record.payload) {
                    Ok(event) if filter.matches(&event) => events.push(event),
                    Ok(_) => {}
                    Err(e) => warn!(error = %e, "cdc: dropped unreadable durable record on replay"),
                }
            }
        }

        events.sort_by_key(|e| e.id);
        events.truncate(limit);
        Ok(events)
    }

    /// The id of the most recently published event, used for a WebSocket
    /// connection's welcome frame (§4.8) so a client knows where to resume
    /// with `replay(since_id, ...)` if it later needs the durable stream.
    pub fn cursor(&self) -> u64 {
        self.last_event_id.load(std::sync::atomic::Ordering::Relaxed)
    }
}

impl EventSink for CdcManager {
    /// Never blocks: called synchronously from under `GraphEngine`'s
    /// writer lock (§5). A full queue means C5 is mutating faster than C7
    /// can dispatch; the event is logged and dropped rather than stalling
    /// the graph (§4.7 "a failure logs and drops rather than blocking C5").
    fn emit(&self, event: GraphEvent) {
        if let Err(e) = self.dispatch_tx.try_send(event) {
            warn!(error = %e, "cdc queue full, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_storage::SqliteEventStore;

    fn manager() -> Arc<CdcManager> {
        let store: Arc<dyn DurableStream> = Arc::new(SqliteEventStore::open_in_memory().unwrap());
        CdcManager::new(store)
    }

    #[tokio::test]
    async fn subscriber_receives_emitted_events() {
        let manager = manager();
        let mut sub = manager.subscribe(EventFilter::any());

        manager.emit(GraphEvent::node_added(0, "n1", serde_json::json!({})));

        let event = sub.next().await.unwrap();
        assert_eq!(event.entity_id.as_deref(), Some("n1"));
    }

    #[tokio::test]
    async fn new_subscriber_does_not_see_past_events() {
        let manager = manager();
        manager.emit(GraphEvent::node_added(0, "n1", serde_json::json!({})));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let mut sub = manager.subscribe(EventFilter::any());
        manager.emit(GraphEvent::node_added(1, "n2", serde_json::json!({})));

        let event = sub.next().await.unwrap();
        assert_eq!(event.entity_id.as_deref(), Some("n2"));
    }

    #[tokio::test]
    async fn replay_reads_back_durable_events() {
        let manager = manager();
        manager.emit(GraphEvent::node_added(0, "n1", serde_json::json!({})));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let events = manager.replay(0, &EventFilter::any(), 50).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].entity_id.as_deref(), Some("n1"));
    }

    #[tokio::test]
    async fn subscriber_with_event_kind_filter_sees_only_matching_kind() {
        let manager = manager();
        let mut kinds = HashSet::new();
        kinds.insert(EventKind::NodeAdded);
        let mut sub = manager.subscribe(EventFilter { event_kinds: Some(kinds), entity_kinds: None });

        manager.emit(GraphEvent::node_added(0, "n1", serde_json::json!({})));
        manager.emit(GraphEvent::relationship_added(1, "e1", serde_json::json!({})));
        // Published after the relationship so a second node-added event would
        // arrive after it on the channel; its absence confirms the
        // relationship event was filtered out rather than merely not yet
        // delivered.
        manager.emit(GraphEvent::node_added(2, "n2", serde_json::json!({})));

        let first = sub.next().await.unwrap();
        assert_eq!(first.entity_id.as_deref(), Some("n1"));
        let second = sub.next().await.unwrap();
        assert_eq!(second.entity_id.as_deref(), Some("n2"));
    }

    #[tokio::test]
    async fn register_handler_runs_for_matching_kind() {
        let manager = manager();
        let seen = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let seen_clone = seen.clone();
        manager.register_handler(EventKind::NodeAdded, move |_event| {
            seen_clone.store(true, std::sync::atomic::Ordering::SeqCst);
        });

        manager.emit(GraphEvent::node_added(0, "n1", serde_json::json!({})));
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert!(seen.load(std::sync::atomic::Ordering::SeqCst));
    }
}

//! Wire format for the WebSocket Broadcaster (§4.8, §6 "WebSocket
//! protocol"/"Event schema"), grounded in `canopy-server`'s tagged
//! `WsMessage` enum but matching the literal control-frame shape §6 gives:
//! `{"action":"filter", "event_types":[…], "entity_types":[…]}`.

use codegraph_core::shared::models::{EventKind, GraphEvent};
use serde::{Deserialize, Serialize};

use crate::cdc::EventFilter;

/// Frames sent from the server to a connected client. `type` is the
/// discriminator §6 requires on every server frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once, immediately on connect (§4.8 "Connect").
    Welcome { client_id: String, cursor: u64 },
    /// `event`'s own fields are §6's "Event schema on the wire"
    /// (`id, kind, entity_id, entity_type, file_path, timestamp, payload`).
    Event { event: GraphEvent },
    Pong,
    Error { message: String },
}

/// Frames a client may send, tagged by `action` exactly as §6 shows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientMessage {
    Filter {
        #[serde(default)]
        event_types: Option<Vec<EventKind>>,
        #[serde(default)]
        entity_types: Option<Vec<String>>,
    },
    Ping,
}

impl ClientMessage {
    /// `None` for `Ping`, which carries no filter update.
    pub fn into_filter(self) -> Option<EventFilter> {
        match self {
            ClientMessage::Filter { event_types, entity_types } => Some(EventFilter {
                event_kinds: event_types.map(|kinds| kinds.into_iter().collect()),
                entity_kinds: entity_types.map(|kinds| kinds.into_iter().collect()),
            }),
            ClientMessage::Ping => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_frame_matches_the_documented_shape() {
        let text = r#"{"action":"filter","event_types":["node-added"],"entity_types":["node"]}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        let filter = msg.into_filter().unwrap();
        assert!(filter.event_kinds.unwrap().contains(&EventKind::NodeAdded));
        assert!(filter.entity_kinds.unwrap().contains("node"));
    }

    #[test]
    fn ping_frame_is_tagged_by_action() {
        let text = serde_json::to_string(&ClientMessage::Ping).unwrap();
        assert_eq!(text, r#"{"action":"ping"}"#);
    }

    #[test]
    fn ping_carries_no_filter_update() {
        assert!(ClientMessage::Ping.into_filter().is_none());
    }
}

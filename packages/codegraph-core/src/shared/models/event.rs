//! Graph mutation events (§4.5, §5, §6 "Event schema")
//!
//! Every structural change to the Universal Graph produces exactly one of
//! these, handed synchronously to the CDC Manager before the mutating call
//! returns (§4.5 "Mutation events").

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    NodeAdded,
    NodeUpdated,
    RelationshipAdded,
    FileRemoved,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::NodeAdded => "node-added",
            EventKind::NodeUpdated => "node-updated",
            EventKind::RelationshipAdded => "relationship-added",
            EventKind::FileRemoved => "file-removed",
        }
    }
}

/// A single record describing one structural change to the graph (GLOSSARY
/// "CDC event"). `entity_id` is a node or edge id for the first three kinds,
/// and the file path for `file-removed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphEvent {
    /// Monotonically increasing within a single publisher (§4.7 Ordering).
    pub id: u64,
    pub kind: EventKind,
    pub entity_id: Option<String>,
    pub entity_type: Option<String>,
    pub file_path: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl GraphEvent {
    pub fn node_added(id: u64, node_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id,
            kind: EventKind::NodeAdded,
            entity_id: Some(node_id.into()),
            entity_type: Some("node".to_string()),
            file_path: None,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn node_updated(id: u64, node_id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id,
            kind: EventKind::NodeUpdated,
            entity_id: Some(node_id.into()),
            entity_type: Some("node".to_string()),
            file_path: None,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn relationship_added(
        id: u64,
        edge_id: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id,
            kind: EventKind::RelationshipAdded,
            entity_id: Some(edge_id.into()),
            entity_type: Some("relationship".to_string()),
            file_path: None,
            timestamp: Utc::now(),
            payload,
        }
    }

    pub fn file_removed(id: u64, file_path: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            id,
            kind: EventKind::FileRemoved,
            entity_id: None,
            entity_type: Some("file".to_string()),
            file_path: Some(file_path.into()),
            timestamp: Utc::now(),
            payload,
        }
    }
}

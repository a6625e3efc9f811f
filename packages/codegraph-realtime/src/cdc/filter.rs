//! Event filter shared by `subscribe`/`replay` (§4.7) and by each connected
//! WebSocket client (§4.8 "each with an optional filter").

use std::collections::HashSet;

use codegraph_core::shared::models::{EventKind, GraphEvent};
use serde::{Deserialize, Serialize};

/// `None` on either field means "no restriction on this dimension". Also
/// the wire format for a client's filter-update frame (§4.8).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub event_kinds: Option<HashSet<EventKind>>,
    pub entity_kinds: Option<HashSet<String>>,
}

impl EventFilter {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, event: &GraphEvent) -> bool {
        if let Some(kinds) = &self.event_kinds {
            if !kinds.contains(&event.kind) {
                return false;
            }
        }
        if let Some(entity_kinds) = &self.entity_kinds {
            match &event.entity_type {
                Some(entity_type) if entity_kinds.contains(entity_type) => {}
                _ => return false,
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_filter_matches_everything() {
        let event = GraphEvent::node_added(1, "n1", json!({}));
        assert!(EventFilter::any().matches(&event));
    }

    #[test]
    fn event_kind_filter_excludes_other_kinds() {
        let mut kinds = HashSet::new();
        kinds.insert(EventKind::NodeAdded);
        let filter = EventFilter { event_kinds: Some(kinds), entity_kinds: None };

        assert!(filter.matches(&GraphEvent::node_added(1, "n1", json!({}))));
        assert!(!filter.matches(&GraphEvent::relationship_added(2, "e1", json!({}))));
    }

    #[test]
    fn entity_kind_filter_checks_entity_type() {
        let mut entity_kinds = HashSet::new();
        entity_kinds.insert("relationship".to_string());
        let filter = EventFilter { event_kinds: None, entity_kinds: Some(entity_kinds) };

        assert!(filter.matches(&GraphEvent::relationship_added(1, "e1", json!({}))));
        assert!(!filter.matches(&GraphEvent::node_added(2, "n1", json!({}))));
    }
}

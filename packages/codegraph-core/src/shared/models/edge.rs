//! Relationship (edge) model (§3 Data Model)

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::node::InternedString;

/// The prefix used for a call/reference target that could not be resolved
/// to a known node at extraction time (§4.4, GLOSSARY "Unresolved target").
pub const UNRESOLVED_PREFIX: &str = "unresolved:";

pub fn unresolved_target(name: &str) -> String {
    format!("{UNRESOLVED_PREFIX}{name}")
}

pub fn is_unresolved(target_id: &str) -> bool {
    target_id.starts_with(UNRESOLVED_PREFIX)
}

/// A directed, typed edge between two node ids.
///
/// `seam` is deliberately absent here: per §3 it is "computed, not stored
/// independently" — whether an edge is a seam depends on the two endpoint
/// nodes' `language` tags and is derived at query time (see
/// `features::graph::engine::GraphEngine::is_seam_edge`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    Contains,
    Imports,
    Calls,
    References,
    Extends,
    Implements,
    Decorates,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Contains => "contains",
            EdgeKind::Imports => "imports",
            EdgeKind::Calls => "calls",
            EdgeKind::References => "references",
            EdgeKind::Extends => "extends",
            EdgeKind::Implements => "implements",
            EdgeKind::Decorates => "decorates",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "contains" => EdgeKind::Contains,
            "imports" => EdgeKind::Imports,
            "calls" => EdgeKind::Calls,
            "references" => EdgeKind::References,
            "extends" => EdgeKind::Extends,
            "implements" => EdgeKind::Implements,
            "decorates" => EdgeKind::Decorates,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Deterministic from (source_id, target_id, kind); duplicates idempotent.
    pub id: InternedString,
    pub kind: EdgeKind,
    pub source_id: InternedString,
    pub target_id: InternedString,
    pub metadata: AHashMap<String, serde_json::Value>,
}

impl Edge {
    pub fn new(
        kind: EdgeKind,
        source_id: impl Into<InternedString>,
        target_id: impl Into<InternedString>,
    ) -> Self {
        let source_id = source_id.into();
        let target_id = target_id.into();
        let id = derive_edge_id(&source_id, &target_id, kind);
        Self {
            id: id.into(),
            kind,
            source_id,
            target_id,
            metadata: AHashMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn is_unresolved(&self) -> bool {
        is_unresolved(&self.target_id)
    }
}

pub fn derive_edge_id(source_id: &str, target_id: &str, kind: EdgeKind) -> String {
    let digest = blake3::hash(format!("{source_id}\u{0}{target_id}\u{0}{}", kind.as_str()).as_bytes());
    digest.to_hex()[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_id_is_idempotent_on_duplicate_add() {
        let a = Edge::new(EdgeKind::Calls, "n1", "n2");
        let b = Edge::new(EdgeKind::Calls, "n1", "n2");
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn unresolved_targets_are_tagged() {
        let target = unresolved_target("foo");
        assert!(is_unresolved(&target));
        assert!(!is_unresolved("n2"));
    }
}

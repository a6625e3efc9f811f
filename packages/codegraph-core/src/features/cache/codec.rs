//! Explicit cache-boundary codec (§4.3 "Serialization contract", §9).
//!
//! `NodeKind`/`EdgeKind` already derive `Serialize`/`Deserialize` with
//! `rename_all = "kebab-case"`, which happens to produce the canonical
//! lowercase string today — but relying on that for the cache boundary is
//! exactly the "structural copy that preserves enum objects" failure mode
//! §9 calls out: a future refactor of the derive's rename policy would
//! silently break the wire format. These free functions convert explicitly,
//! so the contract holds even if the in-memory representation changes.

use serde::{Deserialize, Serialize};

use crate::shared::models::{CodegraphError, Edge, EdgeKind, Node, NodeKind, Result};

/// On-wire representation of a `Node`: `kind` travels as its canonical
/// string, never as whatever the derive would otherwise emit.
#[derive(Serialize, Deserialize)]
struct WireNode {
    id: String,
    name: String,
    kind: String,
    language: String,
    file_path: String,
    start_line: u32,
    start_col: u32,
    end_line: u32,
    end_col: u32,
    complexity: u32,
    metadata: ahash::AHashMap<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct WireEdge {
    id: String,
    kind: String,
    source_id: String,
    target_id: String,
    metadata: ahash::AHashMap<String, serde_json::Value>,
}

pub fn encode_nodes(nodes: &[Node]) -> Result<Vec<u8>> {
    let wire: Vec<WireNode> = nodes
        .iter()
        .map(|n| WireNode {
            id: n.id.to_string(),
            name: n.name.to_string(),
            kind: n.kind.as_str().to_string(),
            language: n.language.to_string(),
            file_path: n.location.file_path.clone(),
            start_line: n.location.span.start_line,
            start_col: n.location.span.start_col,
            end_line: n.location.span.end_line,
            end_col: n.location.span.end_col,
            complexity: n.complexity,
            metadata: n.metadata.clone(),
        })
        .collect();
    Ok(serde_json::to_vec(&wire)?)
}

pub fn decode_nodes(bytes: &[u8]) -> Result<Vec<Node>> {
    let wire: Vec<WireNode> = serde_json::from_slice(bytes)?;
    wire.into_iter()
        .map(|w| {
            let kind = NodeKind::from_str(&w.kind).ok_or_else(|| {
                CodegraphError::storage(format!("unknown node kind in cache entry: {}", w.kind))
            })?;
            Ok(Node {
                id: w.id.into(),
                name: w.name.into(),
                kind,
                language: w.language.into(),
                location: crate::shared::models::NodeLocation {
                    file_path: w.file_path,
                    span: crate::shared::models::Span::new(
                        w.start_line,
                        w.start_col,
                        w.end_line,
                        w.end_col,
                    ),
                },
                complexity: w.complexity,
                metadata: w.metadata,
            })
        })
        .collect()
}

pub fn encode_edges(edges: &[Edge]) -> Result<Vec<u8>> {
    let wire: Vec<WireEdge> = edges
        .iter()
        .map(|e| WireEdge {
            id: e.id.to_string(),
            kind: e.kind.as_str().to_string(),
            source_id: e.source_id.to_string(),
            target_id: e.target_id.to_string(),
            metadata: e.metadata.clone(),
        })
        .collect();
    Ok(serde_json::to_vec(&wire)?)
}

pub fn decode_edges(bytes: &[u8]) -> Result<Vec<Edge>> {
    let wire: Vec<WireEdge> = serde_json::from_slice(bytes)?;
    wire.into_iter()
        .map(|w| {
            let kind = EdgeKind::from_str(&w.kind).ok_or_else(|| {
                CodegraphError::storage(format!("unknown edge kind in cache entry: {}", w.kind))
            })?;
            Ok(Edge {
                id: w.id.into(),
                kind,
                source_id: w.source_id.into(),
                target_id: w.target_id.into(),
                metadata: w.metadata,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::NodeLocation;

    #[test]
    fn node_round_trips_with_typed_kind_intact() {
        let node = Node::new(
            "n1",
            "foo",
            NodeKind::Function,
            "python",
            NodeLocation {
                file_path: "a.py".to_string(),
                span: crate::shared::models::Span::new(1, 0, 2, 0),
            },
        );
        let bytes = encode_nodes(std::slice::from_ref(&node)).unwrap();
        let decoded = decode_nodes(&bytes).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].kind, NodeKind::Function);
        assert_eq!(decoded[0].id, node.id);
    }

    #[test]
    fn wire_format_stores_canonical_lowercase_kind() {
        let node = Node::new(
            "n1",
            "Foo",
            NodeKind::TypeAlias,
            "rust",
            NodeLocation {
                file_path: "a.rs".to_string(),
                span: crate::shared::models::Span::zero(),
            },
        );
        let bytes = encode_nodes(std::slice::from_ref(&node)).unwrap();
        let json = String::from_utf8(bytes).unwrap();
        assert!(json.contains("\"type-alias\""));
    }

    #[test]
    fn edge_round_trips() {
        let edge = Edge::new(EdgeKind::Calls, "n1", "n2");
        let bytes = encode_edges(std::slice::from_ref(&edge)).unwrap();
        let decoded = decode_edges(&bytes).unwrap();
        assert_eq!(decoded[0].kind, EdgeKind::Calls);
    }
}

//! C6 — Query Engine (§4.6): a thin, paginated read layer over C5.
//!
//! Grounded in the teacher's `node_query.rs` fluent query builder and
//! `query_engine.rs` dispatcher; `search_nodes`'s glob matching uses the
//! `glob` crate, kept deliberately distinct from the `globset` matcher C2
//! uses for ignore-file patterns.

use std::sync::Arc;

use serde::Serialize;

use super::pagination::{paginate, Page, PageRequest};
use super::stdlib_allowlist;
use crate::features::graph::GraphEngine;
use crate::shared::models::{CodegraphError, Edge, EdgeKind, Node, NodeKind, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    EntryPoints,
    Hubs,
    Leaves,
}

impl Category {
    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "entry-points" => Category::EntryPoints,
            "hubs" => Category::Hubs,
            "leaves" => Category::Leaves,
            _ => return None,
        })
    }
}

/// One edge plus the node at its other end, returned by the incidence
/// queries (`find_callers`/`find_callees`/`find_references`).
#[derive(Debug, Clone, Serialize)]
pub struct IncidentMatch {
    pub node: Node,
    pub edge: Edge,
}

pub struct QueryEngine {
    graph: Arc<GraphEngine>,
}

impl QueryEngine {
    pub fn new(graph: Arc<GraphEngine>) -> Self {
        Self { graph }
    }

    fn resolve_symbol(&self, symbol: &str, file_hint: Option<&str>) -> Vec<Node> {
        let mut candidates = self.graph.nodes_by_name(symbol);
        if let Some(hint) = file_hint {
            candidates.retain(|n| n.file_path() == hint);
        }
        candidates
    }

    /// §4.6 `find_callers`: incoming `calls` edges onto every node matching
    /// `symbol` (optionally narrowed by `file_hint`).
    pub fn find_callers(
        &self,
        symbol: &str,
        file_hint: Option<&str>,
        request: PageRequest,
    ) -> Page<IncidentMatch> {
        let candidates = self.resolve_symbol(symbol, file_hint);
        let mut matches = Vec::new();
        for candidate in &candidates {
            for edge in self.graph.get_relationships(None, Some(&candidate.id), Some(EdgeKind::Calls)) {
                if let Some(caller) = self.graph.get_node(&edge.source_id) {
                    matches.push(IncidentMatch { node: caller, edge });
                }
            }
        }
        matches.sort_by(|a, b| a.node.id.cmp(&b.node.id));
        paginate(matches, request)
    }

    /// §4.6 `find_callees`: outgoing `calls` edges from every node matching
    /// `symbol`.
    pub fn find_callees(
        &self,
        symbol: &str,
        file_hint: Option<&str>,
        request: PageRequest,
    ) -> Page<IncidentMatch> {
        let candidates = self.resolve_symbol(symbol, file_hint);
        let mut matches = Vec::new();
        for candidate in &candidates {
            for edge in self.graph.get_relationships(Some(&candidate.id), None, Some(EdgeKind::Calls)) {
                if let Some(callee) = self.graph.get_node(&edge.target_id) {
                    matches.push(IncidentMatch { node: callee, edge });
                }
            }
        }
        matches.sort_by(|a, b| a.node.id.cmp(&b.node.id));
        paginate(matches, request)
    }

    /// §4.6 `find_references`: incoming `references` edges onto every node
    /// matching `symbol` — who references this symbol, not what it refers to.
    pub fn find_references(
        &self,
        symbol: &str,
        file_hint: Option<&str>,
        request: PageRequest,
    ) -> Page<IncidentMatch> {
        let candidates = self.resolve_symbol(symbol, file_hint);
        let mut matches = Vec::new();
        for candidate in &candidates {
            for edge in self.graph.get_relationships(None, Some(&candidate.id), Some(EdgeKind::References)) {
                if let Some(referrer) = self.graph.get_node(&edge.source_id) {
                    matches.push(IncidentMatch { node: referrer, edge });
                }
            }
        }
        matches.sort_by(|a, b| a.node.id.cmp(&b.node.id));
        paginate(matches, request)
    }

    /// §4.6 `find_by_category`, reading C5's memoized `classify()` output.
    /// Entry-point results additionally drop stdlib-import nodes per the
    /// bundled allow-list (§6), on top of `classify()`'s own structural
    /// exclusion of `import` nodes from entry-point status.
    pub fn find_by_category(&self, category: Category, request: PageRequest) -> Page<Node> {
        let classifications = self.graph.classify();
        let mut matches: Vec<Node> = self
            .graph
            .all_nodes()
            .into_iter()
            .filter(|node| {
                let Some(class) = classifications.get(&node.id) else { return false };
                match category {
                    Category::EntryPoints => class.is_entry_point,
                    Category::Hubs => class.is_hub,
                    Category::Leaves => class.is_leaf,
                }
            })
            .filter(|node| {
                if category != Category::EntryPoints || node.kind != NodeKind::Import {
                    return true;
                }
                !stdlib_allowlist::is_stdlib(&node.language, &node.name)
            })
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        paginate(matches, request)
    }

    /// §4.6 `search_nodes`: glob match against node name, optionally
    /// narrowed by language and kind.
    pub fn search_nodes(
        &self,
        name_glob: &str,
        language: Option<&str>,
        kind: Option<NodeKind>,
        request: PageRequest,
    ) -> Result<Page<Node>> {
        let pattern = glob::Pattern::new(name_glob)
            .map_err(|e| CodegraphError::internal(format!("invalid glob pattern: {e}")))?;
        let mut matches: Vec<Node> = self
            .graph
            .all_nodes()
            .into_iter()
            .filter(|n| pattern.matches(&n.name))
            .filter(|n| language.map_or(true, |l| &*n.language == l))
            .filter(|n| kind.map_or(true, |k| n.kind == k))
            .collect();
        matches.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(paginate(matches, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{NodeLocation, Span};

    fn node(id: &str, name: &str, kind: NodeKind) -> Node {
        Node::new(
            id,
            name,
            kind,
            "python",
            NodeLocation { file_path: "a.py".into(), span: Span::zero() },
        )
    }

    fn setup() -> QueryEngine {
        let graph = Arc::new(GraphEngine::new(0.95));
        graph.add_node(node("caller", "caller", NodeKind::Function));
        graph.add_node(node("callee", "callee", NodeKind::Function));
        graph.add_relationship(Edge::new(EdgeKind::Calls, "caller", "callee")).unwrap();
        QueryEngine::new(graph)
    }

    #[test]
    fn find_callers_returns_incident_edges() {
        let qe = setup();
        let page = qe.find_callers("callee", None, PageRequest::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].node.id.as_ref(), "caller");
    }

    #[test]
    fn find_callees_returns_incident_edges() {
        let qe = setup();
        let page = qe.find_callees("caller", None, PageRequest::default());
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].node.id.as_ref(), "callee");
    }

    #[test]
    fn find_by_category_entry_points_excludes_stdlib_imports() {
        let graph = Arc::new(GraphEngine::new(0.95));
        graph.add_node(node("fn1", "handler", NodeKind::Function));
        let mut import_node = node("imp1", "os", NodeKind::Import);
        import_node.language = "python".into();
        graph.add_node(import_node);
        let qe = QueryEngine::new(graph);
        let page = qe.find_by_category(Category::EntryPoints, PageRequest::default());
        assert!(page.items.iter().all(|n| n.name.as_ref() != "os"));
        assert!(page.items.iter().any(|n| n.name.as_ref() == "handler"));
    }

    #[test]
    fn search_nodes_matches_glob() {
        let qe = setup();
        let page = qe.search_nodes("call*", None, None, PageRequest::default()).unwrap();
        assert_eq!(page.total, 2);
    }
}

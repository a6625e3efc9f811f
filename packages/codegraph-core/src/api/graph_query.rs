//! Language-agnostic facade over C5 (`GraphEngine`) and C6 (`QueryEngine`),
//! meant to be wrapped by any binding layer without exposing either
//! engine's internal types directly.

use std::sync::Arc;

use crate::features::graph::GraphEngine;
use crate::features::query_engine::{Category, IncidentMatch, Page, PageRequest, QueryEngine};
use crate::shared::models::{Node, NodeKind, Result};

pub use crate::features::graph::GraphStats;

/// Narrowing filter shared by the category and search endpoints.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub language: Option<String>,
    pub kind: Option<NodeKind>,
}

pub struct GraphQuery {
    graph: Arc<GraphEngine>,
    queries: QueryEngine,
}

impl GraphQuery {
    pub fn new(graph: Arc<GraphEngine>) -> Self {
        let queries = QueryEngine::new(graph.clone());
        Self { graph, queries }
    }

    pub fn stats(&self) -> GraphStats {
        self.graph.stats()
    }

    pub fn find_callers(
        &self,
        symbol: &str,
        file_hint: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Page<IncidentMatch> {
        self.queries.find_callers(symbol, file_hint, PageRequest::new(limit, offset))
    }

    pub fn find_callees(
        &self,
        symbol: &str,
        file_hint: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Page<IncidentMatch> {
        self.queries.find_callees(symbol, file_hint, PageRequest::new(limit, offset))
    }

    pub fn find_references(
        &self,
        symbol: &str,
        file_hint: Option<&str>,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Page<IncidentMatch> {
        self.queries.find_references(symbol, file_hint, PageRequest::new(limit, offset))
    }

    pub fn find_by_category(
        &self,
        category: &str,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Option<Page<Node>> {
        let category = Category::from_str(category)?;
        Some(self.queries.find_by_category(category, PageRequest::new(limit, offset)))
    }

    pub fn search_nodes(
        &self,
        name_glob: &str,
        filter: QueryFilter,
        limit: Option<usize>,
        offset: Option<usize>,
    ) -> Result<Page<Node>> {
        self.queries.search_nodes(
            name_glob,
            filter.language.as_deref(),
            filter.kind,
            PageRequest::new(limit, offset),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::graph::GraphEngine;
    use crate::shared::models::{Edge, EdgeKind, Node, NodeLocation, Span};

    fn node(id: &str) -> Node {
        Node::new(
            id,
            id,
            NodeKind::Function,
            "python",
            NodeLocation { file_path: "a.py".into(), span: Span::zero() },
        )
    }

    #[test]
    fn facade_delegates_to_query_engine() {
        let graph = Arc::new(GraphEngine::new(0.95));
        graph.add_node(node("caller"));
        graph.add_node(node("callee"));
        graph.add_relationship(Edge::new(EdgeKind::Calls, "caller", "callee")).unwrap();

        let api = GraphQuery::new(graph);
        let page = api.find_callees("caller", None, None, None);
        assert_eq!(page.total, 1);
        assert_eq!(api.stats().node_count, 2);
    }

    #[test]
    fn unknown_category_returns_none() {
        let graph = Arc::new(GraphEngine::new(0.95));
        let api = GraphQuery::new(graph);
        assert!(api.find_by_category("nonsense", None, None).is_none());
    }
}

//! C5 — Universal Graph (§4.5).
//!
//! One `parking_lot::RwLock` guards the whole mutable state (node/edge maps
//! plus the two adjacency indices and the file index), giving the
//! single-writer/concurrent-reader discipline §5 requires — the same
//! primitive the teacher reaches for everywhere it needs a fast sync lock
//! rather than `std::sync::RwLock`. `petgraph::algo::tarjan_scc` runs over a
//! transient view built from the adjacency indices for cycle detection
//! rather than keeping a live `petgraph::Graph` in sync on every mutation.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use parking_lot::RwLock;
use petgraph::graph::DiGraph;

use crate::shared::models::{
    is_unresolved, CodegraphError, Edge, EdgeKind, GraphEvent, InternedString, Node, NodeKind,
    Result,
};

/// Sink C5 hands every mutation event to synchronously before the mutating
/// call returns (§4.5 "Mutation events"). Implemented by C7 in the
/// `codegraph-realtime` crate; `GraphEngine` only depends on this port.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: GraphEvent);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeighborDirection {
    Outgoing,
    Incoming,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    Bfs,
    Dfs,
}

#[derive(Debug, Clone)]
pub struct TraversalOutcome {
    pub visited: Vec<InternedString>,
    pub edges_walked: usize,
}

#[derive(Debug, Clone, Default)]
pub struct RemoveFileOutcome {
    pub nodes_removed: usize,
    pub edges_removed: usize,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Classification {
    pub in_degree: usize,
    pub out_degree: usize,
    pub is_entry_point: bool,
    pub is_hub: bool,
    pub is_leaf: bool,
}

#[derive(Debug, Clone, Default)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub file_count: usize,
}

struct GraphState {
    nodes: AHashMap<InternedString, Node>,
    edges: AHashMap<InternedString, Edge>,
    out_edges: AHashMap<InternedString, Vec<InternedString>>,
    in_edges: AHashMap<InternedString, Vec<InternedString>>,
    file_index: AHashMap<String, Vec<InternedString>>,
    classify_cache: Option<Arc<AHashMap<InternedString, Classification>>>,
    next_event_id: u64,
}

impl GraphState {
    fn new() -> Self {
        Self {
            nodes: AHashMap::new(),
            edges: AHashMap::new(),
            out_edges: AHashMap::new(),
            in_edges: AHashMap::new(),
            file_index: AHashMap::new(),
            classify_cache: None,
            next_event_id: 0,
        }
    }

    fn next_event_id(&mut self) -> u64 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        id
    }
}

pub struct GraphEngine {
    state: RwLock<GraphState>,
    hub_percentile: f64,
    sink: Option<Arc<dyn EventSink>>,
}

impl GraphEngine {
    pub fn new(hub_percentile: f64) -> Self {
        Self {
            state: RwLock::new(GraphState::new()),
            hub_percentile,
            sink: None,
        }
    }

    pub fn with_sink(hub_percentile: f64, sink: Arc<dyn EventSink>) -> Self {
        Self {
            state: RwLock::new(GraphState::new()),
            hub_percentile,
            sink: Some(sink),
        }
    }

    fn emit(&self, event: GraphEvent) {
        if let Some(sink) = &self.sink {
            sink.emit(event);
        }
    }

    /// §4.5 `add_node`: idempotent on id.
    pub fn add_node(&self, node: Node) {
        let mut state = self.state.write();
        let event_id = state.next_event_id();
        let file_path = node.file_path().to_string();
        let id = node.id.clone();
        let payload = serde_json::json!({
            "kind": node.kind.as_str(),
            "name": node.name,
            "file_path": file_path,
            "language": node.language,
        });

        let is_update = state.nodes.contains_key(&id);
        if !is_update {
            state.file_index.entry(file_path).or_default().push(id.clone());
        }
        state.nodes.insert(id.clone(), node);
        state.classify_cache = None;

        let event = if is_update {
            GraphEvent::node_updated(event_id, id.to_string(), payload)
        } else {
            GraphEvent::node_added(event_id, id.to_string(), payload)
        };
        drop(state);
        self.emit(event);
    }

    /// §4.5 `add_relationship`: requires both endpoints present or an
    /// `unresolved:*` target; idempotent on id.
    pub fn add_relationship(&self, edge: Edge) -> Result<()> {
        let mut state = self.state.write();
        if !state.nodes.contains_key(&edge.source_id) {
            return Err(CodegraphError::invariant_violation(format!(
                "relationship source {} not present in graph",
                edge.source_id
            )));
        }
        if !state.nodes.contains_key(&edge.target_id) && !is_unresolved(&edge.target_id) {
            return Err(CodegraphError::invariant_violation(format!(
                "relationship target {} not present and not unresolved",
                edge.target_id
            )));
        }

        if state.edges.contains_key(&edge.id) {
            return Ok(()); // idempotent on duplicate add
        }

        let event_id = state.next_event_id();
        let id = edge.id.clone();
        let payload = serde_json::json!({
            "kind": edge.kind.as_str(),
            "source_id": edge.source_id,
            "target_id": edge.target_id,
        });
        state.out_edges.entry(edge.source_id.clone()).or_default().push(id.clone());
        state.in_edges.entry(edge.target_id.clone()).or_default().push(id.clone());
        state.edges.insert(id.clone(), edge);
        state.classify_cache = None;
        drop(state);

        self.emit(GraphEvent::relationship_added(event_id, id.to_string(), payload));
        Ok(())
    }

    /// §4.5 `remove_file`: one event for the whole file-scoped removal, not
    /// one per child — consumers expect a single invalidation boundary per
    /// reparse.
    pub fn remove_file(&self, file_path: &str) -> RemoveFileOutcome {
        let mut state = self.state.write();
        let Some(node_ids) = state.file_index.remove(file_path) else {
            return RemoveFileOutcome::default();
        };
        let removed: AHashSet<InternedString> = node_ids.iter().cloned().collect();

        for id in &node_ids {
            state.nodes.remove(id);
        }

        let mut edges_removed = 0usize;
        let edge_ids: Vec<InternedString> = state.edges.keys().cloned().collect();
        for edge_id in edge_ids {
            let incident = state
                .edges
                .get(&edge_id)
                .map(|e| removed.contains(&e.source_id) || removed.contains(&e.target_id))
                .unwrap_or(false);
            if incident {
                state.edges.remove(&edge_id);
                edges_removed += 1;
            }
        }
        let remaining_edges: AHashSet<InternedString> = state.edges.keys().cloned().collect();
        for ids in state.out_edges.values_mut() {
            ids.retain(|id| remaining_edges.contains(id));
        }
        for ids in state.in_edges.values_mut() {
            ids.retain(|id| remaining_edges.contains(id));
        }
        state.out_edges.retain(|k, _| !removed.contains(k));
        state.in_edges.retain(|k, _| !removed.contains(k));

        let event_id = state.next_event_id();
        state.classify_cache = None;
        drop(state);

        let payload = serde_json::json!({
            "nodes_removed": node_ids.len(),
            "edges_removed": edges_removed,
        });
        self.emit(GraphEvent::file_removed(event_id, file_path.to_string(), payload));
        RemoveFileOutcome {
            nodes_removed: node_ids.len(),
            edges_removed,
        }
    }

    pub fn get_node(&self, id: &str) -> Option<Node> {
        self.state.read().nodes.get(id).cloned()
    }

    /// Every node currently in the graph. Used by C6's `search_nodes` and
    /// symbol resolution — not a hot path, so a full clone is acceptable.
    pub fn all_nodes(&self) -> Vec<Node> {
        self.state.read().nodes.values().cloned().collect()
    }

    pub fn nodes_by_name(&self, name: &str) -> Vec<Node> {
        self.state.read().nodes.values().filter(|n| &*n.name == name).cloned().collect()
    }

    pub fn get_relationships(
        &self,
        source: Option<&str>,
        target: Option<&str>,
        kind: Option<EdgeKind>,
    ) -> Vec<Edge> {
        let state = self.state.read();
        state
            .edges
            .values()
            .filter(|e| source.map_or(true, |s| &*e.source_id == s))
            .filter(|e| target.map_or(true, |t| &*e.target_id == t))
            .filter(|e| kind.map_or(true, |k| e.kind == k))
            .cloned()
            .collect()
    }

    pub fn neighbors(
        &self,
        id: &str,
        direction: NeighborDirection,
        kind_filter: Option<EdgeKind>,
    ) -> Vec<InternedString> {
        let state = self.state.read();
        let mut result = Vec::new();
        if matches!(direction, NeighborDirection::Outgoing | NeighborDirection::Both) {
            if let Some(edge_ids) = state.out_edges.get(id) {
                for eid in edge_ids {
                    if let Some(edge) = state.edges.get(eid) {
                        if kind_filter.map_or(true, |k| edge.kind == k) {
                            result.push(edge.target_id.clone());
                        }
                    }
                }
            }
        }
        if matches!(direction, NeighborDirection::Incoming | NeighborDirection::Both) {
            if let Some(edge_ids) = state.in_edges.get(id) {
                for eid in edge_ids {
                    if let Some(edge) = state.edges.get(eid) {
                        if kind_filter.map_or(true, |k| edge.kind == k) {
                            result.push(edge.source_id.clone());
                        }
                    }
                }
            }
        }
        result
    }

    /// Whether `edge` connects two differently-tagged-language nodes —
    /// computed on demand, never stored (§3 "seam ... computed, not stored
    /// independently").
    pub fn is_seam_edge(&self, edge: &Edge) -> bool {
        let state = self.state.read();
        let source_lang = state.nodes.get(&edge.source_id).map(|n| n.language.clone());
        let target_lang = state.nodes.get(&edge.target_id).map(|n| n.language.clone());
        match (source_lang, target_lang) {
            (Some(a), Some(b)) => a != b,
            _ => false,
        }
    }

    /// §4.5 traversal: BFS/DFS with a visited set, `max_depth` bound; seam
    /// edges are skipped when `follow_seams` is false.
    pub fn traverse(
        &self,
        start_id: &str,
        mode: TraversalMode,
        max_depth: usize,
        kind_filter: Option<EdgeKind>,
        follow_seams: bool,
    ) -> TraversalOutcome {
        let state = self.state.read();
        if !state.nodes.contains_key(start_id) {
            return TraversalOutcome { visited: Vec::new(), edges_walked: 0 };
        }

        let mut visited: AHashSet<InternedString> = AHashSet::new();
        let mut order = Vec::new();
        let mut edges_walked = 0usize;
        let mut frontier: std::collections::VecDeque<(InternedString, usize)> = std::collections::VecDeque::new();
        frontier.push_back((InternedString::from(start_id), 0));
        visited.insert(InternedString::from(start_id));

        while let Some((current, depth)) = if mode == TraversalMode::Bfs {
            frontier.pop_front()
        } else {
            frontier.pop_back()
        } {
            order.push(current.clone());
            if depth >= max_depth {
                continue;
            }
            if let Some(edge_ids) = state.out_edges.get(&current) {
                for eid in edge_ids {
                    let Some(edge) = state.edges.get(eid) else { continue };
                    if kind_filter.map_or(false, |k| edge.kind != k) {
                        continue;
                    }
                    if !follow_seams && self.edge_is_seam_locked(&state, edge) {
                        continue;
                    }
                    edges_walked += 1;
                    if visited.insert(edge.target_id.clone()) {
                        frontier.push_back((edge.target_id.clone(), depth + 1));
                    }
                }
            }
        }

        TraversalOutcome { visited: order, edges_walked }
    }

    fn edge_is_seam_locked(&self, state: &GraphState, edge: &Edge) -> bool {
        let source_lang = state.nodes.get(&edge.source_id).map(|n| n.language.clone());
        let target_lang = state.nodes.get(&edge.target_id).map(|n| n.language.clone());
        matches!((source_lang, target_lang), (Some(a), Some(b)) if a != b)
    }

    /// Call chains from `start_id`: DFS following only `calls` edges,
    /// deduplicated by node-sequence, ordered shortest-first, capped at
    /// `max_depth` (§4.5 "Algorithms").
    pub fn call_chain(&self, start_id: &str, max_depth: usize) -> Vec<Vec<InternedString>> {
        let state = self.state.read();
        if !state.nodes.contains_key(start_id) {
            return Vec::new();
        }
        let mut paths = Vec::new();
        let mut seen: AHashSet<Vec<InternedString>> = AHashSet::new();
        let mut stack: Vec<InternedString> = vec![InternedString::from(start_id)];
        self.call_chain_dfs(&state, &mut stack, max_depth, &mut paths, &mut seen);
        paths.sort_by_key(|p| p.len());
        paths
    }

    fn call_chain_dfs(
        &self,
        state: &GraphState,
        stack: &mut Vec<InternedString>,
        max_depth: usize,
        out: &mut Vec<Vec<InternedString>>,
        seen: &mut AHashSet<Vec<InternedString>>,
    ) {
        if stack.len() > 1 && seen.insert(stack.clone()) {
            out.push(stack.clone());
        }
        if stack.len() > max_depth {
            return;
        }
        let Some(current) = stack.last().cloned() else { return };
        let Some(edge_ids) = state.out_edges.get(&current) else { return };
        for eid in edge_ids {
            let Some(edge) = state.edges.get(eid) else { continue };
            if edge.kind != EdgeKind::Calls || is_unresolved(&edge.target_id) {
                continue;
            }
            if stack.contains(&edge.target_id) {
                continue; // avoid infinite loops on recursive call cycles
            }
            stack.push(edge.target_id.clone());
            self.call_chain_dfs(state, stack, max_depth, out, seen);
            stack.pop();
        }
    }

    /// BFS to `depth` from `start_id`, then the induced edges among visited
    /// nodes, capped at `limit` nodes (§4.5 "Algorithms").
    pub fn subgraph(&self, start_id: &str, depth: usize, limit: usize) -> (Vec<Node>, Vec<Edge>) {
        let outcome = self.traverse(start_id, TraversalMode::Bfs, depth, None, true);
        let state = self.state.read();
        let visited_ids: AHashSet<InternedString> = outcome.visited.into_iter().take(limit).collect();
        let nodes: Vec<Node> = visited_ids.iter().filter_map(|id| state.nodes.get(id).cloned()).collect();
        let edges: Vec<Edge> = state
            .edges
            .values()
            .filter(|e| visited_ids.contains(&e.source_id) && visited_ids.contains(&e.target_id))
            .cloned()
            .collect();
        (nodes, edges)
    }

    /// Tarjan-style SCC over `calls` edges only, on demand (§4.5
    /// "Algorithms"). Only strongly-connected components of size > 1 are
    /// true cycles; singletons are dropped.
    pub fn detect_cycles(&self) -> Vec<Vec<InternedString>> {
        let state = self.state.read();
        let mut graph: DiGraph<InternedString, ()> = DiGraph::new();
        let mut index_of: AHashMap<InternedString, petgraph::graph::NodeIndex> = AHashMap::new();

        for id in state.nodes.keys() {
            let idx = graph.add_node(id.clone());
            index_of.insert(id.clone(), idx);
        }
        for edge in state.edges.values() {
            if edge.kind != EdgeKind::Calls || is_unresolved(&edge.target_id) {
                continue;
            }
            if let (Some(&s), Some(&t)) = (index_of.get(&edge.source_id), index_of.get(&edge.target_id)) {
                graph.add_edge(s, t, ());
            }
        }

        petgraph::algo::tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1)
            .map(|scc| scc.into_iter().map(|idx| graph[idx].clone()).collect())
            .collect()
    }

    /// §4.5 `classify()`, memoized until the next structural mutation.
    pub fn classify(&self) -> Arc<AHashMap<InternedString, Classification>> {
        {
            let state = self.state.read();
            if let Some(cached) = &state.classify_cache {
                return cached.clone();
            }
        }

        let mut state = self.state.write();
        if let Some(cached) = &state.classify_cache {
            return cached.clone();
        }

        let mut degrees: AHashMap<InternedString, (usize, usize)> = AHashMap::new();
        for id in state.nodes.keys() {
            degrees.insert(id.clone(), (0, 0));
        }
        for edge in state.edges.values() {
            if let Some(entry) = degrees.get_mut(&edge.source_id) {
                entry.1 += 1;
            }
            if let Some(entry) = degrees.get_mut(&edge.target_id) {
                entry.0 += 1;
            }
        }

        let mut degree_sums: Vec<usize> = degrees.values().map(|(i, o)| i + o).collect();
        degree_sums.sort_unstable();
        let hub_threshold = percentile(&degree_sums, self.hub_percentile);

        let mut result = AHashMap::new();
        for (id, (in_degree, out_degree)) in degrees {
            let kind = state.nodes.get(&id).map(|n| n.kind);
            let is_entry_point = in_degree == 0 && kind != Some(NodeKind::Import);
            let is_hub = (in_degree + out_degree) as f64 > hub_threshold;
            let is_leaf = out_degree == 0 && !matches!(kind, Some(NodeKind::File) | Some(NodeKind::Module));
            result.insert(
                id,
                Classification { in_degree, out_degree, is_entry_point, is_hub, is_leaf },
            );
        }

        let result = Arc::new(result);
        state.classify_cache = Some(result.clone());
        result
    }

    pub fn stats(&self) -> GraphStats {
        let state = self.state.read();
        GraphStats {
            node_count: state.nodes.len(),
            edge_count: state.edges.len(),
            file_count: state.file_index.len(),
        }
    }
}

/// Nearest-rank percentile over an already-sorted slice.
fn percentile(sorted: &[usize], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((sorted.len() - 1) as f64 * p).round() as usize;
    sorted[idx.min(sorted.len() - 1)] as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Node, NodeLocation, Span};

    fn node(id: &str, kind: NodeKind, language: &str) -> Node {
        Node::new(id, id, kind, language, NodeLocation { file_path: "a.py".into(), span: Span::zero() })
    }

    #[test]
    fn add_node_is_idempotent_on_id() {
        let engine = GraphEngine::new(0.95);
        engine.add_node(node("n1", NodeKind::Function, "python"));
        engine.add_node(node("n1", NodeKind::Function, "python"));
        assert_eq!(engine.stats().node_count, 1);
    }

    #[test]
    fn add_relationship_requires_known_or_unresolved_target() {
        let engine = GraphEngine::new(0.95);
        engine.add_node(node("n1", NodeKind::Function, "python"));
        assert!(engine.add_relationship(Edge::new(EdgeKind::Calls, "n1", "unresolved:foo")).is_ok());
        assert!(engine.add_relationship(Edge::new(EdgeKind::Calls, "n1", "missing")).is_err());
    }

    #[test]
    fn remove_file_emits_single_boundary_and_clears_incident_edges() {
        let engine = GraphEngine::new(0.95);
        engine.add_node(node("n1", NodeKind::Function, "python"));
        engine.add_node(node("n2", NodeKind::Function, "python"));
        engine.add_relationship(Edge::new(EdgeKind::Calls, "n1", "n2")).unwrap();
        let outcome = engine.remove_file("a.py");
        assert_eq!(outcome.nodes_removed, 2);
        assert_eq!(outcome.edges_removed, 1);
        assert_eq!(engine.stats().node_count, 0);
    }

    #[test]
    fn seam_edge_detected_across_languages() {
        let engine = GraphEngine::new(0.95);
        engine.add_node(node("n1", NodeKind::Function, "python"));
        engine.add_node(node("n2", NodeKind::Function, "rust"));
        let edge = Edge::new(EdgeKind::Calls, "n1", "n2");
        engine.add_relationship(edge.clone()).unwrap();
        assert!(engine.is_seam_edge(&edge));
    }

    #[test]
    fn classify_marks_entry_point_and_leaf() {
        let engine = GraphEngine::new(0.95);
        engine.add_node(node("n1", NodeKind::Function, "python"));
        engine.add_node(node("n2", NodeKind::Function, "python"));
        engine.add_relationship(Edge::new(EdgeKind::Calls, "n1", "n2")).unwrap();
        let classes = engine.classify();
        assert!(classes[&InternedString::from("n1")].is_entry_point);
        assert!(classes[&InternedString::from("n2")].is_leaf);
    }

    #[test]
    fn detect_cycles_finds_mutual_recursion() {
        let engine = GraphEngine::new(0.95);
        engine.add_node(node("n1", NodeKind::Function, "python"));
        engine.add_node(node("n2", NodeKind::Function, "python"));
        engine.add_relationship(Edge::new(EdgeKind::Calls, "n1", "n2")).unwrap();
        engine.add_relationship(Edge::new(EdgeKind::Calls, "n2", "n1")).unwrap();
        let cycles = engine.detect_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].len(), 2);
    }
}

//! C9 — Entry-Point Classifier (§4.9).
//!
//! Runs after C4 completes, and after each significant reparse. Grounded in
//! the teacher's framework-awareness indexing (route/decorator pattern
//! tables keyed by language) repurposed here into a confidence-scoring
//! pattern bank rather than a routing index.

use ahash::AHashMap;
use serde_json::json;

use crate::features::graph::{GraphEngine, NeighborDirection};
use crate::shared::models::{EdgeKind, NodeKind};

/// One named pattern and how much confidence a match contributes. Several
/// patterns may match the same node; their confidences sum, capped at 1.0.
struct Pattern {
    name: &'static str,
    confidence: f64,
    matcher: fn(&str, &str) -> bool,
}

fn is_main_entry(language: &str, name: &str) -> bool {
    match language {
        "python" => name == "main" || name == "__main__",
        "rust" | "go" => name == "main",
        "java" | "kotlin" => name == "main",
        "javascript" | "typescript" => name == "main" || name == "index",
        _ => false,
    }
}

fn looks_like_route_handler(_language: &str, name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ["get_", "post_", "put_", "delete_", "patch_", "handle_", "route_"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
}

fn looks_like_mq_handler(_language: &str, name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    ["on_message", "consume", "handle_event", "process_message", "subscriber", "listener"]
        .iter()
        .any(|needle| lower.contains(needle))
}

fn looks_like_cli_command(_language: &str, name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.starts_with("cmd_") || lower.ends_with("_command") || lower == "run"
}

fn looks_like_test_entry(_language: &str, name: &str) -> bool {
    name.starts_with("test_") || name.starts_with("Test")
}

const PATTERNS: &[Pattern] = &[
    Pattern { name: "main-function", confidence: 1.0, matcher: is_main_entry },
    Pattern { name: "http-route-name-convention", confidence: 0.6, matcher: looks_like_route_handler },
    Pattern { name: "message-queue-handler", confidence: 0.5, matcher: looks_like_mq_handler },
    Pattern { name: "cli-command", confidence: 0.4, matcher: looks_like_cli_command },
    Pattern { name: "test-entry", confidence: 0.3, matcher: looks_like_test_entry },
];

/// A decorator-based match, read from the `Decorator` nodes C4 attaches via
/// incoming `Decorates` edges (e.g. `@app.route(...)`, `@RestController`).
/// Decorator names are matched by substring against per-language keyword
/// lists.
fn decorator_confidence(language: &str, decorators: &[String]) -> Option<(&'static str, f64)> {
    let keywords: &[&str] = match language {
        "python" => &["route", "app.get", "app.post", "blueprint", "celery.task"],
        "javascript" | "typescript" => &["@get", "@post", "@controller", "@route"],
        "java" | "kotlin" => &["@getmapping", "@postmapping", "@requestmapping", "@restcontroller"],
        _ => &[],
    };
    for decorator in decorators {
        let lower = decorator.to_ascii_lowercase();
        if keywords.iter().any(|k| lower.contains(k)) {
            return Some(("http-route-decorator", 0.8));
        }
    }
    None
}

/// Re-scans every function/method node in `graph`, writes
/// `entry_point_confidence`/`entry_point_pattern` metadata, and invalidates
/// the `classify()` cache as a side effect of the node rewrite.
pub fn classify_entry_points(graph: &GraphEngine) {
    let nodes = graph.all_nodes();
    for node in nodes {
        if !matches!(node.kind, NodeKind::Function | NodeKind::Method) {
            continue;
        }

        let mut confidence = 0.0f64;
        let mut matched_patterns: Vec<&'static str> = Vec::new();

        for pattern in PATTERNS {
            if (pattern.matcher)(&node.language, &node.name) {
                confidence = (confidence + pattern.confidence).min(1.0);
                matched_patterns.push(pattern.name);
            }
        }

        let decorator_names: Vec<String> = graph
            .neighbors(&node.id, NeighborDirection::Incoming, Some(EdgeKind::Decorates))
            .iter()
            .filter_map(|id| graph.get_node(id))
            .map(|n| n.name.to_string())
            .collect();
        if let Some((name, conf)) = decorator_confidence(&node.language, &decorator_names) {
            confidence = (confidence + conf).min(1.0);
            matched_patterns.push(name);
        }

        if confidence == 0.0 {
            continue;
        }

        let mut updated = node.clone();
        updated.metadata.insert("entry_point_confidence".to_string(), json!(confidence));
        updated.metadata.insert("entry_point_pattern".to_string(), json!(matched_patterns));
        graph.add_node(updated);
    }
}

/// Per-node confidence table, useful for tests and for C6 callers that want
/// the raw scores without re-running the scan.
pub fn score_node(language: &str, name: &str, decorators: &[String]) -> AHashMap<&'static str, f64> {
    let mut scores = AHashMap::new();
    for pattern in PATTERNS {
        if (pattern.matcher)(language, name) {
            scores.insert(pattern.name, pattern.confidence);
        }
    }
    if let Some((name, conf)) = decorator_confidence(language, decorators) {
        scores.insert(name, conf);
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::{Edge, Node, NodeLocation, Span};

    fn function_node(name: &str, language: &str) -> Node {
        Node::new(
            name,
            name,
            NodeKind::Function,
            language,
            NodeLocation { file_path: "a.py".into(), span: Span::zero() },
        )
    }

    #[test]
    fn main_function_gets_full_confidence() {
        let graph = GraphEngine::new(0.95);
        graph.add_node(function_node("main", "rust"));
        classify_entry_points(&graph);
        let node = graph.get_node("main").unwrap();
        assert_eq!(node.metadata.get("entry_point_confidence").unwrap(), &json!(1.0));
    }

    #[test]
    fn unrelated_function_has_no_entry_point_metadata() {
        let graph = GraphEngine::new(0.95);
        graph.add_node(function_node("compute_total", "python"));
        classify_entry_points(&graph);
        let node = graph.get_node("compute_total").unwrap();
        assert!(node.metadata.get("entry_point_confidence").is_none());
    }

    #[test]
    fn route_handler_name_convention_scores_partial_confidence() {
        let graph = GraphEngine::new(0.95);
        graph.add_node(function_node("get_user", "python"));
        classify_entry_points(&graph);
        let node = graph.get_node("get_user").unwrap();
        assert_eq!(node.metadata.get("entry_point_confidence").unwrap(), &json!(0.6));
    }

    #[test]
    fn confidence_sums_and_caps_at_one() {
        let node = function_node("main", "python");
        let graph = GraphEngine::new(0.95);
        graph.add_node(node);
        let decorator = Node::new(
            "deco1",
            "@app.route('/')",
            NodeKind::Decorator,
            "python",
            NodeLocation { file_path: "a.py".into(), span: Span::zero() },
        );
        graph.add_node(decorator);
        graph.add_relationship(Edge::new(EdgeKind::Decorates, "deco1", "main")).unwrap();

        classify_entry_points(&graph);
        let updated = graph.get_node("main").unwrap();
        assert_eq!(updated.metadata.get("entry_point_confidence").unwrap(), &json!(1.0));
    }
}

//! Tree-sitter node traversal and text-extraction utilities shared by every
//! language plugin (C4).

use crate::shared::models::Span;
use tree_sitter::Node;

/// Find a direct child node by kind
#[inline]
pub fn find_child_by_kind<'a>(node: &'a Node, kind: &str) -> Option<Node<'a>> {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }
    None
}

/// Find all direct children by kind
#[inline]
pub fn find_children_by_kind<'a>(node: &'a Node, kind: &str) -> Vec<Node<'a>> {
    let mut result = Vec::new();
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == kind {
                result.push(child);
            }
        }
    }
    result
}

/// Find all descendants by kind
pub fn find_descendants_by_kind<'a>(node: &'a Node, kind: &str) -> Vec<Node<'a>> {
    let mut result = Vec::new();
    let mut stack = vec![*node];
    while let Some(current) = stack.pop() {
        if current.kind() == kind {
            result.push(current);
        }
        for i in (0..current.child_count()).rev() {
            if let Some(child) = current.child(i) {
                stack.push(child);
            }
        }
    }
    result
}

/// Extract text content from a node
#[inline]
pub fn extract_node_text<'a>(node: &Node, source: &'a str) -> &'a str {
    let start = node.start_byte();
    let end = node.end_byte();
    &source[start..end]
}

/// Extract text content from a node as owned String
#[inline]
pub fn extract_node_text_owned(node: &Node, source: &str) -> String {
    extract_node_text(node, source).to_string()
}

/// Extract identifier name from a node that has an identifier child
#[inline]
pub fn extract_identifier_name(node: &Node, source: &str) -> Option<String> {
    find_child_by_kind(node, "identifier").map(|id_node| extract_node_text_owned(&id_node, source))
}

/// Convert tree-sitter node to Span (1-indexed lines)
#[inline]
pub fn node_to_span(node: &Node) -> Span {
    let start_pos = node.start_position();
    let end_pos = node.end_position();

    Span::new(
        start_pos.row as u32 + 1,
        start_pos.column as u32,
        end_pos.row as u32 + 1,
        end_pos.column as u32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tree_sitter::Parser;

    fn parse_python(code: &str) -> tree_sitter::Tree {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::language())
            .unwrap();
        parser.parse(code, None).unwrap()
    }

    #[test]
    fn test_find_child_by_kind() {
        let code = "def foo(): pass";
        let tree = parse_python(code);
        let root = tree.root_node();
        let func = root.child(0).unwrap();

        let id = find_child_by_kind(&func, "identifier");
        assert!(id.is_some());
        assert_eq!(extract_node_text(&id.unwrap(), code), "foo");
    }

    #[test]
    fn test_find_children_by_kind() {
        let code = "def foo(a, b, c): pass";
        let tree = parse_python(code);
        let root = tree.root_node();
        let func = root.child(0).unwrap();
        let params = find_child_by_kind(&func, "parameters").unwrap();

        let identifiers = find_children_by_kind(&params, "identifier");
        assert_eq!(identifiers.len(), 3);
    }

    #[test]
    fn test_node_to_span() {
        let code = "def foo():\n    pass";
        let tree = parse_python(code);
        let root = tree.root_node();
        let func = root.child(0).unwrap();

        let span = node_to_span(&func);
        assert_eq!(span.start_line, 1);
        assert_eq!(span.start_col, 0);
        assert_eq!(span.end_line, 2);
    }

    #[test]
    fn test_find_descendants_by_kind() {
        let code = "x = 1\ny = 2\nz = 3\n";
        let tree = parse_python(code);
        let root = tree.root_node();

        let identifiers = find_descendants_by_kind(&root, "identifier");
        assert_eq!(identifiers.len(), 3);
    }
}

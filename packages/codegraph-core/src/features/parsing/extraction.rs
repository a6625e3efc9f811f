//! Generic, pattern-driven tree walker shared by every language plugin
//! (§4.4 steps 4-6).
//!
//! Language differences live entirely in `LanguagePatterns` (which
//! tree-sitter node kinds mean "function", "class", etc.) and in the
//! grammar binding each plugin supplies. The walk itself — scope tracking,
//! contains-edge emission, complexity counting, call/import extraction — is
//! identical across languages, the same way the teacher's extractors shared
//! one `ExtractionContext`/`ExtractionResult` pair per language rather than
//! duplicating traversal logic.

use tree_sitter::{Node as TsNode, Tree};

use crate::features::language_registry::LanguagePatterns;
use crate::shared::models::{
    derive_node_id, unresolved_target, Edge, EdgeKind, Node, NodeKind, NodeLocation,
};
use crate::shared::utils::tree_sitter::{extract_node_text, node_to_span};

pub struct ExtractionOutcome {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

struct Walker<'a> {
    file_path: &'a str,
    source: &'a str,
    language: &'a str,
    patterns: &'a LanguagePatterns,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    pending_decorators: Vec<String>,
}

/// Walk `tree` for `file_path` using `patterns`, producing the file's nodes
/// and relationships per §4.4 steps 4-6. `language` is the normalized tag
/// stored on every produced node.
pub fn extract(file_path: &str, language: &str, source: &str, tree: &Tree, patterns: &LanguagePatterns) -> ExtractionOutcome {
    let root = tree.root_node();
    let file_span = node_to_span(&root);
    let file_name = std::path::Path::new(file_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file_path);
    let file_id = derive_node_id(file_path, NodeKind::File, file_name, 0);
    let file_node = Node::new(
        file_id.clone(),
        file_name,
        NodeKind::File,
        language,
        NodeLocation {
            file_path: file_path.to_string(),
            span: file_span,
        },
    );

    let mut walker = Walker {
        file_path,
        source,
        language,
        patterns,
        nodes: vec![file_node],
        edges: Vec::new(),
        pending_decorators: Vec::new(),
    };

    walker.walk_children(&root, &file_id, NodeKind::File);

    ExtractionOutcome {
        nodes: walker.nodes,
        edges: walker.edges,
    }
}

impl<'a> Walker<'a> {
    fn text(&self, node: &TsNode) -> &'a str {
        extract_node_text(node, self.source)
    }

    fn node_name(&self, node: &TsNode) -> String {
        if let Some(name_field) = node.child_by_field_name("name") {
            return self.text(&name_field).to_string();
        }
        if let Some(id) = crate::shared::utils::tree_sitter::extract_identifier_name(node, self.source) {
            return id;
        }
        "<anonymous>".to_string()
    }

    fn add_node(&mut self, node: Node) -> String {
        let id = node.id.to_string();
        self.nodes.push(node);
        id
    }

    fn add_contains(&mut self, enclosing_id: &str, child_id: &str) {
        self.edges.push(Edge::new(EdgeKind::Contains, enclosing_id, child_id));
    }

    /// Recurse into `node`'s children, routing each by pattern membership.
    /// `enclosing_id` is the id structural children attach `contains` edges
    /// to; `enclosing_kind` disambiguates function vs. method and gates
    /// top-level-only constructs like imports.
    fn walk_children(&mut self, node: &TsNode, enclosing_id: &str, enclosing_kind: NodeKind) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            let kind = child.kind();

            if self.patterns.decorator_kinds.contains(&kind) {
                self.pending_decorators.push(self.text(&child).to_string());
                continue;
            }

            if self.patterns.class_kinds.contains(&kind) {
                self.handle_class(&child, enclosing_id);
                continue;
            }

            if self.patterns.function_kinds.contains(&kind) {
                self.handle_function(&child, enclosing_id, enclosing_kind);
                continue;
            }

            if enclosing_kind == NodeKind::File && self.patterns.import_kinds.contains(&kind) {
                self.handle_import(&child, enclosing_id);
                continue;
            }

            if matches!(enclosing_kind, NodeKind::File | NodeKind::Module | NodeKind::Class | NodeKind::Namespace)
                && self.patterns.variable_kinds.contains(&kind)
            {
                self.handle_top_level_variable(&child, enclosing_id);
                continue;
            }

            // Not a construct of interest itself — recurse through it so
            // declarations nested inside wrapper nodes (e.g. Python's
            // decorated_definition, a JS export_statement) are still found.
            self.walk_children(&child, enclosing_id, enclosing_kind);
        }
    }

    fn handle_class(&mut self, node: &TsNode, enclosing_id: &str) {
        let kind = node.kind();
        let node_kind = if kind.contains("interface") {
            NodeKind::Interface
        } else {
            NodeKind::Class
        };
        let name = self.node_name(node);
        let span = node_to_span(node);
        let id = derive_node_id(self.file_path, node_kind, &name, span.start_line);
        let mut class_node = Node::new(id.clone(), name, node_kind, self.language, NodeLocation {
            file_path: self.file_path.to_string(),
            span,
        });
        class_node = self.attach_pending_decorators(class_node, &id);
        self.add_node(class_node);
        self.add_contains(enclosing_id, &id);

        self.walk_children(node, &id, node_kind);
    }

    fn handle_function(&mut self, node: &TsNode, enclosing_id: &str, enclosing_kind: NodeKind) {
        let node_kind = if matches!(enclosing_kind, NodeKind::Class | NodeKind::Interface) {
            NodeKind::Method
        } else {
            NodeKind::Function
        };
        let name = self.node_name(node);
        let span = node_to_span(node);
        let id = derive_node_id(self.file_path, node_kind, &name, span.start_line);
        let complexity = self.count_complexity(node);
        let mut fn_node = Node::new(id.clone(), name, node_kind, self.language, NodeLocation {
            file_path: self.file_path.to_string(),
            span,
        })
        .with_complexity(complexity);
        fn_node = self.attach_pending_decorators(fn_node, &id);
        self.add_node(fn_node);
        self.add_contains(enclosing_id, &id);

        let call_kinds = self.patterns.call_kinds.clone();
        let calls = self.scoped_descendants(node, &call_kinds);
        for call in calls {
            self.handle_call(&call, &id);
        }

        self.walk_children(node, &id, node_kind);
    }

    fn handle_call(&mut self, call_node: &TsNode, caller_id: &str) {
        let callee_name = call_node
            .child_by_field_name("function")
            .or_else(|| call_node.child(0))
            .map(|n| self.text(&n).to_string())
            .unwrap_or_default();
        let callee_name = callee_name
            .rsplit(['.', ':'])
            .next()
            .unwrap_or(&callee_name)
            .to_string();
        if callee_name.is_empty() {
            return;
        }
        let target = unresolved_target(&callee_name);
        let edge = Edge::new(EdgeKind::Calls, caller_id, target)
            .with_metadata("callee_name", serde_json::Value::String(callee_name));
        self.edges.push(edge);
    }

    fn handle_import(&mut self, node: &TsNode, file_id: &str) {
        let module_name = self.extract_module_name(node);
        if module_name.is_empty() {
            return;
        }
        let span = node_to_span(node);
        let import_id = derive_node_id(self.file_path, NodeKind::Import, &module_name, span.start_line);
        let import_node = Node::new(import_id.clone(), module_name.clone(), NodeKind::Import, self.language, NodeLocation {
            file_path: self.file_path.to_string(),
            span,
        });
        self.add_node(import_node);
        self.add_contains(file_id, &import_id);

        let target = unresolved_target(&module_name);
        self.edges.push(Edge::new(EdgeKind::Imports, file_id, target));
    }

    fn extract_module_name(&self, node: &TsNode) -> String {
        let mut stack = vec![*node];
        while let Some(current) = stack.pop() {
            let kind = current.kind();
            if kind.contains("string") {
                return self.text(&current).trim_matches(['"', '\'']).to_string();
            }
            if kind == "dotted_name" || kind == "scoped_identifier" {
                return self.text(&current).to_string();
            }
            for i in (0..current.child_count()).rev() {
                if let Some(child) = current.child(i) {
                    stack.push(child);
                }
            }
        }
        self.text(node)
            .split_whitespace()
            .nth(1)
            .unwrap_or_default()
            .trim_matches([';', '"', '\''])
            .to_string()
    }

    fn handle_top_level_variable(&mut self, node: &TsNode, enclosing_id: &str) {
        let name = self.node_name(node);
        if name == "<anonymous>" {
            return;
        }
        let is_constant = name.chars().all(|c| c.is_uppercase() || c == '_' || c.is_ascii_digit());
        let node_kind = if is_constant { NodeKind::Constant } else { NodeKind::Variable };
        let span = node_to_span(node);
        let id = derive_node_id(self.file_path, node_kind, &name, span.start_line);
        let var_node = Node::new(id.clone(), name, node_kind, self.language, NodeLocation {
            file_path: self.file_path.to_string(),
            span,
        });
        self.add_node(var_node);
        self.add_contains(enclosing_id, &id);
    }

    fn attach_pending_decorators(&mut self, node: Node, target_id: &str) -> Node {
        if self.pending_decorators.is_empty() {
            return node;
        }
        for (i, text) in std::mem::take(&mut self.pending_decorators).into_iter().enumerate() {
            let span = node.location.span;
            let decorator_id = derive_node_id(self.file_path, NodeKind::Decorator, &text, span.start_line.wrapping_add(i as u32));
            let decorator_node = Node::new(decorator_id.clone(), text, NodeKind::Decorator, self.language, node.location.clone());
            self.nodes.push(decorator_node);
            self.edges.push(Edge::new(EdgeKind::Decorates, decorator_id.as_str(), target_id));
        }
        node
    }

    /// Counts branching constructs in `patterns.complexity_kinds` within
    /// `node`'s own body, base 1 (§4.4 step 5), not descending into nested
    /// function/class declarations (they're counted separately).
    fn count_complexity(&self, node: &TsNode) -> u32 {
        let kinds: Vec<&str> = self.patterns.complexity_kinds.iter().map(|(k, _)| *k).collect();
        1 + self.scoped_descendants(node, &kinds).len() as u32
    }

    /// Depth-first descendants of `node` matching `kinds`, stopping at
    /// (but including) any nested function/class boundary rather than
    /// descending past it — those belong to their own scope.
    fn scoped_descendants<'t>(&self, node: &TsNode<'t>, kinds: &[&str]) -> Vec<TsNode<'t>> {
        let mut result = Vec::new();
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.scoped_descendants_inner(&child, kinds, &mut result);
        }
        result
    }

    fn scoped_descendants_inner<'t>(&self, node: &TsNode<'t>, kinds: &[&str], out: &mut Vec<TsNode<'t>>) {
        let kind = node.kind();
        if kinds.contains(&kind) {
            out.push(*node);
        }
        if self.patterns.function_kinds.contains(&kind) || self.patterns.class_kinds.contains(&kind) {
            return;
        }
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.scoped_descendants_inner(&child, kinds, out);
        }
    }
}

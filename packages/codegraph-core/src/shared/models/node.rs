//! Graph node model (§3 Data Model)

use std::sync::Arc;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use super::Span;

/// Memory-efficient interned string; equal strings across nodes/edges share
/// one allocation.
pub type InternedString = Arc<str>;

#[inline]
pub fn intern(s: impl AsRef<str>) -> InternedString {
    Arc::from(s.as_ref())
}

/// The kind of a declared code element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    File,
    Module,
    Class,
    Interface,
    Function,
    Method,
    Variable,
    Constant,
    Import,
    Decorator,
    Parameter,
    Property,
    Enum,
    TypeAlias,
    Namespace,
    Package,
    Comment,
    Docstring,
}

impl NodeKind {
    /// Canonical lowercase wire value. Never derive this implicitly at a
    /// serialization boundary that might leak the Rust variant name instead.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Module => "module",
            NodeKind::Class => "class",
            NodeKind::Interface => "interface",
            NodeKind::Function => "function",
            NodeKind::Method => "method",
            NodeKind::Variable => "variable",
            NodeKind::Constant => "constant",
            NodeKind::Import => "import",
            NodeKind::Decorator => "decorator",
            NodeKind::Parameter => "parameter",
            NodeKind::Property => "property",
            NodeKind::Enum => "enum",
            NodeKind::TypeAlias => "type-alias",
            NodeKind::Namespace => "namespace",
            NodeKind::Package => "package",
            NodeKind::Comment => "comment",
            NodeKind::Docstring => "docstring",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Some(match s {
            "file" => NodeKind::File,
            "module" => NodeKind::Module,
            "class" => NodeKind::Class,
            "interface" => NodeKind::Interface,
            "function" => NodeKind::Function,
            "method" => NodeKind::Method,
            "variable" => NodeKind::Variable,
            "constant" => NodeKind::Constant,
            "import" => NodeKind::Import,
            "decorator" => NodeKind::Decorator,
            "parameter" => NodeKind::Parameter,
            "property" => NodeKind::Property,
            "enum" => NodeKind::Enum,
            "type-alias" => NodeKind::TypeAlias,
            "namespace" => NodeKind::Namespace,
            "package" => NodeKind::Package,
            "comment" => NodeKind::Comment,
            "docstring" => NodeKind::Docstring,
            _ => return None,
        })
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, NodeKind::Function | NodeKind::Method)
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            NodeKind::File
                | NodeKind::Module
                | NodeKind::Class
                | NodeKind::Interface
                | NodeKind::Namespace
                | NodeKind::Package
        )
    }
}

/// A resolved location: which file, and the span within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLocation {
    pub file_path: String,
    pub span: Span,
}

/// An identified code element (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Deterministic from (file_path, kind, name, start_line); stable across
    /// reparses while those inputs are stable.
    pub id: InternedString,
    pub name: InternedString,
    pub kind: NodeKind,
    /// Normalized language tag, e.g. "python", "rust".
    pub language: InternedString,
    pub location: NodeLocation,
    /// Cyclomatic-style complexity; missing values default to 1 (invariant 5).
    pub complexity: u32,
    pub metadata: AHashMap<String, serde_json::Value>,
}

impl Node {
    pub fn new(
        id: impl Into<InternedString>,
        name: impl Into<InternedString>,
        kind: NodeKind,
        language: impl Into<InternedString>,
        location: NodeLocation,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            language: language.into(),
            location,
            complexity: 1,
            metadata: AHashMap::new(),
        }
    }

    pub fn with_complexity(mut self, complexity: u32) -> Self {
        self.complexity = complexity;
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn file_path(&self) -> &str {
        &self.location.file_path
    }
}

/// Deterministic node id derivation, per §3: `(file_path, kind, name, start_line)`.
pub fn derive_node_id(file_path: &str, kind: NodeKind, name: &str, start_line: u32) -> String {
    let digest = blake3::hash(
        format!("{file_path}\u{0}{}\u{0}{name}\u{0}{start_line}", kind.as_str()).as_bytes(),
    );
    digest.to_hex()[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_id_is_deterministic() {
        let a = derive_node_id("a.py", NodeKind::Function, "foo", 10);
        let b = derive_node_id("a.py", NodeKind::Function, "foo", 10);
        assert_eq!(a, b);
    }

    #[test]
    fn node_id_differs_on_any_input() {
        let base = derive_node_id("a.py", NodeKind::Function, "foo", 10);
        assert_ne!(base, derive_node_id("b.py", NodeKind::Function, "foo", 10));
        assert_ne!(base, derive_node_id("a.py", NodeKind::Method, "foo", 10));
        assert_ne!(base, derive_node_id("a.py", NodeKind::Function, "bar", 10));
        assert_ne!(base, derive_node_id("a.py", NodeKind::Function, "foo", 11));
    }

    #[test]
    fn node_kind_round_trips_through_canonical_string() {
        for kind in [
            NodeKind::File,
            NodeKind::TypeAlias,
            NodeKind::Docstring,
            NodeKind::Method,
        ] {
            assert_eq!(NodeKind::from_str(kind.as_str()), Some(kind));
        }
    }
}

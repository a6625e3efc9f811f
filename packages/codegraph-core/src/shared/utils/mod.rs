//! Utility modules shared across features
//!
//! - `tree_sitter`: Tree-sitter AST traversal and extraction

pub mod tree_sitter;

//! C4's plugin seam (§4.1 `patterns_for`, §4.4 step 4).
//!
//! A plugin supplies only the tree-sitter grammar binding for its language;
//! extraction logic is shared (`extraction::extract`), driven by the
//! `LanguagePatterns` the language registry already hands out. This mirrors
//! the teacher's `LanguagePlugin` trait shape while dropping the
//! BFG/CFG-body-extraction methods that had no counterpart here.

use crate::shared::ports::Language;

pub trait LanguagePlugin: Send + Sync {
    fn language(&self) -> Language;
    fn ts_language(&self) -> tree_sitter::Language;
}

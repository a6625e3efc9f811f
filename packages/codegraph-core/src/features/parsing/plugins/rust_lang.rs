use crate::features::parsing::ports::LanguagePlugin;
use crate::shared::ports::Language;

pub struct RustPlugin;

impl LanguagePlugin for RustPlugin {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_rust::language()
    }
}

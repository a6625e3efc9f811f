use crate::features::parsing::ports::LanguagePlugin;
use crate::shared::ports::Language;

pub struct JavaScriptPlugin;

impl LanguagePlugin for JavaScriptPlugin {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_javascript::language()
    }
}

use crate::features::parsing::ports::LanguagePlugin;
use crate::shared::ports::Language;

pub struct GoPlugin;

impl LanguagePlugin for GoPlugin {
    fn language(&self) -> Language {
        Language::Go
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_go::language()
    }
}

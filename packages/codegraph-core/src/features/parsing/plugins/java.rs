use crate::features::parsing::ports::LanguagePlugin;
use crate::shared::ports::Language;

/// Thinner plugin per §4.4: declarations and calls only, no
/// exception-handler/match-arm complexity detail (see the pattern bank's
/// `complexity_kinds` for Java).
pub struct JavaPlugin;

impl LanguagePlugin for JavaPlugin {
    fn language(&self) -> Language {
        Language::Java
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_java::language()
    }
}

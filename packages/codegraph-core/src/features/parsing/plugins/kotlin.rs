use crate::features::parsing::ports::LanguagePlugin;
use crate::shared::ports::Language;

/// Thinner plugin per §4.4, same caveat as `JavaPlugin`.
pub struct KotlinPlugin;

impl LanguagePlugin for KotlinPlugin {
    fn language(&self) -> Language {
        Language::Kotlin
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_kotlin::language()
    }
}

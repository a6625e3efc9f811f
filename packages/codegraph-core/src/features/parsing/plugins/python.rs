use crate::features::parsing::ports::LanguagePlugin;
use crate::shared::ports::Language;

pub struct PythonPlugin;

impl LanguagePlugin for PythonPlugin {
    fn language(&self) -> Language {
        Language::Python
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_python::language()
    }
}

use crate::features::parsing::ports::LanguagePlugin;
use crate::shared::ports::Language;

pub struct TypeScriptPlugin;

impl LanguagePlugin for TypeScriptPlugin {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    /// The `.tsx` grammar variant (`language_tsx`) is close enough to the
    /// plain grammar for the declaration/call/import patterns this parser
    /// extracts that a single grammar is used for both extensions — JSX
    /// syntax inside a `.tsx` file simply doesn't match any bundled pattern
    /// and is skipped, same as any other unrecognized construct.
    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_typescript::language_typescript()
    }
}

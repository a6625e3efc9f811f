//! Per-language pattern sets (§4.1 `patterns_for`).
//!
//! Patterns are data, not code: a table of tree-sitter node-kind names that
//! the parser (C4) walks against. A language with no bundled pattern set
//! still parses — the file simply contributes a file node and nothing else.

use ahash::AHashMap;

use crate::shared::ports::Language;

/// A single branching/looping construct counted toward cyclomatic-style
/// complexity (§4.4 step 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplexityConstruct {
    If,
    Loop,
    CaseArm,
    Ternary,
    ShortCircuitBool,
    ExceptionHandler,
}

/// The tree-sitter node-kind names this language uses for each extractable
/// construct, plus the constructs counted for complexity.
#[derive(Debug, Clone, Default)]
pub struct LanguagePatterns {
    pub function_kinds: Vec<&'static str>,
    pub class_kinds: Vec<&'static str>,
    pub import_kinds: Vec<&'static str>,
    pub call_kinds: Vec<&'static str>,
    pub variable_kinds: Vec<&'static str>,
    pub decorator_kinds: Vec<&'static str>,
    pub complexity_kinds: Vec<(&'static str, ComplexityConstruct)>,
    /// Node kinds that introduce a new scope for FQN purposes.
    pub scope_kinds: Vec<&'static str>,
}

impl LanguagePatterns {
    pub fn is_empty(&self) -> bool {
        self.function_kinds.is_empty() && self.class_kinds.is_empty()
    }
}

pub struct PatternBank {
    by_language: AHashMap<Language, LanguagePatterns>,
}

impl PatternBank {
    pub fn get(&self, language: Language) -> Option<&LanguagePatterns> {
        self.by_language.get(&language)
    }

    /// The bundled pattern sets, one full-depth entry per language plugin in
    /// `features::parsing::plugins`. Java and Kotlin keep thinner sets (no
    /// exception-handler/match-arm complexity detail) — see DESIGN.md.
    pub fn bundled() -> Self {
        use ComplexityConstruct::*;
        let mut by_language = AHashMap::new();

        by_language.insert(
            Language::Python,
            LanguagePatterns {
                function_kinds: vec!["function_definition"],
                class_kinds: vec!["class_definition"],
                import_kinds: vec!["import_statement", "import_from_statement"],
                call_kinds: vec!["call"],
                variable_kinds: vec!["assignment"],
                decorator_kinds: vec!["decorator"],
                complexity_kinds: vec![
                    ("if_statement", If),
                    ("elif_clause", If),
                    ("for_statement", Loop),
                    ("while_statement", Loop),
                    ("conditional_expression", Ternary),
                    ("boolean_operator", ShortCircuitBool),
                    ("except_clause", ExceptionHandler),
                ],
                scope_kinds: vec!["function_definition", "class_definition", "module"],
            },
        );

        by_language.insert(
            Language::Rust,
            LanguagePatterns {
                function_kinds: vec!["function_item"],
                class_kinds: vec!["struct_item", "enum_item", "trait_item", "impl_item"],
                import_kinds: vec!["use_declaration"],
                call_kinds: vec!["call_expression", "method_call_expression"],
                variable_kinds: vec!["let_declaration"],
                decorator_kinds: vec!["attribute_item"],
                complexity_kinds: vec![
                    ("if_expression", If),
                    ("if_let_expression", If),
                    ("for_expression", Loop),
                    ("while_expression", Loop),
                    ("loop_expression", Loop),
                    ("match_arm", CaseArm),
                    ("binary_expression", ShortCircuitBool),
                ],
                scope_kinds: vec!["function_item", "impl_item", "mod_item"],
            },
        );

        by_language.insert(
            Language::JavaScript,
            LanguagePatterns {
                function_kinds: vec![
                    "function_declaration",
                    "method_definition",
                    "arrow_function",
                    "function_expression",
                ],
                class_kinds: vec!["class_declaration"],
                import_kinds: vec!["import_statement"],
                call_kinds: vec!["call_expression"],
                variable_kinds: vec!["variable_declarator"],
                decorator_kinds: vec!["decorator"],
                complexity_kinds: vec![
                    ("if_statement", If),
                    ("for_statement", Loop),
                    ("for_in_statement", Loop),
                    ("while_statement", Loop),
                    ("switch_case", CaseArm),
                    ("ternary_expression", Ternary),
                    ("catch_clause", ExceptionHandler),
                ],
                scope_kinds: vec!["function_declaration", "class_declaration", "program"],
            },
        );

        by_language.insert(
            Language::TypeScript,
            LanguagePatterns {
                function_kinds: vec![
                    "function_declaration",
                    "method_definition",
                    "arrow_function",
                    "function_signature",
                ],
                class_kinds: vec!["class_declaration", "interface_declaration"],
                import_kinds: vec!["import_statement"],
                call_kinds: vec!["call_expression"],
                variable_kinds: vec!["variable_declarator"],
                decorator_kinds: vec!["decorator"],
                complexity_kinds: vec![
                    ("if_statement", If),
                    ("for_statement", Loop),
                    ("while_statement", Loop),
                    ("switch_case", CaseArm),
                    ("ternary_expression", Ternary),
                    ("catch_clause", ExceptionHandler),
                ],
                scope_kinds: vec!["function_declaration", "class_declaration", "program"],
            },
        );

        by_language.insert(
            Language::Go,
            LanguagePatterns {
                function_kinds: vec!["function_declaration", "method_declaration"],
                class_kinds: vec!["type_declaration"],
                import_kinds: vec!["import_spec"],
                call_kinds: vec!["call_expression"],
                variable_kinds: vec!["var_declaration", "short_var_declaration"],
                decorator_kinds: vec![],
                complexity_kinds: vec![
                    ("if_statement", If),
                    ("for_statement", Loop),
                    ("expression_case", CaseArm),
                    ("binary_expression", ShortCircuitBool),
                ],
                scope_kinds: vec!["function_declaration", "method_declaration", "source_file"],
            },
        );

        // Thinner plugins: declarations/calls only, no complexity detail.
        by_language.insert(
            Language::Java,
            LanguagePatterns {
                function_kinds: vec!["method_declaration", "constructor_declaration"],
                class_kinds: vec!["class_declaration", "interface_declaration", "enum_declaration"],
                import_kinds: vec!["import_declaration"],
                call_kinds: vec!["method_invocation"],
                variable_kinds: vec!["local_variable_declaration"],
                decorator_kinds: vec!["annotation", "marker_annotation"],
                complexity_kinds: vec![("if_statement", If), ("for_statement", Loop)],
                scope_kinds: vec!["method_declaration", "class_declaration"],
            },
        );

        by_language.insert(
            Language::Kotlin,
            LanguagePatterns {
                function_kinds: vec!["function_declaration"],
                class_kinds: vec!["class_declaration", "object_declaration"],
                import_kinds: vec!["import_header"],
                call_kinds: vec!["call_expression"],
                variable_kinds: vec!["property_declaration"],
                decorator_kinds: vec!["annotation"],
                complexity_kinds: vec![("if_expression", If), ("for_statement", Loop)],
                scope_kinds: vec!["function_declaration", "class_declaration"],
            },
        );

        Self { by_language }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_covers_every_grammar_dependency() {
        let bank = PatternBank::bundled();
        for lang in [
            Language::Python,
            Language::Rust,
            Language::JavaScript,
            Language::TypeScript,
            Language::Go,
            Language::Java,
            Language::Kotlin,
        ] {
            assert!(!bank.get(lang).unwrap().is_empty());
        }
    }
}

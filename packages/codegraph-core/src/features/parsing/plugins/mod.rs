//! The seven bundled language plugins (§4.4: "Five language plugins are
//! implemented ... full depth; Java and Kotlin keep a thinner extraction").
//! Each plugin is just a grammar binding — see `extraction.rs` for the
//! shared traversal every plugin runs through.

mod go;
mod java;
mod javascript;
mod kotlin;
mod python;
mod rust_lang;
mod typescript;

use ahash::AHashMap;

use super::ports::LanguagePlugin;
use crate::shared::ports::Language;

pub struct PluginRegistry {
    plugins: AHashMap<Language, Box<dyn LanguagePlugin>>,
}

impl PluginRegistry {
    pub fn bundled() -> Self {
        let mut plugins: AHashMap<Language, Box<dyn LanguagePlugin>> = AHashMap::new();
        plugins.insert(Language::Python, Box::new(python::PythonPlugin));
        plugins.insert(Language::Rust, Box::new(rust_lang::RustPlugin));
        plugins.insert(Language::JavaScript, Box::new(javascript::JavaScriptPlugin));
        plugins.insert(Language::TypeScript, Box::new(typescript::TypeScriptPlugin));
        plugins.insert(Language::Go, Box::new(go::GoPlugin));
        plugins.insert(Language::Java, Box::new(java::JavaPlugin));
        plugins.insert(Language::Kotlin, Box::new(kotlin::KotlinPlugin));
        Self { plugins }
    }

    pub fn get(&self, language: Language) -> Option<&dyn LanguagePlugin> {
        self.plugins.get(&language).map(|b| b.as_ref())
    }
}

//! C1 — Language Registry
//!
//! Maps a file to a language tag and exposes the per-language extraction
//! pattern set consumed by C4. Read-only after construction (§5 "Shared
//! resources"); detection results are memoized since the same extension or
//! shebang is checked for every file in a walk.

mod patterns;

pub use patterns::{ComplexityConstruct, LanguagePatterns};

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache;

use crate::shared::ports::Language;

/// Fixed tie-break order used when more than one detector would match
/// (§4.1 "Ties broken by a fixed preference list").
const PREFERENCE_ORDER: &[Language] = &[
    Language::Rust,
    Language::Go,
    Language::Python,
    Language::TypeScript,
    Language::JavaScript,
    Language::Java,
    Language::Kotlin,
];

fn shebang_language(first_line: &str) -> Option<Language> {
    if !first_line.starts_with("#!") {
        return None;
    }
    let lower = first_line.to_lowercase();
    if lower.contains("python") {
        Some(Language::Python)
    } else if lower.contains("node") {
        Some(Language::JavaScript)
    } else {
        None
    }
}

/// Filename-based detection for extension-less files (§4.1 step 2), e.g.
/// `Dockerfile`. None of the bundled languages currently claim one of these
/// names, so this is a documented hook rather than dead code: a future
/// plugin (e.g. a Dockerfile or Makefile language) registers here.
fn filename_language(_file_name: &str) -> Option<Language> {
    None
}

/// Content-signature detection for extension-less, shebang-less files
/// (§4.1 step 4), e.g. a leading `<?xml` or `#!`-less JSON. None of the
/// bundled languages currently have a content signature distinct from their
/// extension, so this always falls through; kept as an explicit resolution
/// step so a future signature (e.g. XML prologue) has a defined place to live.
fn content_signature_language(_first_bytes: &[u8]) -> Option<Language> {
    None
}

/// Key used to memoize `detect`: the extension plus a hash of the first 64
/// bytes, so two files with the same extension but conflicting shebangs
/// (rare, but possible for extension-less scripts) don't collide.
fn detect_cache_key(file_path: &str, first_bytes: &[u8]) -> String {
    let ext = std::path::Path::new(file_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    let digest = blake3::hash(&first_bytes[..first_bytes.len().min(64)]);
    format!("{ext}:{}", &digest.to_hex()[..16])
}

pub struct LanguageRegistry {
    detect_cache: Cache<String, Option<Language>>,
    patterns: Arc<patterns::PatternBank>,
}

impl LanguageRegistry {
    pub fn new(detection_ttl: Duration) -> Self {
        Self {
            detect_cache: Cache::builder()
                .time_to_live(detection_ttl)
                .max_capacity(50_000)
                .build(),
            patterns: Arc::new(patterns::PatternBank::bundled()),
        }
    }

    /// Resolution order (§4.1): extension, filename, shebang, content
    /// signature, each checked in turn; the first match wins.
    pub fn detect(&self, file_path: &str, first_bytes: Option<&[u8]>) -> Option<Language> {
        let key = detect_cache_key(file_path, first_bytes.unwrap_or(&[]));
        if let Some(hit) = self.detect_cache.get(&key) {
            return hit;
        }

        let result = self.detect_uncached(file_path, first_bytes);
        self.detect_cache.insert(key, result);
        result
    }

    fn detect_uncached(&self, file_path: &str, first_bytes: Option<&[u8]>) -> Option<Language> {
        let path = std::path::Path::new(file_path);

        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if let Some(lang) = Language::from_extension(ext) {
                return Some(lang);
            }
        }

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if let Some(lang) = filename_language(name) {
                return Some(lang);
            }
        }

        if let Some(bytes) = first_bytes {
            if let Ok(text) = std::str::from_utf8(bytes) {
                if let Some(first_line) = text.lines().next() {
                    if let Some(lang) = shebang_language(first_line) {
                        return Some(lang);
                    }
                }
            }
            if let Some(lang) = content_signature_language(bytes) {
                return Some(lang);
            }
        }

        None
    }

    /// All bundled languages, in the fixed tie-break order (§4.1). Used by
    /// callers that need to enumerate every supported language rather than
    /// detect one, e.g. the entry-point classifier's per-language pattern
    /// sweep.
    pub fn supported_languages(&self) -> &'static [Language] {
        PREFERENCE_ORDER
    }

    pub fn extensions_for(&self, language: Language) -> &'static [&'static str] {
        language.extensions()
    }

    pub fn patterns_for(&self, language: Language) -> Option<&LanguagePatterns> {
        self.patterns.get(language)
    }

    pub fn is_supported(&self, file_path: &str) -> bool {
        self.detect(file_path, None).is_some()
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new(Duration::from_secs(1800))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_by_extension() {
        let registry = LanguageRegistry::default();
        assert_eq!(registry.detect("main.rs", None), Some(Language::Rust));
        assert_eq!(registry.detect("app.py", None), Some(Language::Python));
    }

    #[test]
    fn detects_by_shebang_when_extension_unknown() {
        let registry = LanguageRegistry::default();
        let content = b"#!/usr/bin/env python3\nprint('hi')\n";
        assert_eq!(
            registry.detect("script", Some(content)),
            Some(Language::Python)
        );
    }

    #[test]
    fn unknown_extension_with_no_signature_is_none() {
        let registry = LanguageRegistry::default();
        assert_eq!(registry.detect("data.xyz", Some(b"garbage")), None);
    }

    #[test]
    fn detection_is_memoized() {
        let registry = LanguageRegistry::default();
        let first = registry.detect("a.rs", None);
        let second = registry.detect("a.rs", None);
        assert_eq!(first, second);
    }

    #[test]
    fn languages_without_patterns_yield_empty_set() {
        let registry = LanguageRegistry::default();
        // every bundled language currently has a pattern set; this guards
        // the contract that patterns_for never panics for a supported lang.
        for lang in PREFERENCE_ORDER {
            assert!(registry.patterns_for(*lang).is_some());
        }
    }
}

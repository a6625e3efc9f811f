//! §6 "Stdlib allow-list (C6 filter)" — bundled per-language module names
//! excluded from the `entry-points` category so indexing a project doesn't
//! surface `os`, `re`, `json`, and friends as entry points. Replaceable at
//! the configuration layer; this module only supplies the bundled default.

use std::sync::LazyLock;

use ahash::AHashSet;

fn python_stdlib() -> AHashSet<&'static str> {
    [
        "os", "sys", "re", "json", "itertools", "collections", "functools", "typing", "pathlib",
        "subprocess", "logging", "abc", "dataclasses", "enum", "math", "random", "time",
        "datetime", "asyncio", "threading", "multiprocessing", "argparse", "unittest", "io",
        "shutil", "copy", "contextlib", "traceback", "warnings", "socket", "http", "urllib",
        "string", "textwrap", "struct", "hashlib", "base64", "uuid", "csv", "sqlite3", "glob",
    ]
    .into_iter()
    .collect()
}

fn javascript_stdlib() -> AHashSet<&'static str> {
    [
        "fs", "path", "http", "https", "os", "util", "events", "crypto", "child_process",
        "stream", "url", "querystring", "net", "assert", "buffer", "zlib", "readline", "process",
    ]
    .into_iter()
    .collect()
}

fn go_stdlib() -> AHashSet<&'static str> {
    [
        "fmt", "os", "io", "net/http", "strings", "strconv", "sync", "context", "time", "errors",
        "bytes", "bufio", "encoding/json", "sort", "math", "regexp", "log", "path/filepath",
        "reflect",
    ]
    .into_iter()
    .collect()
}

fn java_stdlib() -> AHashSet<&'static str> {
    [
        "java.lang", "java.util", "java.io", "java.nio", "java.net", "java.time", "java.math",
        "java.text", "java.security", "javax.annotation",
    ]
    .into_iter()
    .collect()
}

fn kotlin_stdlib() -> AHashSet<&'static str> {
    ["kotlin", "kotlin.collections", "kotlin.io", "kotlin.text", "kotlin.coroutines", "java.util"]
        .into_iter()
        .collect()
}

fn rust_stdlib() -> AHashSet<&'static str> {
    ["std", "core", "alloc", "proc_macro", "test"].into_iter().collect()
}

static PYTHON: LazyLock<AHashSet<&'static str>> = LazyLock::new(python_stdlib);
static JAVASCRIPT: LazyLock<AHashSet<&'static str>> = LazyLock::new(javascript_stdlib);
static TYPESCRIPT: LazyLock<AHashSet<&'static str>> = LazyLock::new(javascript_stdlib);
static GO: LazyLock<AHashSet<&'static str>> = LazyLock::new(go_stdlib);
static JAVA: LazyLock<AHashSet<&'static str>> = LazyLock::new(java_stdlib);
static KOTLIN: LazyLock<AHashSet<&'static str>> = LazyLock::new(kotlin_stdlib);
static RUST: LazyLock<AHashSet<&'static str>> = LazyLock::new(rust_stdlib);

/// Whether `module_name` is a bundled stdlib/runtime module for `language`.
/// Unknown languages never match (fail open toward including the node).
pub fn is_stdlib(language: &str, module_name: &str) -> bool {
    let table = match language {
        "python" => &PYTHON,
        "javascript" => &JAVASCRIPT,
        "typescript" => &TYPESCRIPT,
        "go" => &GO,
        "java" => &JAVA,
        "kotlin" => &KOTLIN,
        "rust" => &RUST,
        _ => return false,
    };
    table.contains(module_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_stdlib_modules() {
        assert!(is_stdlib("python", "os"));
        assert!(is_stdlib("python", "re"));
        assert!(is_stdlib("go", "fmt"));
        assert!(!is_stdlib("python", "requests"));
    }

    #[test]
    fn unknown_language_never_matches() {
        assert!(!is_stdlib("cobol", "anything"));
    }
}

//! C2 — Ignore Matcher
//!
//! Loaded once per project root, then read-only for the lifetime of the
//! analysis session (§3 "Lifecycles", §5 "Shared resources"). Compiles every
//! ignore file found scanning upward from the root into one matcher; no
//! further filesystem reads for ignore state happen during the walk (§4.2's
//! hard performance contract).

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::shared::models::{CodegraphError, Result};

pub struct IgnoreMatcher {
    root: PathBuf,
    compiled: Gitignore,
}

impl IgnoreMatcher {
    /// Scans upward from `root` for files named anything in
    /// `ignore_file_names`, concatenating them in encounter order
    /// (root-level overrides nested, matching `ignore`'s own semantics for
    /// directory-scoped `.gitignore` precedence).
    pub fn load(root: impl AsRef<Path>, ignore_file_names: &[String]) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let mut builder = GitignoreBuilder::new(&root);

        for entry in walkdir::WalkDir::new(&root)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let file_name = match entry.file_name().to_str() {
                Some(n) => n,
                None => continue,
            };
            if ignore_file_names.iter().any(|n| n == file_name) {
                if let Some(err) = builder.add(entry.path()) {
                    return Err(CodegraphError::source_unreadable(format!(
                        "failed to parse ignore file: {err}"
                    ))
                    .with_file(entry.path().to_string_lossy().to_string()));
                }
            }
        }

        let compiled = builder
            .build()
            .map_err(|e| CodegraphError::internal(format!("failed to compile ignore patterns: {e}")))?;

        Ok(Self { root, compiled })
    }

    /// `load` with the platform-conventional ignore file name only.
    pub fn load_default(root: impl AsRef<Path>) -> Result<Self> {
        Self::load(root, &[".gitignore".to_string()])
    }

    /// Takes the entry type the caller already knows (e.g. from a
    /// `walkdir`/`ignore` entry's own `file_type()`) so checking ignore
    /// state during a walk never costs a second filesystem stat.
    pub fn is_ignored(&self, path: impl AsRef<Path>, is_dir: bool) -> bool {
        matches!(
            self.compiled.matched(path.as_ref(), is_dir),
            ignore::Match::Ignore(_)
        )
    }

    /// Convenience for callers without an entry type in hand; stats the
    /// path to determine it. Not used on the hot walk path (see
    /// `is_ignored`).
    pub fn is_ignored_path(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        self.is_ignored(path, path.is_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn ignores_matched_pattern() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\nbuild/\n").unwrap();
        fs::create_dir(dir.path().join("build")).unwrap();
        fs::write(dir.path().join("app.log"), "").unwrap();
        fs::write(dir.path().join("main.rs"), "").unwrap();

        let matcher = IgnoreMatcher::load_default(dir.path()).unwrap();
        assert!(matcher.is_ignored_path(dir.path().join("app.log")));
        assert!(matcher.is_ignored_path(dir.path().join("build")));
        assert!(!matcher.is_ignored_path(dir.path().join("main.rs")));
    }

    #[test]
    fn negation_unignores_a_path() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n!keep.log\n").unwrap();
        fs::write(dir.path().join("keep.log"), "").unwrap();
        fs::write(dir.path().join("drop.log"), "").unwrap();

        let matcher = IgnoreMatcher::load_default(dir.path()).unwrap();
        assert!(!matcher.is_ignored_path(dir.path().join("keep.log")));
        assert!(matcher.is_ignored_path(dir.path().join("drop.log")));
    }

    #[test]
    fn load_is_idempotent() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        let a = IgnoreMatcher::load_default(dir.path()).unwrap();
        let b = IgnoreMatcher::load_default(dir.path()).unwrap();
        assert_eq!(
            a.is_ignored_path(dir.path().join("x.log")),
            b.is_ignored_path(dir.path().join("x.log"))
        );
    }
}

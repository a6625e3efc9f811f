//! Unified error type for the codegraph-core crate
//!
//! Error kinds mirror the failure modes of a code graph engine: per-file
//! parse failures, cache degradation, stream unavailability, and invariant
//! violations during graph mutation. Every kind maps to a canonical lowercase
//! string so it travels unambiguously across the cache/CDC boundary.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Permission, I/O, or encoding failure on a file.
    SourceUnreadable,
    /// Language has no pattern set; not a true failure.
    PatternUnsupported,
    /// A pattern evaluation crashed on malformed input.
    PatternFailure,
    /// L2 cache unreachable.
    CacheDegraded,
    /// Durable stream unreachable.
    StreamUnavailable,
    /// Relationship added with both endpoints unknown after resolution.
    InvariantViolation,
    /// Cooperative cancellation.
    Cancelled,
    /// Configuration is invalid at startup.
    Config,
    /// Generic I/O error.
    Io,
    /// Storage/serialization error.
    Storage,
    /// Bug / unreachable state.
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SourceUnreadable => "source-unreadable",
            ErrorKind::PatternUnsupported => "pattern-unsupported",
            ErrorKind::PatternFailure => "pattern-failure",
            ErrorKind::CacheDegraded => "cache-degraded",
            ErrorKind::StreamUnavailable => "stream-unavailable",
            ErrorKind::InvariantViolation => "invariant-violation",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Config => "config",
            ErrorKind::Io => "io",
            ErrorKind::Storage => "storage",
            ErrorKind::Internal => "internal",
        }
    }
}

/// Unified error type, carrying optional file/line context and a source chain.
#[derive(Debug)]
pub struct CodegraphError {
    pub kind: ErrorKind,
    pub message: String,
    pub file_path: Option<String>,
    pub line: Option<u32>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl CodegraphError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file_path: None,
            line: None,
            source: None,
        }
    }

    pub fn with_file(mut self, file_path: impl Into<String>) -> Self {
        self.file_path = Some(file_path.into());
        self
    }

    pub fn with_line(mut self, line: u32) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn source_unreadable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SourceUnreadable, message)
    }

    pub fn pattern_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PatternUnsupported, message)
    }

    pub fn pattern_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::PatternFailure, message)
    }

    pub fn cache_degraded(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CacheDegraded, message)
    }

    pub fn stream_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::StreamUnavailable, message)
    }

    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvariantViolation, message)
    }

    pub fn cancelled(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cancelled, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }
}

impl fmt::Display for CodegraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.as_str(), self.message)?;
        if let Some(ref file) = self.file_path {
            write!(f, " in {}", file)?;
            if let Some(line) = self.line {
                write!(f, ":{}", line)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for CodegraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

pub type Result<T> = std::result::Result<T, CodegraphError>;

impl From<std::io::Error> for CodegraphError {
    fn from(err: std::io::Error) -> Self {
        CodegraphError::new(ErrorKind::Io, format!("I/O error: {err}")).with_source(err)
    }
}

impl From<serde_json::Error> for CodegraphError {
    fn from(err: serde_json::Error) -> Self {
        CodegraphError::storage(format!("JSON serialization error: {err}")).with_source(err)
    }
}

impl From<rusqlite::Error> for CodegraphError {
    fn from(err: rusqlite::Error) -> Self {
        CodegraphError::storage(format!("SQLite error: {err}")).with_source(err)
    }
}

impl<T> From<std::sync::PoisonError<T>> for CodegraphError {
    fn from(_err: std::sync::PoisonError<T>) -> Self {
        CodegraphError::internal("lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodegraphError::source_unreadable("permission denied")
            .with_file("test.py")
            .with_line(42);

        let msg = format!("{}", err);
        assert!(msg.contains("source-unreadable"));
        assert!(msg.contains("permission denied"));
        assert!(msg.contains("test.py"));
        assert!(msg.contains("42"));
    }

    #[test]
    fn test_error_kind_strings_are_canonical() {
        assert_eq!(ErrorKind::CacheDegraded.as_str(), "cache-degraded");
        assert_eq!(ErrorKind::InvariantViolation.as_str(), "invariant-violation");
    }
}

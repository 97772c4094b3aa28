//! Error types for the rewrite core.

use thiserror::Error;

/// Errors raised while walking or rewriting a document.
///
/// Missing or mistyped fields are never errors: they degrade to "no rewrite".
/// A parsed document can only be rejected for nesting deeper than the walker
/// allows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// The document nests containers deeper than the configured bound.
    #[error("document nesting depth exceeds limit: depth {depth} (max {max})")]
    DepthExceeded { depth: usize, max: usize },

    /// The input handed to [`JsonTreeVisitor::parse`](crate::JsonTreeVisitor::parse) is not JSON.
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Convenience alias for rewrite results.
pub type RewriteResult<T> = Result<T, RewriteError>;

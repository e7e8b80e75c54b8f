//! Error types for baml-trace
//!
//! Only the wrapped function's own error ever crosses the public boundary.
//! `BackendError` is isolated at the emission layer (logged, never
//! propagated) and `ParseError` degrades to an opaque payload passthrough.

use thiserror::Error;

/// Result type alias for trace-backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors reported by a trace backend implementation
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("experiment error: {0}")]
    Experiment(String),

    #[error("span not found: {0}")]
    SpanNotFound(String),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("backend error: {0}")]
    Other(String),
}

/// Errors raised while parsing a provider payload
///
/// Never surfaced to callers: the provider dispatch layer catches these
/// and falls back to the opaque passthrough form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("unexpected payload shape: {0}")]
    UnexpectedShape(String),
}

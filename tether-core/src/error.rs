//! Error types shared across the engine.
//!
//! Nothing in the engine aborts the dependency graph: every variant here is
//! either logged and recovered from locally, or handed to the runtime's
//! [`ErrorBoundary`](crate::reactive::ErrorBoundary).

use thiserror::Error;

/// Errors produced by the reactive engine and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// An expression could not be evaluated. The value is treated as
    /// `undefined` by bindings.
    #[error("failed to evaluate `{expression}`: {reason}")]
    Eval { expression: String, reason: String },

    /// A dotted property path did not resolve to an assignable location.
    #[error("cannot resolve path `{path}`")]
    UnresolvedPath { path: String },

    /// An array index or length beyond the largest an array can hold.
    #[error("array index {index} is out of range")]
    IndexOutOfRange { index: usize },

    /// Assignment to a derived (computed) property was rejected.
    #[error("cannot assign to derived property `{key}`")]
    ReadOnlyDerivation { key: String },

    /// A list region's source did not evaluate to an array.
    #[error("list source evaluated to {found}, expected an array")]
    NotAList { found: &'static str },

    /// A key function failed; the positional index was used instead.
    #[error("key function failed at index {index}: {reason}")]
    KeyFallback { index: usize, reason: String },

    /// A computation body, accessor or template panicked.
    #[error("computation panicked: {message}")]
    Panicked { message: String },

    /// Runtime configuration could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Error types for waymark

use thiserror::Error;

/// Result type alias for waymark operations
pub type Result<T> = std::result::Result<T, Error>;

/// Waymark error types
///
/// Matching never fails: a path nobody claims is a normal `match: false`
/// outcome. Errors come from building patterns, from route handlers and from
/// the host environment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Route pattern compilation error
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// History API failure reported by the environment
    #[error("history error: {0}")]
    History(String),

    /// A route handler failed to produce its payload
    #[error("route handler for {path:?} failed: {reason}")]
    Handler { path: String, reason: String },

    /// Route state could not be encoded for the store
    #[error("encode error: {0}")]
    EncodeError(String),
}

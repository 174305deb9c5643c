//! Error types for bundle construction
//!
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations. All failures are programming/input errors raised
//! synchronously at the offending call; nothing at this layer is transient
//! or retryable.

use std::io;
use thiserror::Error;

/// Result type alias for bundle operations
pub type BundleResult<T> = std::result::Result<T, BundleError>;

/// Errors that can occur while accumulating or encoding a bundle
#[derive(Debug, Error)]
pub enum BundleError {
    /// An argument violated the add contract (empty name, malformed snapshot)
    #[error("Invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        /// Name of the offending parameter
        argument: String,
        /// Description of the violation
        reason: String,
    },

    /// A named query was added under a name that is already taken
    #[error("Named query already exists: {0}")]
    NameConflict(String),

    /// Element payload serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (file writer only)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A snapshot collaborator failed to produce its encoding
    #[error("Snapshot error: {0}")]
    Snapshot(String),
}

impl BundleError {
    /// Create an invalid-argument error naming the offending parameter
    pub fn invalid_argument(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument: argument.into(),
            reason: reason.into(),
        }
    }

    /// Create a name-conflict error for a duplicate query name
    pub fn name_conflict(name: impl Into<String>) -> Self {
        Self::NameConflict(name.into())
    }

    /// Create a snapshot collaborator error
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot(msg.into())
    }
}

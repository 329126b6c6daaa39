//! Error types for document store operations

use thiserror::Error;

/// Result type for document store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a document store
///
/// The signaling layer treats every store failure as terminal for the user
/// action that triggered it: reported, never retried.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// `update` addressed a document that does not exist
    #[error("Document not found: {number}")]
    NotFound { number: String },

    /// The backing store failed (network, quota, permission, ...)
    #[error("Store backend error: {reason}")]
    Backend { reason: String },

    /// A document could not be encoded or decoded
    #[error("Document serialization error: {reason}")]
    Serialization { reason: String },
}

impl StoreError {
    /// Create a not-found error
    pub fn not_found(number: impl Into<String>) -> Self {
        Self::NotFound {
            number: number.into(),
        }
    }

    /// Create a backend error
    pub fn backend(reason: impl Into<String>) -> Self {
        Self::Backend {
            reason: reason.into(),
        }
    }

    /// Stable category name for diagnostics grouping
    pub fn category(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Backend { .. } => "backend",
            Self::Serialization { .. } => "serialization",
        }
    }
}

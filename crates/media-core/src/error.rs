//! Error types for media transport operations

use thiserror::Error;

/// Result type for media transport operations
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors reported by a media transport or capture device
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    /// Offer/answer negotiation failed
    #[error("Negotiation failed: {reason}")]
    NegotiationFailed { reason: String },

    /// The operation is not valid in the transport's current state
    #[error("Invalid transport state: {message}")]
    InvalidState { message: String },

    /// A candidate could not be applied
    #[error("Candidate rejected: {reason}")]
    CandidateRejected { reason: String },

    /// Local capture failed (no device, permission denied, ...)
    #[error("Media device error: {reason}")]
    MediaDevice { reason: String },

    /// The transport has been closed; no further operations are possible
    #[error("Transport closed")]
    Closed,

    /// Catch-all for engine-internal failures
    #[error("Internal transport error: {message}")]
    Internal { message: String },
}

impl TransportError {
    /// Create a negotiation failure error
    pub fn negotiation_failed(reason: impl Into<String>) -> Self {
        Self::NegotiationFailed {
            reason: reason.into(),
        }
    }

    /// Create an invalid-state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a media device error
    pub fn media_device(reason: impl Into<String>) -> Self {
        Self::MediaDevice {
            reason: reason.into(),
        }
    }

    /// Stable category name for diagnostics grouping
    pub fn category(&self) -> &'static str {
        match self {
            Self::NegotiationFailed { .. } => "negotiation",
            Self::InvalidState { .. } => "state",
            Self::CandidateRejected { .. } => "candidate",
            Self::MediaDevice { .. } => "device",
            Self::Closed => "closed",
            Self::Internal { .. } => "internal",
        }
    }
}

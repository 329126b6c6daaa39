//! Error types for signaling coordination
//!
//! Every coordinator operation catches at its own boundary: the error is
//! logged, surfaced as a user-visible status event, and returned typed.
//! Nothing here is fatal - each failure leaves the coordinator in a state
//! where the same or an earlier step can be retried manually.

use thiserror::Error;

use talkie_media_core::TransportError;
use talkie_store_core::StoreError;

use crate::call::{SignalingOperation, SignalingState};
use crate::identity::{PartyRole, ProfileError};

/// Result type for signaling coordination operations
pub type SignalingResult<T> = Result<T, SignalingError>;

/// Errors reported by the signaling coordinator
#[derive(Debug, Error, Clone)]
pub enum SignalingError {
    /// Validation: the identifier for a role is empty or unset. Caught
    /// before any I/O; no state changes.
    #[error("Missing {role} identifier")]
    MissingIdentifier { role: PartyRole },

    /// The fetched document has no offer yet; the counterpart step has not
    /// completed
    #[error("Offer not found for {number}")]
    OfferNotFound { number: String },

    /// The fetched document has no answer yet
    #[error("Answer not found for {number}")]
    AnswerNotFound { number: String },

    /// The counterpart's candidate array is absent or empty
    #[error("Candidates not found for {number}")]
    CandidatesNotFound { number: String },

    /// The operation is not legal from the current handshake state
    #[error("Operation {operation} is not permitted in state {from}")]
    InvalidTransition {
        from: SignalingState,
        operation: SignalingOperation,
    },

    /// The shared document store failed; reported, never retried
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The media transport or capture failed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Local profile persistence failed
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// A collaborator was missing or misconfigured at build time
    #[error("Coordinator configuration error: {message}")]
    Configuration { message: String },

    /// Invariant violation inside the coordinator itself
    #[error("Internal signaling error: {message}")]
    Internal { message: String },
}

impl SignalingError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Stable category name for diagnostics grouping
    ///
    /// Mirrors the failure taxonomy: validation, missing data, store,
    /// transport, state.
    pub fn category(&self) -> &'static str {
        match self {
            Self::MissingIdentifier { .. } => "validation",
            Self::OfferNotFound { .. }
            | Self::AnswerNotFound { .. }
            | Self::CandidatesNotFound { .. } => "missing_data",
            Self::InvalidTransition { .. } => "state",
            Self::Store(_) => "store",
            Self::Transport(_) => "transport",
            Self::Profile(_) => "profile",
            Self::Configuration { .. } => "configuration",
            Self::Internal { .. } => "internal",
        }
    }

    /// True when re-triggering the same step later can succeed (the
    /// counterpart simply has not completed its step yet)
    pub fn is_retriable_later(&self) -> bool {
        matches!(
            self,
            Self::OfferNotFound { .. }
                | Self::AnswerNotFound { .. }
                | Self::CandidatesNotFound { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_follow_the_taxonomy() {
        assert_eq!(
            SignalingError::MissingIdentifier {
                role: PartyRole::Caller
            }
            .category(),
            "validation"
        );
        assert_eq!(
            SignalingError::OfferNotFound {
                number: "111".into()
            }
            .category(),
            "missing_data"
        );
        assert_eq!(
            SignalingError::from(StoreError::backend("quota")).category(),
            "store"
        );
    }

    #[test]
    fn missing_data_errors_are_retriable() {
        assert!(SignalingError::AnswerNotFound {
            number: "111".into()
        }
        .is_retriable_later());
        assert!(!SignalingError::MissingIdentifier {
            role: PartyRole::Receiver
        }
        .is_retriable_later());
    }
}

//! Event surface of the signaling coordinator
//!
//! Two delivery paths, both optional for the embedding application:
//!
//! - a broadcast channel of [`SignalingEvent`] values
//!   ([`SignalingCoordinator::subscribe`]), suitable for driving a UI or a
//!   test harness
//! - an [`SignalingEventHandler`] registered with
//!   [`SignalingCoordinator::set_event_handler`], called inline from the
//!   coordinator for the three things a thin UI actually renders: state
//!   changes, transient status messages, and remote tracks
//!
//! Every event also carries a short human-readable status text
//! ([`SignalingEvent::status_text`]) - the equivalent of the transient
//! toast channel in the original app.
//!
//! [`SignalingCoordinator::subscribe`]: crate::SignalingCoordinator::subscribe
//! [`SignalingCoordinator::set_event_handler`]: crate::SignalingCoordinator::set_event_handler

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use talkie_media_core::{IceConnectionState, MediaStreamTrack};

use crate::call::{SignalingOperation, SignalingState};
use crate::identity::PartyRole;

/// Everything observable about the coordinator, as it happens
#[derive(Debug, Clone, PartialEq)]
pub enum SignalingEvent {
    /// The handshake state machine moved
    StateChanged {
        previous: SignalingState,
        current: SignalingState,
    },

    /// An identifier was validated and persisted
    PartyStored { role: PartyRole, number: String },

    /// The offer is applied locally and persisted in the store
    OfferCreated { number: String },

    /// The answer is applied locally and persisted in the store
    AnswerCreated { number: String },

    /// The answer was pulled and applied as remote description
    AnswerFetched { number: String },

    /// One candidate from the counterpart's array was applied
    CandidateApplied { candidate: String },

    /// The whole counterpart array was applied
    CandidatesFetched { number: String, count: usize },

    /// A discovered local candidate was appended to the store
    CandidateStored { number: String },

    /// A local candidate was discovered by the transport
    CandidateDiscovered { candidate: String },

    /// Candidate gathering reported an error; non-fatal, negotiation may
    /// still succeed
    CandidateGatheringError { details: String },

    /// Local media was captured and attached to the transport
    MediaReady { stream_id: String, track_count: usize },

    /// A remote track arrived and was added to the remote stream in place
    RemoteTrackAdded { track: MediaStreamTrack },

    /// Connectivity checks succeeded; the call is live
    IceEstablished { state: IceConnectionState },

    /// The transport wants a new offer/answer round; nothing is done
    /// automatically, re-trigger `create_offer` manually
    NegotiationNeeded,

    /// The transport's connection state reached closed
    ConnectionClosed,

    /// The transport's connection state reached failed
    ConnectionFailed,

    /// The transport's own signaling state reached closed
    TransportSignalingClosed,

    /// The session was torn down by `end_call`
    CallEnded,

    /// An operation failed; the error was already logged and typed
    OperationFailed {
        operation: SignalingOperation,
        message: String,
    },
}

impl SignalingEvent {
    /// Short transient message for the user-visible status channel
    pub fn status_text(&self) -> String {
        match self {
            Self::StateChanged { current, .. } => format!("State: {current}."),
            Self::PartyStored { role, .. } => format!("{} stored.", capitalize(role)),
            Self::OfferCreated { .. } => "Offer created.".to_string(),
            Self::AnswerCreated { .. } => "Answer created.".to_string(),
            Self::AnswerFetched { .. } => "Answer fetched.".to_string(),
            Self::CandidateApplied { candidate } => format!("Candidate added: {candidate}"),
            Self::CandidatesFetched { count, .. } => format!("{count} candidates fetched."),
            Self::CandidateStored { .. } => "ICE candidate stored.".to_string(),
            Self::CandidateDiscovered { .. } => "New ICE candidate found.".to_string(),
            Self::CandidateGatheringError { details } => {
                format!("ICE candidate error: {details}")
            }
            Self::MediaReady { .. } => "Media stream obtained.".to_string(),
            Self::RemoteTrackAdded { .. } => "Remote track added.".to_string(),
            Self::IceEstablished { state } => {
                format!("ICE connection established: {state:?}.")
            }
            Self::NegotiationNeeded => "Negotiation needed.".to_string(),
            Self::ConnectionClosed => "Connection closed.".to_string(),
            Self::ConnectionFailed => "Connection failed.".to_string(),
            Self::TransportSignalingClosed => "Signaling state closed.".to_string(),
            Self::CallEnded => "Call ended.".to_string(),
            Self::OperationFailed { operation, message } => {
                format!("Failed to {}: {message}", operation.to_string().replace('_', " "))
            }
        }
    }
}

fn capitalize(role: &PartyRole) -> String {
    let name = role.storage_key();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// A state machine move, as delivered to handlers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChangedInfo {
    /// State before the move
    pub previous: SignalingState,
    /// State after the move
    pub current: SignalingState,
}

/// One transient status message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusInfo {
    /// Human-readable text, short enough for a toast
    pub message: String,
    /// When the coordinator emitted it
    pub timestamp: DateTime<Utc>,
}

/// Inline callbacks for the things a thin UI renders
///
/// Implementations must be cheap; they run on the coordinator's task.
#[async_trait]
pub trait SignalingEventHandler: Send + Sync {
    /// The handshake state machine moved
    async fn on_state_changed(&self, info: StateChangedInfo);

    /// A transient status message should be shown
    async fn on_status(&self, info: StatusInfo);

    /// A remote track arrived; the remote stream is ready to (re)render
    async fn on_remote_track(&self, track: MediaStreamTrack);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_texts_match_the_user_facing_wording() {
        assert_eq!(
            SignalingEvent::OfferCreated {
                number: "111".into()
            }
            .status_text(),
            "Offer created."
        );
        assert_eq!(
            SignalingEvent::PartyStored {
                role: PartyRole::Caller,
                number: "111".into()
            }
            .status_text(),
            "Caller stored."
        );
        assert_eq!(
            SignalingEvent::ConnectionClosed.status_text(),
            "Connection closed."
        );
    }

    #[test]
    fn operation_failures_read_naturally() {
        let text = SignalingEvent::OperationFailed {
            operation: SignalingOperation::CreateOffer,
            message: "store backend error: quota".into(),
        }
        .status_text();
        assert!(text.starts_with("Failed to create offer:"));
    }
}

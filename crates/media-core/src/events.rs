//! Asynchronous event feed emitted by a media transport
//!
//! The engine delivers these on a broadcast channel obtained from
//! [`MediaTransport::subscribe`]; the signaling coordinator consumes them in
//! its reaction loop for the lifetime of the session.
//!
//! [`MediaTransport::subscribe`]: crate::MediaTransport::subscribe

use crate::types::{
    IceCandidateInit, IceConnectionState, MediaStreamTrack, PeerConnectionState,
    TransportSignalingState,
};

/// One event from the transport's asynchronous feed
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    /// Aggregate connection state changed
    ConnectionStateChange(PeerConnectionState),

    /// A new local candidate was discovered and should be sent to the peer
    /// immediately (trickle exchange)
    IceCandidate(IceCandidateInit),

    /// Candidate gathering finished. This is the null-candidate sentinel: it
    /// carries no data and is never persisted.
    IceGatheringComplete,

    /// A candidate failed to gather. Non-fatal; connections can still be
    /// made when some candidates error.
    IceCandidateError {
        /// Engine-provided diagnostic text
        details: String,
    },

    /// Connectivity-check state changed
    IceConnectionStateChange(IceConnectionState),

    /// The engine wants a new offer/answer round. May fire multiple times;
    /// each firing is independent.
    NegotiationNeeded,

    /// The transport's own offer/answer exchange state changed
    SignalingStateChange(TransportSignalingState),

    /// A remote media track arrived
    Track(MediaStreamTrack),
}

//! Trait seams between the signaling layer and the media engine
//!
//! The coordinator only ever talks to these traits. A production build wires
//! them to a real peer-connection engine; tests wire them to the
//! [`mock`](crate::mock) implementations.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::TransportResult;
use crate::events::TransportEvent;
use crate::types::{
    IceCandidateInit, MediaConstraints, MediaStream, MediaStreamTrack, OfferOptions,
    SessionDescription,
};

/// One peer-to-peer transport session
///
/// Lifecycle is create-on-call-start, close-on-call-end: a coordinator owns
/// exactly one session and a second call gets a fresh one, so stale
/// negotiation state never leaks across calls.
///
/// All operations are asynchronous and may fail; none of them retry
/// internally. Duplicate candidates are treated as no-ops by conforming
/// engines, so re-applying an already-added candidate must not fail.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Create an offer description for the configured media sections
    async fn create_offer(&self, options: OfferOptions) -> TransportResult<SessionDescription>;

    /// Create an answer to the currently applied remote offer
    async fn create_answer(&self) -> TransportResult<SessionDescription>;

    /// Apply a description produced by this side
    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> TransportResult<()>;

    /// Apply a description received from the peer
    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> TransportResult<()>;

    /// Feed one remote candidate into connectivity checking
    async fn add_ice_candidate(&self, candidate: IceCandidateInit) -> TransportResult<()>;

    /// Attach a locally captured track, grouped under the given stream id
    async fn add_track(&self, track: MediaStreamTrack, stream_id: &str) -> TransportResult<()>;

    /// Tear the session down. Further operations fail with
    /// [`TransportError::Closed`](crate::TransportError::Closed).
    async fn close(&self) -> TransportResult<()>;

    /// Subscribe to the transport's asynchronous event feed
    fn subscribe(&self) -> broadcast::Receiver<TransportEvent>;
}

/// Local capture devices
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Capture a local stream satisfying the given constraints
    async fn get_user_media(&self, constraints: MediaConstraints) -> TransportResult<MediaStream>;
}

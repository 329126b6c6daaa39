//! # Talkie Media Core - Transport Session Contracts
//!
//! This crate defines the contracts a peer-to-peer media engine must satisfy
//! for the talkie signaling layer: session-description negotiation
//! (offer/answer), incremental candidate exchange, local media capture, and
//! an asynchronous event feed for transport state changes.
//!
//! The real media engine (capture, codecs, NAT traversal, encryption) lives
//! outside this workspace. Everything here is either a payload type that
//! crosses the signaling channel or a trait seam the coordinator drives:
//!
//! - [`MediaTransport`] - one peer connection: negotiation calls plus the
//!   [`TransportEvent`] broadcast feed
//! - [`MediaDevices`] - local capture (`get_user_media`)
//! - [`SessionDescription`] / [`IceCandidateInit`] - the opaque negotiation
//!   payloads that get written to the shared document store
//!
//! The [`mock`] module provides scriptable in-memory implementations of both
//! traits so the signaling layer can be exercised end-to-end without a real
//! engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use talkie_media_core::{MediaTransport, OfferOptions};
//! use talkie_media_core::mock::MockMediaTransport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = MockMediaTransport::new();
//! let _events = transport.subscribe();
//!
//! let offer = transport.create_offer(OfferOptions::audio_video()).await?;
//! transport.set_local_description(offer.clone()).await?;
//! assert!(offer.is_offer());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod events;
pub mod mock;
pub mod transport;
pub mod types;

pub use error::{TransportError, TransportResult};
pub use events::TransportEvent;
pub use transport::{MediaDevices, MediaTransport};
pub use types::{
    FacingMode, IceCandidateInit, IceConnectionState, MediaConstraints, MediaStream,
    MediaStreamTrack, OfferOptions, PeerConnectionState, SdpType, SessionDescription,
    TrackKind, TransportSignalingState, VideoConstraints,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Talkie Call Core - Signaling Coordination Layer
//!
//! Two devices establish a peer-to-peer call by exchanging connection
//! metadata (session descriptions and network candidates) through a shared
//! document store. This crate owns that handshake: the explicit signaling
//! state machine, the party identity state that keys the documents, and the
//! [`SignalingCoordinator`] that maps user-triggered steps and asynchronous
//! transport events onto store reads and writes.
//!
//! The store, the media engine, and local profile persistence are external
//! collaborators consumed behind traits
//! ([`CallStore`](talkie_store_core::CallStore),
//! [`MediaTransport`](talkie_media_core::MediaTransport) /
//! [`MediaDevices`](talkie_media_core::MediaDevices), [`ProfileStore`]).
//!
//! ## The handshake
//!
//! Every step is user-triggered; there is no automatic advancement, no
//! timeout, and no retry. The caller creates and persists an offer; the
//! receiver answers against it; both sides trickle candidates through the
//! document's append-only arrays and pull the other side's array on demand:
//!
//! ```text
//! caller device                    store                   receiver device
//! store_party ──── {number} ───────►│
//! create_offer ─── {offer} ────────►│
//!                                   │◄──── create_answer reads offer,
//!                                   │      writes {answer}
//! fetch_answer ◄── {answer} ────────│
//! (candidates trickle into the two arrays as they are discovered)
//! fetch_candidates ◄── answerCandidates
//!                                   │───── candidates ──► fetch_candidates
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use talkie_call_core::{CoordinatorBuilder, MemoryProfileStore, PartyRole};
//! use talkie_media_core::mock::{MockMediaDevices, MockMediaTransport};
//! use talkie_store_core::MemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let coordinator = Arc::new(
//!     CoordinatorBuilder::new()
//!         .with_store(Arc::new(MemoryStore::new()))
//!         .with_transport(Arc::new(MockMediaTransport::new()))
//!         .with_devices(Arc::new(MockMediaDevices::new()))
//!         .with_profiles(Arc::new(MemoryProfileStore::new()))
//!         .build()?,
//! );
//! coordinator.start().await?;
//!
//! coordinator.store_party(PartyRole::Caller, "111").await?;
//! coordinator.create_offer().await?;
//! # Ok(())
//! # }
//! ```

pub mod call;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod identity;

pub use call::{SignalingOperation, SignalingState};
pub use coordinator::{
    CallMediaConfig, CoordinatorBuilder, CoordinatorConfig, IceServerConfig,
    SignalingCoordinator,
};
pub use error::{SignalingError, SignalingResult};
pub use events::{SignalingEvent, SignalingEventHandler, StateChangedInfo, StatusInfo};
pub use identity::{MemoryProfileStore, PartyIdentity, PartyRole, ProfileError, ProfileStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

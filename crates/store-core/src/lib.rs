//! # Talkie Store Core - Shared Document Store Contract
//!
//! Call setup in talkie is brokered through a shared, eventually-consistent,
//! multi-writer document store: one flat collection of call documents keyed
//! by party identifier. This crate defines that contract and the data model
//! that crosses it:
//!
//! - [`CallDocument`] - the per-party record holding offer, answer, and both
//!   candidate arrays
//! - [`DocumentPatch`] - a partial update naming only the fields it touches,
//!   with server-assigned timestamp requests
//! - [`CallStore`] - the store seam: `get`, `set`, `update`, and the
//!   additive [`append_candidate`](CallStore::append_candidate)
//! - [`MemoryStore`] - an in-process reference implementation used by tests
//!   and demos
//!
//! The one operation with real design weight is the candidate append: two
//! devices may append to the same document concurrently, so the merge must
//! be additive, order-independent, and duplicate-suppressing. A
//! last-writer-wins overwrite would silently lose connectivity paths.
//!
//! ## Quick Start
//!
//! ```rust
//! use talkie_store_core::{CallStore, CandidateSlot, DocumentPatch, MemoryStore};
//! use talkie_media_core::{IceCandidateInit, SessionDescription};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//!
//! store.set("111", DocumentPatch::new()
//!     .with_number("111")
//!     .with_offer(SessionDescription::offer("v=0\r\n"))
//!     .stamp_created())
//!     .await?;
//!
//! store.append_candidate("111", CandidateSlot::Candidates,
//!     IceCandidateInit::new("candidate:1 1 udp 1 10.0.0.1 1 typ host"))
//!     .await?;
//!
//! let doc = store.get("111").await?.expect("document exists");
//! assert!(doc.offer.is_some());
//! # Ok(())
//! # }
//! ```

pub mod document;
pub mod error;
pub mod memory;
pub mod store;

pub use document::{CallDocument, CandidateSlot, DocumentPatch};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use store::CallStore;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

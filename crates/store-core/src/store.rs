//! The document store seam
//!
//! Production builds wire this to a cloud document store; tests and demos
//! use [`MemoryStore`](crate::MemoryStore). The signaling layer never sees
//! anything below this trait.

use async_trait::async_trait;

use talkie_media_core::IceCandidateInit;

use crate::document::{CallDocument, CandidateSlot, DocumentPatch};
use crate::error::StoreResult;

/// One flat collection of call documents keyed by party identifier
///
/// All operations are asynchronous, may fail with a generic
/// [`StoreError`](crate::StoreError), and are never retried by callers.
#[async_trait]
pub trait CallStore: Send + Sync {
    /// Fetch a document, `None` when it has never been written
    async fn get(&self, number: &str) -> StoreResult<Option<CallDocument>>;

    /// Write the fields named by the patch, creating the document if absent
    ///
    /// Fields the patch does not name keep their stored values.
    async fn set(&self, number: &str, patch: DocumentPatch) -> StoreResult<()>;

    /// Write the fields named by the patch; fails with
    /// [`StoreError::NotFound`](crate::StoreError::NotFound) when the
    /// document does not exist
    async fn update(&self, number: &str, patch: DocumentPatch) -> StoreResult<()>;

    /// Append one candidate to the given array, creating document and array
    /// if absent
    ///
    /// The merge is additive, order-independent, and duplicate-suppressing:
    /// concurrent appends from unrelated writers must all survive, and
    /// re-appending an identical candidate leaves the array unchanged.
    async fn append_candidate(
        &self,
        number: &str,
        slot: CandidateSlot,
        candidate: IceCandidateInit,
    ) -> StoreResult<()>;
}

//! In-process reference store
//!
//! Used by unit and integration tests, and by two-device end-to-end tests
//! where both coordinators share one `MemoryStore` behind an `Arc`.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;

use talkie_media_core::IceCandidateInit;

use crate::document::{CallDocument, CandidateSlot, DocumentPatch};
use crate::error::{StoreError, StoreResult};
use crate::store::CallStore;

/// In-memory [`CallStore`] over a concurrent map
///
/// Timestamp requests in a patch are fulfilled with `Utc::now()` at write
/// time, mirroring a server-assigned timestamp. The candidate merge keeps
/// first-write order per writer and suppresses exact duplicates, so
/// interleaved appends from two devices converge to the same set.
pub struct MemoryStore {
    documents: DashMap<String, CallDocument>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Number of documents currently held
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True when no document has been written yet
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    fn apply_patch(document: &mut CallDocument, patch: DocumentPatch) {
        if let Some(number) = patch.number {
            document.number = number;
        }
        if let Some(offer) = patch.offer {
            document.offer = Some(offer);
        }
        if let Some(answer) = patch.answer {
            document.answer = Some(answer);
        }
        if patch.stamp_created_at {
            document.created_at = Some(Utc::now());
        }
        if patch.stamp_updated_at {
            document.updated_at = Some(Utc::now());
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallStore for MemoryStore {
    async fn get(&self, number: &str) -> StoreResult<Option<CallDocument>> {
        Ok(self.documents.get(number).map(|entry| entry.clone()))
    }

    async fn set(&self, number: &str, patch: DocumentPatch) -> StoreResult<()> {
        debug!(number, "memory store set");
        let mut entry = self
            .documents
            .entry(number.to_string())
            .or_insert_with(|| CallDocument::new(number));
        Self::apply_patch(entry.value_mut(), patch);
        Ok(())
    }

    async fn update(&self, number: &str, patch: DocumentPatch) -> StoreResult<()> {
        debug!(number, "memory store update");
        let mut entry = self
            .documents
            .get_mut(number)
            .ok_or_else(|| StoreError::not_found(number))?;
        Self::apply_patch(entry.value_mut(), patch);
        Ok(())
    }

    async fn append_candidate(
        &self,
        number: &str,
        slot: CandidateSlot,
        candidate: IceCandidateInit,
    ) -> StoreResult<()> {
        debug!(number, field = slot.field_name(), "memory store append");
        let mut entry = self
            .documents
            .entry(number.to_string())
            .or_insert_with(|| CallDocument::new(number));
        let document = entry.value_mut();
        let array = match slot {
            CandidateSlot::Candidates => document.candidates.get_or_insert_with(Vec::new),
            CandidateSlot::AnswerCandidates => {
                document.answer_candidates.get_or_insert_with(Vec::new)
            }
        };
        // Additive merge: appends commute and exact duplicates collapse.
        if !array.contains(&candidate) {
            array.push(candidate);
        }
        Ok(())
    }
}

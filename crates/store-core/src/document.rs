//! Call document data model
//!
//! One document per party identifier. Field names in the serialized form
//! are the wire schema's camelCase spellings; the document is never deleted
//! by this system, only grown.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use talkie_media_core::{IceCandidateInit, SessionDescription};

/// The per-party call record held in the shared store
///
/// Concurrent writers (caller device and receiver device) never write the
/// same scalar field; the candidate arrays are the only shared-write state
/// and use the additive merge in
/// [`CallStore::append_candidate`](crate::CallStore::append_candidate).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CallDocument {
    /// Echo of the document key (redundant but always written)
    pub number: String,
    /// Present once the caller has created an offer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<SessionDescription>,
    /// Present once the receiver has created an answer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<SessionDescription>,
    /// Candidates contributed by the caller side, append-only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<IceCandidateInit>>,
    /// Candidates contributed by the receiver side, append-only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_candidates: Option<Vec<IceCandidateInit>>,
    /// Store-assigned creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Store-assigned last-update timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl CallDocument {
    /// Empty document for the given party identifier
    pub fn new(number: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            ..Default::default()
        }
    }

    /// The candidate array for the given slot, empty when absent
    pub fn candidates_in(&self, slot: CandidateSlot) -> &[IceCandidateInit] {
        let field = match slot {
            CandidateSlot::Candidates => &self.candidates,
            CandidateSlot::AnswerCandidates => &self.answer_candidates,
        };
        field.as_deref().unwrap_or(&[])
    }
}

/// Which of the document's two append-only candidate arrays to touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateSlot {
    /// `candidates` - written by the caller side
    Candidates,
    /// `answerCandidates` - written by the receiver side
    AnswerCandidates,
}

impl CandidateSlot {
    /// Wire name of the array field
    pub fn field_name(&self) -> &'static str {
        match self {
            CandidateSlot::Candidates => "candidates",
            CandidateSlot::AnswerCandidates => "answerCandidates",
        }
    }
}

impl std::fmt::Display for CandidateSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.field_name())
    }
}

/// A partial document write naming only the fields it touches
///
/// `set` applies a patch field-by-field (creating the document if absent);
/// `update` applies the same way but fails when the document does not
/// exist. Timestamps are requested, not supplied: the store assigns the
/// actual value at write time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentPatch {
    /// New value for `number`, if named
    pub number: Option<String>,
    /// New value for `offer`, if named
    pub offer: Option<SessionDescription>,
    /// New value for `answer`, if named
    pub answer: Option<SessionDescription>,
    /// Ask the store to assign `createdAt` at write time
    pub stamp_created_at: bool,
    /// Ask the store to assign `updatedAt` at write time
    pub stamp_updated_at: bool,
}

impl DocumentPatch {
    /// Patch that names no fields
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the `number` field
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Name the `offer` field
    pub fn with_offer(mut self, offer: SessionDescription) -> Self {
        self.offer = Some(offer);
        self
    }

    /// Name the `answer` field
    pub fn with_answer(mut self, answer: SessionDescription) -> Self {
        self.answer = Some(answer);
        self
    }

    /// Request a store-assigned `createdAt`
    pub fn stamp_created(mut self) -> Self {
        self.stamp_created_at = true;
        self
    }

    /// Request a store-assigned `updatedAt`
    pub fn stamp_updated(mut self) -> Self {
        self.stamp_updated_at = true;
        self
    }

    /// True when the patch names nothing at all
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.offer.is_none()
            && self.answer.is_none()
            && !self.stamp_created_at
            && !self.stamp_updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_serializes_with_wire_schema_names() {
        let mut doc = CallDocument::new("111");
        doc.offer = Some(SessionDescription::offer("v=0\r\n"));
        doc.answer_candidates = Some(vec![IceCandidateInit::new("candidate:9")]);
        doc.created_at = Some(Utc::now());

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["number"], "111");
        assert!(json.get("offer").is_some());
        assert!(json.get("answerCandidates").is_some());
        assert!(json.get("createdAt").is_some());
        // Absent optionals stay off the wire entirely.
        assert!(json.get("answer").is_none());
        assert!(json.get("candidates").is_none());
        assert!(json.get("updatedAt").is_none());
    }

    #[test]
    fn candidates_in_defaults_to_empty() {
        let doc = CallDocument::new("222");
        assert!(doc.candidates_in(CandidateSlot::Candidates).is_empty());
        assert!(doc.candidates_in(CandidateSlot::AnswerCandidates).is_empty());
    }

    #[test]
    fn patch_builder_names_fields() {
        let patch = DocumentPatch::new()
            .with_number("111")
            .with_offer(SessionDescription::offer("o"))
            .stamp_created();
        assert!(!patch.is_empty());
        assert!(patch.answer.is_none());
        assert!(!patch.stamp_updated_at);
    }
}

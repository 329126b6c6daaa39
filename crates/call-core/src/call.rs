//! Signaling state machine
//!
//! The original handshake left its state implicit in whichever buttons had
//! been pressed; here it is an explicit state with a validated transition
//! table. Operations invoked out of order are rejected with a typed error
//! before any store or transport I/O happens.

use serde::{Deserialize, Serialize};

/// Where a device currently stands in the call-setup handshake
///
/// Transitions are driven entirely by user-triggered operations plus
/// asynchronous transport events; there is no automatic advancement and no
/// timeout-based retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalingState {
    /// Nothing has happened yet
    Idle,
    /// The caller's offer is applied locally but not yet persisted
    OfferCreated,
    /// The caller's offer is in the shared store
    OfferPersisted,
    /// The receiver answered: remote offer applied, answer created and
    /// persisted
    AnswerCreated,
    /// The caller pulled the answer and applied it as remote description
    AnswerFetched,
    /// The counterpart's candidate array has been applied to the transport
    CandidatesExchanged,
    /// Connectivity checks succeeded; the call is live
    Connected,
    /// The session was torn down; terminal
    Closed,
    /// The transport failed; a new offer round or teardown can follow
    Failed,
}

impl SignalingState {
    /// True for states that end the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, SignalingState::Closed)
    }

    /// True once media can flow
    pub fn is_connected(&self) -> bool {
        matches!(self, SignalingState::Connected)
    }

    /// Whether the given operation may start from this state
    ///
    /// Re-invocations are deliberately legal where the manual flow needs
    /// them: the caller may re-offer (renegotiation is manual), either side
    /// may re-pull candidates, and a failed transport allows a fresh offer
    /// round.
    pub fn permits(&self, operation: SignalingOperation) -> bool {
        use SignalingOperation as Op;
        use SignalingState::*;

        match operation {
            Op::StoreParty | Op::SetupMedia => !self.is_terminal(),
            Op::CreateOffer => matches!(
                self,
                Idle | OfferCreated | OfferPersisted | AnswerFetched | CandidatesExchanged
                    | Connected
                    | Failed
            ),
            Op::CreateAnswer => matches!(self, Idle | AnswerCreated | Failed),
            Op::FetchAnswer => matches!(self, OfferPersisted | AnswerFetched),
            Op::FetchCandidates => {
                matches!(self, AnswerCreated | AnswerFetched | CandidatesExchanged | Connected)
            }
            Op::EndCall => !self.is_terminal(),
            // Not handshake steps: reported on failure but never gated.
            Op::StoreCandidate | Op::LoadProfile => true,
        }
    }
}

impl std::fmt::Display for SignalingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalingState::Idle => "Idle",
            SignalingState::OfferCreated => "OfferCreated",
            SignalingState::OfferPersisted => "OfferPersisted",
            SignalingState::AnswerCreated => "AnswerCreated",
            SignalingState::AnswerFetched => "AnswerFetched",
            SignalingState::CandidatesExchanged => "CandidatesExchanged",
            SignalingState::Connected => "Connected",
            SignalingState::Closed => "Closed",
            SignalingState::Failed => "Failed",
        };
        write!(f, "{name}")
    }
}

/// The coordinator operations gated by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalingOperation {
    /// Persist a party identifier (and the caller's call document)
    StoreParty,
    /// Create and persist the caller's offer
    CreateOffer,
    /// Answer the persisted offer from the receiver side
    CreateAnswer,
    /// Pull the answer onto the caller's transport
    FetchAnswer,
    /// Pull the counterpart's candidate array onto the transport
    FetchCandidates,
    /// Capture local media and attach it to the transport
    SetupMedia,
    /// Tear the session down
    EndCall,
    /// Persist one discovered local candidate (event-driven)
    StoreCandidate,
    /// Load persisted identifiers at startup
    LoadProfile,
}

impl std::fmt::Display for SignalingOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SignalingOperation::StoreParty => "store_party",
            SignalingOperation::CreateOffer => "create_offer",
            SignalingOperation::CreateAnswer => "create_answer",
            SignalingOperation::FetchAnswer => "fetch_answer",
            SignalingOperation::FetchCandidates => "fetch_candidates",
            SignalingOperation::SetupMedia => "setup_media",
            SignalingOperation::EndCall => "end_call",
            SignalingOperation::StoreCandidate => "store_candidate",
            SignalingOperation::LoadProfile => "load_profile",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignalingOperation as Op;
    use SignalingState::*;

    #[test]
    fn caller_happy_path_is_permitted() {
        assert!(Idle.permits(Op::StoreParty));
        assert!(Idle.permits(Op::CreateOffer));
        assert!(OfferPersisted.permits(Op::FetchAnswer));
        assert!(AnswerFetched.permits(Op::FetchCandidates));
        assert!(CandidatesExchanged.permits(Op::FetchCandidates));
    }

    #[test]
    fn receiver_happy_path_is_permitted() {
        assert!(Idle.permits(Op::CreateAnswer));
        assert!(AnswerCreated.permits(Op::FetchCandidates));
        assert!(AnswerCreated.permits(Op::CreateAnswer));
    }

    #[test]
    fn out_of_order_operations_are_rejected() {
        // No answer can be fetched before an offer is persisted.
        assert!(!Idle.permits(Op::FetchAnswer));
        assert!(!OfferCreated.permits(Op::FetchAnswer));
        // A device that answered cannot switch to offering mid-call.
        assert!(!AnswerCreated.permits(Op::CreateOffer));
        // A device that offered cannot answer its own call.
        assert!(!OfferPersisted.permits(Op::CreateAnswer));
        // Candidates can only be pulled once a description round completed.
        assert!(!Idle.permits(Op::FetchCandidates));
        assert!(!OfferPersisted.permits(Op::FetchCandidates));
    }

    #[test]
    fn closed_is_terminal() {
        for op in [
            Op::StoreParty,
            Op::CreateOffer,
            Op::CreateAnswer,
            Op::FetchAnswer,
            Op::FetchCandidates,
            Op::SetupMedia,
            Op::EndCall,
        ] {
            assert!(!Closed.permits(op), "{op} must be rejected after close");
        }
    }

    #[test]
    fn failed_allows_manual_recovery() {
        assert!(Failed.permits(Op::CreateOffer));
        assert!(Failed.permits(Op::CreateAnswer));
        assert!(Failed.permits(Op::EndCall));
        assert!(!Failed.permits(Op::FetchAnswer));
    }

    #[test]
    fn renegotiation_reoffer_is_permitted_while_connected() {
        assert!(Connected.permits(Op::CreateOffer));
        assert!(Connected.permits(Op::FetchCandidates));
    }
}

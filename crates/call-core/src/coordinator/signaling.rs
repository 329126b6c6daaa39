//! User-triggered handshake operations
//!
//! Preconditions are checked locally before any store or transport call;
//! failures are reported through [`finish`](SignalingCoordinator::finish)
//! and never retried. There is no automatic waiting anywhere: when a
//! counterpart step has not completed yet, the operation fails with a
//! missing-data error and the user re-triggers it later.

use tracing::info;

use talkie_media_core::{IceCandidateInit, OfferOptions};
use talkie_store_core::{CandidateSlot, DocumentPatch};

use crate::call::{SignalingOperation, SignalingState};
use crate::coordinator::config::CallMediaConfig;
use crate::coordinator::SignalingCoordinator;
use crate::error::{SignalingError, SignalingResult};
use crate::events::SignalingEvent;
use crate::identity::PartyRole;

impl SignalingCoordinator {
    /// Persist an identifier under a role
    ///
    /// For the caller role this also upserts the call document
    /// `{number, createdAt}` so the document exists before the offer is
    /// written. The receiver role only persists locally - the receiver
    /// writes into the caller-keyed document later, during
    /// [`create_answer`](Self::create_answer).
    pub async fn store_party(&self, role: PartyRole, id: &str) -> SignalingResult<()> {
        let result = self.store_party_inner(role, id).await;
        self.finish(SignalingOperation::StoreParty, result).await
    }

    async fn store_party_inner(&self, role: PartyRole, id: &str) -> SignalingResult<()> {
        self.ensure_permitted(SignalingOperation::StoreParty).await?;
        let number = id.trim();
        if number.is_empty() {
            return Err(SignalingError::MissingIdentifier { role });
        }

        if role == PartyRole::Caller {
            self.store
                .set(
                    number,
                    DocumentPatch::new().with_number(number).stamp_created(),
                )
                .await?;
        }
        self.profiles.save(role, number).await?;
        self.identity.write().await.set(role, number);

        info!(%role, number, "party identifier stored");
        self.emit(SignalingEvent::PartyStored {
            role,
            number: number.to_string(),
        })
        .await;
        Ok(())
    }

    /// Create the caller's offer and persist it
    ///
    /// Asks the transport for an offer requesting audio and video with
    /// voice-activity detection, applies it locally, then upserts the
    /// caller document with the offer. An existing offer is overwritten -
    /// this is also the manual renegotiation path.
    pub async fn create_offer(&self) -> SignalingResult<()> {
        let result = self.create_offer_inner().await;
        self.finish(SignalingOperation::CreateOffer, result).await
    }

    async fn create_offer_inner(&self) -> SignalingResult<()> {
        self.ensure_permitted(SignalingOperation::CreateOffer).await?;
        let number = self.require_identifier(PartyRole::Caller).await?;

        let offer = self
            .transport
            .create_offer(OfferOptions::audio_video())
            .await?;
        self.transport.set_local_description(offer.clone()).await?;
        *self.role.write().await = Some(PartyRole::Caller);
        self.set_state(SignalingState::OfferCreated).await;

        self.store
            .set(
                &number,
                DocumentPatch::new()
                    .with_number(&number)
                    .with_offer(offer)
                    .stamp_created(),
            )
            .await?;
        self.set_state(SignalingState::OfferPersisted).await;

        info!(%number, "offer created and persisted");
        self.emit(SignalingEvent::OfferCreated { number }).await;
        Ok(())
    }

    /// Answer the persisted offer from the receiver side
    ///
    /// Fails with [`SignalingError::OfferNotFound`] - without touching the
    /// transport - when the caller has not completed
    /// [`create_offer`](Self::create_offer) yet.
    pub async fn create_answer(&self) -> SignalingResult<()> {
        let result = self.create_answer_inner().await;
        self.finish(SignalingOperation::CreateAnswer, result).await
    }

    async fn create_answer_inner(&self) -> SignalingResult<()> {
        self.ensure_permitted(SignalingOperation::CreateAnswer)
            .await?;
        let number = self.require_identifier(PartyRole::Receiver).await?;

        let offer = self
            .store
            .get(&number)
            .await?
            .and_then(|document| document.offer)
            .ok_or_else(|| SignalingError::OfferNotFound {
                number: number.clone(),
            })?;

        self.transport.set_remote_description(offer).await?;
        let answer = self.transport.create_answer().await?;
        self.transport.set_local_description(answer.clone()).await?;
        *self.role.write().await = Some(PartyRole::Receiver);

        self.store
            .update(
                &number,
                DocumentPatch::new().with_answer(answer).stamp_updated(),
            )
            .await?;
        self.set_state(SignalingState::AnswerCreated).await;

        info!(%number, "answer created and persisted");
        self.emit(SignalingEvent::AnswerCreated { number }).await;
        Ok(())
    }

    /// Pull the answer onto the caller's transport
    ///
    /// Resumes the negotiation begun by [`create_offer`](Self::create_offer).
    /// Fails with [`SignalingError::AnswerNotFound`] - leaving the remote
    /// description unset - until the receiver has answered.
    pub async fn fetch_answer(&self) -> SignalingResult<()> {
        let result = self.fetch_answer_inner().await;
        self.finish(SignalingOperation::FetchAnswer, result).await
    }

    async fn fetch_answer_inner(&self) -> SignalingResult<()> {
        self.ensure_permitted(SignalingOperation::FetchAnswer)
            .await?;
        let number = self.require_identifier(PartyRole::Caller).await?;

        let answer = self
            .store
            .get(&number)
            .await?
            .and_then(|document| document.answer)
            .ok_or_else(|| SignalingError::AnswerNotFound {
                number: number.clone(),
            })?;

        self.transport.set_remote_description(answer).await?;
        self.set_state(SignalingState::AnswerFetched).await;

        info!(%number, "answer fetched and applied");
        self.emit(SignalingEvent::AnswerFetched { number }).await;
        Ok(())
    }

    /// Pull the counterpart's candidate array onto the transport
    ///
    /// Role-directed: the receiver reads the caller's `candidates` array,
    /// the caller reads `answerCandidates`. Candidates are applied in
    /// document order (order does not affect correctness - candidates are
    /// commutative); N stored candidates mean exactly N transport
    /// additions. Re-invocation is tolerated: the transport treats
    /// duplicate candidates as no-ops.
    pub async fn fetch_candidates(&self) -> SignalingResult<()> {
        let result = self.fetch_candidates_inner().await;
        self.finish(SignalingOperation::FetchCandidates, result)
            .await
    }

    async fn fetch_candidates_inner(&self) -> SignalingResult<()> {
        self.ensure_permitted(SignalingOperation::FetchCandidates)
            .await?;
        let role = self.role.read().await.ok_or_else(|| {
            SignalingError::internal("fetch_candidates permitted without an assumed role")
        })?;
        let (number, slot) = match role {
            PartyRole::Receiver => (
                self.require_identifier(PartyRole::Receiver).await?,
                CandidateSlot::Candidates,
            ),
            PartyRole::Caller => (
                self.require_identifier(PartyRole::Caller).await?,
                CandidateSlot::AnswerCandidates,
            ),
        };

        let candidates = self
            .store
            .get(&number)
            .await?
            .map(|document| document.candidates_in(slot).to_vec())
            .unwrap_or_default();
        if candidates.is_empty() {
            return Err(SignalingError::CandidatesNotFound { number });
        }

        let count = candidates.len();
        for candidate in candidates {
            self.transport.add_ice_candidate(candidate.clone()).await?;
            self.emit(SignalingEvent::CandidateApplied {
                candidate: candidate.candidate,
            })
            .await;
        }

        // A live call stays Connected; anything earlier advances.
        let current = *self.state.read().await;
        if current != SignalingState::Connected {
            self.set_state(SignalingState::CandidatesExchanged).await;
        }

        info!(%number, count, field = slot.field_name(), "candidates fetched");
        self.emit(SignalingEvent::CandidatesFetched { number, count })
            .await;
        Ok(())
    }

    /// Persist one locally discovered candidate
    ///
    /// Driven by the transport event loop on every discovered candidate
    /// (the gathering-finished sentinel never reaches here). Silently drops
    /// the candidate when no role has been assumed or the role's identifier
    /// is unset - an intentional drop, not an error.
    pub async fn on_local_candidate(&self, candidate: IceCandidateInit) -> SignalingResult<()> {
        let result = self.on_local_candidate_inner(candidate).await;
        self.finish(SignalingOperation::StoreCandidate, result).await
    }

    async fn on_local_candidate_inner(
        &self,
        candidate: IceCandidateInit,
    ) -> SignalingResult<()> {
        let Some(role) = *self.role.read().await else {
            tracing::debug!("dropping local candidate: no role assumed yet");
            return Ok(());
        };
        let number = match self.identity.read().await.get(role) {
            Some(number) => number.to_string(),
            None => {
                tracing::debug!(%role, "dropping local candidate: identifier unset");
                return Ok(());
            }
        };
        let slot = match role {
            PartyRole::Caller => CandidateSlot::Candidates,
            PartyRole::Receiver => CandidateSlot::AnswerCandidates,
        };

        self.store.append_candidate(&number, slot, candidate).await?;
        self.emit(SignalingEvent::CandidateStored { number }).await;
        Ok(())
    }

    /// Capture local media with the configured constraints and attach it
    pub async fn setup_media(&self) -> SignalingResult<()> {
        self.setup_media_with(self.config.media).await
    }

    /// Capture local media with explicit per-call configuration
    ///
    /// With `voice_only` set, the video track is captured and then disabled
    /// before attachment, so the negotiated session keeps its video section.
    pub async fn setup_media_with(&self, media: CallMediaConfig) -> SignalingResult<()> {
        let result = self.setup_media_inner(media).await;
        self.finish(SignalingOperation::SetupMedia, result).await
    }

    async fn setup_media_inner(&self, media: CallMediaConfig) -> SignalingResult<()> {
        self.ensure_permitted(SignalingOperation::SetupMedia).await?;

        let mut stream = self.devices.get_user_media(media.constraints()).await?;
        if media.voice_only {
            for track in stream
                .tracks
                .iter_mut()
                .filter(|track| track.kind == talkie_media_core::TrackKind::Video)
            {
                track.enabled = false;
            }
        }
        for track in &stream.tracks {
            self.transport.add_track(track.clone(), &stream.id).await?;
        }

        let stream_id = stream.id.clone();
        let track_count = stream.tracks.len();
        *self.local_stream.write().await = Some(stream);

        info!(%stream_id, track_count, voice_only = media.voice_only, "local media attached");
        self.emit(SignalingEvent::MediaReady {
            stream_id,
            track_count,
        })
        .await;
        Ok(())
    }

    /// Tear the call down: close the transport and park the state machine
    ///
    /// No document cleanup happens - call documents outlive the call. A new
    /// call gets a fresh coordinator and a fresh transport session.
    pub async fn end_call(&self) -> SignalingResult<()> {
        let result = self.end_call_inner().await;
        self.finish(SignalingOperation::EndCall, result).await
    }

    async fn end_call_inner(&self) -> SignalingResult<()> {
        self.ensure_permitted(SignalingOperation::EndCall).await?;

        self.transport.close().await?;
        self.set_state(SignalingState::Closed).await;
        self.emit(SignalingEvent::CallEnded).await;
        self.detach_event_loop().await;

        info!("call ended");
        Ok(())
    }

    async fn require_identifier(&self, role: PartyRole) -> SignalingResult<String> {
        self.identity
            .read()
            .await
            .get(role)
            .filter(|value| !value.trim().is_empty())
            .map(str::to_string)
            .ok_or(SignalingError::MissingIdentifier { role })
    }
}

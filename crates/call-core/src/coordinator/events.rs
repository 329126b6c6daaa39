//! Transport event reaction loop
//!
//! Attached for the coordinator's lifetime by
//! [`start`](SignalingCoordinator::start); every asynchronous transport
//! event maps onto a store write, a state machine move, or a status
//! notification - nothing here is retried and nothing is fatal.

use tokio::sync::broadcast;
use tracing::{debug, warn};

use talkie_media_core::{PeerConnectionState, TransportEvent, TransportSignalingState};

use crate::call::SignalingState;
use crate::coordinator::SignalingCoordinator;
use crate::events::SignalingEvent;

impl SignalingCoordinator {
    pub(crate) async fn pump_transport_events(
        self: std::sync::Arc<Self>,
        mut receiver: broadcast::Receiver<TransportEvent>,
    ) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.handle_transport_event(event).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "transport event feed lagged; events were dropped");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("transport event loop ended");
    }

    pub(crate) async fn detach_event_loop(&self) {
        if let Some(handle) = self.take_event_loop().await {
            handle.abort();
        }
    }

    async fn handle_transport_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::ConnectionStateChange(state) => {
                self.handle_connection_state(state).await;
            }

            TransportEvent::IceCandidate(candidate) => {
                // Rolling log keeps the raw JSON, newest first.
                match serde_json::to_string(&candidate) {
                    Ok(json) => {
                        let mut log = self.status_log.write().await;
                        log.push_front(json);
                        log.truncate(self.config.status_log_capacity);
                    }
                    Err(e) => warn!(error = %e, "could not serialize candidate for the log"),
                }
                self.emit(SignalingEvent::CandidateDiscovered {
                    candidate: candidate.candidate.clone(),
                })
                .await;
                // Failures are already reported at the operation boundary.
                let _ = self.on_local_candidate(candidate).await;
            }

            // The null-candidate sentinel: gathering finished, nothing to
            // persist.
            TransportEvent::IceGatheringComplete => {
                debug!("candidate gathering finished");
            }

            TransportEvent::IceCandidateError { details } => {
                // Connections can still be made when some candidates error.
                warn!(%details, "candidate gathering error (non-fatal)");
                self.emit(SignalingEvent::CandidateGatheringError { details })
                    .await;
            }

            TransportEvent::IceConnectionStateChange(state) if state.is_established() => {
                let current = *self.state.read().await;
                if !current.is_terminal() {
                    self.set_state(SignalingState::Connected).await;
                }
                self.emit(SignalingEvent::IceEstablished { state }).await;
            }
            TransportEvent::IceConnectionStateChange(_) => {}

            // No automatic renegotiation: surfaced so the user can
            // re-trigger create_offer manually. May fire multiple times;
            // each firing is independent.
            TransportEvent::NegotiationNeeded => {
                self.emit(SignalingEvent::NegotiationNeeded).await;
            }

            TransportEvent::SignalingStateChange(TransportSignalingState::Closed) => {
                self.emit(SignalingEvent::TransportSignalingClosed).await;
            }
            TransportEvent::SignalingStateChange(_) => {}

            TransportEvent::Track(track) => {
                // The remote stream is one coordinator-owned entity, grown
                // in place; renders observe it through remote_stream().
                self.remote_stream.write().await.add_track(track.clone());
                self.emit(SignalingEvent::RemoteTrackAdded { track }).await;
            }
        }
    }

    async fn handle_connection_state(&self, state: PeerConnectionState) {
        match state {
            PeerConnectionState::Closed => {
                // No cleanup is triggered: documents outlive the call.
                self.set_state(SignalingState::Closed).await;
                self.emit(SignalingEvent::ConnectionClosed).await;
            }
            PeerConnectionState::Failed => {
                let current = *self.state.read().await;
                if !current.is_terminal() {
                    self.set_state(SignalingState::Failed).await;
                }
                self.emit(SignalingEvent::ConnectionFailed).await;
            }
            _ => {}
        }
    }
}

//! Scriptable in-memory implementations of the transport contracts
//!
//! These doubles record every call so tests can assert on exactly what the
//! signaling layer did, and expose [`MockMediaTransport::emit`] so tests can
//! inject transport events into the feed the coordinator consumes.

use async_trait::async_trait;
use tokio::sync::{broadcast, Mutex};

use crate::error::{TransportError, TransportResult};
use crate::events::TransportEvent;
use crate::transport::{MediaDevices, MediaTransport};
use crate::types::{
    IceCandidateInit, MediaConstraints, MediaStream, MediaStreamTrack, OfferOptions, SdpType,
    SessionDescription, TrackKind,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct MockTransportState {
    local_description: Option<SessionDescription>,
    remote_description: Option<SessionDescription>,
    added_candidates: Vec<IceCandidateInit>,
    added_tracks: Vec<(MediaStreamTrack, String)>,
    last_offer_options: Option<OfferOptions>,
    offers_created: u32,
    answers_created: u32,
    closed: bool,
}

/// In-memory [`MediaTransport`] double
///
/// Descriptions are canned (`create_offer` / `create_answer` return
/// synthetic SDP bodies); every negotiation call is recorded for later
/// inspection. Duplicate candidates are accepted without error, matching
/// the engine contract.
pub struct MockMediaTransport {
    state: Mutex<MockTransportState>,
    event_tx: broadcast::Sender<TransportEvent>,
}

impl MockMediaTransport {
    /// Create a fresh, open transport
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(MockTransportState::default()),
            event_tx,
        }
    }

    /// Inject an event into the feed, as the engine would
    pub fn emit(&self, event: TransportEvent) {
        tracing::debug!(?event, "mock transport emitting event");
        // Send fails only when nobody is subscribed, which tests may do
        // deliberately before the coordinator starts.
        let _ = self.event_tx.send(event);
    }

    /// The description most recently applied as local
    pub async fn local_description(&self) -> Option<SessionDescription> {
        self.state.lock().await.local_description.clone()
    }

    /// The description most recently applied as remote
    pub async fn remote_description(&self) -> Option<SessionDescription> {
        self.state.lock().await.remote_description.clone()
    }

    /// Every candidate passed to `add_ice_candidate`, in call order
    pub async fn added_candidates(&self) -> Vec<IceCandidateInit> {
        self.state.lock().await.added_candidates.clone()
    }

    /// Every track attached, with its stream id, in call order
    pub async fn added_tracks(&self) -> Vec<(MediaStreamTrack, String)> {
        self.state.lock().await.added_tracks.clone()
    }

    /// Options of the most recent `create_offer` call
    pub async fn last_offer_options(&self) -> Option<OfferOptions> {
        self.state.lock().await.last_offer_options
    }

    /// True once `close` has been called
    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}

impl Default for MockMediaTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaTransport for MockMediaTransport {
    async fn create_offer(&self, options: OfferOptions) -> TransportResult<SessionDescription> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.offers_created += 1;
        state.last_offer_options = Some(options);
        Ok(SessionDescription::offer(format!(
            "v=0\r\no=mock {} 0 IN IP4 127.0.0.1\r\n",
            state.offers_created
        )))
    }

    async fn create_answer(&self) -> TransportResult<SessionDescription> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(TransportError::Closed);
        }
        // An answer only makes sense against an applied remote offer.
        match &state.remote_description {
            Some(remote) if remote.sdp_type == SdpType::Offer => {}
            _ => {
                return Err(TransportError::invalid_state(
                    "create_answer requires a remote offer",
                ))
            }
        }
        state.answers_created += 1;
        Ok(SessionDescription::answer(format!(
            "v=0\r\no=mock-answer {} 0 IN IP4 127.0.0.1\r\n",
            state.answers_created
        )))
    }

    async fn set_local_description(
        &self,
        description: SessionDescription,
    ) -> TransportResult<()> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.local_description = Some(description);
        Ok(())
    }

    async fn set_remote_description(
        &self,
        description: SessionDescription,
    ) -> TransportResult<()> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.remote_description = Some(description);
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidateInit) -> TransportResult<()> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.added_candidates.push(candidate);
        Ok(())
    }

    async fn add_track(&self, track: MediaStreamTrack, stream_id: &str) -> TransportResult<()> {
        let mut state = self.state.lock().await;
        if state.closed {
            return Err(TransportError::Closed);
        }
        state.added_tracks.push((track, stream_id.to_string()));
        Ok(())
    }

    async fn close(&self) -> TransportResult<()> {
        let mut state = self.state.lock().await;
        state.closed = true;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.event_tx.subscribe()
    }
}

/// In-memory [`MediaDevices`] double
pub struct MockMediaDevices {
    fail_with: Option<String>,
    last_constraints: Mutex<Option<MediaConstraints>>,
}

impl MockMediaDevices {
    /// Devices that satisfy every capture request
    pub fn new() -> Self {
        Self {
            fail_with: None,
            last_constraints: Mutex::new(None),
        }
    }

    /// Devices that refuse every capture request with the given reason
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            last_constraints: Mutex::new(None),
        }
    }

    /// Constraints of the most recent capture request
    pub async fn last_constraints(&self) -> Option<MediaConstraints> {
        *self.last_constraints.lock().await
    }
}

impl Default for MockMediaDevices {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaDevices for MockMediaDevices {
    async fn get_user_media(&self, constraints: MediaConstraints) -> TransportResult<MediaStream> {
        if let Some(reason) = &self.fail_with {
            return Err(TransportError::media_device(reason.clone()));
        }
        *self.last_constraints.lock().await = Some(constraints);

        let mut stream = MediaStream::new();
        if constraints.audio {
            stream.add_track(MediaStreamTrack::new(TrackKind::Audio));
        }
        if constraints.video.is_some() {
            stream.add_track(MediaStreamTrack::new(TrackKind::Video));
        }
        Ok(stream)
    }
}

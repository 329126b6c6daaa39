//! Payload and state types shared between the media engine and the
//! signaling layer
//!
//! The serialized forms here are wire-visible: session descriptions and
//! candidates are stored verbatim in the shared call document, so the serde
//! field names follow the W3C JSON spellings (`type`, `sdp`, `sdpMid`,
//! `sdpMLineIndex`) rather than Rust conventions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a session description (offer/answer model, RFC 3264)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    /// Description proposed by the initiating side
    Offer,
    /// Description produced in response to an offer
    Answer,
}

impl std::fmt::Display for SdpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SdpType::Offer => write!(f, "offer"),
            SdpType::Answer => write!(f, "answer"),
        }
    }
}

/// An opaque negotiation payload produced by the media engine
///
/// Immutable once created; the producing side sets it as its local
/// description and the consuming side as its remote description. The
/// signaling layer never inspects the SDP body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDescription {
    /// Whether this description is an offer or an answer
    #[serde(rename = "type")]
    pub sdp_type: SdpType,
    /// Raw SDP text, opaque to the signaling layer
    pub sdp: String,
}

impl SessionDescription {
    /// Build an offer description from raw SDP text
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    /// Build an answer description from raw SDP text
    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }

    /// True when this description is an offer
    pub fn is_offer(&self) -> bool {
        self.sdp_type == SdpType::Offer
    }

    /// True when this description is an answer
    pub fn is_answer(&self) -> bool {
        self.sdp_type == SdpType::Answer
    }
}

/// One potential network path by which a peer might be reachable
///
/// Emitted incrementally by the engine as paths are discovered and exchanged
/// through the store as an atomic value. Unordered and commutative: adding
/// candidates in any order yields the same connectivity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidateInit {
    /// The candidate-attribute line, opaque to the signaling layer
    pub candidate: String,
    /// Identification tag of the media description this candidate belongs to
    pub sdp_mid: Option<String>,
    /// Index of the media description this candidate belongs to
    #[serde(rename = "sdpMLineIndex")]
    pub sdp_mline_index: Option<u16>,
}

impl IceCandidateInit {
    /// Convenience constructor used heavily in tests
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: Some("0".to_string()),
            sdp_mline_index: Some(0),
        }
    }
}

/// Aggregate connection state of the peer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PeerConnectionState {
    /// Connection is in its initial state
    #[default]
    New,
    /// Transport establishment is in progress
    Connecting,
    /// All transports are established
    Connected,
    /// At least one transport lost connectivity
    Disconnected,
    /// Connection establishment failed permanently
    Failed,
    /// The connection has been shut down
    Closed,
}

/// Connectivity-check state of the candidate pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IceConnectionState {
    /// Gathering addresses or waiting for remote candidates
    #[default]
    New,
    /// Actively checking candidate pairs
    Checking,
    /// A usable pair was found for every component
    Connected,
    /// Checks finished and a pair is in use
    Completed,
    /// A previously usable pair stopped working
    Disconnected,
    /// No usable pair could be found
    Failed,
    /// Checks have been shut down
    Closed,
}

impl IceConnectionState {
    /// True once media can flow (`Connected` or `Completed`)
    pub fn is_established(&self) -> bool {
        matches!(
            self,
            IceConnectionState::Connected | IceConnectionState::Completed
        )
    }
}

/// Offer/answer exchange state of the transport itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransportSignalingState {
    /// No exchange in progress
    #[default]
    Stable,
    /// A local offer has been applied
    HaveLocalOffer,
    /// A remote offer has been applied
    HaveRemoteOffer,
    /// The transport has been shut down
    Closed,
}

/// Kind of a media track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    /// Audio track
    Audio,
    /// Video track
    Video,
}

/// A single captured or received media track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaStreamTrack {
    /// Engine-assigned track identifier
    pub id: String,
    /// Whether this track carries audio or video
    pub kind: TrackKind,
    /// Disabled tracks keep their slot in the stream but transmit silence
    /// or black frames
    pub enabled: bool,
}

impl MediaStreamTrack {
    /// Create an enabled track of the given kind with a fresh identifier
    pub fn new(kind: TrackKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            enabled: true,
        }
    }
}

/// A group of related media tracks
///
/// The coordinator owns one local stream (captured tracks) and one remote
/// stream grown in place as remote tracks arrive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaStream {
    /// Stream identifier, generated locally
    pub id: String,
    /// Tracks currently in the stream
    pub tracks: Vec<MediaStreamTrack>,
}

impl MediaStream {
    /// Create an empty stream with a fresh identifier
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tracks: Vec::new(),
        }
    }

    /// Append a track to the stream
    pub fn add_track(&mut self, track: MediaStreamTrack) {
        self.tracks.push(track);
    }

    /// Iterator over the audio tracks
    pub fn audio_tracks(&self) -> impl Iterator<Item = &MediaStreamTrack> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Audio)
    }

    /// Iterator over the video tracks
    pub fn video_tracks(&self) -> impl Iterator<Item = &MediaStreamTrack> {
        self.tracks.iter().filter(|t| t.kind == TrackKind::Video)
    }

    /// True when the stream has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Camera selection for video capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    /// Front-facing camera
    #[default]
    User,
    /// Rear-facing camera
    Environment,
}

/// Constraints for the video portion of a capture request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoConstraints {
    /// Requested frames per second
    pub frame_rate: u32,
    /// Which camera to capture from
    pub facing_mode: FacingMode,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            frame_rate: 30,
            facing_mode: FacingMode::User,
        }
    }
}

/// Constraints passed to [`MediaDevices::get_user_media`]
///
/// [`MediaDevices::get_user_media`]: crate::MediaDevices::get_user_media
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediaConstraints {
    /// Capture an audio track
    pub audio: bool,
    /// Capture a video track with these constraints, or skip video entirely
    pub video: Option<VideoConstraints>,
}

impl Default for MediaConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            video: Some(VideoConstraints::default()),
        }
    }
}

/// Options for [`MediaTransport::create_offer`]
///
/// [`MediaTransport::create_offer`]: crate::MediaTransport::create_offer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfferOptions {
    /// Request an audio section in the offer even without a local audio track
    pub offer_to_receive_audio: bool,
    /// Request a video section in the offer even without a local video track
    pub offer_to_receive_video: bool,
    /// Enable voice-activity detection in the offered audio
    pub voice_activity_detection: bool,
}

impl OfferOptions {
    /// Offer requesting both audio and video with voice-activity detection
    pub fn audio_video() -> Self {
        Self {
            offer_to_receive_audio: true,
            offer_to_receive_video: true,
            voice_activity_detection: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_description_serializes_with_wire_field_names() {
        let offer = SessionDescription::offer("v=0\r\n");
        let json = serde_json::to_value(&offer).unwrap();
        assert_eq!(json["type"], "offer");
        assert_eq!(json["sdp"], "v=0\r\n");
    }

    #[test]
    fn candidate_serializes_with_w3c_spelling() {
        let candidate = IceCandidateInit::new("candidate:1 1 udp 2130706431 10.0.0.1 54321 typ host");
        let json = serde_json::to_value(&candidate).unwrap();
        assert!(json.get("sdpMid").is_some());
        assert!(json.get("sdpMLineIndex").is_some());
        assert!(json.get("sdp_mline_index").is_none());
    }

    #[test]
    fn candidate_roundtrips_as_atomic_value() {
        let candidate = IceCandidateInit {
            candidate: "candidate:2 1 tcp 1518280447 192.168.1.2 9 typ host".to_string(),
            sdp_mid: Some("audio".to_string()),
            sdp_mline_index: Some(1),
        };
        let json = serde_json::to_string(&candidate).unwrap();
        let back: IceCandidateInit = serde_json::from_str(&json).unwrap();
        assert_eq!(back, candidate);
    }

    #[test]
    fn ice_connection_state_established() {
        assert!(IceConnectionState::Connected.is_established());
        assert!(IceConnectionState::Completed.is_established());
        assert!(!IceConnectionState::Checking.is_established());
        assert!(!IceConnectionState::Failed.is_established());
    }

    #[test]
    fn voice_only_stream_still_carries_disabled_video() {
        let mut stream = MediaStream::new();
        stream.add_track(MediaStreamTrack::new(TrackKind::Audio));
        let mut video = MediaStreamTrack::new(TrackKind::Video);
        video.enabled = false;
        stream.add_track(video);

        assert_eq!(stream.audio_tracks().count(), 1);
        assert_eq!(stream.video_tracks().count(), 1);
        assert!(!stream.video_tracks().next().unwrap().enabled);
    }
}

//! Coordinator configuration
//!
//! Small on purpose: the coordinator itself needs almost nothing beyond its
//! collaborators. The ICE server list is carried here so the embedding
//! application has one place to read it from when constructing the real
//! transport engine; the in-memory mocks ignore it.

use serde::{Deserialize, Serialize};

use talkie_media_core::{MediaConstraints, VideoConstraints};

use crate::error::{SignalingError, SignalingResult};

/// One STUN/TURN server entry handed to the transport engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceServerConfig {
    /// Server URLs, e.g. `stun:stun.l.google.com:19302`
    pub urls: Vec<String>,
}

impl Default for IceServerConfig {
    fn default() -> Self {
        Self {
            urls: vec!["stun:stun.l.google.com:19302".to_string()],
        }
    }
}

/// Per-call media configuration
///
/// `voice_only` replaces the process-wide flag of the original design: the
/// video track is still captured, then disabled before attachment, so the
/// negotiated session keeps its video section and video can be enabled
/// later without renegotiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallMediaConfig {
    /// Disable the captured video track before attaching it
    pub voice_only: bool,
    /// Capture an audio track
    pub audio: bool,
    /// Video capture constraints, or `None` to skip video capture entirely
    pub video: Option<VideoConstraints>,
}

impl Default for CallMediaConfig {
    fn default() -> Self {
        Self {
            voice_only: false,
            audio: true,
            video: Some(VideoConstraints::default()),
        }
    }
}

impl CallMediaConfig {
    /// The capture constraints this configuration asks for
    pub fn constraints(&self) -> MediaConstraints {
        MediaConstraints {
            audio: self.audio,
            video: self.video,
        }
    }
}

/// Configuration for a [`SignalingCoordinator`](crate::SignalingCoordinator)
#[derive(Debug, Clone, PartialEq)]
pub struct CoordinatorConfig {
    /// ICE servers for the transport engine
    pub ice_servers: Vec<IceServerConfig>,
    /// Default media configuration used by `setup_media`
    pub media: CallMediaConfig,
    /// Maximum entries kept in the rolling newest-first status log
    pub status_log_capacity: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::default()],
            media: CallMediaConfig::default(),
            status_log_capacity: 256,
        }
    }
}

impl CoordinatorConfig {
    /// Fresh default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the media configuration
    pub fn with_media(mut self, media: CallMediaConfig) -> Self {
        self.media = media;
        self
    }

    /// Add one ICE server entry
    pub fn with_ice_server(mut self, urls: impl Into<String>) -> Self {
        self.ice_servers.push(IceServerConfig {
            urls: vec![urls.into()],
        });
        self
    }

    /// Reject configurations the coordinator cannot run with
    pub fn validate(&self) -> SignalingResult<()> {
        if self.status_log_capacity == 0 {
            return Err(SignalingError::configuration(
                "status_log_capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_points_at_the_public_stun_server() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.ice_servers.len(), 1);
        assert_eq!(
            config.ice_servers[0].urls[0],
            "stun:stun.l.google.com:19302"
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_log_capacity_is_rejected() {
        let config = CoordinatorConfig {
            status_log_capacity: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn voice_only_still_captures_video() {
        let media = CallMediaConfig {
            voice_only: true,
            ..Default::default()
        };
        assert!(media.constraints().video.is_some());
    }
}

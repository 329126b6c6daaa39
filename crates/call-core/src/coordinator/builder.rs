//! Builder for the signaling coordinator
//!
//! All four collaborators are required; everything else has defaults.

use std::sync::Arc;

use talkie_media_core::{MediaDevices, MediaTransport};
use talkie_store_core::CallStore;

use crate::coordinator::config::{CallMediaConfig, CoordinatorConfig};
use crate::coordinator::SignalingCoordinator;
use crate::error::{SignalingError, SignalingResult};
use crate::identity::ProfileStore;

/// Progressive-disclosure builder for [`SignalingCoordinator`]
///
/// ```rust
/// use std::sync::Arc;
/// use talkie_call_core::CoordinatorBuilder;
/// use talkie_media_core::mock::{MockMediaDevices, MockMediaTransport};
/// use talkie_store_core::MemoryStore;
/// use talkie_call_core::MemoryProfileStore;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let coordinator = CoordinatorBuilder::new()
///     .with_store(Arc::new(MemoryStore::new()))
///     .with_transport(Arc::new(MockMediaTransport::new()))
///     .with_devices(Arc::new(MockMediaDevices::new()))
///     .with_profiles(Arc::new(MemoryProfileStore::new()))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct CoordinatorBuilder {
    config: CoordinatorConfig,
    store: Option<Arc<dyn CallStore>>,
    transport: Option<Arc<dyn MediaTransport>>,
    devices: Option<Arc<dyn MediaDevices>>,
    profiles: Option<Arc<dyn ProfileStore>>,
}

impl CoordinatorBuilder {
    /// Start from the default configuration
    pub fn new() -> Self {
        Self {
            config: CoordinatorConfig::default(),
            store: None,
            transport: None,
            devices: None,
            profiles: None,
        }
    }

    /// Replace the whole configuration
    pub fn with_config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the media configuration only
    pub fn with_media(mut self, media: CallMediaConfig) -> Self {
        self.config.media = media;
        self
    }

    /// The shared document store
    pub fn with_store(mut self, store: Arc<dyn CallStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// The media transport session for this call
    pub fn with_transport(mut self, transport: Arc<dyn MediaTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// The local capture devices
    pub fn with_devices(mut self, devices: Arc<dyn MediaDevices>) -> Self {
        self.devices = Some(devices);
        self
    }

    /// Local persistence for the two party identifiers
    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    /// Validate the configuration and assemble the coordinator
    pub fn build(self) -> SignalingResult<SignalingCoordinator> {
        self.config.validate()?;
        let store = self
            .store
            .ok_or_else(|| SignalingError::configuration("document store is required"))?;
        let transport = self
            .transport
            .ok_or_else(|| SignalingError::configuration("media transport is required"))?;
        let devices = self
            .devices
            .ok_or_else(|| SignalingError::configuration("media devices are required"))?;
        let profiles = self
            .profiles
            .ok_or_else(|| SignalingError::configuration("profile store is required"))?;

        Ok(SignalingCoordinator::new(
            self.config,
            store,
            transport,
            devices,
            profiles,
        ))
    }
}

impl Default for CoordinatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use talkie_media_core::mock::{MockMediaDevices, MockMediaTransport};
    use talkie_store_core::MemoryStore;

    use crate::identity::MemoryProfileStore;

    #[test]
    fn build_without_a_collaborator_names_the_missing_piece() {
        let err = CoordinatorBuilder::new()
            .with_store(Arc::new(MemoryStore::new()))
            .build()
            .unwrap_err();
        match err {
            SignalingError::Configuration { message } => {
                assert!(message.contains("transport"), "got: {message}")
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn build_with_all_collaborators_succeeds() {
        let coordinator = CoordinatorBuilder::new()
            .with_store(Arc::new(MemoryStore::new()))
            .with_transport(Arc::new(MockMediaTransport::new()))
            .with_devices(Arc::new(MockMediaDevices::new()))
            .with_profiles(Arc::new(MemoryProfileStore::new()))
            .build();
        assert!(coordinator.is_ok());
    }
}

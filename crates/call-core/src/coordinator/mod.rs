//! The signaling coordinator
//!
//! Owns the handshake state machine, the party identity, the remote media
//! stream, and the rolling status log. Every user-triggered step and every
//! transport event flows through here.
//!
//! Module layout:
//!
//! - [`config`] - coordinator, media, and ICE server configuration
//! - [`builder`] - assembly of a coordinator from its collaborators
//! - `signaling` - the user-triggered handshake operations
//! - `events` - the transport event reaction loop

pub mod builder;
pub mod config;

mod events;
mod signaling;

pub use builder::CoordinatorBuilder;
pub use config::{CallMediaConfig, CoordinatorConfig, IceServerConfig};

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use talkie_media_core::{MediaDevices, MediaStream, MediaTransport};
use talkie_store_core::CallStore;

use crate::call::{SignalingOperation, SignalingState};
use crate::error::SignalingResult;
use crate::events::{SignalingEvent, SignalingEventHandler, StateChangedInfo, StatusInfo};
use crate::identity::{PartyIdentity, PartyRole, ProfileStore};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Orchestrates the six-step handshake between two identified parties
///
/// One coordinator per call attempt: it owns exactly one transport session
/// (create-on-call-start, close-on-call-end), so a second call never
/// inherits stale negotiation state. All operations are short-lived
/// asynchronous tasks; overlapping invocations of the same operation are
/// not serialized (two rapid `create_offer` calls race, the later write
/// wins - an accepted limitation of the design).
impl std::fmt::Debug for SignalingCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalingCoordinator").finish_non_exhaustive()
    }
}

pub struct SignalingCoordinator {
    pub(crate) config: CoordinatorConfig,
    pub(crate) store: Arc<dyn CallStore>,
    pub(crate) transport: Arc<dyn MediaTransport>,
    pub(crate) devices: Arc<dyn MediaDevices>,
    pub(crate) profiles: Arc<dyn ProfileStore>,

    pub(crate) state: RwLock<SignalingState>,
    pub(crate) role: RwLock<Option<PartyRole>>,
    pub(crate) identity: RwLock<PartyIdentity>,
    pub(crate) local_stream: RwLock<Option<MediaStream>>,
    pub(crate) remote_stream: RwLock<MediaStream>,
    pub(crate) status_log: RwLock<VecDeque<String>>,

    event_tx: broadcast::Sender<SignalingEvent>,
    handler: RwLock<Option<Arc<dyn SignalingEventHandler>>>,
    event_loop: Mutex<Option<JoinHandle<()>>>,
}

impl SignalingCoordinator {
    pub(crate) fn new(
        config: CoordinatorConfig,
        store: Arc<dyn CallStore>,
        transport: Arc<dyn MediaTransport>,
        devices: Arc<dyn MediaDevices>,
        profiles: Arc<dyn ProfileStore>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config,
            store,
            transport,
            devices,
            profiles,
            state: RwLock::new(SignalingState::Idle),
            role: RwLock::new(None),
            identity: RwLock::new(PartyIdentity::default()),
            local_stream: RwLock::new(None),
            remote_stream: RwLock::new(MediaStream::new()),
            status_log: RwLock::new(VecDeque::new()),
            event_tx,
            handler: RwLock::new(None),
            event_loop: Mutex::new(None),
        }
    }

    /// Load persisted identifiers and attach the transport event loop
    ///
    /// Idempotent: a second call is a no-op. Profile load failures are
    /// reported as status and do not prevent startup.
    pub async fn start(self: &Arc<Self>) -> SignalingResult<()> {
        for role in [PartyRole::Caller, PartyRole::Receiver] {
            match self.profiles.load(role).await {
                Ok(Some(value)) => {
                    debug!(%role, "loaded persisted identifier");
                    self.identity.write().await.set(role, value);
                }
                Ok(None) => {}
                Err(e) => {
                    error!(%role, error = %e, "failed to load persisted identifier");
                    self.emit(SignalingEvent::OperationFailed {
                        operation: SignalingOperation::LoadProfile,
                        message: e.to_string(),
                    })
                    .await;
                }
            }
        }

        let mut guard = self.event_loop.lock().await;
        if guard.is_none() {
            let receiver = self.transport.subscribe();
            let coordinator = Arc::clone(self);
            *guard = Some(tokio::spawn(async move {
                coordinator.pump_transport_events(receiver).await;
            }));
            info!("signaling coordinator started");
        }
        Ok(())
    }

    /// True while the transport event loop is attached
    pub async fn is_running(&self) -> bool {
        self.event_loop
            .lock()
            .await
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Subscribe to the coordinator's event feed
    pub fn subscribe(&self) -> broadcast::Receiver<SignalingEvent> {
        self.event_tx.subscribe()
    }

    /// Register the inline event handler (replaces any previous one)
    pub async fn set_event_handler(&self, handler: Arc<dyn SignalingEventHandler>) {
        *self.handler.write().await = Some(handler);
    }

    /// Current handshake state
    pub async fn state(&self) -> SignalingState {
        *self.state.read().await
    }

    /// Role assumed by this device, once an offer or answer step ran
    pub async fn role(&self) -> Option<PartyRole> {
        *self.role.read().await
    }

    /// The two identifiers currently held
    pub async fn identity(&self) -> PartyIdentity {
        self.identity.read().await.clone()
    }

    /// The locally captured stream, once `setup_media` ran
    pub async fn local_stream(&self) -> Option<MediaStream> {
        self.local_stream.read().await.clone()
    }

    /// The remote stream, grown in place as remote tracks arrive
    pub async fn remote_stream(&self) -> MediaStream {
        self.remote_stream.read().await.clone()
    }

    /// Rolling newest-first log of raw candidate JSON
    pub async fn status_log(&self) -> Vec<String> {
        self.status_log.read().await.iter().cloned().collect()
    }

    pub(crate) async fn emit(&self, event: SignalingEvent) {
        debug!(?event, "signaling event");
        let handler = self.handler.read().await.clone();
        if let Some(handler) = handler {
            match &event {
                SignalingEvent::StateChanged { previous, current } => {
                    handler
                        .on_state_changed(StateChangedInfo {
                            previous: *previous,
                            current: *current,
                        })
                        .await;
                }
                SignalingEvent::RemoteTrackAdded { track } => {
                    handler.on_remote_track(track.clone()).await;
                }
                _ => {}
            }
            handler
                .on_status(StatusInfo {
                    message: event.status_text(),
                    timestamp: chrono::Utc::now(),
                })
                .await;
        }
        // Send only fails when nobody subscribed, which is fine.
        let _ = self.event_tx.send(event);
    }

    pub(crate) async fn set_state(&self, next: SignalingState) {
        let previous = {
            let mut state = self.state.write().await;
            if *state == next {
                return;
            }
            let previous = *state;
            *state = next;
            previous
        };
        info!(%previous, current = %next, "signaling state changed");
        self.emit(SignalingEvent::StateChanged {
            previous,
            current: next,
        })
        .await;
    }

    /// Reject the operation before any I/O when the state machine forbids it
    pub(crate) async fn ensure_permitted(
        &self,
        operation: SignalingOperation,
    ) -> SignalingResult<()> {
        let state = *self.state.read().await;
        if state.permits(operation) {
            Ok(())
        } else {
            Err(crate::error::SignalingError::InvalidTransition {
                from: state,
                operation,
            })
        }
    }

    pub(crate) async fn take_event_loop(&self) -> Option<JoinHandle<()>> {
        self.event_loop.lock().await.take()
    }

    /// Boundary error handling shared by every operation: log, surface as a
    /// status event, return typed
    pub(crate) async fn finish<T>(
        &self,
        operation: SignalingOperation,
        result: SignalingResult<T>,
    ) -> SignalingResult<T> {
        if let Err(e) = &result {
            error!(%operation, error = %e, category = e.category(), "signaling operation failed");
            self.emit(SignalingEvent::OperationFailed {
                operation,
                message: e.to_string(),
            })
            .await;
        }
        result
    }
}

impl Drop for SignalingCoordinator {
    fn drop(&mut self) {
        if let Ok(mut guard) = self.event_loop.try_lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}

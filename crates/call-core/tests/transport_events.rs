//! Integration tests for the transport event reaction loop
//!
//! Events are injected through the mock transport's feed, exactly as the
//! real engine would deliver them, and the observable coordinator state is
//! asserted afterwards.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};

use talkie_call_core::{
    CoordinatorBuilder, CoordinatorConfig, MemoryProfileStore, PartyRole, SignalingCoordinator,
    SignalingError, SignalingEvent, SignalingEventHandler, SignalingState, StateChangedInfo,
    StatusInfo,
};
use talkie_media_core::mock::{MockMediaDevices, MockMediaTransport};
use talkie_media_core::{
    IceCandidateInit, IceConnectionState, MediaStreamTrack, PeerConnectionState, TrackKind,
    TransportEvent, TransportSignalingState,
};
use talkie_store_core::{CallStore, CandidateSlot, MemoryStore};

async fn caller_device(
    store: &Arc<MemoryStore>,
    config: CoordinatorConfig,
) -> (Arc<SignalingCoordinator>, Arc<MockMediaTransport>) {
    let transport = Arc::new(MockMediaTransport::new());
    let coordinator = Arc::new(
        CoordinatorBuilder::new()
            .with_config(config)
            .with_store(store.clone())
            .with_transport(transport.clone())
            .with_devices(Arc::new(MockMediaDevices::new()))
            .with_profiles(Arc::new(MemoryProfileStore::new()))
            .build()
            .unwrap(),
    );
    coordinator.start().await.unwrap();
    (coordinator, transport)
}

async fn wait_for<F>(
    events: &mut broadcast::Receiver<SignalingEvent>,
    predicate: F,
) -> SignalingEvent
where
    F: Fn(&SignalingEvent) -> bool,
{
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return event,
                Ok(_) => continue,
                Err(e) => panic!("event channel closed: {e}"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

#[tokio::test]
async fn discovered_candidates_are_persisted_and_logged_newest_first() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();
    coordinator.create_offer().await.unwrap();

    let first = IceCandidateInit::new("candidate:1 1 udp 1 10.0.0.1 1 typ host");
    let second = IceCandidateInit::new("candidate:2 1 udp 2 10.0.0.2 1 typ host");
    transport.emit(TransportEvent::IceCandidate(first.clone()));
    transport.emit(TransportEvent::IceCandidate(second.clone()));
    for _ in 0..2 {
        wait_for(&mut events, |e| {
            matches!(e, SignalingEvent::CandidateStored { .. })
        })
        .await;
    }

    let doc = store.get("111").await.unwrap().unwrap();
    assert_eq!(
        doc.candidates_in(CandidateSlot::Candidates),
        [first.clone(), second.clone()].as_slice()
    );

    // The rolling log holds raw candidate JSON, newest first.
    let log = coordinator.status_log().await;
    assert_eq!(log.len(), 2);
    let newest: IceCandidateInit = serde_json::from_str(&log[0]).unwrap();
    let older: IceCandidateInit = serde_json::from_str(&log[1]).unwrap();
    assert_eq!(newest, second);
    assert_eq!(older, first);
}

#[tokio::test]
async fn gathering_sentinel_is_not_persisted() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();
    coordinator.create_offer().await.unwrap();

    transport.emit(TransportEvent::IceGatheringComplete);
    // Drain with a marker event: the loop is sequential, so once the marker
    // is observed the sentinel has been fully handled.
    transport.emit(TransportEvent::NegotiationNeeded);
    wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::NegotiationNeeded)
    })
    .await;

    let doc = store.get("111").await.unwrap().unwrap();
    assert!(doc.candidates_in(CandidateSlot::Candidates).is_empty());
    assert!(coordinator.status_log().await.is_empty());
}

#[tokio::test]
async fn candidates_before_any_role_are_silently_dropped() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    // Identifier stored, but no offer/answer step yet - no role assumed.
    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();

    transport.emit(TransportEvent::IceCandidate(IceCandidateInit::new(
        "candidate:early",
    )));
    transport.emit(TransportEvent::NegotiationNeeded);
    wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::NegotiationNeeded)
    })
    .await;

    // Dropped, not an error: the document has no candidates array.
    let doc = store.get("111").await.unwrap().unwrap();
    assert!(doc.candidates_in(CandidateSlot::Candidates).is_empty());
}

#[tokio::test]
async fn connection_closed_parks_the_state_machine() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();
    coordinator.create_offer().await.unwrap();

    transport.emit(TransportEvent::ConnectionStateChange(
        PeerConnectionState::Closed,
    ));
    wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::ConnectionClosed)
    })
    .await;

    assert_eq!(coordinator.state().await, SignalingState::Closed);
    let err = coordinator.create_offer().await.unwrap_err();
    assert!(matches!(err, SignalingError::InvalidTransition { .. }));
    // No cleanup is triggered by closure: the document is still there.
    assert!(store.get("111").await.unwrap().is_some());
}

#[tokio::test]
async fn connection_failure_allows_a_fresh_offer_round() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();
    coordinator.create_offer().await.unwrap();

    transport.emit(TransportEvent::ConnectionStateChange(
        PeerConnectionState::Failed,
    ));
    wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::ConnectionFailed)
    })
    .await;
    assert_eq!(coordinator.state().await, SignalingState::Failed);

    // Manual recovery: the user re-triggers the offer step.
    coordinator.create_offer().await.unwrap();
    assert_eq!(coordinator.state().await, SignalingState::OfferPersisted);
}

#[tokio::test]
async fn ice_establishment_transitions_to_connected() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();
    coordinator.create_offer().await.unwrap();

    transport.emit(TransportEvent::IceConnectionStateChange(
        IceConnectionState::Completed,
    ));
    let event = wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::IceEstablished { .. })
    })
    .await;
    assert_eq!(
        event,
        SignalingEvent::IceEstablished {
            state: IceConnectionState::Completed
        }
    );
    assert_eq!(coordinator.state().await, SignalingState::Connected);

    // Checking-state churn does not move the machine.
    transport.emit(TransportEvent::IceConnectionStateChange(
        IceConnectionState::Checking,
    ));
    transport.emit(TransportEvent::NegotiationNeeded);
    wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::NegotiationNeeded)
    })
    .await;
    assert_eq!(coordinator.state().await, SignalingState::Connected);
}

#[tokio::test]
async fn gathering_errors_are_non_fatal() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();

    transport.emit(TransportEvent::IceCandidateError {
        details: "STUN server unreachable".to_string(),
    });
    let event = wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::CandidateGatheringError { .. })
    })
    .await;
    assert!(event.status_text().contains("STUN server unreachable"));

    // Negotiation can still proceed.
    assert_eq!(coordinator.state().await, SignalingState::Idle);
    coordinator.create_offer().await.unwrap();
    assert_eq!(coordinator.state().await, SignalingState::OfferPersisted);
}

#[tokio::test]
async fn remote_tracks_grow_one_stream_in_place() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    let stream_before = coordinator.remote_stream().await;
    assert!(stream_before.is_empty());

    let audio = MediaStreamTrack::new(TrackKind::Audio);
    let video = MediaStreamTrack::new(TrackKind::Video);
    transport.emit(TransportEvent::Track(audio.clone()));
    transport.emit(TransportEvent::Track(video.clone()));
    for _ in 0..2 {
        wait_for(&mut events, |e| {
            matches!(e, SignalingEvent::RemoteTrackAdded { .. })
        })
        .await;
    }

    // Same stream entity, mutated in place - not replaced per track.
    let stream_after = coordinator.remote_stream().await;
    assert_eq!(stream_after.id, stream_before.id);
    assert_eq!(stream_after.tracks, vec![audio, video]);
}

#[tokio::test]
async fn transport_signaling_closed_is_surfaced_as_status_only() {
    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();
    coordinator.create_offer().await.unwrap();

    transport.emit(TransportEvent::SignalingStateChange(
        TransportSignalingState::Closed,
    ));
    wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::TransportSignalingClosed)
    })
    .await;

    // Status only: the handshake state machine is untouched.
    assert_eq!(coordinator.state().await, SignalingState::OfferPersisted);
}

#[tokio::test]
async fn status_log_is_bounded_by_configured_capacity() {
    let store = Arc::new(MemoryStore::new());
    let config = CoordinatorConfig {
        status_log_capacity: 3,
        ..Default::default()
    };
    let (coordinator, transport) = caller_device(&store, config).await;
    let mut events = coordinator.subscribe();

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();
    coordinator.create_offer().await.unwrap();

    for i in 1..=5 {
        transport.emit(TransportEvent::IceCandidate(IceCandidateInit::new(
            format!("candidate:{i}"),
        )));
    }
    for _ in 0..5 {
        wait_for(&mut events, |e| {
            matches!(e, SignalingEvent::CandidateStored { .. })
        })
        .await;
    }

    let log = coordinator.status_log().await;
    assert_eq!(log.len(), 3);
    // Newest first: 5, 4, 3.
    let newest: IceCandidateInit = serde_json::from_str(&log[0]).unwrap();
    assert_eq!(newest.candidate, "candidate:5");
}

#[derive(Default)]
struct RecordingHandler {
    states: Mutex<Vec<StateChangedInfo>>,
    statuses: Mutex<Vec<String>>,
    tracks: Mutex<Vec<MediaStreamTrack>>,
}

#[async_trait::async_trait]
impl SignalingEventHandler for RecordingHandler {
    async fn on_state_changed(&self, info: StateChangedInfo) {
        self.states.lock().await.push(info);
    }

    async fn on_status(&self, info: StatusInfo) {
        self.statuses.lock().await.push(info.message);
    }

    async fn on_remote_track(&self, track: MediaStreamTrack) {
        self.tracks.lock().await.push(track);
    }
}

#[tokio::test]
async fn inline_handler_receives_states_statuses_and_tracks() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("talkie=debug")
        .try_init();

    let store = Arc::new(MemoryStore::new());
    let (coordinator, transport) = caller_device(&store, CoordinatorConfig::default()).await;
    let mut events = coordinator.subscribe();

    let handler = Arc::new(RecordingHandler::default());
    coordinator.set_event_handler(handler.clone()).await;

    coordinator
        .store_party(PartyRole::Caller, "111")
        .await
        .unwrap();
    coordinator.create_offer().await.unwrap();

    let track = MediaStreamTrack::new(TrackKind::Audio);
    transport.emit(TransportEvent::Track(track.clone()));
    wait_for(&mut events, |e| {
        matches!(e, SignalingEvent::RemoteTrackAdded { .. })
    })
    .await;

    let statuses = handler.statuses.lock().await.clone();
    assert!(statuses.iter().any(|s| s == "Caller stored."));
    assert!(statuses.iter().any(|s| s == "Offer created."));
    assert!(statuses.iter().any(|s| s == "Remote track added."));

    let states = handler.states.lock().await.clone();
    assert!(states.iter().any(|info| {
        info.previous == SignalingState::Idle && info.current == SignalingState::OfferCreated
    }));
    assert!(states
        .iter()
        .any(|info| info.current == SignalingState::OfferPersisted));

    assert_eq!(handler.tracks.lock().await.clone(), vec![track]);
}

//! Two-device call setup, end to end, against in-memory collaborators
//!
//! Both "devices" live in this process and share one `MemoryStore`, the
//! same way two phones share the cloud document store. Run with:
//!
//! ```bash
//! RUST_LOG=talkie=debug cargo run -p talkie-call-core --example two_device_call
//! ```

use std::sync::Arc;

use talkie_call_core::{CoordinatorBuilder, MemoryProfileStore, PartyRole, SignalingCoordinator};
use talkie_media_core::mock::{MockMediaDevices, MockMediaTransport};
use talkie_media_core::{IceCandidateInit, IceConnectionState, TransportEvent};
use talkie_store_core::MemoryStore;

async fn make_device(
    store: &Arc<MemoryStore>,
) -> (Arc<SignalingCoordinator>, Arc<MockMediaTransport>) {
    let transport = Arc::new(MockMediaTransport::new());
    let coordinator = Arc::new(
        CoordinatorBuilder::new()
            .with_store(store.clone())
            .with_transport(transport.clone())
            .with_devices(Arc::new(MockMediaDevices::new()))
            .with_profiles(Arc::new(MemoryProfileStore::new()))
            .build()
            .expect("coordinator builds"),
    );
    coordinator.start().await.expect("coordinator starts");
    (coordinator, transport)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "talkie=info".into()),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    let (alice, alice_transport) = make_device(&store).await;
    let (bob, bob_transport) = make_device(&store).await;

    let mut alice_events = alice.subscribe();
    let mut bob_events = bob.subscribe();

    // Step 0: both sides capture media and identify the call.
    alice.setup_media().await?;
    bob.setup_media().await?;
    alice.store_party(PartyRole::Caller, "111").await?;
    bob.store_party(PartyRole::Receiver, "111").await?;

    // Steps 1-4: offer, answer, answer pickup.
    alice.create_offer().await?;
    bob.create_answer().await?;
    alice.fetch_answer().await?;

    // Trickle: each engine discovers a couple of candidates.
    for i in 1..=2 {
        alice_transport.emit(TransportEvent::IceCandidate(IceCandidateInit::new(
            format!("candidate:{i} 1 udp {i} 10.0.0.{i} 40000 typ host"),
        )));
        bob_transport.emit(TransportEvent::IceCandidate(IceCandidateInit::new(
            format!("candidate:{i} 1 udp {i} 10.1.0.{i} 40000 typ host"),
        )));
    }
    // Let the reaction loops persist them before pulling.
    use talkie_call_core::SignalingEvent;
    for events in [&mut alice_events, &mut bob_events] {
        for _ in 0..2 {
            while !matches!(
                events.recv().await?,
                SignalingEvent::CandidateStored { .. }
            ) {}
        }
    }

    // Steps 3/5: each side pulls the other's candidates.
    bob.fetch_candidates().await?;
    alice.fetch_candidates().await?;

    // The engines report connectivity.
    alice_transport.emit(TransportEvent::IceConnectionStateChange(
        IceConnectionState::Connected,
    ));
    bob_transport.emit(TransportEvent::IceConnectionStateChange(
        IceConnectionState::Completed,
    ));
    while !matches!(
        alice_events.recv().await?,
        SignalingEvent::IceEstablished { .. }
    ) {}
    while !matches!(
        bob_events.recv().await?,
        SignalingEvent::IceEstablished { .. }
    ) {}

    println!("alice: {:?}", alice.state().await);
    println!("bob:   {:?}", bob.state().await);
    println!("call log (newest first):");
    for line in alice.status_log().await {
        println!("  {line}");
    }

    alice.end_call().await?;
    bob.end_call().await?;
    Ok(())
}

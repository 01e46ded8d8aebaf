//! End-to-end invariant checks for the channel registry and fan-out engine,
//! driven through the public `sse_hub` library API rather than internals.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sse_hub::channel::{Channel, ChannelName, Event, EventSource, ListenerFn};
use sse_hub::registry::ChannelRegistry;
use sse_hub::BroadcastService;

fn name(s: &str) -> ChannelName {
    ChannelName::parse(s).unwrap()
}

fn recording_listener() -> (Arc<std::sync::Mutex<Vec<String>>>, ListenerFn) {
    let received = Arc::new(std::sync::Mutex::new(Vec::new()));
    let captured = received.clone();
    let listener: ListenerFn = Arc::new(move |event| {
        let captured = captured.clone();
        Box::pin(async move {
            captured.lock().unwrap().push(event.payload);
            true
        })
    });
    (received, listener)
}

#[tokio::test]
async fn single_subscriber_receives_broadcast() {
    let service = BroadcastService::new(Arc::new(ChannelRegistry::new()));
    let (received, listener) = recording_listener();
    service.subscribe(name("t1"), listener).await;

    service.broadcast(name("t1"), r#"{"x":1}"#).await.unwrap();

    assert_eq!(*received.lock().unwrap(), vec![r#"{"x":1}"#.to_string()]);
    assert_eq!(service.get_client_count(&name("t1")).await, 1);
}

#[tokio::test]
async fn fan_out_to_three_subscribers() {
    let service = BroadcastService::new(Arc::new(ChannelRegistry::new()));
    let mut receivers = Vec::new();
    for _ in 0..3 {
        let (received, listener) = recording_listener();
        service.subscribe(name("t2"), listener).await;
        receivers.push(received);
    }

    service.broadcast(name("t2"), "hello").await.unwrap();

    for received in &receivers {
        assert_eq!(*received.lock().unwrap(), vec!["hello".to_string()]);
    }
    assert_eq!(service.get_client_count(&name("t2")).await, 3);
}

#[tokio::test]
async fn disconnect_eviction_drops_count_on_next_fire() {
    let service = BroadcastService::new(Arc::new(ChannelRegistry::new()));
    let (survivor, survivor_listener) = recording_listener();
    service.subscribe(name("t3"), survivor_listener).await;

    let evicted: ListenerFn = Arc::new(|_event| Box::pin(async move { false }));
    service.subscribe(name("t3"), evicted).await;
    assert_eq!(service.get_client_count(&name("t3")).await, 2);

    service.broadcast(name("t3"), "ping").await.unwrap();

    assert_eq!(service.get_client_count(&name("t3")).await, 1);
    assert_eq!(*survivor.lock().unwrap(), vec!["ping".to_string()]);
}

#[tokio::test]
async fn broadcast_to_unsubscribed_channel_is_a_true_no_op() {
    let service = BroadcastService::new(Arc::new(ChannelRegistry::new()));
    service.broadcast(name("ghost"), "x").await.unwrap();

    // Publishing to a channel nobody has looked up or subscribed to must
    // not allocate it.
    assert_eq!(service.get_client_count(&name("ghost")).await, 0);
    assert!(service.get_active_channels().await.is_empty());
}

#[tokio::test]
async fn close_channel_produces_new_incarnation() {
    let registry = Arc::new(ChannelRegistry::new());
    let service = BroadcastService::new(registry.clone());

    let first = registry.get_or_create(name("t6")).await;
    service.subscribe(name("t6"), Arc::new(|_e| Box::pin(async move { true }))).await;

    assert!(service.close_channel(&name("t6")).await);
    assert!(!first.is_active());

    let second = registry.get_or_create(name("t6")).await;
    assert_ne!(first.id(), second.id());
}

#[tokio::test]
async fn invalid_channel_name_is_rejected_at_construction() {
    // The reserved _system prefix never reaches BroadcastService::broadcast
    // in typed code; ChannelName::parse is the enforcement point.
    assert!(ChannelName::parse("_system.audit").is_err());
}

#[tokio::test]
async fn heartbeat_event_carries_empty_payload_and_is_diagnostics_only() {
    let channel_id = uuid::Uuid::new_v4();
    let event: Event = BroadcastService::heartbeat_event(channel_id);
    assert_eq!(event.source, EventSource::Heartbeat);
    assert!(event.payload.is_empty());
}

#[tokio::test]
async fn concurrent_lookup_by_name_returns_same_channel() {
    let registry = Arc::new(ChannelRegistry::new());
    let mut handles = Vec::new();
    for _ in 0..16 {
        let registry = registry.clone();
        handles.push(tokio::spawn(async move { registry.get_or_create(name("hot")).await.id() }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap());
    }

    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn fire_and_subscribe_interleave_without_losing_listeners() {
    let channel = Arc::new(Channel::new(name("race")));
    let hits = Arc::new(AtomicUsize::new(0));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let channel = channel.clone();
        let hits = hits.clone();
        handles.push(tokio::spawn(async move {
            let listener: ListenerFn = Arc::new(move |_event| {
                let hits = hits.clone();
                Box::pin(async move {
                    hits.fetch_add(1, Ordering::SeqCst);
                    true
                })
            });
            channel.subscribe(listener).await;
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    channel.fire(Event {
        channel_id: channel.id(),
        source: EventSource::Publisher,
        payload: "go".to_string(),
    })
    .await;

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(hits.load(Ordering::SeqCst), 8);
}

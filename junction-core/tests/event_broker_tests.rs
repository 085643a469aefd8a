/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Notify, Semaphore};

use junction_core::prelude::*;
use junction_test::prelude::*;

use crate::setup::*;

mod setup;

/// Handles events only as fast as the test releases permits.
#[derive(Clone)]
struct GatedSubscriber {
    started: Arc<Notify>,
    release: Arc<Semaphore>,
}

#[async_trait]
impl EventSubscriber for GatedSubscriber {
    async fn on_event(&self, _event: Arc<IntegrationEvent>) -> anyhow::Result<()> {
        self.started.notify_one();
        self.release.acquire().await?.forget();
        Ok(())
    }
}

fn connection_opened(source: &EventSource, id: &str) -> IntegrationEvent {
    IntegrationEvent::new(
        source.clone(),
        AdapterEvent::TcpConnectionOpened {
            connection_id: id.to_string(),
        },
    )
}

#[junction_test]
async fn test_listening_event_reaches_subscriber() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = EventBroker::new();
    let recorder = RecordingSubscriber::default();
    broker.subscribe([EventKind::UdpServerListening], recorder.clone());

    let source = EventSource::new("udp_inbound")?;
    let queued = announce_listening(&broker, &source, 0, 54321);
    assert_eq!(queued, 1);

    broker.shutdown().await;
    let received = recorder.received();
    assert_eq!(received.len(), 1);

    let event = &received[0];
    assert_eq!(event.kind(), EventKind::UdpServerListening);
    assert_eq!(event.port(), Some(54321));
    assert_eq!(event.source(), &source);
    assert_eq!(
        event.event(),
        &AdapterEvent::UdpServerListening(ServerListening::new(0, 54321))
    );
    assert!(event.to_string().contains("port=54321"));
    Ok(())
}

#[junction_test]
async fn test_subscriptions_select_by_kind() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = EventBroker::new();
    let listening_only = RecordingSubscriber::default();
    let everything = RecordingSubscriber::default();
    broker.subscribe([EventKind::UdpServerListening], listening_only.clone());
    broker.subscribe([], everything.clone());
    assert_eq!(broker.subscriber_count(), 2);

    let source = EventSource::new("tcp_inbound")?;
    assert_eq!(broker.publish(connection_opened(&source, "c-1")), 1);
    assert_eq!(
        broker.publish(IntegrationEvent::udp_server_listening(source.clone(), 9000, 9000)),
        2
    );

    broker.shutdown().await;
    assert_eq!(listening_only.received().len(), 1);
    assert_eq!(everything.received().len(), 2);
    assert_eq!(everything.received()[0].port(), None);

    let stats = broker.stats();
    assert_eq!(stats.published, 2);
    assert_eq!(stats.delivered, 3);
    assert_eq!(stats.dropped, 0);
    Ok(())
}

#[junction_test]
async fn test_full_queue_drops_for_that_subscriber_only() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = EventBroker::new().with_queue_capacity(1);
    let gated = GatedSubscriber {
        started: Arc::new(Notify::new()),
        release: Arc::new(Semaphore::new(0)),
    };
    let recorder = RecordingSubscriber::default();
    broker.subscribe([], gated.clone());
    broker.subscribe([], recorder.clone());

    let source = EventSource::new("tcp_inbound")?;
    broker.publish(connection_opened(&source, "c-0"));
    // The gated subscriber now holds event 0 and its queue is empty again.
    gated.started.notified().await;

    for i in 1..=4 {
        // Let the recorder keep pace so only the gated queue overflows.
        tokio::time::sleep(Duration::from_millis(20)).await;
        broker.publish(connection_opened(&source, &format!("c-{i}")));
    }

    gated.release.add_permits(16);
    broker.shutdown().await;

    let stats = broker.stats();
    assert_eq!(stats.published, 5);
    assert_eq!(stats.dropped, 3);
    assert_eq!(recorder.received().len(), 5);
    assert_eq!(stats.delivered, 5 + 2);
    Ok(())
}

#[junction_test]
async fn test_failing_subscriber_is_isolated() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = EventBroker::new();
    let recorder = RecordingSubscriber::default();
    broker.subscribe(
        [],
        FnSubscriber::new(|_event: Arc<IntegrationEvent>| -> FutureBoxResult {
            Box::pin(async { Err(anyhow::anyhow!("subscriber rejected event")) })
        }),
    );
    broker.subscribe([], recorder.clone());

    let source = EventSource::new("tcp_inbound")?;
    for i in 0..3 {
        assert_eq!(broker.publish(connection_opened(&source, &i.to_string())), 2);
    }

    broker.shutdown().await;
    assert_eq!(recorder.received().len(), 3);
    let stats = broker.stats();
    assert_eq!(stats.failures, 3);
    assert_eq!(stats.delivered, 3);
    Ok(())
}

#[junction_test]
async fn test_unsubscribe_stops_delivery() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = EventBroker::new();
    let id = broker.subscribe([], RecordingSubscriber::default());

    assert!(broker.unsubscribe(id));
    assert!(!broker.unsubscribe(id));
    assert_eq!(broker.subscriber_count(), 0);

    let source = EventSource::new("tcp_inbound")?;
    assert_eq!(broker.publish(connection_opened(&source, "c-1")), 0);
    broker.shutdown().await;
    Ok(())
}

#[junction_test]
async fn test_shutdown_drains_queued_events() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = EventBroker::new();
    let recorder = RecordingSubscriber::default();
    broker.subscribe([], recorder.clone());

    let source = EventSource::new("tcp_inbound")?;
    for i in 0..10 {
        broker.publish(connection_opened(&source, &i.to_string()));
    }
    broker.shutdown().await;

    let ids: Vec<String> = recorder
        .received()
        .iter()
        .filter_map(|event| match event.event() {
            AdapterEvent::TcpConnectionOpened { connection_id } => Some(connection_id.clone()),
            _ => None,
        })
        .collect();
    let expected: Vec<String> = (0..10).map(|i| i.to_string()).collect();
    assert_eq!(ids, expected, "each subscriber sees events in publish order");
    assert_eq!(broker.subscriber_count(), 0);

    let late = RecordingSubscriber::default();
    broker.subscribe([], late.clone());
    assert_eq!(broker.publish(connection_opened(&source, "late")), 0);
    assert!(late.received().is_empty());
    Ok(())
}

#[junction_test]
async fn test_slow_subscriber_never_blocks_publisher() -> anyhow::Result<()> {
    initialize_tracing();
    let config = EventConfig {
        subscriber_queue_capacity: 4,
        shutdown_timeout_ms: 100,
    };
    let broker = EventBroker::with_config(&config);
    broker.subscribe(
        [],
        FnSubscriber::new(|_event: Arc<IntegrationEvent>| -> FutureBoxResult {
            Box::pin(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
        }),
    );

    let source = EventSource::new("tcp_inbound")?;
    let started = Instant::now();
    for i in 0..100 {
        broker.publish(connection_opened(&source, &i.to_string()));
    }
    assert!(started.elapsed() < Duration::from_secs(1));
    assert!(broker.stats().dropped >= 95);

    let started = Instant::now();
    broker.shutdown().await;
    assert!(started.elapsed() < Duration::from_secs(5), "shutdown is bounded by its timeout");
    Ok(())
}

#[junction_test]
async fn test_broker_is_usable_as_shared_publisher() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = EventBroker::new();
    let recorder = RecordingSubscriber::default();
    broker.subscribe([EventKind::TcpConnectionClosed], recorder.clone());

    let publisher: Arc<dyn EventPublisher> = Arc::new(broker.clone());
    let source = EventSource::from(Ern::with_root("tcp_inbound")?);
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let publisher = Arc::clone(&publisher);
            let source = source.clone();
            tokio::spawn(async move {
                publisher.publish(IntegrationEvent::new(
                    source,
                    AdapterEvent::TcpConnectionClosed {
                        connection_id: format!("c-{i}"),
                    },
                ))
            })
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.await?, 1);
    }

    broker.shutdown().await;
    assert_eq!(recorder.received().len(), 4);
    Ok(())
}

#[junction_test]
async fn test_subscriptions_racing_shutdown_are_not_left_behind() -> anyhow::Result<()> {
    initialize_tracing();
    for _ in 0..20 {
        let broker = EventBroker::new();
        let subscribers: Vec<_> = (0..8)
            .map(|_| {
                let broker = broker.clone();
                tokio::spawn(async move {
                    tokio::task::yield_now().await;
                    broker.subscribe([], RecordingSubscriber::default())
                })
            })
            .collect();

        broker.shutdown().await;
        for handle in subscribers {
            handle.await?;
        }

        assert_eq!(broker.subscriber_count(), 0);
        let source = EventSource::new("tcp_inbound")?;
        assert_eq!(broker.publish(connection_opened(&source, "late")), 0);
        assert_eq!(broker.stats().dropped, 0);
    }
    Ok(())
}

#[test]
fn blank_event_source_is_rejected() {
    initialize_tracing();
    assert!(matches!(
        EventSource::new("  "),
        Err(MessageError::InvalidArgument(_))
    ));
}

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
//! Subscribers that panic. These run on plain `#[test]` with a hand-built runtime
//! because `#[junction_test]` fails any test in which a panic is raised, even one the
//! broker recovers from.

use std::sync::Arc;

use junction_core::prelude::*;

use crate::setup::*;

mod setup;

struct PanickingSubscriber {
    calls: Arc<CallCounter>,
}

#[async_trait]
impl EventSubscriber for PanickingSubscriber {
    async fn on_event(&self, event: Arc<IntegrationEvent>) -> anyhow::Result<()> {
        let call = self.calls.hit();
        if call % 2 == 1 {
            panic!("subscriber blew up on {event}");
        }
        Ok(())
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("runtime")
}

#[test]
fn panicking_subscriber_does_not_reach_publisher_or_peers() {
    initialize_tracing();
    runtime().block_on(async {
        let broker = EventBroker::new();
        let calls = Arc::new(CallCounter::default());
        let recorder = RecordingSubscriber::default();
        broker.subscribe(
            [],
            PanickingSubscriber {
                calls: Arc::clone(&calls),
            },
        );
        broker.subscribe([], recorder.clone());

        let source = EventSource::new("udp_inbound").expect("valid source");
        for port in [7000, 7001, 7002, 7003] {
            assert_eq!(announce_listening(&broker, &source, 0, port), 2);
        }
        broker.shutdown().await;

        assert_eq!(calls.count(), 4, "the task survives its own panics");
        assert_eq!(recorder.received().len(), 4);
        let stats = broker.stats();
        assert_eq!(stats.failures, 2);
        assert_eq!(stats.delivered, 4 + 2);
    });
}

#[test]
fn panicking_closure_subscriber_is_counted() {
    initialize_tracing();
    runtime().block_on(async {
        let broker = EventBroker::new();
        broker.subscribe(
            [EventKind::MessageExpired],
            FnSubscriber::new(|event: Arc<IntegrationEvent>| -> FutureBoxResult {
                Box::pin(async move {
                    if matches!(event.event(), AdapterEvent::MessageExpired { .. }) {
                        panic!("closure subscriber panicked");
                    }
                    Ok(())
                })
            }),
        );

        let source = EventSource::new("poller").expect("valid source");
        let expired = Message::builder()
            .payload("stale")
            .expiration(std::time::SystemTime::UNIX_EPOCH)
            .build()
            .expect("payload supplied");
        let live = discard_expired(vec![expired], Some(&broker as &dyn EventPublisher), &source);
        assert!(live.is_empty());

        broker.shutdown().await;
        assert_eq!(broker.stats().failures, 1);
    });
}

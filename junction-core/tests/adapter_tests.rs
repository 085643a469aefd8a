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
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use junction_core::prelude::*;
use junction_test::prelude::*;

use crate::setup::*;

mod setup;

fn text_files(source: &str) -> anyhow::Result<EntryMessageSource<String>> {
    Ok(EntryMessageSource::new(
        EventSource::new(source)?,
        AntPatternEntryFilter::new("*.txt"),
    ))
}

#[test]
fn receive_wraps_admitted_entries_in_fresh_messages() -> anyhow::Result<()> {
    initialize_tracing();
    let source = text_files("file_inbound")?;

    let messages = source.receive(vec![
        "a.txt".to_string(),
        "b.csv".to_string(),
        "c.txt".to_string(),
    ]);

    let payloads: Vec<&str> = messages.iter().map(|m| m.payload().as_str()).collect();
    assert_eq!(payloads, ["a.txt", "c.txt"]);
    let ids: HashSet<&MessageId> = messages.iter().map(Message::id).collect();
    assert_eq!(ids.len(), 2);
    assert!(messages.iter().all(|m| m.header().is_empty()));
    Ok(())
}

#[test]
fn receive_uses_injected_factory() -> anyhow::Result<()> {
    initialize_tracing();
    let source = text_files("file_inbound")?.with_factory(MessageFactory::new(Arc::new(
        SequentialIdGenerator::with_prefix("file-"),
    )));

    let messages = source.receive(vec!["a.txt".to_string(), "b.txt".to_string()]);
    let ids: Vec<&str> = messages.iter().map(|m| m.id().as_str()).collect();
    assert_eq!(ids, ["file-1", "file-2"]);
    Ok(())
}

#[test]
fn unevaluable_entries_are_reported_and_skipped() -> anyhow::Result<()> {
    initialize_tracing();
    let publisher = CollectingPublisher::default();
    let source = EntryMessageSource::<TestEntry>::new(
        EventSource::new("file_inbound")?,
        AntPatternEntryFilter::new("*.txt"),
    )
    .with_publisher(Arc::new(publisher.clone()));

    let messages = source.receive(vec![
        TestEntry::Named("a.txt".to_string()),
        TestEntry::Broken,
        TestEntry::Named("b.txt".to_string()),
    ]);
    assert_eq!(messages.len(), 2);

    let events = publisher.published();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), EventKind::FilterEvaluationFailed);
    assert_eq!(events[0].source(), source.source());
    match events[0].event() {
        AdapterEvent::FilterEvaluationFailed { entry, reason } => {
            assert_eq!(entry, "Broken");
            assert!(reason.contains("entry vanished"), "{reason}");
        }
        other => panic!("unexpected event {other}"),
    }
    Ok(())
}

#[test]
fn poll_scans_then_receives() -> anyhow::Result<()> {
    initialize_tracing();
    let source = EntryMessageSource::<String>::new(
        EventSource::new("file_inbound")?,
        AntPatternEntryFilter::<String>::new("*.txt")
            .and(AcceptOnceEntryListFilter::with_capacity(None)),
    );
    let directory = || -> anyhow::Result<Vec<String>> {
        Ok(vec!["a.txt".to_string(), "b.csv".to_string()])
    };

    let first = source.poll(&directory)?;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].payload(), "a.txt");
    assert!(source.poll(&directory)?.is_empty(), "already seen");
    Ok(())
}

#[test]
fn poll_propagates_scan_errors() -> anyhow::Result<()> {
    initialize_tracing();
    let source = text_files("file_inbound")?;
    let missing = || -> anyhow::Result<Vec<String>> { Err(anyhow::anyhow!("directory missing")) };

    let error = source.poll(&missing).unwrap_err();
    let rendered = format!("{error:#}");
    assert!(rendered.contains("scan failed for"), "{rendered}");
    assert!(rendered.contains("directory missing"), "{rendered}");
    Ok(())
}

#[test]
fn expired_messages_are_discarded_quietly() -> anyhow::Result<()> {
    initialize_tracing();
    let publisher = CollectingPublisher::default();
    let source = EventSource::new("poller")?;

    let fresh = Message::new("fresh");
    let stale = Message::builder()
        .payload("stale")
        .expiration(SystemTime::now() - Duration::from_secs(5))
        .build()?;
    let later = Message::builder()
        .payload("later")
        .expiration(SystemTime::now() + Duration::from_secs(60))
        .build()?;
    let stale_id = stale.id().clone();

    let live = discard_expired(
        vec![fresh, stale, later],
        Some(&publisher as &dyn EventPublisher),
        &source,
    );
    let payloads: Vec<&str> = live.iter().map(|m| *m.payload()).collect();
    assert_eq!(payloads, ["fresh", "later"]);

    let events = publisher.published();
    assert_eq!(events.len(), 1);
    assert_eq!(
        events[0].event(),
        &AdapterEvent::MessageExpired { message_id: stale_id }
    );

    let without_publisher = discard_expired(live, None, &source);
    assert_eq!(without_publisher.len(), 2);
    Ok(())
}

#[test]
fn unexpired_filter_matches_discard() -> anyhow::Result<()> {
    initialize_tracing();
    let filter = UnexpiredMessageFilter::<i32>::new();
    let stale = Message::builder()
        .payload(1)
        .expiration(SystemTime::UNIX_EPOCH)
        .build()?;
    let filtered = filter.filter_entries(vec![Message::new(2), stale]);
    assert_eq!(filtered.accepted.len(), 1);
    assert_eq!(*filtered.accepted[0].payload(), 2);
    assert_eq!(filtered.rejected, 1);
    Ok(())
}

#[junction_test]
async fn test_inbound_flow_through_broker() -> anyhow::Result<()> {
    initialize_tracing();
    let broker = EventBroker::new();
    let diagnostics = RecordingSubscriber::default();
    broker.subscribe(
        [EventKind::FilterEvaluationFailed, EventKind::UdpServerListening],
        diagnostics.clone(),
    );

    let udp = EventSource::new("udp_inbound")?;
    announce_listening(&broker, &udp, 0, 54321);

    let source = EntryMessageSource::<TestEntry>::new(
        EventSource::new("file_inbound")?,
        AntPatternEntryFilter::new("**/*.txt"),
    )
    .with_publisher(Arc::new(broker.clone()));
    let messages = source.receive(vec![
        TestEntry::Named("in/a.txt".to_string()),
        TestEntry::Broken,
    ]);
    assert_eq!(messages.len(), 1);

    broker.shutdown().await;
    let kinds: Vec<EventKind> = diagnostics.received().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        [EventKind::UdpServerListening, EventKind::FilterEvaluationFailed]
    );
    Ok(())
}

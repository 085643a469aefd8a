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

use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use futures::future::join_all;
use futures::FutureExt;
use parking_lot::RwLock;
use static_assertions::assert_impl_all;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, trace, warn};

use crate::common::config::EventConfig;
use crate::common::{FutureBoxResult, CONFIG};
use crate::event::{EventKind, IntegrationEvent};

/// Accepts events from adapters.
///
/// Publishing is synchronous and never blocks the adapter's hot path; it returns the
/// number of subscribers the event was queued for.
pub trait EventPublisher: Send + Sync {
    /// Hands `event` to every interested subscriber.
    fn publish(&self, event: IntegrationEvent) -> usize;
}

/// Receives events from an [`EventBroker`].
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    /// Handles one event. Errors are logged and counted by the broker, never
    /// propagated to the publisher.
    async fn on_event(&self, event: Arc<IntegrationEvent>) -> anyhow::Result<()>;
}

/// Adapts a closure returning a boxed future into an [`EventSubscriber`].
pub struct FnSubscriber<F>(F);

impl<F> FnSubscriber<F>
where
    F: Fn(Arc<IntegrationEvent>) -> FutureBoxResult + Send + Sync + 'static,
{
    /// Wraps `handler`.
    pub const fn new(handler: F) -> Self {
        Self(handler)
    }
}

#[async_trait]
impl<F> EventSubscriber for FnSubscriber<F>
where
    F: Fn(Arc<IntegrationEvent>) -> FutureBoxResult + Send + Sync + 'static,
{
    async fn on_event(&self, event: Arc<IntegrationEvent>) -> anyhow::Result<()> {
        (self.0)(event).await
    }
}

impl<F> fmt::Debug for FnSubscriber<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnSubscriber")
    }
}

/// Handle returned by [`EventBroker::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A snapshot of the broker's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BrokerStats {
    /// Events handed to [`EventPublisher::publish`].
    pub published: u64,
    /// Events a subscriber handled successfully.
    pub delivered: u64,
    /// Events not queued because a subscriber's queue was full or closed.
    pub dropped: u64,
    /// Events a subscriber returned an error for or panicked on.
    pub failures: u64,
}

#[derive(Debug, Default)]
struct BrokerCounters {
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug)]
struct Subscription {
    kinds: HashSet<EventKind>,
    sender: mpsc::Sender<Arc<IntegrationEvent>>,
    cancellation_token: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    fn wants(&self, kind: EventKind) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&kind)
    }
}

/// Type alias for the subscription registry.
type Subscriptions = Arc<DashMap<SubscriptionId, Subscription>>;

/// In-process publish/subscribe hub for [`IntegrationEvent`]s.
///
/// Every subscription owns a bounded queue drained by its own task, so a slow or
/// failing subscriber never delays the publisher or other subscribers. When a queue
/// is full the event is dropped for that subscriber only.
///
/// Cloning yields another handle to the same broker.
#[derive(Debug, Clone)]
pub struct EventBroker {
    subscriptions: Subscriptions,
    next_id: Arc<AtomicU64>,
    counters: Arc<BrokerCounters>,
    /// Set once `shutdown` starts. Held for reading while a subscription is registered.
    closing: Arc<RwLock<bool>>,
    cancellation_token: CancellationToken,
    queue_capacity: usize,
    shutdown_timeout: Duration,
}

assert_impl_all!(EventBroker: Send, Sync, EventPublisher);

impl Default for EventBroker {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBroker {
    /// Creates a broker configured from the `[events]` section of the loaded configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(&CONFIG.events)
    }

    /// Creates a broker from an explicit configuration.
    #[must_use]
    pub fn with_config(config: &EventConfig) -> Self {
        Self {
            subscriptions: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
            counters: Arc::new(BrokerCounters::default()),
            closing: Arc::new(RwLock::new(false)),
            cancellation_token: CancellationToken::new(),
            queue_capacity: config.subscriber_queue_capacity.max(1),
            shutdown_timeout: config.shutdown_timeout(),
        }
    }

    /// Overrides the per-subscriber queue capacity for subsequent subscriptions.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Registers `subscriber` for the given kinds. An empty `kinds` subscribes to every kind.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    #[instrument(skip(self, kinds, subscriber))]
    pub fn subscribe<S>(
        &self,
        kinds: impl IntoIterator<Item = EventKind>,
        subscriber: S,
    ) -> SubscriptionId
    where
        S: EventSubscriber + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let closing = self.closing.read();
        if *closing {
            warn!(subscription = %id, "Broker is shut down; subscription will receive nothing");
            return id;
        }

        let kinds: HashSet<EventKind> = kinds.into_iter().collect();
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let cancellation_token = self.cancellation_token.child_token();
        let task = tokio::spawn(run_subscription(
            id,
            subscriber,
            receiver,
            cancellation_token.clone(),
            self.counters.clone(),
        ));

        trace!(subscription = %id, kinds = ?kinds, "Subscription added");
        self.subscriptions.insert(
            id,
            Subscription {
                kinds,
                sender,
                cancellation_token,
                task,
            },
        );
        drop(closing);
        id
    }

    /// Removes a subscription. Events still queued for it are discarded.
    ///
    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        match self.subscriptions.remove(&id) {
            Some((_, subscription)) => {
                subscription.cancellation_token.cancel();
                trace!(subscription = %id, "Subscription removed");
                true
            }
            None => false,
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// A snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            published: self.counters.published.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
        }
    }

    /// Stops the broker.
    ///
    /// Every subscription is closed and its task allowed to drain the events already
    /// queued. Tasks still running after the configured timeout are aborted.
    #[instrument(skip(self))]
    pub async fn shutdown(&self) {
        *self.closing.write() = true;
        let ids: Vec<SubscriptionId> = self.subscriptions.iter().map(|entry| *entry.key()).collect();
        let mut tasks: Vec<JoinHandle<()>> = ids
            .into_iter()
            .filter_map(|id| self.subscriptions.remove(&id))
            .map(|(_, subscription)| subscription.task)
            .collect();
        debug!(count = tasks.len(), "Draining subscriptions");

        if tokio::time::timeout(self.shutdown_timeout, join_all(tasks.iter_mut()))
            .await
            .is_err()
        {
            warn!(
                timeout_ms = self.shutdown_timeout.as_millis(),
                "Subscribers did not drain in time; aborting"
            );
            for task in &tasks {
                task.abort();
            }
        }
        self.cancellation_token.cancel();
        trace!("Broker shut down");
    }
}

impl EventPublisher for EventBroker {
    fn publish(&self, event: IntegrationEvent) -> usize {
        self.counters.published.fetch_add(1, Ordering::Relaxed);
        let kind = event.kind();
        let event = Arc::new(event);
        let mut queued = 0;

        for subscription in self.subscriptions.iter() {
            if !subscription.wants(kind) {
                continue;
            }
            match subscription.sender.try_send(event.clone()) {
                Ok(()) => queued += 1,
                Err(TrySendError::Full(_)) => {
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(subscription = %subscription.key(), kind = ?kind, "Subscriber queue full; event dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    debug!(subscription = %subscription.key(), "Subscriber closed; event dropped");
                }
            }
        }
        trace!(kind = ?kind, queued, "Event published");
        queued
    }
}

async fn run_subscription<S: EventSubscriber>(
    id: SubscriptionId,
    subscriber: S,
    mut receiver: mpsc::Receiver<Arc<IntegrationEvent>>,
    cancellation_token: CancellationToken,
    counters: Arc<BrokerCounters>,
) {
    loop {
        tokio::select! {
            biased;
            () = cancellation_token.cancelled() => break,
            next = receiver.recv() => {
                let Some(event) = next else { break };
                deliver(id, &subscriber, event, &counters).await;
            }
        }
    }
    trace!(subscription = %id, "Subscription task finished");
}

async fn deliver<S: EventSubscriber>(
    id: SubscriptionId,
    subscriber: &S,
    event: Arc<IntegrationEvent>,
    counters: &BrokerCounters,
) {
    match AssertUnwindSafe(subscriber.on_event(event)).catch_unwind().await {
        Ok(Ok(())) => {
            counters.delivered.fetch_add(1, Ordering::Relaxed);
        }
        Ok(Err(e)) => {
            counters.failures.fetch_add(1, Ordering::Relaxed);
            warn!(subscription = %id, error = %e, "Subscriber failed to handle event");
        }
        Err(payload) => {
            counters.failures.fetch_add(1, Ordering::Relaxed);
            error!(subscription = %id, panic = %panic_message(payload.as_ref()), "Subscriber panicked");
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

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

use std::fmt::{self, Debug};
use std::sync::Arc;

use anyhow::Context;
use tracing::{instrument, trace};

use crate::common::BoxedEntryListFilter;
use crate::event::{AdapterEvent, EventPublisher, EventSource, IntegrationEvent};
use crate::filter::{EntryListFilter, FilteredEntries};
use crate::message::{Message, MessageFactory};

/// Lists the candidate entries of an external resource.
///
/// Transports implement this for whatever they poll: a directory, a remote listing,
/// a queue browser. Closures returning `anyhow::Result<Vec<E>>` implement it too.
pub trait EntrySource<E>: Send + Sync {
    /// Returns the entries currently available.
    ///
    /// # Errors
    ///
    /// Returns any error raised while reading the resource.
    fn scan(&self) -> anyhow::Result<Vec<E>>;
}

impl<E, F> EntrySource<E> for F
where
    F: Fn() -> anyhow::Result<Vec<E>> + Send + Sync,
{
    fn scan(&self) -> anyhow::Result<Vec<E>> {
        self()
    }
}

/// Turns the entries of an external resource into messages.
///
/// Entries pass through the configured filter; each admitted entry is wrapped in a
/// fresh message with an empty header. Entries the filter cannot evaluate are
/// reported as [`AdapterEvent::FilterEvaluationFailed`] and skipped.
pub struct EntryMessageSource<E> {
    source: EventSource,
    filter: BoxedEntryListFilter<E>,
    factory: MessageFactory,
    publisher: Option<Arc<dyn EventPublisher>>,
}

impl<E> EntryMessageSource<E>
where
    E: Debug + 'static,
{
    /// Creates a source identified by `source` that admits what `filter` accepts.
    pub fn new(source: EventSource, filter: impl EntryListFilter<E> + 'static) -> Self {
        Self {
            source,
            filter: Box::new(filter),
            factory: MessageFactory::default(),
            publisher: None,
        }
    }

    /// Uses `factory` to create messages instead of the default one.
    #[must_use]
    pub fn with_factory(mut self, factory: MessageFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Publishes diagnostic events to `publisher`.
    #[must_use]
    pub fn with_publisher(mut self, publisher: Arc<dyn EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    /// The identity events are raised under.
    #[must_use]
    pub const fn source(&self) -> &EventSource {
        &self.source
    }

    /// The entry filter.
    #[must_use]
    pub fn filter(&self) -> &dyn EntryListFilter<E> {
        self.filter.as_ref()
    }

    /// Filters `entries` and wraps every admitted entry in a new message, keeping
    /// input order.
    #[instrument(skip(self, entries), fields(source = %self.source))]
    pub fn receive(&self, entries: Vec<E>) -> Vec<Message<E>> {
        let FilteredEntries {
            accepted,
            rejected,
            failures,
        } = self.filter.filter_entries(entries);

        for (entry, error) in failures {
            self.emit(AdapterEvent::FilterEvaluationFailed {
                entry: format!("{entry:?}"),
                reason: error.to_string(),
            });
        }

        let messages: Vec<Message<E>> = accepted
            .into_iter()
            .map(|entry| self.factory.create(entry))
            .collect();
        trace!(created = messages.len(), rejected, "Received entries");
        messages
    }

    /// Scans `entries` and passes the result to [`receive`](Self::receive).
    ///
    /// # Errors
    ///
    /// Returns the scan error; nothing is filtered in that case.
    pub fn poll(&self, entries: &dyn EntrySource<E>) -> anyhow::Result<Vec<Message<E>>> {
        let scanned = entries
            .scan()
            .with_context(|| format!("scan failed for {}", self.source))?;
        Ok(self.receive(scanned))
    }

    fn emit(&self, event: AdapterEvent) {
        if let Some(publisher) = &self.publisher {
            publisher.publish(IntegrationEvent::new(self.source.clone(), event));
        }
    }
}

impl<E> fmt::Debug for EntryMessageSource<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntryMessageSource")
            .field("source", &self.source)
            .field("filter", &self.filter.name())
            .field("factory", &self.factory)
            .field("publishes", &self.publisher.is_some())
            .finish()
    }
}

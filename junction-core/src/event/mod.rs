//! Adapter lifecycle events and the in-process broker that distributes them.
//!
//! Adapters raise an [`IntegrationEvent`] when something noteworthy happens in their
//! lifecycle, such as a server socket starting to listen, and hand it to an
//! [`EventPublisher`]. The [`EventBroker`] fans events out to [`EventSubscriber`]s
//! without ever blocking the adapter.

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

// --- Public Re-exports ---
pub use event_broker::{
    BrokerStats, EventBroker, EventPublisher, EventSubscriber, FnSubscriber, SubscriptionId,
};
pub use integration_event::{AdapterEvent, EventKind, EventSource, IntegrationEvent, ServerListening};

// --- Submodules ---

/// Defines [`EventBroker`] and the publisher/subscriber contracts.
mod event_broker;
/// Defines [`IntegrationEvent`] and its payloads.
mod integration_event;

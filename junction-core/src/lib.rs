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

#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! # Junction Core
//!
//! The messaging core that enterprise-integration adapters are built on.
//!
//! ## Key Concepts
//!
//! - **Messages (`Message`)**: Immutable envelopes pairing a unique `MessageId` and a
//!   `MessageHeader` with a shared payload. Ids come from a pluggable `IdGenerator`.
//! - **Entry filters (`EntryListFilter`)**: Decide which entries found by an inbound
//!   adapter become messages. Includes Ant-style path patterns, regular expressions,
//!   composition and an accept-once variant.
//! - **Events (`IntegrationEvent`)**: Lifecycle notifications raised by adapters, such
//!   as a datagram server starting to listen, distributed by an `EventBroker`.
//! - **Adapters (`EntryMessageSource`)**: Glue turning scanned entries into messages.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use junction_core::prelude::*;
//!
//! let source = EntryMessageSource::new(
//!     EventSource::new("file_inbound")?,
//!     AntPatternEntryFilter::new("*.txt"),
//! );
//! let messages = source.receive(vec!["a.txt".to_string(), "b.csv".to_string()]);
//! assert_eq!(messages.len(), 1);
//! ```

/// Configuration, logging setup and shared aliases.
pub(crate) mod common;

/// Defines the message envelope and identities.
pub(crate) mod message;

/// Defines the entry-filtering framework.
pub(crate) mod filter;

/// Defines adapter lifecycle events and the event broker.
pub(crate) mod event;

/// Glue between entry sources, filters and messages.
pub(crate) mod adapter;

/// A prelude module for conveniently importing the most commonly used items.
///
/// # Re-exports
///
/// ## External Crates
/// *   [`acton_ern::Ern`](https://docs.rs/acton-ern): Resource names used as event sources.
/// *   [`async_trait::async_trait`](https://docs.rs/async-trait/latest/async_trait/attr.async_trait.html): Needed to implement [`EventSubscriber`](crate::event::EventSubscriber).
///
/// ## Core Types
/// *   Messages: [`Message`](crate::message::Message), [`MessageHeader`](crate::message::MessageHeader),
///     [`MessageFactory`](crate::message::MessageFactory) and the id generators.
/// *   Filters: [`EntryListFilter`](crate::filter::EntryListFilter) and its implementations.
/// *   Events: [`IntegrationEvent`](crate::event::IntegrationEvent) and [`EventBroker`](crate::event::EventBroker).
/// *   Adapters: [`EntryMessageSource`](crate::adapter::EntryMessageSource) and the lifecycle helpers.
/// *   Configuration: [`JunctionConfig`](crate::common::JunctionConfig), [`CONFIG`](crate::common::CONFIG)
///     and [`init_tracing`](crate::common::init_tracing).
pub mod prelude {
    pub use acton_ern::Ern;
    pub use async_trait::async_trait;

    pub use crate::adapter::{announce_listening, discard_expired, EntryMessageSource, EntrySource};
    pub use crate::common::config::{EventConfig, FilterConfig, IdConfig, TracingConfig};
    pub use crate::common::{
        init_tracing, BoxedEntryListFilter, FutureBoxResult, JunctionConfig, CONFIG,
    };
    pub use crate::event::{
        AdapterEvent, BrokerStats, EventBroker, EventKind, EventPublisher, EventSource,
        EventSubscriber, FnSubscriber, IntegrationEvent, ServerListening, SubscriptionId,
    };
    pub use crate::filter::{
        AcceptOnceEntryListFilter, AndFilter, AntPathMatcher, AntPatternEntryFilter,
        CompositeEntryListFilter, CompositeMode, EntryListFilter, EntryListFilterExt,
        FilterError, FilteredEntries, NotFilter, OrFilter, PathEntry, RegexPatternEntryFilter,
        UnexpiredMessageFilter,
    };
    pub use crate::message::{
        default_id_generator, HeaderValue, IdGenerator, IdStrategy, Message, MessageBuilder,
        MessageError, MessageFactory, MessageHeader, MessageId, MessagePriority,
        RandomUuidGenerator, ReturnAddress, SequentialIdGenerator,
    };
}

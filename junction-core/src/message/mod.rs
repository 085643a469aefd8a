//! Defines the message envelope, its header, identities and id generation.
//!
//! # Key Components
//!
//! *   [`Message`]: The immutable envelope carrying an id, a header and a payload.
//! *   [`MessageHeader`]: The per-message metadata bag (properties, attributes,
//!     return address, expiration and sequencing details).
//! *   [`IdGenerator`]: Strategy producing unique [`MessageId`]s, with
//!     [`RandomUuidGenerator`] as the process-wide default.
//! *   [`MessageFactory`]: Creates messages from a single injected generator.

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
pub use id_generator::{
    default_id_generator, IdGenerator, IdStrategy, RandomUuidGenerator, SequentialIdGenerator,
};
pub use message::{Message, MessageBuilder, MessageFactory};
pub use message_error::MessageError;
pub use message_header::{HeaderValue, MessageHeader, MessagePriority, ReturnAddress};
pub use message_id::MessageId;

// --- Submodules ---

/// Defines [`IdGenerator`] and its implementations.
mod id_generator;
/// Defines [`Message`], [`MessageBuilder`] and [`MessageFactory`].
#[allow(clippy::module_inception)]
mod message;
/// Defines [`MessageError`].
mod message_error;
/// Defines [`MessageHeader`] and the values it stores.
mod message_header;
/// Defines [`MessageId`].
mod message_id;

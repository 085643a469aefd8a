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

use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

use static_assertions::assert_impl_all;
use tracing::{instrument, trace};

use crate::message::{
    default_id_generator, IdGenerator, MessageError, MessageHeader, MessageId, ReturnAddress,
};

/// An immutable envelope: identity, header and payload.
///
/// The id and payload are fixed at construction. The header belongs to this message
/// alone and may still be changed through [`Message::header_mut`]. The payload is held
/// behind an `Arc` and never cloned by the envelope, so [`Message::shared_payload`]
/// hands out the very value the message was built with.
///
/// `Message` deliberately has no structural equality; compare [`Message::id`] when
/// deduplicating.
#[derive(Debug)]
pub struct Message<T> {
    id: MessageId,
    header: MessageHeader,
    payload: Arc<T>,
}

impl<T> Message<T> {
    /// Creates a message whose id comes from the process-wide default generator.
    ///
    /// The header starts empty with no expiration.
    pub fn new(payload: T) -> Self {
        Self::generated(default_id_generator().as_ref(), Arc::new(payload))
    }

    /// Creates a message with a caller-supplied id.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidArgument`] when `id` is blank.
    pub fn with_id(id: impl AsRef<str>, payload: T) -> Result<Self, MessageError> {
        let id = MessageId::parse(id)?;
        Ok(Self::from_shared(id, Arc::new(payload)))
    }

    /// Creates a message with a generated id and a copy of `header_to_copy`.
    ///
    /// Properties, attributes and the return address are copied into the new
    /// message's own header. Expiration is not carried over; the new message starts
    /// without one.
    pub fn with_header(payload: T, header_to_copy: &MessageHeader) -> Self {
        let mut message = Self::new(payload);
        message.header.copy_from(header_to_copy);
        message
    }

    /// Wraps an already shared payload without cloning it.
    pub fn from_shared(id: MessageId, payload: Arc<T>) -> Self {
        trace!(%id, "Creating Message");
        Self {
            id,
            header: MessageHeader::new(),
            payload,
        }
    }

    pub(crate) fn generated(generator: &dyn IdGenerator, payload: Arc<T>) -> Self {
        Self::from_shared(generator.generate_id(), payload)
    }

    /// Starts a [`MessageBuilder`].
    #[must_use]
    pub fn builder() -> MessageBuilder<T> {
        MessageBuilder::default()
    }

    /// The message identity.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> &MessageId {
        &self.id
    }

    /// The message header.
    #[inline]
    #[must_use]
    pub const fn header(&self) -> &MessageHeader {
        &self.header
    }

    /// Mutable access to this message's own header.
    #[inline]
    pub fn header_mut(&mut self) -> &mut MessageHeader {
        &mut self.header
    }

    /// The payload.
    #[inline]
    #[must_use]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Another handle to the same payload value.
    #[inline]
    #[must_use]
    pub fn shared_payload(&self) -> Arc<T> {
        Arc::clone(&self.payload)
    }

    /// Whether the expiration instant has passed, evaluated against the clock now.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(SystemTime::now())
    }

    /// Whether the message counts as expired at `now`.
    ///
    /// True only if an expiration is set and is strictly earlier than `now`; a message
    /// whose expiration equals `now` has not expired yet.
    #[must_use]
    pub fn is_expired_at(&self, now: SystemTime) -> bool {
        self.header.expiration().is_some_and(|expiration| expiration < now)
    }
}

impl<T: fmt::Display> fmt::Display for Message<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ID={}][Header={}][Payload='{}']",
            self.id, self.header, self.payload
        )
    }
}

/// Step-by-step construction of a [`Message`], validated in [`MessageBuilder::build`].
///
/// Useful for adapters whose inputs may be absent: a missing payload or blank id is
/// reported as an error instead of producing a half-built message.
#[derive(Debug)]
pub struct MessageBuilder<T> {
    id: Option<String>,
    payload: Option<Arc<T>>,
    header_to_copy: Option<MessageHeader>,
    expiration: Option<SystemTime>,
    return_address: Option<ReturnAddress>,
    generator: Option<Arc<dyn IdGenerator>>,
}

impl<T> Default for MessageBuilder<T> {
    fn default() -> Self {
        Self {
            id: None,
            payload: None,
            header_to_copy: None,
            expiration: None,
            return_address: None,
            generator: None,
        }
    }
}

impl<T> MessageBuilder<T> {
    /// Uses a caller-supplied id instead of generating one.
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the payload.
    #[must_use]
    pub fn payload(mut self, payload: T) -> Self {
        self.payload = Some(Arc::new(payload));
        self
    }

    /// Sets an already shared payload.
    #[must_use]
    pub fn shared_payload(mut self, payload: Arc<T>) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Copies properties, attributes and return address from `header`.
    #[must_use]
    pub fn copy_header(mut self, header: &MessageHeader) -> Self {
        self.header_to_copy = Some(header.clone());
        self
    }

    /// Sets the expiration instant.
    #[must_use]
    pub fn expiration(mut self, expiration: SystemTime) -> Self {
        self.expiration = Some(expiration);
        self
    }

    /// Sets the reply destination, overriding any copied one.
    #[must_use]
    pub fn return_address(mut self, address: impl Into<ReturnAddress>) -> Self {
        self.return_address = Some(address.into());
        self
    }

    /// Generates the id with `generator` rather than the process-wide default.
    #[must_use]
    pub fn generator(mut self, generator: Arc<dyn IdGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Validates the collected parts and creates the message.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidArgument`] when no payload was supplied or the
    /// supplied id is blank.
    #[instrument(skip(self))]
    pub fn build(self) -> Result<Message<T>, MessageError> {
        let payload = self
            .payload
            .ok_or_else(|| MessageError::invalid("payload must not be null"))?;
        let id = match self.id {
            Some(id) => MessageId::parse(id)?,
            None => self
                .generator
                .unwrap_or_else(default_id_generator)
                .generate_id(),
        };

        let mut message = Message::from_shared(id, payload);
        if let Some(header) = &self.header_to_copy {
            message.header.copy_from(header);
        }
        if let Some(expiration) = self.expiration {
            message.header.set_expiration(Some(expiration));
        }
        if let Some(address) = self.return_address {
            message.header.set_return_address(Some(address));
        }
        Ok(message)
    }
}

/// Creates messages using one injected id generator.
///
/// Share a factory (or its generator) across an adapter instead of building a
/// generator per message.
#[derive(Debug, Clone)]
pub struct MessageFactory {
    generator: Arc<dyn IdGenerator>,
}

impl Default for MessageFactory {
    fn default() -> Self {
        Self::new(default_id_generator())
    }
}

impl MessageFactory {
    /// Creates a factory backed by `generator`.
    pub fn new(generator: Arc<dyn IdGenerator>) -> Self {
        Self { generator }
    }

    /// The generator this factory draws ids from.
    #[must_use]
    pub fn generator(&self) -> &Arc<dyn IdGenerator> {
        &self.generator
    }

    /// Creates a message with a freshly generated id and an empty header.
    pub fn create<T>(&self, payload: T) -> Message<T> {
        Message::generated(self.generator.as_ref(), Arc::new(payload))
    }

    /// Creates a message with a caller-supplied id.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidArgument`] when `id` is blank.
    pub fn create_with_id<T>(&self, id: impl AsRef<str>, payload: T) -> Result<Message<T>, MessageError> {
        Message::with_id(id, payload)
    }

    /// Creates a message with a generated id and a copy of `header_to_copy`.
    pub fn create_with_header<T>(&self, payload: T, header_to_copy: &MessageHeader) -> Message<T> {
        let mut message = self.create(payload);
        message.header.copy_from(header_to_copy);
        message
    }
}

assert_impl_all!(Message<String>: Send, Sync);
assert_impl_all!(MessageFactory: Send, Sync);

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::message::SequentialIdGenerator;

    #[test]
    fn expiration_equal_to_now_is_not_expired() {
        let now = SystemTime::now();
        let mut message = Message::new("payload");
        message.header_mut().set_expiration(Some(now));
        assert!(!message.is_expired_at(now));
        assert!(message.is_expired_at(now + Duration::from_millis(1)));
    }

    #[test]
    fn factory_uses_injected_generator() {
        let factory = MessageFactory::new(Arc::new(SequentialIdGenerator::with_prefix("m-")));
        assert_eq!(factory.create(1).id().as_str(), "m-1");
        assert_eq!(factory.create(2).id().as_str(), "m-2");
    }
}

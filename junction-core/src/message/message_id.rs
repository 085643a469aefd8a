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

use uuid::Uuid;

use crate::message::MessageError;

/// Opaque identity of a [`Message`](crate::message::Message).
///
/// Ids are compared and hashed by value, so two messages carrying the same id are
/// the same entity for deduplication purposes. Cloning is a reference-count bump.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(Arc<str>);

impl MessageId {
    /// Parses a caller-supplied id.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidArgument`] when `id` is empty or only whitespace.
    pub fn parse(id: impl AsRef<str>) -> Result<Self, MessageError> {
        let id = id.as_ref();
        if id.trim().is_empty() {
            return Err(MessageError::invalid("id must not be null"));
        }
        Ok(Self(Arc::from(id)))
    }

    /// Wraps an id produced by a generator, which always contains at least one digit.
    pub(crate) fn from_generated(id: String) -> Self {
        Self(Arc::from(id))
    }

    /// The id as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<Uuid> for MessageId {
    fn from(value: Uuid) -> Self {
        Self(Arc::from(value.to_string()))
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self(Arc::from(value.to_string()))
    }
}

impl AsRef<str> for MessageId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_ids_are_rejected() {
        assert!(MessageId::parse("").is_err());
        assert!(MessageId::parse("   ").is_err());
        assert_eq!(MessageId::parse("order-7").unwrap().as_str(), "order-7");
    }
}

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

use std::collections::BTreeMap;
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use acton_ern::Ern;

use crate::message::MessageId;

/// A value stored in a header's properties or attributes.
///
/// Values are owned, so cloning a header never aliases another header's data.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    /// UTF-8 text.
    Str(String),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Boolean flag.
    Bool(bool),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Point in time.
    Timestamp(SystemTime),
    /// Reference to another message.
    Id(MessageId),
}

impl HeaderValue {
    /// Returns the text if this is a [`HeaderValue::Str`].
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HeaderValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is a [`HeaderValue::Int`].
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            HeaderValue::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Str(value.to_string())
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Str(value)
    }
}

impl From<i64> for HeaderValue {
    fn from(value: i64) -> Self {
        HeaderValue::Int(value)
    }
}

impl From<i32> for HeaderValue {
    fn from(value: i32) -> Self {
        HeaderValue::Int(i64::from(value))
    }
}

impl From<f64> for HeaderValue {
    fn from(value: f64) -> Self {
        HeaderValue::Float(value)
    }
}

impl From<bool> for HeaderValue {
    fn from(value: bool) -> Self {
        HeaderValue::Bool(value)
    }
}

impl From<Vec<u8>> for HeaderValue {
    fn from(value: Vec<u8>) -> Self {
        HeaderValue::Bytes(value)
    }
}

impl From<SystemTime> for HeaderValue {
    fn from(value: SystemTime) -> Self {
        HeaderValue::Timestamp(value)
    }
}

impl From<MessageId> for HeaderValue {
    fn from(value: MessageId) -> Self {
        HeaderValue::Id(value)
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Str(s) => f.write_str(s),
            HeaderValue::Int(i) => write!(f, "{i}"),
            HeaderValue::Float(x) => write!(f, "{x}"),
            HeaderValue::Bool(b) => write!(f, "{b}"),
            HeaderValue::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
            HeaderValue::Timestamp(t) => write!(f, "{}", epoch_millis(*t)),
            HeaderValue::Id(id) => write!(f, "{id}"),
        }
    }
}

/// Where a reply to a message should be routed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReturnAddress {
    /// A channel, by name.
    Channel(String),
    /// An endpoint, by resource name.
    Endpoint(Ern),
}

impl From<&str> for ReturnAddress {
    fn from(value: &str) -> Self {
        ReturnAddress::Channel(value.to_string())
    }
}

impl From<Ern> for ReturnAddress {
    fn from(value: Ern) -> Self {
        ReturnAddress::Endpoint(value)
    }
}

impl fmt::Display for ReturnAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReturnAddress::Channel(name) => write!(f, "channel:{name}"),
            ReturnAddress::Endpoint(ern) => write!(f, "endpoint:{ern}"),
        }
    }
}

/// Delivery priority hint for endpoints that order their work.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MessagePriority {
    /// Lowest priority.
    Lowest,
    /// Below normal.
    Low,
    /// The default.
    #[default]
    Normal,
    /// Above normal.
    High,
    /// Highest priority.
    Highest,
}

/// Metadata attached to exactly one message.
///
/// `properties` hold user-defined values and `attributes` hold framework routing
/// metadata. The two namespaces are independent: the same key may appear in both.
/// Keys are kept sorted so the [`Display`](fmt::Display) rendering is stable.
///
/// The header performs no locking. An endpoint that mutates a header after the
/// message has been shared must synchronize that mutation itself.
#[derive(Debug, Clone)]
pub struct MessageHeader {
    timestamp: SystemTime,
    expiration: Option<SystemTime>,
    return_address: Option<ReturnAddress>,
    correlation_id: Option<MessageId>,
    sequence_number: u32,
    sequence_size: u32,
    priority: MessagePriority,
    properties: BTreeMap<String, HeaderValue>,
    attributes: BTreeMap<String, HeaderValue>,
}

impl Default for MessageHeader {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageHeader {
    /// Creates an empty header stamped with the current time and no expiration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timestamp: SystemTime::now(),
            expiration: None,
            return_address: None,
            correlation_id: None,
            sequence_number: 0,
            sequence_size: 0,
            priority: MessagePriority::default(),
            properties: BTreeMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// True when no property, attribute, return address or expiration is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.attributes.is_empty()
            && self.return_address.is_none()
            && self.expiration.is_none()
    }

    /// Looks up a user property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&HeaderValue> {
        self.properties.get(key)
    }

    /// Sets a user property, returning the value it replaced.
    pub fn set_property(
        &mut self,
        key: impl Into<String>,
        value: impl Into<HeaderValue>,
    ) -> Option<HeaderValue> {
        self.properties.insert(key.into(), value.into())
    }

    /// Removes a user property.
    pub fn remove_property(&mut self, key: &str) -> Option<HeaderValue> {
        self.properties.remove(key)
    }

    /// Names of all user properties, in sorted order.
    pub fn property_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.properties.keys().map(String::as_str)
    }

    /// Looks up a framework attribute.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&HeaderValue> {
        self.attributes.get(key)
    }

    /// Sets a framework attribute, returning the value it replaced.
    pub fn set_attribute(
        &mut self,
        key: impl Into<String>,
        value: impl Into<HeaderValue>,
    ) -> Option<HeaderValue> {
        self.attributes.insert(key.into(), value.into())
    }

    /// Removes a framework attribute.
    pub fn remove_attribute(&mut self, key: &str) -> Option<HeaderValue> {
        self.attributes.remove(key)
    }

    /// Names of all framework attributes, in sorted order.
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.attributes.keys().map(String::as_str)
    }

    /// The reply destination, if any.
    #[must_use]
    pub const fn return_address(&self) -> Option<&ReturnAddress> {
        self.return_address.as_ref()
    }

    /// Replaces the reply destination.
    pub fn set_return_address(&mut self, address: Option<ReturnAddress>) {
        self.return_address = address;
    }

    /// The expiration instant; `None` means the message never expires.
    #[must_use]
    pub const fn expiration(&self) -> Option<SystemTime> {
        self.expiration
    }

    /// Replaces the expiration instant.
    pub fn set_expiration(&mut self, expiration: Option<SystemTime>) {
        self.expiration = expiration;
    }

    /// Expires the message `ttl` from now.
    ///
    /// A `ttl` too large to represent as a [`SystemTime`] clears the expiration,
    /// so the message never expires.
    pub fn expire_after(&mut self, ttl: Duration) {
        self.expiration = SystemTime::now().checked_add(ttl);
    }

    /// When this header was created.
    #[must_use]
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// Id correlating this message with others (e.g. a request it replies to).
    #[must_use]
    pub const fn correlation_id(&self) -> Option<&MessageId> {
        self.correlation_id.as_ref()
    }

    /// Replaces the correlation id.
    pub fn set_correlation_id(&mut self, correlation_id: Option<MessageId>) {
        self.correlation_id = correlation_id;
    }

    /// Position of this message within a split sequence.
    #[must_use]
    pub const fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    /// Sets the position within a split sequence.
    pub fn set_sequence_number(&mut self, sequence_number: u32) {
        self.sequence_number = sequence_number;
    }

    /// Total number of messages in the split sequence.
    #[must_use]
    pub const fn sequence_size(&self) -> u32 {
        self.sequence_size
    }

    /// Sets the size of the split sequence.
    pub fn set_sequence_size(&mut self, sequence_size: u32) {
        self.sequence_size = sequence_size;
    }

    /// Delivery priority.
    #[must_use]
    pub const fn priority(&self) -> MessagePriority {
        self.priority
    }

    /// Sets the delivery priority.
    pub fn set_priority(&mut self, priority: MessagePriority) {
        self.priority = priority;
    }

    /// Copies every property, every attribute and the return address of `source`.
    ///
    /// Values are cloned into this header's own maps; later changes to either header
    /// are invisible to the other. Expiration, correlation, sequence and priority are
    /// left untouched.
    pub fn copy_from(&mut self, source: &MessageHeader) {
        for (key, value) in &source.properties {
            self.properties.insert(key.clone(), value.clone());
        }
        for (key, value) in &source.attributes {
            self.attributes.insert(key.clone(), value.clone());
        }
        self.return_address = source.return_address.clone();
    }
}

impl fmt::Display for MessageHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timestamp={}", epoch_millis(self.timestamp))?;
        if let Some(expiration) = self.expiration {
            write!(f, " expiration={}", epoch_millis(expiration))?;
        }
        if let Some(address) = &self.return_address {
            write!(f, " returnAddress={address}")?;
        }
        if let Some(correlation_id) = &self.correlation_id {
            write!(f, " correlationId={correlation_id}")?;
        }
        if self.sequence_size > 0 {
            write!(f, " sequence={}/{}", self.sequence_number, self.sequence_size)?;
        }
        if self.priority != MessagePriority::Normal {
            write!(f, " priority={:?}", self.priority)?;
        }
        write_map(f, " properties", &self.properties)?;
        write_map(f, " attributes", &self.attributes)
    }
}

fn write_map(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    map: &BTreeMap<String, HeaderValue>,
) -> fmt::Result {
    write!(f, "{label}={{")?;
    for (i, (key, value)) in map.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{key}={value}")?;
    }
    f.write_str("}")
}

fn epoch_millis(time: SystemTime) -> u128 {
    time.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_millis())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_are_independent() {
        let mut header = MessageHeader::new();
        header.set_property("key", "user");
        header.set_attribute("key", "framework");
        assert_eq!(header.property("key"), Some(&HeaderValue::from("user")));
        assert_eq!(header.attribute("key"), Some(&HeaderValue::from("framework")));
        header.remove_property("key");
        assert!(header.property("key").is_none());
        assert!(header.attribute("key").is_some());
    }

    #[test]
    fn display_lists_keys_in_sorted_order() {
        let mut header = MessageHeader::new();
        header.set_property("b", 2);
        header.set_property("a", 1);
        let rendered = header.to_string();
        assert!(rendered.contains("properties={a=1, b=2}"), "{rendered}");
        assert!(rendered.contains("attributes={}"), "{rendered}");
    }

    #[test]
    fn expire_after_sets_a_future_deadline() {
        let before = SystemTime::now();
        let mut header = MessageHeader::new();
        header.expire_after(Duration::from_secs(60));
        let expiration = header.expiration().expect("expiration set");
        assert!(expiration >= before + Duration::from_secs(60));
    }

    #[test]
    fn expire_after_with_unrepresentable_ttl_never_expires() {
        let mut header = MessageHeader::new();
        header.set_expiration(Some(SystemTime::UNIX_EPOCH));
        header.expire_after(Duration::MAX);
        assert!(header.expiration().is_none());
    }
}

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
use std::time::SystemTime;

use acton_ern::Ern;
use derive_new::new;

use crate::message::{MessageError, MessageId};

/// Identity of the component that raised an event.
///
/// Wraps the component's resource name. A source is fixed when the event is built
/// and never reassigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventSource(Ern);

impl EventSource {
    /// Creates a source rooted at `name`.
    ///
    /// # Errors
    ///
    /// Returns [`MessageError::InvalidArgument`] when `name` is blank or is not a valid
    /// resource name.
    pub fn new(name: &str) -> Result<Self, MessageError> {
        if name.trim().is_empty() {
            return Err(MessageError::InvalidArgument(
                "event source must not be null".to_string(),
            ));
        }
        Ern::with_root(name)
            .map(Self)
            .map_err(|e| MessageError::InvalidArgument(format!("invalid event source '{name}': {e}")))
    }

    /// The source's resource name.
    #[must_use]
    pub const fn ern(&self) -> &Ern {
        &self.0
    }
}

impl From<Ern> for EventSource {
    fn from(value: Ern) -> Self {
        Self(value)
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reported when a server adapter has bound its socket.
///
/// `requested_port` is what the adapter was configured with (`0` asks the operating
/// system for any free port); `port` is the port actually bound.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerListening {
    /// The configured port.
    pub requested_port: u16,
    /// The bound port.
    pub port: u16,
}

/// The adapter-specific part of an [`IntegrationEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdapterEvent {
    /// A datagram server adapter started listening.
    UdpServerListening(ServerListening),
    /// A stream server adapter started listening.
    TcpServerListening(ServerListening),
    /// A connection was established.
    TcpConnectionOpened {
        /// Adapter-assigned connection id.
        connection_id: String,
    },
    /// A connection was closed.
    TcpConnectionClosed {
        /// Adapter-assigned connection id.
        connection_id: String,
    },
    /// A connection failed.
    TcpConnectionException {
        /// Adapter-assigned connection id.
        connection_id: String,
        /// Rendered cause.
        cause: String,
    },
    /// An entry could not be evaluated by a filter and was skipped.
    FilterEvaluationFailed {
        /// Lossy rendering of the entry.
        entry: String,
        /// Rendered filter error.
        reason: String,
    },
    /// A message was dropped because it had expired.
    MessageExpired {
        /// The dropped message.
        message_id: MessageId,
    },
}

/// Discriminant of [`AdapterEvent`], used to select subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`AdapterEvent::UdpServerListening`]
    UdpServerListening,
    /// [`AdapterEvent::TcpServerListening`]
    TcpServerListening,
    /// [`AdapterEvent::TcpConnectionOpened`]
    TcpConnectionOpened,
    /// [`AdapterEvent::TcpConnectionClosed`]
    TcpConnectionClosed,
    /// [`AdapterEvent::TcpConnectionException`]
    TcpConnectionException,
    /// [`AdapterEvent::FilterEvaluationFailed`]
    FilterEvaluationFailed,
    /// [`AdapterEvent::MessageExpired`]
    MessageExpired,
}

impl AdapterEvent {
    /// The variant's discriminant.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            AdapterEvent::UdpServerListening(_) => EventKind::UdpServerListening,
            AdapterEvent::TcpServerListening(_) => EventKind::TcpServerListening,
            AdapterEvent::TcpConnectionOpened { .. } => EventKind::TcpConnectionOpened,
            AdapterEvent::TcpConnectionClosed { .. } => EventKind::TcpConnectionClosed,
            AdapterEvent::TcpConnectionException { .. } => EventKind::TcpConnectionException,
            AdapterEvent::FilterEvaluationFailed { .. } => EventKind::FilterEvaluationFailed,
            AdapterEvent::MessageExpired { .. } => EventKind::MessageExpired,
        }
    }
}

impl fmt::Display for AdapterEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterEvent::UdpServerListening(listening) => {
                write!(f, "UdpServerListening port={}", listening.port)
            }
            AdapterEvent::TcpServerListening(listening) => {
                write!(f, "TcpServerListening port={}", listening.port)
            }
            AdapterEvent::TcpConnectionOpened { connection_id } => {
                write!(f, "TcpConnectionOpened id={connection_id}")
            }
            AdapterEvent::TcpConnectionClosed { connection_id } => {
                write!(f, "TcpConnectionClosed id={connection_id}")
            }
            AdapterEvent::TcpConnectionException {
                connection_id,
                cause,
            } => write!(f, "TcpConnectionException id={connection_id} cause={cause}"),
            AdapterEvent::FilterEvaluationFailed { entry, reason } => {
                write!(f, "FilterEvaluationFailed entry={entry} reason={reason}")
            }
            AdapterEvent::MessageExpired { message_id } => {
                write!(f, "MessageExpired id={message_id}")
            }
        }
    }
}

/// A lifecycle event raised by an adapter.
///
/// Immutable once built; consumers receive it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct IntegrationEvent {
    source: EventSource,
    event: AdapterEvent,
    timestamp: SystemTime,
}

impl IntegrationEvent {
    /// Creates an event raised by `source`, stamped with the current time.
    #[must_use]
    pub fn new(source: EventSource, event: AdapterEvent) -> Self {
        Self {
            source,
            event,
            timestamp: SystemTime::now(),
        }
    }

    /// Shorthand for a [`AdapterEvent::UdpServerListening`] event.
    #[must_use]
    pub fn udp_server_listening(source: EventSource, requested_port: u16, port: u16) -> Self {
        Self::new(
            source,
            AdapterEvent::UdpServerListening(ServerListening::new(requested_port, port)),
        )
    }

    /// The component that raised the event.
    #[must_use]
    pub const fn source(&self) -> &EventSource {
        &self.source
    }

    /// The adapter-specific payload.
    #[must_use]
    pub const fn event(&self) -> &AdapterEvent {
        &self.event
    }

    /// The payload's discriminant.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.event.kind()
    }

    /// When the event was raised.
    #[must_use]
    pub const fn timestamp(&self) -> SystemTime {
        self.timestamp
    }

    /// The bound port, for the listening events.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        match &self.event {
            AdapterEvent::UdpServerListening(listening)
            | AdapterEvent::TcpServerListening(listening) => Some(listening.port),
            _ => None,
        }
    }
}

impl fmt::Display for IntegrationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[source={}] {}", self.source, self.event)
    }
}

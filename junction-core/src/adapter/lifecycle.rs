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

use std::time::SystemTime;

use tracing::{debug, info};

use crate::event::{AdapterEvent, EventPublisher, EventSource, IntegrationEvent};
use crate::message::Message;

/// Publishes the "listening started" event of a datagram server adapter.
///
/// `requested` is the configured port (`0` for "any free port"); `bound` is the port
/// the socket actually got. Returns the number of subscribers the event was queued for.
pub fn announce_listening(
    publisher: &dyn EventPublisher,
    source: &EventSource,
    requested: u16,
    bound: u16,
) -> usize {
    info!(source = %source, requested, port = bound, "UDP server listening");
    publisher.publish(IntegrationEvent::udp_server_listening(
        source.clone(),
        requested,
        bound,
    ))
}

/// Removes expired messages from `messages`.
///
/// Dropping is not an error: each expired message is logged at `debug` and, when a
/// publisher is given, reported as [`AdapterEvent::MessageExpired`]. Survivors keep
/// their order. Expiration is judged against a single instant taken on entry.
pub fn discard_expired<T>(
    messages: Vec<Message<T>>,
    publisher: Option<&dyn EventPublisher>,
    source: &EventSource,
) -> Vec<Message<T>> {
    let now = SystemTime::now();
    let (expired, live): (Vec<_>, Vec<_>) = messages
        .into_iter()
        .partition(|message| message.is_expired_at(now));

    for message in expired {
        debug!(source = %source, id = %message.id(), "Discarding expired message");
        if let Some(publisher) = publisher {
            publisher.publish(IntegrationEvent::new(
                source.clone(),
                AdapterEvent::MessageExpired {
                    message_id: message.id().clone(),
                },
            ));
        }
    }
    live
}

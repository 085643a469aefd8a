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

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use static_assertions::assert_impl_all;
use tracing::debug;
use uuid::Uuid;

use crate::common::CONFIG;
use crate::message::MessageId;

/// Strategy for producing message identities.
///
/// Implementations must be callable concurrently from any number of endpoints
/// without external locking, and must never hand out the same id twice.
pub trait IdGenerator: Send + Sync + Debug {
    /// Returns a fresh identity.
    fn generate_id(&self) -> MessageId;
}

/// Generates random (version 4) UUIDs.
///
/// Stateless; uniqueness is probabilistic with negligible collision odds.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomUuidGenerator;

impl IdGenerator for RandomUuidGenerator {
    fn generate_id(&self) -> MessageId {
        MessageId::from(Uuid::new_v4())
    }
}

/// Generates ids from a monotonically increasing counter, starting at 1.
///
/// Ids are exactly unique within one generator instance. Share the instance (behind
/// an `Arc`) rather than creating one per caller.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose ids are `"{prefix}{n}"`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: AtomicU64::new(0),
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn generate_id(&self) -> MessageId {
        let n = self.next.fetch_add(1, Ordering::Relaxed) + 1;
        if self.prefix.is_empty() {
            MessageId::from(n)
        } else {
            MessageId::from_generated(format!("{}{n}", self.prefix))
        }
    }
}

/// Selects which generator backs [`default_id_generator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// [`RandomUuidGenerator`]
    #[default]
    Uuid,
    /// [`SequentialIdGenerator`]
    Sequential,
}

impl IdStrategy {
    /// Builds a generator for this strategy.
    #[must_use]
    pub fn build(self, sequential_prefix: &str) -> Arc<dyn IdGenerator> {
        match self {
            IdStrategy::Uuid => Arc::new(RandomUuidGenerator),
            IdStrategy::Sequential => Arc::new(SequentialIdGenerator::with_prefix(sequential_prefix)),
        }
    }
}

lazy_static! {
    static ref DEFAULT_GENERATOR: Arc<dyn IdGenerator> = {
        let strategy = CONFIG.ids.strategy;
        debug!(?strategy, "Initializing process-wide id generator");
        strategy.build(&CONFIG.ids.sequential_prefix)
    };
}

/// The process-wide generator used when no generator is injected.
///
/// Built once from [`IdConfig`](crate::common::config::IdConfig); every call returns
/// the same shared instance.
#[must_use]
pub fn default_id_generator() -> Arc<dyn IdGenerator> {
    Arc::clone(&DEFAULT_GENERATOR)
}

assert_impl_all!(RandomUuidGenerator: Send, Sync);
assert_impl_all!(SequentialIdGenerator: Send, Sync);

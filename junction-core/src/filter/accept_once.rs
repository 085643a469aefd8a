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

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use crate::common::CONFIG;
use crate::filter::{EntryListFilter, FilterError};

/// Admits each distinct entry at most once.
///
/// # State
///
/// * An unseen entry is accepted and becomes *seen*.
/// * A seen entry is rejected.
/// * [`forget`](Self::forget) returns an entry to *unseen*, e.g. after its
///   processing failed and it should be picked up by the next poll.
/// * With a capacity, recording a new entry beyond it evicts the oldest seen entry,
///   which becomes *unseen* again.
///
/// Unlike the other filters, `accept` changes state, so two calls with the same entry
/// return `true` then `false`. The check-and-record step is atomic, so concurrent
/// pollers never both admit the same entry. Clones share the same memory.
pub struct AcceptOnceEntryListFilter<E> {
    state: Arc<Mutex<SeenEntries<E>>>,
}

struct SeenEntries<E> {
    seen: HashSet<E>,
    order: VecDeque<E>,
    capacity: Option<usize>,
}

impl<E: Hash + Eq + Clone> AcceptOnceEntryListFilter<E> {
    /// Creates a filter using the configured default capacity (`0` is unbounded).
    #[must_use]
    pub fn new() -> Self {
        match CONFIG.filters.accept_once_capacity {
            0 => Self::with_capacity(None),
            capacity => Self::with_capacity(Some(capacity)),
        }
    }

    /// Creates a filter remembering at most `capacity` entries, or all of them for `None`.
    #[must_use]
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SeenEntries {
                seen: HashSet::new(),
                order: VecDeque::new(),
                capacity,
            })),
        }
    }

    /// Makes `entry` unseen again. Returns whether it was remembered.
    pub fn forget(&self, entry: &E) -> bool {
        let mut state = self.state.lock();
        if state.seen.remove(entry) {
            state.order.retain(|seen| seen != entry);
            true
        } else {
            false
        }
    }

    /// Number of entries currently remembered.
    #[must_use]
    pub fn seen_count(&self) -> usize {
        self.state.lock().seen.len()
    }
}

impl<E: Hash + Eq + Clone> Default for AcceptOnceEntryListFilter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for AcceptOnceEntryListFilter<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<E> fmt::Debug for AcceptOnceEntryListFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("AcceptOnceEntryListFilter")
            .field("seen", &state.seen.len())
            .field("capacity", &state.capacity)
            .finish()
    }
}

impl<E> EntryListFilter<E> for AcceptOnceEntryListFilter<E>
where
    E: Hash + Eq + Clone + Send,
{
    fn accept(&self, entry: &E) -> Result<bool, FilterError> {
        let mut state = self.state.lock();
        if state.seen.contains(entry) {
            return Ok(false);
        }
        if let Some(capacity) = state.capacity {
            while state.order.len() >= capacity {
                let Some(oldest) = state.order.pop_front() else {
                    break;
                };
                state.seen.remove(&oldest);
            }
            if capacity == 0 {
                // Nothing can be remembered; every entry is new.
                return Ok(true);
            }
        }
        state.seen.insert(entry.clone());
        state.order.push_back(entry.clone());
        trace!(remembered = state.seen.len(), "Entry accepted once");
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "AcceptOnceEntryListFilter"
    }
}

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

use tracing::trace;

use crate::filter::{EntryListFilter, FilterError};

/// Admits an entry only if both filters admit it. `right` is not consulted when
/// `left` rejects.
#[derive(Debug, Clone)]
pub struct AndFilter<A, B> {
    left: A,
    right: B,
}

/// Admits an entry if either filter admits it. `right` is not consulted when
/// `left` accepts.
#[derive(Debug, Clone)]
pub struct OrFilter<A, B> {
    left: A,
    right: B,
}

/// Inverts a filter. Evaluation errors pass through unchanged.
#[derive(Debug, Clone)]
pub struct NotFilter<A> {
    inner: A,
}

impl<E, A, B> EntryListFilter<E> for AndFilter<A, B>
where
    A: EntryListFilter<E> + Clone,
    B: EntryListFilter<E> + Clone,
{
    fn accept(&self, entry: &E) -> Result<bool, FilterError> {
        Ok(self.left.accept(entry)? && self.right.accept(entry)?)
    }

    fn name(&self) -> &'static str {
        "AndFilter"
    }
}

impl<E, A, B> EntryListFilter<E> for OrFilter<A, B>
where
    A: EntryListFilter<E> + Clone,
    B: EntryListFilter<E> + Clone,
{
    fn accept(&self, entry: &E) -> Result<bool, FilterError> {
        Ok(self.left.accept(entry)? || self.right.accept(entry)?)
    }

    fn name(&self) -> &'static str {
        "OrFilter"
    }
}

impl<E, A> EntryListFilter<E> for NotFilter<A>
where
    A: EntryListFilter<E> + Clone,
{
    fn accept(&self, entry: &E) -> Result<bool, FilterError> {
        Ok(!self.inner.accept(entry)?)
    }

    fn name(&self) -> &'static str {
        "NotFilter"
    }
}

/// Combinators available on every clonable filter.
pub trait EntryListFilterExt<E>: EntryListFilter<E> + Clone + Sized {
    /// Both `self` and `other` must accept.
    fn and<F>(self, other: F) -> AndFilter<Self, F>
    where
        F: EntryListFilter<E> + Clone,
    {
        AndFilter {
            left: self,
            right: other,
        }
    }

    /// Either `self` or `other` must accept.
    fn or<F>(self, other: F) -> OrFilter<Self, F>
    where
        F: EntryListFilter<E> + Clone,
    {
        OrFilter {
            left: self,
            right: other,
        }
    }

    /// Accepts exactly what `self` rejects.
    fn not(self) -> NotFilter<Self> {
        NotFilter { inner: self }
    }

    /// Boxes the filter for storage next to filters of other types.
    fn boxed(self) -> Box<dyn EntryListFilter<E>>
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<E, T> EntryListFilterExt<E> for T where T: EntryListFilter<E> + Clone {}

/// How a [`CompositeEntryListFilter`] combines its members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompositeMode {
    /// Every member must accept.
    #[default]
    MatchAll,
    /// At least one member must accept.
    MatchAny,
}

/// A runtime-assembled list of filters.
///
/// Members are consulted in insertion order and evaluation stops as soon as the
/// outcome is known. An empty composite accepts every entry.
pub struct CompositeEntryListFilter<E> {
    filters: Vec<Box<dyn EntryListFilter<E>>>,
    mode: CompositeMode,
}

impl<E: 'static> CompositeEntryListFilter<E> {
    /// Creates an empty composite in [`CompositeMode::MatchAll`] mode.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(CompositeMode::MatchAll)
    }

    /// Creates an empty composite using `mode`.
    #[must_use]
    pub fn with_mode(mode: CompositeMode) -> Self {
        Self {
            filters: Vec::new(),
            mode,
        }
    }

    /// Appends a member filter.
    #[must_use]
    pub fn with_filter(mut self, filter: impl EntryListFilter<E> + 'static) -> Self {
        self.add_filter(filter);
        self
    }

    /// Appends a member filter.
    pub fn add_filter(&mut self, filter: impl EntryListFilter<E> + 'static) {
        self.filters.push(Box::new(filter));
    }

    /// Number of member filters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    /// True when there are no member filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<E: 'static> Default for CompositeEntryListFilter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for CompositeEntryListFilter<E> {
    fn clone(&self) -> Self {
        Self {
            filters: self.filters.clone(),
            mode: self.mode,
        }
    }
}

impl<E> fmt::Debug for CompositeEntryListFilter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeEntryListFilter")
            .field("mode", &self.mode)
            .field("filters", &self.filters)
            .finish()
    }
}

impl<E> EntryListFilter<E> for CompositeEntryListFilter<E> {
    fn accept(&self, entry: &E) -> Result<bool, FilterError> {
        for filter in &self.filters {
            let accepted = filter.accept(entry)?;
            trace!(member = filter.name(), accepted, "Composite member evaluated");
            match (self.mode, accepted) {
                (CompositeMode::MatchAll, false) => return Ok(false),
                (CompositeMode::MatchAny, true) => return Ok(true),
                _ => {}
            }
        }
        Ok(match self.mode {
            CompositeMode::MatchAll => true,
            CompositeMode::MatchAny => self.filters.is_empty(),
        })
    }

    fn name(&self) -> &'static str {
        "CompositeEntryListFilter"
    }
}

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

use std::borrow::Cow;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use dyn_clone::DynClone;
use tracing::{trace, warn};

use crate::filter::FilterError;

/// Decides whether an external entry should enter the processing pipeline.
///
/// `accept` must be deterministic: with no state-changing call in between, the same
/// entry yields the same answer. Implementations must be safe to call from several
/// pollers at once. Stateful variants document their state transitions on the type.
///
/// Filters are object safe and clonable as `Box<dyn EntryListFilter<E>>`, and compose
/// through [`EntryListFilterExt`](crate::filter::EntryListFilterExt) or
/// [`CompositeEntryListFilter`](crate::filter::CompositeEntryListFilter).
pub trait EntryListFilter<E>: DynClone + Debug + Send + Sync {
    /// Whether `entry` is admitted.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Evaluation`] when the entry cannot be evaluated. The
    /// entry is then neither admitted nor rejected; the caller decides what to do.
    fn accept(&self, entry: &E) -> Result<bool, FilterError>;

    /// A short name used in diagnostics.
    fn name(&self) -> &'static str {
        let full = std::any::type_name::<Self>();
        let base = full.split('<').next().unwrap_or(full);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Runs `accept` over every entry.
    ///
    /// A failing entry never aborts the batch: it is logged, set aside in
    /// [`FilteredEntries::failures`], and evaluation continues with the next entry.
    /// Accepted entries keep their input order.
    fn filter_entries(&self, entries: Vec<E>) -> FilteredEntries<E> {
        let mut filtered = FilteredEntries::default();
        for entry in entries {
            match self.accept(&entry) {
                Ok(true) => filtered.accepted.push(entry),
                Ok(false) => filtered.rejected += 1,
                Err(error) => {
                    warn!(filter = self.name(), %error, "Entry could not be evaluated, skipping");
                    filtered.failures.push((entry, error));
                }
            }
        }
        trace!(
            filter = self.name(),
            accepted = filtered.accepted.len(),
            rejected = filtered.rejected,
            failed = filtered.failures.len(),
            "Filtered entries"
        );
        filtered
    }
}

dyn_clone::clone_trait_object!(<E> EntryListFilter<E>);

impl<E, F> EntryListFilter<E> for Box<F>
where
    F: EntryListFilter<E> + ?Sized,
    Box<F>: Clone,
{
    fn accept(&self, entry: &E) -> Result<bool, FilterError> {
        (**self).accept(entry)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Outcome of [`EntryListFilter::filter_entries`].
#[derive(Debug)]
pub struct FilteredEntries<E> {
    /// Entries that were admitted, in input order.
    pub accepted: Vec<E>,
    /// Number of entries that were evaluated and turned away.
    pub rejected: usize,
    /// Entries that could not be evaluated, with the reason.
    pub failures: Vec<(E, FilterError)>,
}

impl<E> Default for FilteredEntries<E> {
    fn default() -> Self {
        Self {
            accepted: Vec::new(),
            rejected: 0,
            failures: Vec::new(),
        }
    }
}

/// An entry with a textual path, as consumed by the pattern filters.
pub trait PathEntry {
    /// The entry's path representation.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::Evaluation`] when the path has no textual form.
    fn entry_path(&self) -> Result<Cow<'_, str>, FilterError>;
}

impl PathEntry for String {
    fn entry_path(&self) -> Result<Cow<'_, str>, FilterError> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl PathEntry for &str {
    fn entry_path(&self) -> Result<Cow<'_, str>, FilterError> {
        Ok(Cow::Borrowed(self))
    }
}

impl PathEntry for PathBuf {
    fn entry_path(&self) -> Result<Cow<'_, str>, FilterError> {
        utf8_path(self.as_path())
    }
}

impl PathEntry for &Path {
    fn entry_path(&self) -> Result<Cow<'_, str>, FilterError> {
        utf8_path(self)
    }
}

fn utf8_path(path: &Path) -> Result<Cow<'_, str>, FilterError> {
    path.to_str()
        .map(Cow::Borrowed)
        .ok_or_else(|| FilterError::evaluation(path.to_string_lossy(), "path is not valid UTF-8"))
}

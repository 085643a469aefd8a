//! The entry-filtering framework used by inbound adapters.
//!
//! An adapter scans its external source (a directory, a socket, a queue) for
//! candidate entries and asks an [`EntryListFilter`] which of them are eligible to
//! become messages.
//!
//! # Key Components
//!
//! *   [`EntryListFilter`]: The single-operation filter contract, plus batch
//!     evaluation that isolates entries which cannot be evaluated.
//! *   [`EntryListFilterExt`] and [`CompositeEntryListFilter`]: Static and runtime
//!     composition of filters.
//! *   [`AntPathMatcher`] and [`AntPatternEntryFilter`]: Ant-style path patterns.
//! *   [`RegexPatternEntryFilter`]: Regular expressions over file names.
//! *   [`AcceptOnceEntryListFilter`]: The stateful "only new entries" variant.
//! *   [`UnexpiredMessageFilter`]: Drops expired messages.

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
pub use accept_once::AcceptOnceEntryListFilter;
pub use ant_path_matcher::AntPathMatcher;
pub use composite::{
    AndFilter, CompositeEntryListFilter, CompositeMode, EntryListFilterExt, NotFilter, OrFilter,
};
pub use entry_list_filter::{EntryListFilter, FilteredEntries, PathEntry};
pub use filter_error::FilterError;
pub use message_filter::UnexpiredMessageFilter;
pub use pattern_filter::{AntPatternEntryFilter, RegexPatternEntryFilter};

// --- Submodules ---

/// Defines [`AcceptOnceEntryListFilter`].
mod accept_once;
/// Defines [`AntPathMatcher`].
mod ant_path_matcher;
/// Defines filter combinators and [`CompositeEntryListFilter`].
mod composite;
/// Defines the [`EntryListFilter`] contract.
mod entry_list_filter;
/// Defines [`FilterError`].
mod filter_error;
/// Defines [`UnexpiredMessageFilter`].
mod message_filter;
/// Defines the path-pattern filters.
mod pattern_filter;

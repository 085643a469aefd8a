//! Common type aliases shared across `junction-core`.

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

use std::future::Future;
use std::pin::Pin;

use crate::filter::EntryListFilter;

/// A pinned, boxed future resolving to an `anyhow::Result<()>`, as returned by
/// closure-based event subscribers.
pub type FutureBoxResult = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// An owned, type-erased entry filter.
pub type BoxedEntryListFilter<E> = Box<dyn EntryListFilter<E>>;

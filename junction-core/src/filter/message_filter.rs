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
use std::marker::PhantomData;

use crate::filter::{EntryListFilter, FilterError};
use crate::message::Message;

/// Admits only messages that have not expired at the time of the call.
///
/// This is the policy layer for expiration: expired messages are dropped quietly,
/// never reported as errors.
pub struct UnexpiredMessageFilter<T> {
    _payload: PhantomData<fn(&T)>,
}

impl<T> UnexpiredMessageFilter<T> {
    /// Creates the filter.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _payload: PhantomData,
        }
    }
}

impl<T> Default for UnexpiredMessageFilter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for UnexpiredMessageFilter<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for UnexpiredMessageFilter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UnexpiredMessageFilter")
    }
}

impl<T> EntryListFilter<Message<T>> for UnexpiredMessageFilter<T> {
    fn accept(&self, message: &Message<T>) -> Result<bool, FilterError> {
        Ok(!message.is_expired())
    }

    fn name(&self) -> &'static str {
        "UnexpiredMessageFilter"
    }
}
